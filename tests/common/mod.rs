#![allow(dead_code)]

use mesh_metric::prelude::*;
use nalgebra::Vector3;

/// Structured triangulation of `[x0, x1] × [y0, y1]` lifted to `z = f(x, y)`.
///
/// Points are numbered row by row (`j * nx + i`). Normals come from `normal`.
pub struct Grid {
    pub mesh: SurfaceMesh,
    pub nx: usize,
    pub ny: usize,
    pub ids: Vec<PointId>,
}

impl Grid {
    pub fn at(&self, i: usize, j: usize) -> PointId {
        self.ids[j * self.nx + i]
    }

    pub fn is_boundary(&self, i: usize, j: usize) -> bool {
        i == 0 || j == 0 || i + 1 == self.nx || j + 1 == self.ny
    }
}

pub fn grid(
    nx: usize,
    ny: usize,
    (x0, x1): (f64, f64),
    (y0, y1): (f64, f64),
    f: impl Fn(f64, f64) -> f64,
    normal: impl Fn(f64, f64) -> [f64; 3],
) -> Grid {
    let mut mesh = SurfaceMesh::with_capacity(nx * ny, 2 * (nx - 1) * (ny - 1));
    let mut ids = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            let x = x0 + (x1 - x0) * i as f64 / (nx - 1) as f64;
            let y = y0 + (y1 - y0) * j as f64 / (ny - 1) as f64;
            let p = mesh.add_point([x, y, f(x, y)]);
            mesh.set_normal(p, normal(x, y)).unwrap();
            ids.push(p);
        }
    }
    for j in 0..ny - 1 {
        for i in 0..nx - 1 {
            let a = ids[j * nx + i];
            let b = ids[j * nx + i + 1];
            let c = ids[(j + 1) * nx + i + 1];
            let d = ids[(j + 1) * nx + i];
            mesh.add_tria([a, b, c]).unwrap();
            mesh.add_tria([a, c, d]).unwrap();
        }
    }
    Grid { mesh, nx, ny, ids }
}

pub fn flat_square(n: usize) -> Grid {
    grid(n, n, (0.0, 1.0), (0.0, 1.0), |_, _| 0.0, |_, _| [0.0, 0.0, 1.0])
}

/// `z = (a·x² + b·y²) / 2` over `[-0.5, 0.5]²` with exact normals.
pub fn paraboloid(n: usize, a: f64, b: f64) -> Grid {
    grid(
        n,
        n,
        (-0.5, 0.5),
        (-0.5, 0.5),
        move |x, y| 0.5 * (a * x * x + b * y * y),
        move |x, y| [-a * x, -b * y, 1.0],
    )
}

/// Closed UV sphere of radius `r` with exact outward normals.
pub fn uv_sphere(r: f64, nlat: usize, nlon: usize) -> (SurfaceMesh, PointId, PointId) {
    let mut mesh = SurfaceMesh::new();
    let add = |mesh: &mut SurfaceMesh, x: Vector3<f64>| {
        let p = mesh.add_point((x * r).into());
        mesh.set_normal(p, x.into()).unwrap();
        p
    };
    let north = add(&mut mesh, Vector3::z());
    let rings: Vec<Vec<PointId>> = (1..nlat)
        .map(|i| {
            let theta = std::f64::consts::PI * i as f64 / nlat as f64;
            (0..nlon)
                .map(|j| {
                    let phi = std::f64::consts::TAU * j as f64 / nlon as f64;
                    let x = Vector3::new(
                        theta.sin() * phi.cos(),
                        theta.sin() * phi.sin(),
                        theta.cos(),
                    );
                    add(&mut mesh, x)
                })
                .collect()
        })
        .collect();
    let south = add(&mut mesh, -Vector3::z());

    for j in 0..nlon {
        let jn = (j + 1) % nlon;
        mesh.add_tria([north, rings[0][j], rings[0][jn]]).unwrap();
        for w in rings.windows(2) {
            let (up, down) = (&w[0], &w[1]);
            mesh.add_tria([up[j], down[j], down[jn]]).unwrap();
            mesh.add_tria([up[j], down[jn], up[jn]]).unwrap();
        }
        let last = &rings[rings.len() - 1];
        mesh.add_tria([south, last[jn], last[j]]).unwrap();
    }
    (mesh, north, south)
}

/// Sheet folded along the x axis: `z = c·y²` for `y ≥ 0` and `z = -y/2`
/// for `y < 0`.
///
/// The fold is tagged as a ridge; its two ends on the boundary are corners.
pub fn folded_sheet(nx: usize, half_rows: usize, c: f64) -> (Grid, Vec<PointId>) {
    let ny = 2 * half_rows + 1;
    let slope = 0.5;
    let n2 = [0.0, slope, 1.0];
    let mut g = grid(
        nx,
        ny,
        (0.0, 1.0),
        (-0.5, 0.5),
        move |_, y| if y >= 0.0 { c * y * y } else { -slope * y },
        move |_, y| if y >= 0.0 { [0.0, -2.0 * c * y, 1.0] } else { n2 },
    );
    let ridge: Vec<PointId> = (0..nx).map(|i| g.at(i, half_rows)).collect();
    for (k, &p) in ridge.iter().enumerate() {
        if k == 0 || k + 1 == nx {
            g.mesh.set_tag(p, PointTag::CORNER).unwrap();
        } else {
            g.mesh.set_tag(p, PointTag::RIDGE).unwrap();
            g.mesh.set_tangent(p, [1.0, 0.0, 0.0]).unwrap();
            g.mesh.set_ridge_normals(p, [0.0, 0.0, 1.0], n2).unwrap();
        }
    }
    for w in ridge.windows(2) {
        g.mesh.tag_edge(w[0], w[1], EdgeTag::Ridge).unwrap();
    }
    (g, ridge)
}

pub fn params(hmin: f64, hmax: f64, hausd: f64) -> SizeMapParams {
    SizeMapParams {
        hmin,
        hmax: Some(hmax),
        hausd,
        hgrad: None,
        ..Default::default()
    }
}

/// Tangential eigenvalues of a tensor whose kernel holds the normal.
pub fn tangent_eigenvalues(m: &SymTensor3) -> [f64; 2] {
    let ev = m.eigenvalues();
    [ev[1], ev[2]]
}
