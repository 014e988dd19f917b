//! Curvature-based metric estimation at a single point.
//!
//! The estimator is chosen by the feature class of the point:
//!
//! - **singular**: isotropic size from the largest normal curvature of the
//!   edge curves leaving the point;
//! - **ridge**: one size along the ridge (curvature of the two ridge curves)
//!   and one per incident sheet (curvature of the sheet in the direction
//!   orthogonal to the ridge);
//! - **regular**: least-squares quadric fitted to samples of the Bezier
//!   patches of the ball, in the tangent frame of the point;
//! - **reference**: the regular fit, overridden along the reference curve by
//!   the curvature of the curve itself.
//!
//! Curvature `κ` maps to a specific size `factor·κ/hausd` clamped to
//! `[1/hmax², 1/hmin²]`.

use crate::adapt::ResolvedParams;
use crate::adapt::metric::{PointMetric, RidgeSizes};
use crate::geometry::bezier::{BezierPatch, edge_curve};
use crate::geometry::linalg::{SymMat2, SymTensor3, rotation_to_z, solve_sym3};
use crate::mesh_error::MeshMetricError;
use crate::topology::ball::{Ball, ball, half_balls, outer_points};
use crate::topology::point::{PointId, TriaId};
use crate::topology::surface::{EPSD, NEXT, PREV, SurfaceMesh};
use crate::topology::tags::PointClass;
use arrayvec::ArrayVec;
use itertools::Itertools;
use nalgebra::{Matrix3, Vector2, Vector3};
use std::fmt;

/// Size factor for curvatures of curves.
const CURVE_FACTOR: f64 = 1.0 / 8.0;
/// Size factor for curvatures from the quadric fit.
const SURFACE_FACTOR: f64 = 2.0 / 9.0;

/// Why a point could not be estimated locally.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocalFailure {
    /// The ball folds over when projected on the tangent plane.
    DegenerateProjection,
    /// The quadric normal equations are singular.
    SingularFit,
    /// A reference point has fewer than two reference neighbours.
    MissingReferenceCurve,
}

impl fmt::Display for LocalFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LocalFailure::DegenerateProjection => "bad projection over tangent plane",
            LocalFailure::SingularFit => "singular quadric fit",
            LocalFailure::MissingReferenceCurve => "fewer than two reference neighbours",
        })
    }
}

/// Result of a point estimate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Estimate {
    /// The metric of the point.
    Resolved(PointMetric),
    /// The point needs a fallback metric.
    Unresolved(LocalFailure),
}

/// Specific size for curvature `kappa`, clamped to the allowed range.
pub fn size_from_curvature(kappa: f64, factor: f64, params: &ResolvedParams) -> f64 {
    (factor * kappa / params.hausd)
        .min(params.isqhmin)
        .max(params.isqhmax)
}

/// Estimates the metric at local vertex `local` of triangle `t`.
///
/// # Errors
/// Broken topology around the point (empty or oversized ball, missing ridge
/// record, a reference point on three reference curves).
pub fn estimate_point(
    mesh: &SurfaceMesh,
    t: TriaId,
    local: usize,
    params: &ResolvedParams,
) -> Result<Estimate, MeshMetricError> {
    let p = mesh.tria(t)?.v[local % 3];
    match mesh.point(p)?.tag.class() {
        PointClass::Singular => singular(mesh, t, local, params),
        PointClass::Ridge => ridge(mesh, t, local, params),
        PointClass::Reference => reference(mesh, t, local, params),
        PointClass::Regular => regular(mesh, t, local, params),
    }
}

/// Normal curvature at `x0` of the cubic `(x0, b0, b1, ..)`.
fn curve_curvature(x0: &Vector3<f64>, b0: &Vector3<f64>, b1: &Vector3<f64>) -> Option<f64> {
    let tau = (b0 - x0) * 3.0;
    let ll = tau.norm_squared();
    if ll < EPSD {
        return None;
    }
    let gammasec = x0 * 6.0 - b0 * 12.0 + b1 * 6.0;
    let normal_part = gammasec - tau * (gammasec.dot(&tau) / ll);
    Some(normal_part.norm() / ll)
}

fn singular(
    mesh: &SurfaceMesh,
    t: TriaId,
    local: usize,
    params: &ResolvedParams,
) -> Result<Estimate, MeshMetricError> {
    let ball = ball(mesh, t, local)?;
    let p = ball.center;
    let x0 = mesh.point(p)?.position();

    // every edge of the fan, including the far edge of an open fan
    let mut edges = Vec::with_capacity(ball.len() + 1);
    for &(k, i0) in &ball.fan {
        let tria = mesh.tria(k)?;
        edges.push((k, tria.v[NEXT[i0]], tria.edges[PREV[i0]].is_feature()));
    }
    if !ball.closed {
        if let Some(&(k, i0)) = ball.fan.last() {
            let tria = mesh.tria(k)?;
            edges.push((k, tria.v[PREV[i0]], tria.edges[NEXT[i0]].is_feature()));
        }
    }

    let mut max_kappa: f64 = 0.0;
    for (k, q, feature) in edges {
        let nt = mesh.tria_normal(k).unwrap_or_else(Vector3::zeros);
        let (b0, b1) = edge_curve(mesh, p, q, feature, &nt)?;
        if let Some(kappa) = curve_curvature(&x0, &b0, &b1) {
            max_kappa = max_kappa.max(kappa);
        }
    }
    let alpha = size_from_curvature(max_kappa, CURVE_FACTOR, params);
    Ok(Estimate::Resolved(PointMetric::Isotropic(alpha)))
}

/// Points of a fan expressed in the frame `r` centred at `x0`.
fn rotated_points(
    mesh: &SurfaceMesh,
    pts: &[PointId],
    x0: &Vector3<f64>,
    r: &Matrix3<f64>,
) -> Result<Vec<Vector3<f64>>, MeshMetricError> {
    pts.iter()
        .map(|&q| Ok(r * (mesh.point(q)?.position() - x0)))
        .collect()
}

#[inline]
fn cross2(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

fn ridge(
    mesh: &SurfaceMesh,
    t: TriaId,
    local: usize,
    params: &ResolvedParams,
) -> Result<Estimate, MeshMetricError> {
    let halves = half_balls(mesh, t, local)?;
    let p = halves.center;
    let point = mesh.point(p)?;
    let x0 = point.position();
    let tangent = point.tangent();
    let (n1, n2) = mesh.ridge_normals(p)?;

    let mut sizes = RidgeSizes::uniform(params.isqhmax);

    // along the ridge
    for end in halves.ridge_ends {
        let (b0, b1) = edge_curve(mesh, p, end, true, &n1)?;
        if let Some(kappa) = curve_curvature(&x0, &b0, &b1) {
            sizes.tangent = sizes
                .tangent
                .max(size_from_curvature(kappa, CURVE_FACTOR, params));
        }
    }

    // across the ridge, one sheet at a time
    for (side, n) in [n1, n2].into_iter().enumerate() {
        let fan = &halves.sides[side];
        if fan.is_empty() {
            continue;
        }
        let r = rotation_to_z(&n);
        let pts = outer_points(mesh, fan, true)?;
        let lispoi: Vec<Vector2<f64>> = rotated_points(mesh, &pts, &x0, &r)?
            .into_iter()
            .map(|x| x.xy())
            .collect();
        let trot = r * tangent;
        let dir = Vector2::new(-trot.y, trot.x);

        // fan triangle whose sector [x_k, x_k+1) holds the direction
        // orthogonal to the ridge
        let straddles = |k: usize, u: &Vector2<f64>| {
            cross2(&lispoi[k], u) >= 0.0 && cross2(u, &lispoi[k + 1]) > 0.0
        };
        let found = [dir, -dir]
            .into_iter()
            .find_map(|u| (0..fan.len()).find(|&k| straddles(k, &u)).map(|k| (k, u)));
        let Some((k, u)) = found else {
            log::debug!("ridge point {p}: no triangle across the ridge on sheet {}", side + 1);
            continue;
        };

        let detg = cross2(&lispoi[k], &u);
        let detd = cross2(&u, &lispoi[k + 1]);
        let det = detg + detd;
        if det < EPSD {
            continue;
        }
        // weights of the edges toward the next and the previous vertex
        let (l0, l1) = (detd / det, detg / det);

        let (tk, i0) = fan[k];
        let patch = BezierPatch::new(mesh, tk)?;
        let [j0, j1] = patch.jacobian(i0);
        let [h0, h1, h2] = patch.hessian(i0);

        let tau = j0 * l0 + j1 * l1;
        let ll = tau.norm_squared();
        if ll < EPSD {
            continue;
        }
        let tau = tau / ll.sqrt();
        let gammasec = h0 * (l0 * l0) + h1 * (2.0 * l0 * l1) + h2 * (l1 * l1);
        let normal_part = gammasec - tau * gammasec.dot(&tau);
        let kappa = normal_part.norm() / ll;
        sizes.sheets[side] = sizes.sheets[side].max(size_from_curvature(
            kappa,
            CURVE_FACTOR,
            params,
        ));
    }

    Ok(Estimate::Resolved(PointMetric::Ridge(sizes)))
}

/// Outcome of the quadric fit.
enum Fit {
    /// All samples lie in the tangent plane.
    Flat,
    /// Truncated curvature tensor in the tangent frame.
    Curved(SymMat2),
    Failed(LocalFailure),
}

/// Normal equations of `z = c0·x² + c1·y² + c2·xy`.
#[derive(Default)]
struct QuadricSystem {
    taa: [f64; 6],
    tab: [f64; 3],
}

impl QuadricSystem {
    fn add(&mut self, c: &Vector3<f64>) {
        let (x, y, z) = (c.x, c.y, c.z);
        self.taa[0] += x * x * x * x;
        self.taa[1] += x * x * y * y;
        self.taa[2] += x * x * x * y;
        self.taa[3] += y * y * y * y;
        self.taa[4] += x * y * y * y;
        self.taa[5] += x * x * y * y;
        self.tab[0] += x * x * z;
        self.tab[1] += y * y * z;
        self.tab[2] += x * y * z;
    }
}

/// Barycentric triple with weight `a` on corner `i0`, `b` on the next corner
/// and `c` on the previous one.
fn bary(i0: usize, a: f64, b: f64, c: f64) -> [f64; 3] {
    let mut w = [0.0; 3];
    w[i0] = a;
    w[NEXT[i0]] = b;
    w[PREV[i0]] = c;
    w
}

/// Fits the local quadric over the ball, in the frame `r` centred at `x0`.
fn fit_quadric(
    mesh: &SurfaceMesh,
    ball: &Ball,
    x0: &Vector3<f64>,
    r: &Matrix3<f64>,
    params: &ResolvedParams,
) -> Result<Fit, MeshMetricError> {
    let pts = ball.outer_points(mesh)?;
    let lispoi = rotated_points(mesh, &pts, x0, r)?;

    let folded = |(a, b): (&Vector3<f64>, &Vector3<f64>)| a.x * b.y - a.y * b.x <= 0.0;
    let bad_projection = if ball.closed {
        lispoi.iter().circular_tuple_windows().any(folded)
    } else {
        lispoi.iter().tuple_windows().any(folded)
    };
    if bad_projection {
        return Ok(Fit::Failed(LocalFailure::DegenerateProjection));
    }

    let mut sys = QuadricSystem::default();
    for (k, &(tk, i0)) in ball.fan.iter().enumerate() {
        let patch = BezierPatch::new(mesh, tk)?.to_frame(x0, r);
        // middle of the curve toward the ball point, and the point itself
        sys.add(&patch.eval(bary(i0, 0.5, 0.5, 0.0)));
        sys.add(&lispoi[k]);
        // inside the patch, and middle of the opposite curve
        sys.add(&patch.eval(bary(i0, 0.5, 0.25, 0.25)));
        sys.add(&patch.eval(bary(i0, 0.0, 0.5, 0.5)));
    }
    if !ball.closed {
        if let Some(last) = lispoi.last() {
            sys.add(last);
        }
    }

    let [b0, b1, b2] = sys.tab;
    if b0 * b0 + b1 * b1 + b2 * b2 < EPSD {
        return Ok(Fit::Flat);
    }
    let Some(c) = solve_sym3(&sys.taa, &sys.tab) else {
        return Ok(Fit::Failed(LocalFailure::SingularFit));
    };

    let second_form = SymMat2([2.0 * c[0], c[2], 2.0 * c[1]]);
    let eig = second_form.eigen();
    let kappa = eig
        .values
        .map(|k| size_from_curvature(k.abs(), SURFACE_FACTOR, params));
    Ok(Fit::Curved(SymMat2::from_eigen(kappa, &eig.vectors)))
}

fn regular(
    mesh: &SurfaceMesh,
    t: TriaId,
    local: usize,
    params: &ResolvedParams,
) -> Result<Estimate, MeshMetricError> {
    let ball = ball(mesh, t, local)?;
    let point = mesh.point(ball.center)?;
    let x0 = point.position();
    let r = rotation_to_z(&point.normal());

    Ok(match fit_quadric(mesh, &ball, &x0, &r, params)? {
        Fit::Flat => Estimate::Resolved(PointMetric::Tensor(SymTensor3::scaled_identity(
            params.isqhmax,
        ))),
        Fit::Curved(block) => Estimate::Resolved(PointMetric::Tensor(SymTensor3::embed(&block, &r))),
        Fit::Failed(reason) => Estimate::Unresolved(reason),
    })
}

fn note_reference(
    refs: &mut ArrayVec<PointId, 2>,
    p: PointId,
    q: PointId,
) -> Result<(), MeshMetricError> {
    if refs.contains(&q) {
        return Ok(());
    }
    if refs.is_full() {
        return Err(MeshMetricError::TooManyReferenceNeighbors {
            point: p,
            first: refs[0],
            second: refs[1],
            third: q,
        });
    }
    refs.push(q);
    Ok(())
}

/// Reference-curve neighbours of the centre of `ball`, at most two.
fn reference_neighbours(
    mesh: &SurfaceMesh,
    ball: &Ball,
) -> Result<ArrayVec<PointId, 2>, MeshMetricError> {
    let p = ball.center;
    let mut refs = ArrayVec::<PointId, 2>::new();
    for &(k, i0) in &ball.fan {
        let tria = mesh.tria(k)?;
        let (i1, i2) = (NEXT[i0], PREV[i0]);
        // edge i1 joins the centre to v[i2], edge i2 joins it to v[i1]
        if tria.edges[i1].is_reference() {
            note_reference(&mut refs, p, tria.v[i2])?;
        }
        if tria.edges[i2].is_reference() {
            note_reference(&mut refs, p, tria.v[i1])?;
        }
    }
    Ok(refs)
}

/// Keeps the eigen-directions of `curve`, raising each eigenvalue to the
/// size of `surface` in that direction, capped at `isqhmin`.
fn keep_directions(curve: &SymMat2, surface: &SymMat2, isqhmin: f64) -> SymMat2 {
    let eig = curve.eigen();
    let values = [0, 1].map(|i| {
        eig.values[i]
            .max(surface.quad(&eig.vectors[i]))
            .min(isqhmin)
    });
    SymMat2::from_eigen(values, &eig.vectors)
}

fn reference(
    mesh: &SurfaceMesh,
    t: TriaId,
    local: usize,
    params: &ResolvedParams,
) -> Result<Estimate, MeshMetricError> {
    let ball = ball(mesh, t, local)?;
    let p = ball.center;
    let point = mesh.point(p)?;
    let x0 = point.position();
    let tangent = point.tangent();
    let r = rotation_to_z(&point.normal());

    let refs = reference_neighbours(mesh, &ball)?;
    if refs.len() < 2 {
        return Ok(Estimate::Unresolved(LocalFailure::MissingReferenceCurve));
    }

    let surface = match fit_quadric(mesh, &ball, &x0, &r, params)? {
        Fit::Flat => {
            return Ok(Estimate::Resolved(PointMetric::Tensor(
                SymTensor3::scaled_identity(params.isqhmax),
            )));
        }
        Fit::Curved(block) => block,
        Fit::Failed(reason) => return Ok(Estimate::Unresolved(reason)),
    };

    // curvature of the reference curve toward each neighbour
    let mut kappa: f64 = 0.0;
    for &q in &refs {
        let pq = mesh.point(q)?;
        let u = pq.position() - x0;
        let b0 = r * (tangent * (u.dot(&tangent) / 3.0));
        let b1 = if pq.tag.is_singular() || !pq.has_tangent() {
            r * (u - u / 3.0)
        } else {
            let t1 = pq.tangent();
            r * (u - t1 * (u.dot(&t1) / 3.0))
        };
        let tau = b0.xy() * 3.0;
        let ll = tau.norm_squared();
        if ll < EPSD {
            continue;
        }
        let gammasec = b1 * 6.0 - b0 * 12.0;
        kappa = kappa.max(gammasec.z.abs() / ll);
    }

    let kcur = size_from_curvature(kappa, CURVE_FACTOR, params);
    let tau = (r * tangent).xy();
    let (t0, t1) = (tau.x, tau.y);
    let isqhmax = params.isqhmax;
    let curve = SymMat2([
        kcur * t0 * t0 + isqhmax * t1 * t1,
        (kcur - isqhmax) * t0 * t1,
        kcur * t1 * t1 + isqhmax * t0 * t0,
    ]);
    let block = keep_directions(&curve, &surface, params.isqhmin);
    Ok(Estimate::Resolved(PointMetric::Tensor(SymTensor3::embed(
        &block, &r,
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapt::SizeMapParams;
    use crate::topology::tags::{EdgeTag, PointTag};
    use approx::assert_relative_eq;

    fn params(mesh: &SurfaceMesh, hmin: f64, hmax: f64, hausd: f64) -> ResolvedParams {
        SizeMapParams {
            hmin,
            hmax: Some(hmax),
            hausd,
            ..Default::default()
        }
        .resolved(mesh)
        .unwrap()
    }

    /// Closed hexagonal fan around the origin on `z = f(x, y)`.
    fn fan(f: impl Fn(f64, f64) -> f64) -> (SurfaceMesh, PointId, Vec<PointId>, Vec<TriaId>) {
        let mut mesh = SurfaceMesh::new();
        let c = mesh.add_point([0.0, 0.0, f(0.0, 0.0)]);
        let ring: Vec<PointId> = (0..6)
            .map(|k| {
                let a = std::f64::consts::FRAC_PI_3 * k as f64;
                let (x, y) = (0.1 * a.cos(), 0.1 * a.sin());
                mesh.add_point([x, y, f(x, y)])
            })
            .collect();
        let trias = (0..6)
            .map(|k| mesh.add_tria([c, ring[k], ring[(k + 1) % 6]]).unwrap())
            .collect();
        (mesh, c, ring, trias)
    }

    #[test]
    fn size_law_clamps() {
        let mesh = fan(|_, _| 0.0).0;
        let r = params(&mesh, 0.1, 1.0, 0.01);
        assert_eq!(size_from_curvature(0.0, CURVE_FACTOR, &r), 1.0);
        assert_eq!(size_from_curvature(1e9, CURVE_FACTOR, &r), r.isqhmin);
        assert_relative_eq!(size_from_curvature(0.4, CURVE_FACTOR, &r), 5.0);
    }

    #[test]
    fn flat_regular_point_is_isotropic_hmax() {
        let (mesh, _, _, trias) = fan(|_, _| 0.0);
        let r = params(&mesh, 0.01, 0.5, 0.01);
        let est = estimate_point(&mesh, trias[0], 0, &r).unwrap();
        assert_eq!(
            est,
            Estimate::Resolved(PointMetric::Tensor(SymTensor3::scaled_identity(4.0)))
        );
    }

    #[test]
    fn paraboloid_curvature_is_recovered() {
        // z = (x² + y²)/2 has unit curvature in every direction at the apex
        let (mut mesh, c, ring, trias) = fan(|x, y| 0.5 * (x * x + y * y));
        mesh.set_normal(c, [0.0, 0.0, 1.0]).unwrap();
        for &q in &ring {
            let x = mesh.point(q).unwrap().position();
            mesh.set_normal(q, [-x.x, -x.y, 1.0]).unwrap();
        }
        let r = params(&mesh, 1e-4, 10.0, 0.01);
        let Estimate::Resolved(PointMetric::Tensor(m)) =
            estimate_point(&mesh, trias[0], 0, &r).unwrap()
        else {
            panic!("expected a tensor");
        };
        let expected = SURFACE_FACTOR / 0.01;
        let ev = m.eigenvalues();
        // the normal direction is in the kernel
        assert_relative_eq!(ev[0], 0.0, epsilon = 1e-9);
        assert_relative_eq!(ev[1], expected, max_relative = 0.2);
        assert_relative_eq!(ev[2], expected, max_relative = 0.2);
    }

    #[test]
    fn folded_ball_is_a_local_failure() {
        let (mut mesh, c, _, trias) = fan(|_, _| 0.0);
        mesh.set_normal(c, [1.0, 0.0, 0.0]).unwrap();
        let r = params(&mesh, 0.01, 1.0, 0.01);
        assert_eq!(
            estimate_point(&mesh, trias[0], 0, &r).unwrap(),
            Estimate::Unresolved(LocalFailure::DegenerateProjection)
        );
    }

    #[test]
    fn singular_point_on_a_bent_cone_clamps_to_hmin() {
        let (mut mesh, c, _, trias) = fan(|x, y| (x * x + y * y).sqrt());
        mesh.set_tag(c, PointTag::CORNER).unwrap();
        // ring normals stay vertical, so the edge curves bend at the ring
        let r = params(&mesh, 0.5, 1.0, 1e-6);
        assert_eq!(
            estimate_point(&mesh, trias[0], 0, &r).unwrap(),
            Estimate::Resolved(PointMetric::Isotropic(r.isqhmin))
        );
    }

    #[test]
    fn straight_singular_point_gets_hmax() {
        let (mut mesh, c, _, trias) = fan(|_, _| 0.0);
        mesh.set_tag(c, PointTag::REQUIRED).unwrap();
        let r = params(&mesh, 0.01, 2.0, 0.01);
        assert_eq!(
            estimate_point(&mesh, trias[3], 0, &r).unwrap(),
            Estimate::Resolved(PointMetric::Isotropic(0.25))
        );
    }

    #[test]
    fn reference_point_needs_two_neighbours() {
        let (mut mesh, c, ring, trias) = fan(|_, _| 0.0);
        mesh.set_tag(c, PointTag::REFERENCE).unwrap();
        mesh.tag_edge(c, ring[0], EdgeTag::Reference).unwrap();
        let r = params(&mesh, 0.01, 1.0, 0.01);
        assert_eq!(
            estimate_point(&mesh, trias[0], 0, &r).unwrap(),
            Estimate::Unresolved(LocalFailure::MissingReferenceCurve)
        );
        mesh.tag_edge(c, ring[2], EdgeTag::Reference).unwrap();
        mesh.tag_edge(c, ring[4], EdgeTag::Reference).unwrap();
        assert!(matches!(
            estimate_point(&mesh, trias[0], 0, &r),
            Err(MeshMetricError::TooManyReferenceNeighbors { point, .. }) if point == c
        ));
    }

    #[test]
    fn ridge_sheet_found_along_a_mesh_edge() {
        // square ring: the conormal of the ridge runs exactly along the
        // edge toward ring[2]; z = y²/2 above the ridge, a plane below
        let h = 0.1;
        let f = |y: f64| if y > 0.0 { 0.5 * y * y } else { -0.5 * y };
        let n2 = [0.0, 0.5, 1.0];
        let xy = [
            (h, 0.0),
            (h, h),
            (0.0, h),
            (-h, h),
            (-h, 0.0),
            (-h, -h),
            (0.0, -h),
            (h, -h),
        ];
        let mut mesh = SurfaceMesh::new();
        let c = mesh.add_point([0.0; 3]);
        let ring: Vec<PointId> = xy
            .iter()
            .map(|&(x, y)| {
                let q = mesh.add_point([x, y, f(y)]);
                let n = if y > 0.0 { [0.0, -y, 1.0] } else { n2 };
                mesh.set_normal(q, n).unwrap();
                q
            })
            .collect();
        let trias: Vec<TriaId> = (0..8)
            .map(|k| mesh.add_tria([c, ring[k], ring[(k + 1) % 8]]).unwrap())
            .collect();
        for q in [c, ring[0], ring[4]] {
            mesh.set_tag(q, PointTag::RIDGE).unwrap();
            mesh.set_tangent(q, [1.0, 0.0, 0.0]).unwrap();
            mesh.set_ridge_normals(q, [0.0, 0.0, 1.0], n2).unwrap();
        }
        mesh.tag_edge(c, ring[0], EdgeTag::Ridge).unwrap();
        mesh.tag_edge(c, ring[4], EdgeTag::Ridge).unwrap();

        let r = params(&mesh, 0.01, 1.0, 0.01);
        let Estimate::Resolved(PointMetric::Ridge(sizes)) =
            estimate_point(&mesh, trias[0], 0, &r).unwrap()
        else {
            panic!("expected ridge sizes");
        };
        // unit curvature across the ridge on the curved sheet
        assert_relative_eq!(sizes.sheets[0], CURVE_FACTOR / 0.01, max_relative = 0.05);
        assert_relative_eq!(sizes.sheets[1], 1.0, epsilon = 1e-9);
        assert_relative_eq!(sizes.tangent, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn flat_ridge_keeps_seed_sizes() {
        let (mut mesh, c, ring, trias) = fan(|_, _| 0.0);
        mesh.set_tag(c, PointTag::RIDGE).unwrap();
        mesh.set_tangent(c, [1.0, 0.0, 0.0]).unwrap();
        mesh.set_ridge_normals(c, [0.0, 0.0, 1.0], [0.0, 0.0, 1.0])
            .unwrap();
        for &q in &[ring[0], ring[3]] {
            mesh.set_tag(q, PointTag::RIDGE).unwrap();
            mesh.set_tangent(q, [1.0, 0.0, 0.0]).unwrap();
            mesh.set_ridge_normals(q, [0.0, 0.0, 1.0], [0.0, 0.0, 1.0])
                .unwrap();
            mesh.tag_edge(c, q, EdgeTag::Ridge).unwrap();
        }
        let r = params(&mesh, 0.01, 1.0, 0.01);
        assert_eq!(
            estimate_point(&mesh, trias[1], 0, &r).unwrap(),
            Estimate::Resolved(PointMetric::Ridge(RidgeSizes::uniform(1.0)))
        );
    }
}
