//! Cubic Bezier reconstruction of the surface from the discrete mesh.
//!
//! Each triangle carries a 10-point cubic patch:
//!
//! | index | control point |
//! |---|---|
//! | 0, 1, 2 | vertices `p0`, `p1`, `p2` |
//! | `3 + 2i`, `4 + 2i` | edge `i` (opposite `p_i`), near `p_{i+1}` and `p_{i+2}` |
//! | 9 | centre |
//!
//! Edge control points sit a third of the way along the edge, projected onto
//! the vertex tangent plane (or onto the feature tangent along feature edges).

use crate::mesh_error::MeshMetricError;
use crate::topology::point::{PointId, TriaId};
use crate::topology::surface::{NEXT, PREV, SurfaceMesh};
use nalgebra::{Matrix3, Vector3};

const ATHIRD: f64 = 1.0 / 3.0;

/// Control point of the edge curve leaving `a` toward `b`.
///
/// `feature` tells whether the edge lies on a ridge or reference curve, and
/// `face_normal` picks the sheet normal at a ridge vertex.
pub fn edge_control_point(
    mesh: &SurfaceMesh,
    a: PointId,
    b: PointId,
    feature: bool,
    face_normal: &Vector3<f64>,
) -> Result<Vector3<f64>, MeshMetricError> {
    let pa = mesh.point(a)?;
    let xa = pa.position();
    let u = mesh.point(b)?.position() - xa;
    if pa.tag.is_singular() {
        return Ok(xa + u * ATHIRD);
    }
    if feature && pa.has_tangent() {
        let t = pa.tangent();
        return Ok(xa + t * (u.dot(&t) * ATHIRD));
    }
    let n = mesh.normal_for_face(a, face_normal)?;
    Ok(xa + (u - n * u.dot(&n)) * ATHIRD)
}

/// Control points `(near a, near b)` of the cubic curve over edge `(a, b)`.
pub fn edge_curve(
    mesh: &SurfaceMesh,
    a: PointId,
    b: PointId,
    feature: bool,
    face_normal: &Vector3<f64>,
) -> Result<(Vector3<f64>, Vector3<f64>), MeshMetricError> {
    Ok((
        edge_control_point(mesh, a, b, feature, face_normal)?,
        edge_control_point(mesh, b, a, feature, face_normal)?,
    ))
}

/// Linear combination of control points, as `(index, weight)` pairs.
type Stencil = [(usize, f64); 4];

/// Derivative stencils of a patch at one of its corners.
///
/// Columns are ordered toward the next vertex, then toward the previous one,
/// so a direction `s·(p_next - p) + (1 - s)·(p_prev - p)` maps to the tangent
/// `s·J0 + (1 - s)·J1`.
pub struct CornerStencil {
    /// First derivatives along the two edges leaving the corner (times 1/3).
    pub jacobian: [Stencil; 2],
    /// Second derivatives (times 1/6), in the same column order.
    pub hessian: [Stencil; 3],
}

const PAD: (usize, f64) = (0, 0.0);

/// Stencils of corner `i`: `a` and `a2` are the controls of the edge toward
/// the next vertex (near `i`, near next), `c` and `c2` those of the edge toward
/// the previous vertex.
const fn corner(i: usize, a: usize, a2: usize, c: usize, c2: usize) -> CornerStencil {
    CornerStencil {
        jacobian: [[(a, 1.0), (i, -1.0), PAD, PAD], [(c, 1.0), (i, -1.0), PAD, PAD]],
        hessian: [
            [(i, 1.0), (a, -2.0), (a2, 1.0), PAD],
            [(i, 1.0), (a, -1.0), (c, -1.0), (9, 1.0)],
            [(i, 1.0), (c, -2.0), (c2, 1.0), PAD],
        ],
    }
}

/// Corner derivative table, indexed by local vertex.
pub const CORNER: [CornerStencil; 3] = [
    corner(0, 7, 8, 6, 5),
    corner(1, 3, 4, 8, 7),
    corner(2, 5, 6, 4, 3),
];

/// Cubic Bezier patch over one triangle.
#[derive(Clone, Debug, PartialEq)]
pub struct BezierPatch {
    /// Control points, see the module table.
    pub b: [Vector3<f64>; 10],
}

impl BezierPatch {
    /// Builds the patch of triangle `t`.
    pub fn new(mesh: &SurfaceMesh, t: TriaId) -> Result<Self, MeshMetricError> {
        let tria = mesh.tria(t)?;
        let face_normal = mesh.tria_normal(t).unwrap_or_else(Vector3::zeros);
        let mut b = [Vector3::zeros(); 10];
        for i in 0..3 {
            b[i] = mesh.point(tria.v[i])?.position();
        }
        for i in 0..3 {
            let (near, far) = edge_curve(
                mesh,
                tria.v[NEXT[i]],
                tria.v[PREV[i]],
                tria.edges[i].is_feature(),
                &face_normal,
            )?;
            b[3 + 2 * i] = near;
            b[4 + 2 * i] = far;
        }
        let e = b[3..9].iter().sum::<Vector3<f64>>() / 6.0;
        let v = (b[0] + b[1] + b[2]) / 3.0;
        b[9] = e + (e - v) * 0.5;
        Ok(Self { b })
    }

    /// Same patch expressed in the frame `r` centred at `origin`.
    pub fn to_frame(&self, origin: &Vector3<f64>, r: &Matrix3<f64>) -> Self {
        Self {
            b: self.b.map(|p| r * (p - origin)),
        }
    }

    /// Evaluates the patch at barycentric coordinates `[w0, w1, w2]`
    /// (weights of `p0`, `p1`, `p2`).
    pub fn eval(&self, bary: [f64; 3]) -> Vector3<f64> {
        let [w, u, v] = bary;
        let b = &self.b;
        b[0] * (w * w * w)
            + b[1] * (u * u * u)
            + b[2] * (v * v * v)
            + (b[7] * (w * w * u) + b[8] * (w * u * u)) * 3.0
            + (b[3] * (u * u * v) + b[4] * (u * v * v)) * 3.0
            + (b[5] * (v * v * w) + b[6] * (v * w * w)) * 3.0
            + b[9] * (6.0 * w * u * v)
    }

    fn apply(&self, stencil: &Stencil) -> Vector3<f64> {
        stencil
            .iter()
            .fold(Vector3::zeros(), |acc, &(k, w)| acc + self.b[k] * w)
    }

    /// Jacobian columns of the patch at corner `i`.
    pub fn jacobian(&self, i: usize) -> [Vector3<f64>; 2] {
        CORNER[i % 3].jacobian.each_ref().map(|s| self.apply(s) * 3.0)
    }

    /// Second-derivative columns of the patch at corner `i`.
    pub fn hessian(&self, i: usize) -> [Vector3<f64>; 3] {
        CORNER[i % 3].hessian.each_ref().map(|s| self.apply(s) * 6.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::tags::{EdgeTag, PointTag};
    use approx::assert_relative_eq;

    fn flat() -> (SurfaceMesh, TriaId) {
        let mut mesh = SurfaceMesh::new();
        let a = mesh.add_point([0.0, 0.0, 0.0]);
        let b = mesh.add_point([1.0, 0.0, 0.0]);
        let c = mesh.add_point([0.0, 1.0, 0.0]);
        let t = mesh.add_tria([a, b, c]).unwrap();
        (mesh, t)
    }

    #[test]
    fn flat_patch_reproduces_plane() {
        let (mesh, t) = flat();
        let patch = BezierPatch::new(&mesh, t).unwrap();
        assert_relative_eq!(patch.b[7], Vector3::new(1.0 / 3.0, 0.0, 0.0));
        assert_relative_eq!(patch.b[9], Vector3::new(1.0 / 3.0, 1.0 / 3.0, 0.0), epsilon = 1e-12);
        let p = patch.eval([0.5, 0.25, 0.25]);
        assert_relative_eq!(p, Vector3::new(0.25, 0.25, 0.0), epsilon = 1e-12);
        for i in 0..3 {
            for h in patch.hessian(i) {
                assert_relative_eq!(h.norm(), 0.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn corner_jacobians_follow_edges() {
        let (mesh, t) = flat();
        let patch = BezierPatch::new(&mesh, t).unwrap();
        let [j0, j1] = patch.jacobian(0);
        assert_relative_eq!(j0, Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(j1, Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
        let [j0, j1] = patch.jacobian(1);
        assert_relative_eq!(j0, Vector3::new(-1.0, 1.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(j1, Vector3::new(-1.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn corner_stencils_do_not_depend_on_numbering() {
        let build = |order: [usize; 3]| {
            let mut mesh = SurfaceMesh::new();
            let coords = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.2], [0.0, 1.0, 0.4]];
            let normals = [[0.0, 0.0, 1.0], [-0.4, 0.0, 1.0], [0.0, -0.8, 1.0]];
            let ids: Vec<PointId> = order
                .iter()
                .map(|&k| {
                    let p = mesh.add_point(coords[k]);
                    mesh.set_normal(p, normals[k]).unwrap();
                    p
                })
                .collect();
            let t = mesh.add_tria([ids[0], ids[1], ids[2]]).unwrap();
            BezierPatch::new(&mesh, t).unwrap()
        };
        let base = build([0, 1, 2]);
        let turned = build([1, 2, 0]);
        // vertex 0 of `base` is vertex 2 of `turned`
        for (x, y) in base.jacobian(0).iter().zip(turned.jacobian(2)) {
            assert_relative_eq!(*x, y, epsilon = 1e-12);
        }
        for (x, y) in base.hessian(0).iter().zip(turned.hessian(2)) {
            assert_relative_eq!(*x, y, epsilon = 1e-12);
        }
        for (x, y) in base.hessian(1).iter().zip(turned.hessian(0)) {
            assert_relative_eq!(*x, y, epsilon = 1e-12);
        }
    }

    #[test]
    fn corners_interpolate_vertices() {
        let (mesh, t) = flat();
        let patch = BezierPatch::new(&mesh, t).unwrap();
        assert_relative_eq!(patch.eval([0.0, 1.0, 0.0]), patch.b[1]);
        assert_relative_eq!(patch.eval([0.0, 0.0, 1.0]), patch.b[2]);
    }

    #[test]
    fn control_points_by_point_class() {
        let mut mesh = SurfaceMesh::new();
        let a = mesh.add_point([0.0, 0.0, 0.0]);
        let b = mesh.add_point([3.0, 0.0, 3.0]);
        let up = Vector3::z();

        // regular: projected on the tangent plane
        assert_relative_eq!(
            edge_control_point(&mesh, a, b, false, &up).unwrap(),
            Vector3::new(1.0, 0.0, 0.0)
        );

        // feature edge through a tangent
        mesh.set_tag(a, PointTag::REFERENCE).unwrap();
        mesh.set_tangent(a, [0.0, 0.0, 1.0]).unwrap();
        assert_relative_eq!(
            edge_control_point(&mesh, a, b, true, &up).unwrap(),
            Vector3::new(0.0, 0.0, 1.0)
        );

        // singular: straight chord
        mesh.set_tag(a, PointTag::CORNER).unwrap();
        assert_relative_eq!(
            edge_control_point(&mesh, a, b, true, &up).unwrap(),
            Vector3::new(1.0, 0.0, 1.0)
        );
    }

    #[test]
    fn feature_flag_comes_from_edge_tag() {
        let (mut mesh, t) = flat();
        let v = mesh.tria(t).unwrap().v;
        mesh.set_tag(v[1], PointTag::REFERENCE).unwrap();
        mesh.set_tangent(v[1], [0.0, 1.0, 0.0]).unwrap();
        mesh.set_edge_tag(t, 2, EdgeTag::Reference).unwrap();
        let patch = BezierPatch::new(&mesh, t).unwrap();
        // edge 2 is (p0, p1): control point near p1 collapses on the tangent line
        assert_relative_eq!(patch.b[8], Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
    }
}
