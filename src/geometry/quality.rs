//! Edge length and triangle area measured in the metric field.
//!
//! # Tangent reconstruction
//! Lengths are measured along the curve underlying an edge, not along the
//! chord. At each endpoint the curve tangent is approximated by:
//!
//! - the chord, at singular points;
//! - the chord projected on the feature tangent, along ridge edges;
//! - the chord projected on the tangent plane of the sheet most orthogonal
//!   to it, at ridge points off the ridge;
//! - the chord projected on the tangent plane, elsewhere.
//!
//! # Examples
//! ```rust
//! use mesh_metric::adapt::metric::{MetricField, PointMetric};
//! use mesh_metric::geometry::quality::edge_length;
//! use mesh_metric::topology::surface::SurfaceMesh;
//!
//! let mut mesh = SurfaceMesh::new();
//! let a = mesh.add_point([0.0, 0.0, 0.0]);
//! let b = mesh.add_point([2.0, 0.0, 0.0]);
//! let mut field = MetricField::new();
//! field.set(a, PointMetric::Isotropic(1.0))?;
//! field.set(b, PointMetric::Isotropic(1.0))?;
//! assert!((edge_length(&mesh, &field, a, b, false)? - 2.0).abs() < 1e-12);
//! # Ok::<(), mesh_metric::mesh_error::MeshMetricError>(())
//! ```

use crate::adapt::metric::MetricField;
use crate::adapt::ridge::sheet_for_edge;
use crate::geometry::bezier::BezierPatch;
use crate::geometry::linalg::SymTensor3;
use crate::mesh_error::MeshMetricError;
use crate::topology::point::{PointId, TriaId};
use crate::topology::surface::{NEXT, PREV, SurfaceMesh};
use nalgebra::{Matrix2, Vector3};

/// Tangent of the curve over an edge leaving `p` along `u`.
fn curve_tangent(
    mesh: &SurfaceMesh,
    p: PointId,
    u: &Vector3<f64>,
    ridge_edge: bool,
) -> Result<Vector3<f64>, MeshMetricError> {
    let point = mesh.point(p)?;
    if point.tag.is_singular() {
        return Ok(*u);
    }
    if ridge_edge {
        let t = point.tangent();
        return Ok(t * u.dot(&t));
    }
    let n = if point.tag.is_ridge() {
        sheet_for_edge(mesh, p, u)?.1
    } else {
        point.normal()
    };
    Ok(u - n * u.dot(&n))
}

fn speed_squared(
    mesh: &SurfaceMesh,
    field: &MetricField,
    p: PointId,
    u: &Vector3<f64>,
    ridge_edge: bool,
) -> Result<f64, MeshMetricError> {
    let gamma = curve_tangent(mesh, p, u, ridge_edge)?;
    let m = field.try_get(p)?.along(mesh, p, u)?;
    let l = m.quad(&gamma);
    if l < 0.0 {
        log::warn!("negative metric length {l:e} at point {p}; using 1");
        return Ok(1.0);
    }
    Ok(l)
}

/// Length of edge `(p0, p1)` in the metric field.
///
/// `ridge_edge` tells whether the edge lies on a ridge. The result is the
/// mean of the metric lengths of the two endpoint tangents.
pub fn edge_length(
    mesh: &SurfaceMesh,
    field: &MetricField,
    p0: PointId,
    p1: PointId,
    ridge_edge: bool,
) -> Result<f64, MeshMetricError> {
    let u = mesh.point(p1)?.position() - mesh.point(p0)?.position();
    let l0 = speed_squared(mesh, field, p0, &u, ridge_edge)?;
    let l1 = speed_squared(mesh, field, p1, &-u, ridge_edge)?;
    Ok(0.5 * (l0.sqrt() + l1.sqrt()))
}

/// Area of triangle `t` in the metric field.
///
/// Three-point quadrature of the metric area density `sqrt(det(Jᵀ M J))`
/// at the corners of the cubic patch.
pub fn tria_area(
    mesh: &SurfaceMesh,
    field: &MetricField,
    t: TriaId,
) -> Result<f64, MeshMetricError> {
    let tria = mesh.tria(t)?;
    let patch = BezierPatch::new(mesh, t)?;
    let mut x = [Vector3::zeros(); 3];
    for (xi, &p) in x.iter_mut().zip(&tria.v) {
        *xi = mesh.point(p)?.position();
    }

    let mut surf = 0.0;
    for i in 0..3 {
        let p = tria.v[i];
        // direction toward the middle of the opposite edge
        let u = (x[NEXT[i]] + x[PREV[i]]) * 0.5 - x[i];
        let m: SymTensor3 = field.try_get(p)?.along(mesh, p, &u)?;
        let [j0, j1] = patch.jacobian(i);
        let mm = m.to_matrix();
        let g = Matrix2::new(
            j0.dot(&(mm * j0)),
            j0.dot(&(mm * j1)),
            j1.dot(&(mm * j0)),
            j1.dot(&(mm * j1)),
        );
        let dens = g.determinant();
        if dens < 0.0 {
            log::warn!("negative area density {dens:e} at corner {i} of triangle {t}");
        }
        surf += dens.abs().sqrt();
    }
    Ok(surf / 3.0)
}
