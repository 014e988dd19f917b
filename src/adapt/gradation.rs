//! Gradation of the metric field along mesh edges.
//!
//! For an edge of chord length `l` with endpoint speeds `s1 < s2` (inverse
//! sizes along the edge), the size at the small-speed end may exceed the
//! size at the other end by at most `hgrad·l`:
//!
//! ```text
//! s1 >= alpha = s2 / (1 + hgrad·l·s2)
//! ```
//!
//! A violating endpoint has one tangent eigenvalue raised so that its speed
//! along the edge becomes exactly `alpha`. Sweeps over all edges repeat until
//! nothing changes; an edge is revisited only when one of its endpoints was
//! updated during the previous sweep.

use crate::adapt::epoch::EpochMarks;
use crate::adapt::metric::{MetricField, PointMetric, RidgeSizes};
use crate::geometry::linalg::{SymMat2, SymTensor3, rotation_to_z};
use crate::mesh_error::MeshMetricError;
use crate::topology::point::{PointId, TriaId};
use crate::topology::surface::{NEXT, PREV, SurfaceMesh};
use crate::topology::tags::PointClass;
use nalgebra::{Matrix3, Vector2, Vector3};
use serde::{Deserialize, Serialize};

const EPS: f64 = 1e-6;
const EPSD2: f64 = 1e-200;

/// Outcome of [`enforce_gradation`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradationReport {
    /// Total point updates over all sweeps.
    pub updated: usize,
    /// Sweeps performed.
    pub iterations: usize,
    /// True when the last sweep changed nothing.
    pub converged: bool,
}

/// Tangent-plane view of the metric at one edge endpoint.
struct EndpointFrame {
    r: Matrix3<f64>,
    mtan: SymMat2,
    t: Vector2<f64>,
    speed: f64,
}

fn endpoint_frame(
    mesh: &SurfaceMesh,
    field: &MetricField,
    p: PointId,
    nt: &Vector3<f64>,
    dir: &Vector3<f64>,
) -> Result<Option<EndpointFrame>, MeshMetricError> {
    let point = mesh.point(p)?;
    let n = match point.tag.class() {
        PointClass::Singular => *nt,
        PointClass::Ridge => {
            let (n1, n2) = mesh.ridge_normals(p)?;
            if nt.dot(&n1).abs() < nt.dot(&n2).abs() {
                n2
            } else {
                n1
            }
        }
        PointClass::Reference | PointClass::Regular => point.normal(),
    };
    let m = field.try_get(p)?.along(mesh, p, dir)?;
    let r = rotation_to_z(&n);
    let mtan = m.tangent_block(&r);

    let c = r * dir;
    let dd = c.x * c.x + c.y * c.y;
    if dd < EPSD2 {
        return Ok(None);
    }
    let t = c.xy() / dd.sqrt();
    let speed = mtan.quad(&t).max(0.0).sqrt();
    Ok(Some(EndpointFrame { r, mtan, t, speed }))
}

/// Index, in `[tangent, sheet 1, sheet 2]`, of the size closest to `target`.
fn closest_size(sizes: [f64; 3], target: f64) -> usize {
    let c = sizes.map(|s| (s - target).abs());
    if c[0] < c[1] {
        if c[0] < c[2] { 0 } else { 2 }
    } else if c[1] < c[2] {
        1
    } else {
        2
    }
}

/// Enforces gradation on edge `i` of triangle `t`.
///
/// Returns the endpoint whose metric was changed, if any.
///
/// # Errors
/// Unknown triangle, a missing metric at an endpoint or a ridge endpoint
/// without its normals record.
pub fn enforce_edge_gradation(
    mesh: &SurfaceMesh,
    field: &mut MetricField,
    t: TriaId,
    i: usize,
    hgrad: f64,
) -> Result<Option<PointId>, MeshMetricError> {
    let tria = mesh.tria(t)?;
    let (p1, p2) = (tria.v[NEXT[i % 3]], tria.v[PREV[i % 3]]);
    let Some(nt) = mesh.tria_normal(t) else {
        return Ok(None);
    };
    let u = mesh.point(p2)?.position() - mesh.point(p1)?.position();
    let l = u.norm();

    let Some(f1) = endpoint_frame(mesh, field, p1, &nt, &u)? else {
        return Ok(None);
    };
    let Some(f2) = endpoint_frame(mesh, field, p2, &nt, &-u)? else {
        return Ok(None);
    };

    let (p, frame, big) = if f2.speed > f1.speed {
        (p1, f1, f2.speed)
    } else {
        (p2, f2, f1.speed)
    };
    let alpha = big / (1.0 + hgrad * l * big);
    if frame.speed >= alpha - EPS {
        return Ok(None);
    }

    let eig = frame.mtan.eigen();
    let c = [frame.t.dot(&eig.vectors[0]), frame.t.dot(&eig.vectors[1])];
    let ichg = if c[0].abs() > c[1].abs() { 0 } else { 1 };
    let beta = (alpha * alpha - frame.speed * frame.speed) / (c[ichg] * c[ichg]);

    let class = mesh.point(p)?.tag.class();
    let slot = field
        .get_mut(p)
        .ok_or(MeshMetricError::MissingMetric(p))?;
    match (class, slot) {
        (PointClass::Singular, PointMetric::Isotropic(a)) => *a += 0.5 * beta,
        (PointClass::Singular, PointMetric::Tensor(m)) => m.add_diagonal(0.5 * beta),
        (PointClass::Ridge, PointMetric::Ridge(sizes)) => {
            match closest_size(sizes.as_array(), eig.values[ichg]) {
                0 => sizes.tangent += beta,
                k => sizes.sheets[k - 1] += beta,
            }
        }
        (_, slot) => {
            let mut values = eig.values;
            values[ichg] += beta;
            let mtan = SymMat2::from_eigen(values, &eig.vectors);
            *slot = PointMetric::Tensor(SymTensor3::embed(&mtan, &frame.r));
        }
    }
    Ok(Some(p))
}

/// Enforces gradation over the whole mesh.
///
/// Ridge sizes are first made isotropic (all three set to their largest),
/// then edges are swept until no metric changes or `max_sweeps` is reached.
///
/// # Errors
/// Same as [`enforce_edge_gradation`], plus allocation failure of the
/// per-point marks.
pub fn enforce_gradation(
    mesh: &SurfaceMesh,
    field: &mut MetricField,
    hgrad: f64,
    max_sweeps: usize,
) -> Result<GradationReport, MeshMetricError> {
    log::debug!("anisotropic gradation, hgrad {hgrad}");

    for (p, point) in mesh.points() {
        if point.tag.class() != PointClass::Ridge {
            continue;
        }
        if let Some(PointMetric::Ridge(sizes)) = field.get_mut(p) {
            *sizes = RidgeSizes::uniform(sizes.max());
        }
    }

    let mut marks = EpochMarks::new(mesh.np())?;
    let mut report = GradationReport::default();
    while report.iterations < max_sweeps {
        let base = marks.advance();
        report.iterations += 1;
        let mut nu = 0;
        for (t, tria) in mesh.trias() {
            for i in 0..3 {
                let (p1, p2) = (tria.v[NEXT[i]], tria.v[PREV[i]]);
                if !marks.touched_since(p1, base - 1) && !marks.touched_since(p2, base - 1) {
                    continue;
                }
                if let Some(p) = enforce_edge_gradation(mesh, field, t, i, hgrad)? {
                    marks.stamp(p);
                    nu += 1;
                }
            }
        }
        log::trace!("gradation sweep {}: {nu} updated", report.iterations);
        report.updated += nu;
        if nu == 0 {
            report.converged = true;
            break;
        }
    }

    log::info!(
        "gradation: {} updated, {} iter.",
        report.updated,
        report.iterations
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::tags::PointTag;
    use approx::assert_relative_eq;

    /// Triangle with the edge `(p0, p1)` of unit length along x.
    fn tria(m0: PointMetric, m1: PointMetric) -> (SurfaceMesh, MetricField, [PointId; 3], TriaId) {
        let mut mesh = SurfaceMesh::new();
        let p = [
            mesh.add_point([0.0, 0.0, 0.0]),
            mesh.add_point([1.0, 0.0, 0.0]),
            mesh.add_point([0.0, 1.0, 0.0]),
        ];
        let t = mesh.add_tria(p).unwrap();
        let mut field = MetricField::new();
        field.set(p[0], m0).unwrap();
        field.set(p[1], m1).unwrap();
        field.set(p[2], m0).unwrap();
        (mesh, field, p, t)
    }

    fn speed_along_x(field: &MetricField, p: PointId) -> f64 {
        match field.get(p).unwrap() {
            PointMetric::Tensor(m) => m.quad(&Vector3::x()).sqrt(),
            PointMetric::Isotropic(a) => a.sqrt(),
            PointMetric::Ridge(_) => unreachable!(),
        }
    }

    #[test]
    fn edge_update_hits_alpha_exactly() {
        let fine = PointMetric::Tensor(SymTensor3::scaled_identity(100.0));
        let coarse = PointMetric::Tensor(SymTensor3::scaled_identity(1.0));
        let (mesh, mut field, p, t) = tria(fine, coarse);
        // edge 2 is (p0, p1)
        let changed = enforce_edge_gradation(&mesh, &mut field, t, 2, 0.1).unwrap();
        assert_eq!(changed, Some(p[1]));
        // 10 / (1 + 0.1 · 1 · 10)
        assert_relative_eq!(speed_along_x(&field, p[1]), 5.0, epsilon = 1e-12);
        assert_eq!(field.get(p[0]), Some(&fine));
    }

    #[test]
    fn graded_edge_is_left_alone() {
        let m = PointMetric::Tensor(SymTensor3::scaled_identity(4.0));
        let (mesh, mut field, _, t) = tria(m, PointMetric::Tensor(SymTensor3::scaled_identity(3.0)));
        assert_eq!(
            enforce_edge_gradation(&mesh, &mut field, t, 2, 1.0).unwrap(),
            None
        );
    }

    #[test]
    fn singular_point_grows_isotropically() {
        let (mut mesh, mut field, p, t) = tria(
            PointMetric::Isotropic(100.0),
            PointMetric::Isotropic(1.0),
        );
        mesh.set_tag(p[1], PointTag::CORNER)
            .unwrap();
        enforce_edge_gradation(&mesh, &mut field, t, 2, 0.1).unwrap();
        let Some(PointMetric::Isotropic(a)) = field.get(p[1]) else {
            panic!("singular metric must stay isotropic");
        };
        assert!(*a > 1.0 && *a <= 25.0);
    }

    #[test]
    fn ridge_update_picks_closest_size() {
        assert_eq!(closest_size([1.0, 5.0, 9.0], 4.0), 1);
        assert_eq!(closest_size([1.0, 5.0, 9.0], 0.0), 0);
        assert_eq!(closest_size([1.0, 5.0, 9.0], 8.0), 2);
    }

    #[test]
    fn sweeps_converge_and_bound_growth() {
        let mut mesh = SurfaceMesh::new();
        let n = 6;
        let bottom: Vec<_> = (0..n).map(|k| mesh.add_point([k as f64, 0.0, 0.0])).collect();
        let top: Vec<_> = (0..n).map(|k| mesh.add_point([k as f64, 1.0, 0.0])).collect();
        for k in 0..n - 1 {
            mesh.add_tria([bottom[k], bottom[k + 1], top[k + 1]]).unwrap();
            mesh.add_tria([bottom[k], top[k + 1], top[k]]).unwrap();
        }
        let mut field = MetricField::new();
        for (p, _) in mesh.points() {
            field
                .set(p, PointMetric::Tensor(SymTensor3::scaled_identity(0.01)))
                .unwrap();
        }
        field
            .set(bottom[0], PointMetric::Tensor(SymTensor3::scaled_identity(1e4)))
            .unwrap();

        let report = enforce_gradation(&mesh, &mut field, 0.5, 100).unwrap();
        assert!(report.converged);
        assert!(report.updated > 0);

        // second run finds nothing to do
        let again = enforce_gradation(&mesh, &mut field, 0.5, 100).unwrap();
        assert_eq!(again.updated, 0);
        assert_eq!(again.iterations, 1);
    }

    #[test]
    fn ridges_are_made_isotropic_first() {
        let (mut mesh, mut field, p, _) = tria(
            PointMetric::Tensor(SymTensor3::scaled_identity(1.0)),
            PointMetric::Ridge(RidgeSizes {
                tangent: 1.0,
                sheets: [3.0, 2.0],
            }),
        );
        mesh.set_tag(p[1], PointTag::RIDGE)
            .unwrap();
        mesh.set_tangent(p[1], [0.0, 1.0, 0.0]).unwrap();
        mesh.set_ridge_normals(p[1], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0])
            .unwrap();
        enforce_gradation(&mesh, &mut field, 10.0, 1).unwrap();
        assert_eq!(
            field.get(p[1]),
            Some(&PointMetric::Ridge(RidgeSizes::uniform(3.0)))
        );
    }
}
