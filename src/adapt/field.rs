//! Builds the metric field of a whole mesh, one estimate per point.
//!
//! Points are reached through the active triangles; each point is estimated
//! once, from the first triangle seen. Points that cannot be estimated (local
//! failure, no active triangle) keep a caller-supplied value when there is
//! one, and otherwise get the `hmax` metric of their class.

use crate::adapt::ResolvedParams;
use crate::adapt::epoch::EpochMarks;
use crate::adapt::estimate::{Estimate, estimate_point};
use crate::adapt::metric::{MetricField, PointMetric, RidgeSizes};
use crate::geometry::linalg::SymTensor3;
use crate::mesh_error::MeshMetricError;
use crate::topology::surface::SurfaceMesh;
use crate::topology::tags::PointClass;
use serde::{Deserialize, Serialize};

/// Counts of how each valid point got its metric.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    /// Estimated from curvature.
    pub estimated: usize,
    /// Given the default `hmax` metric.
    pub fallback: usize,
    /// Kept the value supplied by the caller.
    pub retained: usize,
}

fn default_metric(class: PointClass, isqhmax: f64) -> PointMetric {
    match class {
        PointClass::Singular => PointMetric::Isotropic(isqhmax),
        PointClass::Ridge => PointMetric::Ridge(RidgeSizes::uniform(isqhmax)),
        PointClass::Reference | PointClass::Regular => {
            PointMetric::Tensor(SymTensor3::scaled_identity(isqhmax))
        }
    }
}

/// Estimates a metric for every valid point of `mesh` into `field`.
///
/// # Errors
/// Topology errors around a point and allocation failures.
pub fn build_metric_field(
    mesh: &SurfaceMesh,
    field: &mut MetricField,
    params: &ResolvedParams,
) -> Result<BuildReport, MeshMetricError> {
    let supplied = field.is_populated();
    field.ensure_len(mesh.np())?;

    // points reached are stamped `seen`, estimated ones `resolved`
    let mut marks = EpochMarks::new(mesh.np())?;
    let seen = marks.advance();
    marks.advance();
    let mut report = BuildReport::default();

    for (t, tria) in mesh.trias() {
        for (i, &p) in tria.v.iter().enumerate() {
            if marks.touched_since(p, seen) || !mesh.is_valid_point(p) {
                continue;
            }
            marks.stamp_at(p, seen);
            match estimate_point(mesh, t, i, params)? {
                Estimate::Resolved(m) => {
                    field.set(p, m)?;
                    marks.stamp(p);
                    report.estimated += 1;
                }
                Estimate::Unresolved(reason) => {
                    log::debug!("point {p}: {reason}; falling back");
                }
            }
        }
    }

    for (p, point) in mesh.points() {
        if marks.is_current(p) {
            continue;
        }
        if supplied && field.get(p).is_some() {
            report.retained += 1;
            continue;
        }
        field.set(p, default_metric(point.tag.class(), params.isqhmax))?;
        report.fallback += 1;
    }

    log::info!(
        "metric field: {} estimated, {} fallback, {} retained",
        report.estimated,
        report.fallback,
        report.retained
    );
    Ok(report)
}
