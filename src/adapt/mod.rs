//! Anisotropic size map of a surface mesh.
//!
//! [`define_size_map`] runs the two stages in order:
//! 1. [`build_metric_field`]: one metric per point from the local curvature
//!    of the Bezier reconstruction, bounded by `hmin`, `hmax` and `hausd`;
//! 2. [`enforce_gradation`]: relaxation bounding how fast sizes grow
//!    along edges, skipped when `hgrad` is `None`.
//!
//! Sizes are stored as *specific sizes* `1/h²`, so the bounds become
//! eigenvalue bounds `[1/hmax², 1/hmin²]`.

pub mod epoch;
pub mod estimate;
pub mod field;
pub mod gradation;
pub mod metric;
pub mod ridge;

pub use epoch::EpochMarks;
pub use estimate::{Estimate, LocalFailure, estimate_point, size_from_curvature};
pub use field::{BuildReport, build_metric_field};
pub use gradation::{GradationReport, enforce_edge_gradation, enforce_gradation};
pub use metric::{MetricField, PointMetric, RidgeSizes};
pub use ridge::ridge_tensor;

use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshMetricError;
use crate::topology::surface::SurfaceMesh;
use serde::{Deserialize, Serialize};

/// Parameters of the size map.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SizeMapParams {
    /// Smallest allowed edge length.
    pub hmin: f64,
    /// Largest allowed edge length; half the bounding diagonal when unset.
    pub hmax: Option<f64>,
    /// Hausdorff distance allowed between the mesh and the surface.
    pub hausd: f64,
    /// Growth rate of sizes along edges; `None` disables gradation.
    pub hgrad: Option<f64>,
    /// Cap on gradation sweeps.
    pub max_gradation_sweeps: usize,
}

impl Default for SizeMapParams {
    fn default() -> Self {
        Self {
            hmin: 0.01,
            hmax: None,
            hausd: 0.01,
            hgrad: Some(0.3),
            max_gradation_sweeps: 100,
        }
    }
}

fn positive(name: &str, v: f64) -> Result<(), MeshMetricError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(MeshMetricError::InvalidParameter(format!(
            "{name} must be finite and positive, got {v}"
        )))
    }
}

impl SizeMapParams {
    /// Checks ranges without looking at a mesh.
    pub fn validate(&self) -> Result<(), MeshMetricError> {
        positive("hmin", self.hmin)?;
        positive("hausd", self.hausd)?;
        if let Some(hmax) = self.hmax {
            positive("hmax", hmax)?;
            if self.hmin > hmax {
                return Err(MeshMetricError::InvalidParameter(format!(
                    "hmin ({}) exceeds hmax ({hmax})",
                    self.hmin
                )));
            }
        }
        if let Some(hgrad) = self.hgrad {
            positive("hgrad", hgrad)?;
        }
        Ok(())
    }

    /// Validates and fills mesh-dependent defaults.
    pub fn resolved(&self, mesh: &SurfaceMesh) -> Result<ResolvedParams, MeshMetricError> {
        self.validate()?;
        let hmax = match self.hmax {
            Some(h) => h,
            None => {
                let h = 0.5 * mesh.bounding_diagonal();
                if !(h > 0.0) {
                    return Err(MeshMetricError::InvalidParameter(
                        "hmax unset and the mesh has no extent to derive it from".into(),
                    ));
                }
                h
            }
        };
        if self.hmin > hmax {
            return Err(MeshMetricError::InvalidParameter(format!(
                "hmin ({}) exceeds derived hmax ({hmax})",
                self.hmin
            )));
        }
        Ok(ResolvedParams {
            hmin: self.hmin,
            hmax,
            hausd: self.hausd,
            hgrad: self.hgrad,
            isqhmin: 1.0 / (self.hmin * self.hmin),
            isqhmax: 1.0 / (hmax * hmax),
        })
    }
}

/// Parameters with `hmax` fixed and the eigenvalue bounds precomputed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedParams {
    /// Smallest allowed edge length.
    pub hmin: f64,
    /// Largest allowed edge length.
    pub hmax: f64,
    /// Hausdorff tolerance.
    pub hausd: f64,
    /// Gradation rate, if enabled.
    pub hgrad: Option<f64>,
    /// `1/hmin²`, the largest allowed eigenvalue.
    pub isqhmin: f64,
    /// `1/hmax²`, the smallest allowed eigenvalue.
    pub isqhmax: f64,
}

/// Outcome of [`define_size_map`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SizeMapReport {
    /// Points whose metric was estimated from curvature.
    pub estimated: usize,
    /// Points given the default isotropic metric.
    pub fallback: usize,
    /// Points keeping a caller-supplied metric.
    pub retained: usize,
    /// Gradation outcome, when gradation ran.
    pub gradation: Option<GradationReport>,
}

/// Computes the size map of `mesh` into `field`.
///
/// Values already present in `field` are kept for points whose metric cannot
/// be estimated.
///
/// # Errors
/// Propagates invalid parameters, a mesh failing its structural checks,
/// broken topology around a point and allocation failures. Local estimation
/// failures never surface here.
pub fn define_size_map(
    mesh: &SurfaceMesh,
    field: &mut MetricField,
    params: &SizeMapParams,
) -> Result<SizeMapReport, MeshMetricError> {
    let resolved = params.resolved(mesh)?;
    log::info!(
        "Defining map: hmin {} hmax {} hausd {}",
        resolved.hmin,
        resolved.hmax,
        resolved.hausd
    );
    mesh.validate_invariants()?;

    let build = build_metric_field(mesh, field, &resolved)?;
    let gradation = match resolved.hgrad {
        Some(hgrad) => Some(enforce_gradation(
            mesh,
            field,
            hgrad,
            params.max_gradation_sweeps,
        )?),
        None => None,
    };
    field.debug_assert_invariants();

    Ok(SizeMapReport {
        estimated: build.estimated,
        fallback: build.fallback,
        retained: build.retained,
        gradation,
    })
}
