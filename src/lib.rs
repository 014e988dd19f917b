#![cfg_attr(docsrs, feature(doc_cfg))]
//! # mesh-metric
//!
//! mesh-metric computes anisotropic size maps (metric fields) on triangulated
//! surface meshes, the input of metric-driven surface remeshers. Each point
//! receives a symmetric tensor whose eigenvalues are inverse squared target
//! edge lengths, derived from the curvature of a cubic Bezier reconstruction
//! of the surface and bounded by `hmin`, `hmax` and a Hausdorff tolerance.
//!
//! ## Features
//! - Surface store with feature tags (ridge, reference, corner, required,
//!   non-manifold) and edge adjacency
//! - Bounded vertex-ball traversals, split along ridges when needed
//! - Per-class curvature estimators: isotropic at singular points, three
//!   principal sizes at ridge points, a local quadric fit elsewhere
//! - Edge-wise gradation bounding how fast sizes grow across the mesh
//! - Metric edge lengths and triangle areas for remeshing decisions
//!
//! ## Usage
//! ```rust
//! use mesh_metric::prelude::*;
//!
//! let mut mesh = SurfaceMesh::new();
//! let a = mesh.add_point([0.0, 0.0, 0.0]);
//! let b = mesh.add_point([1.0, 0.0, 0.0]);
//! let c = mesh.add_point([1.0, 1.0, 0.0]);
//! let d = mesh.add_point([0.0, 1.0, 0.0]);
//! mesh.add_tria([a, b, c])?;
//! mesh.add_tria([a, c, d])?;
//!
//! let params = SizeMapParams { hmin: 0.001, hmax: Some(1.0), ..Default::default() };
//! let mut field = MetricField::new();
//! let report = define_size_map(&mesh, &mut field, &params)?;
//! assert_eq!(report.estimated + report.fallback, 4);
//! # Ok::<(), MeshMetricError>(())
//! ```
//!
//! ## Invariant checks
//! Data structures implement [`DebugInvariants`]; checks run in debug builds,
//! and in release builds with the `check-invariants` feature.

pub mod adapt;
pub mod debug_invariants;
pub mod geometry;
pub mod mesh_error;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::adapt::{
        BuildReport, GradationReport, MetricField, PointMetric, RidgeSizes, SizeMapParams,
        SizeMapReport, define_size_map,
    };
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::geometry::linalg::SymTensor3;
    pub use crate::geometry::quality::{edge_length, tria_area};
    pub use crate::mesh_error::MeshMetricError;
    pub use crate::topology::{EdgeTag, PointId, PointTag, SurfaceMesh, TriaId};
}
