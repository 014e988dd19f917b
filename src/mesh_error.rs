//! MeshMetricError: Unified error type for mesh-metric public APIs
//!
//! Only conditions the caller has to act on are errors: broken topology
//! around a vertex, invalid parameters and storage exhaustion. Local
//! estimation failures and numerical guards never surface here; they are
//! recovered inside the size-map builder.

use crate::topology::point::{PointId, TriaId};
use thiserror::Error;

/// Unified error type for mesh-metric operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshMetricError {
    /// Attempted to construct an id with a zero value (invalid).
    #[error("entity id must be non-zero (0 is reserved as invalid/sentinel)")]
    InvalidPointId,
    /// A point id does not refer to a stored point.
    #[error("unknown point `{0}`")]
    UnknownPoint(PointId),
    /// A triangle id does not refer to a stored triangle.
    #[error("unknown triangle `{0}`")]
    UnknownTria(TriaId),
    /// A triangle references the same point twice.
    #[error("triangle `{0}` references a point more than once")]
    DegenerateTria(TriaId),
    /// The ball of a point could not be computed.
    #[error("topology error: empty ball around point `{point}`")]
    EmptyBall {
        /// Center of the ball.
        point: PointId,
    },
    /// The ball of a point has more triangles than the bounded traversal allows.
    #[error("topology error: ball of point `{point}` exceeds {capacity} triangles")]
    BallOverflow {
        /// Center of the ball.
        point: PointId,
        /// Maximum number of triangles in a ball.
        capacity: usize,
    },
    /// A ridge point has no ridge or boundary edge to split its ball along.
    #[error("topology error: ridge point `{point}` has no feature edge in its ball")]
    MissingFeatureEdges {
        /// The ridge point.
        point: PointId,
    },
    /// A reference point is adjacent to more than two reference edges.
    #[error(
        "topology error: reference point `{point}` has three adjacent reference curves ({first}, {second}, {third})"
    )]
    TooManyReferenceNeighbors {
        /// The reference point.
        point: PointId,
        /// First reference neighbour found.
        first: PointId,
        /// Second reference neighbour found.
        second: PointId,
        /// Offending third neighbour.
        third: PointId,
    },
    /// A ridge point lacks the record holding its two sheet normals.
    #[error("topology error: ridge point `{0}` has no ridge normals record")]
    MissingRidgeNormals(PointId),
    /// No metric is stored for a point that needs one.
    #[error("no metric stored for point `{0}`")]
    MissingMetric(PointId),
    /// A structural invariant of a mesh or field does not hold.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
    /// A size-map parameter is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// Metric storage could not be grown.
    #[error("allocation failure: could not reserve metric storage for {requested} points")]
    AllocationFailed {
        /// Number of metric slots requested.
        requested: usize,
    },
}
