//! Structural invariant checks for meshes and metric fields.
//!
//! Checks run in debug builds, and in release builds with the
//! `check-invariants` (or `strict-invariants`) feature.

use crate::mesh_error::MeshMetricError;

/// Trait for validating data structure invariants.
pub trait DebugInvariants {
    /// Validate invariants and return the first error encountered.
    fn validate_invariants(&self) -> Result<(), MeshMetricError>;

    /// Assert invariants in debug builds or when invariant checking is enabled.
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), std::any::type_name::<Self>());
    }
}

/// Returns [`MeshMetricError::InvariantViolation`] built from `msg` unless
/// `cond` holds.
#[inline]
pub fn ensure(cond: bool, msg: impl FnOnce() -> String) -> Result<(), MeshMetricError> {
    if cond {
        Ok(())
    } else {
        Err(MeshMetricError::InvariantViolation(msg()))
    }
}

/// Helper macro to run a fallible check and panic on error when invariant
/// checking is enabled.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $ctx:expr) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]
        if let Err(e) = $expr {
            panic!("[invariants] {}: {}", $ctx, e);
        }
    };
}
