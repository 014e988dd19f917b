//! `PointId` and `TriaId`: strong, zero-cost handles for surface entities
//!
//! Points and triangles of a [`SurfaceMesh`](crate::topology::surface::SurfaceMesh)
//! are numbered from 1. Both handles wrap a `NonZeroU32`, so 0 stays
//! reserved as an invalid or sentinel value and `Option<PointId>` costs
//! nothing extra. The metric field is indexed by the same 1-based point
//! numbering.

use crate::mesh_error::MeshMetricError;
use std::{fmt, num::NonZeroU32};

/// Handle of a surface point (mesh vertex).
///
/// # Memory layout
/// This type is `repr(transparent)` over `NonZeroU32`.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct PointId(NonZeroU32);

/// Handle of a surface triangle.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct TriaId(NonZeroU32);

impl PointId {
    /// Creates a new `PointId` from a raw 1-based number.
    ///
    /// # Errors
    ///
    /// Returns [`MeshMetricError::InvalidPointId`] if `raw == 0`.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use mesh_metric::topology::point::PointId;
    /// let p = PointId::new(1)?;
    /// assert_eq!(p.get(), 1);
    /// assert_eq!(p.index(), 0);
    /// # Ok::<(), mesh_metric::mesh_error::MeshMetricError>(())
    /// ```
    #[inline]
    pub fn new(raw: u32) -> Result<Self, MeshMetricError> {
        NonZeroU32::new(raw)
            .map(PointId)
            .ok_or(MeshMetricError::InvalidPointId)
    }

    /// Returns the raw 1-based number.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Zero-based storage slot of this point.
    #[inline]
    pub const fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }

    /// Handle for the zero-based storage slot `index`.
    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        // slot + 1 is never zero
        PointId(NonZeroU32::MIN.saturating_add(index as u32))
    }
}

impl TriaId {
    /// Creates a new `TriaId` from a raw 1-based number.
    ///
    /// # Errors
    ///
    /// Returns [`MeshMetricError::InvalidPointId`] if `raw == 0`.
    #[inline]
    pub fn new(raw: u32) -> Result<Self, MeshMetricError> {
        NonZeroU32::new(raw)
            .map(TriaId)
            .ok_or(MeshMetricError::InvalidPointId)
    }

    /// Returns the raw 1-based number.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Zero-based storage slot of this triangle.
    #[inline]
    pub const fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }

    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        TriaId(NonZeroU32::MIN.saturating_add(index as u32))
    }
}

// -----------------------------------------------------------------------------
// Formatting traits
// -----------------------------------------------------------------------------

impl fmt::Debug for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PointId").field(&self.get()).finish()
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

impl fmt::Debug for TriaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TriaId").field(&self.get()).finish()
    }
}

impl fmt::Display for TriaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}
