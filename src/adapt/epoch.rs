//! Generation stamps used as per-point dirty bits.
//!
//! Each traversal advances the epoch and stamps the points it touches; a
//! point was touched during epoch `e` or later when its stamp is `>= e`.
//! Nothing is reset between traversals.

use crate::mesh_error::MeshMetricError;
use crate::topology::point::PointId;

/// Last-touched epoch of every point.
#[derive(Clone, Debug, Default)]
pub struct EpochMarks {
    stamps: Vec<u32>,
    current: u32,
}

impl EpochMarks {
    /// Marks for `len` points, all at epoch 0.
    pub fn new(len: usize) -> Result<Self, MeshMetricError> {
        let mut stamps = Vec::new();
        stamps
            .try_reserve_exact(len)
            .map_err(|_| MeshMetricError::AllocationFailed { requested: len })?;
        stamps.resize(len, 0);
        Ok(Self { stamps, current: 0 })
    }

    /// Starts a new epoch and returns it.
    pub fn advance(&mut self) -> u32 {
        self.current += 1;
        self.current
    }

    /// Stamps `p` with an earlier `epoch`; epochs past the current one are
    /// clamped to it.
    pub fn stamp_at(&mut self, p: PointId, epoch: u32) {
        let epoch = epoch.min(self.current);
        if let Some(s) = self.stamps.get_mut(p.index()) {
            *s = epoch;
        }
    }

    /// Stamps `p` with the current epoch.
    pub fn stamp(&mut self, p: PointId) {
        if let Some(s) = self.stamps.get_mut(p.index()) {
            *s = self.current;
        }
    }

    /// Epoch at which `p` was last stamped.
    pub fn stamp_of(&self, p: PointId) -> u32 {
        self.stamps.get(p.index()).copied().unwrap_or(0)
    }

    /// True when `p` was stamped during the current epoch.
    pub fn is_current(&self, p: PointId) -> bool {
        self.current > 0 && self.stamp_of(p) == self.current
    }

    /// True when `p` was stamped during `epoch` or later.
    pub fn touched_since(&self, p: PointId, epoch: u32) -> bool {
        self.stamp_of(p) >= epoch
    }
}
