//! Per-point metric values and the metric field that stores them.
//!
//! Ridge points store three principal sizes instead of a tensor: one along
//! the ridge tangent and one along the conormal of each incident sheet. A
//! full tensor is rebuilt on demand for a given edge direction by
//! [`ridge_tensor`](crate::adapt::ridge::ridge_tensor).
//!
//! For interop the field converts to and from six packed values per point,
//! `[m00, m01, m02, m11, m12, m22]` for tensors and `[t, s1, s2, 0, 0, 0]`
//! for ridge sizes.

use crate::adapt::ridge::ridge_tensor;
use crate::debug_invariants::{DebugInvariants, ensure};
use crate::geometry::linalg::SymTensor3;
use crate::mesh_error::MeshMetricError;
use crate::topology::point::PointId;
use crate::topology::surface::SurfaceMesh;
use crate::topology::tags::PointClass;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Principal sizes of a ridge point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RidgeSizes {
    /// Size along the ridge tangent.
    pub tangent: f64,
    /// Size along the conormal of sheet 1 and sheet 2.
    pub sheets: [f64; 2],
}

impl RidgeSizes {
    /// Same size in all three directions.
    pub const fn uniform(s: f64) -> Self {
        Self {
            tangent: s,
            sheets: [s, s],
        }
    }

    /// Largest of the three sizes.
    pub fn max(&self) -> f64 {
        self.tangent.max(self.sheets[0]).max(self.sheets[1])
    }

    /// The sizes as `[tangent, sheet 1, sheet 2]`.
    pub const fn as_array(&self) -> [f64; 3] {
        [self.tangent, self.sheets[0], self.sheets[1]]
    }
}

/// Metric attached to one point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum PointMetric {
    /// `a·I`.
    Isotropic(f64),
    /// General symmetric tensor.
    Tensor(SymTensor3),
    /// Ridge principal sizes.
    Ridge(RidgeSizes),
}

impl PointMetric {
    /// Packed six-value form.
    pub fn components(&self) -> [f64; 6] {
        match self {
            PointMetric::Isotropic(a) => SymTensor3::scaled_identity(*a).components(),
            PointMetric::Tensor(m) => m.components(),
            PointMetric::Ridge(s) => [s.tangent, s.sheets[0], s.sheets[1], 0.0, 0.0, 0.0],
        }
    }

    /// Tensor of the point seen along the edge direction `u`.
    ///
    /// Only ridge metrics depend on `u`.
    pub fn along(
        &self,
        mesh: &SurfaceMesh,
        p: PointId,
        u: &Vector3<f64>,
    ) -> Result<SymTensor3, MeshMetricError> {
        match self {
            PointMetric::Isotropic(a) => Ok(SymTensor3::scaled_identity(*a)),
            PointMetric::Tensor(m) => Ok(*m),
            PointMetric::Ridge(s) => ridge_tensor(mesh, p, s, u),
        }
    }

    fn is_finite(&self) -> bool {
        self.components().iter().all(|x| x.is_finite())
    }
}

/// Metric values indexed by point.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricField {
    values: Vec<Option<PointMetric>>,
}

impl MetricField {
    /// Creates an empty field; storage is allocated on first use.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a field with `len` empty slots.
    pub fn with_len(len: usize) -> Result<Self, MeshMetricError> {
        let mut field = Self::new();
        field.ensure_len(len)?;
        Ok(field)
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no slot has been allocated.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True when at least one point holds a value.
    pub fn is_populated(&self) -> bool {
        self.values.iter().any(Option::is_some)
    }

    /// Grows the field to at least `len` slots.
    pub fn ensure_len(&mut self, len: usize) -> Result<(), MeshMetricError> {
        if len <= self.values.len() {
            return Ok(());
        }
        self.values
            .try_reserve(len - self.values.len())
            .map_err(|_| MeshMetricError::AllocationFailed { requested: len })?;
        self.values.resize(len, None);
        Ok(())
    }

    /// Metric of `p`, if set.
    pub fn get(&self, p: PointId) -> Option<&PointMetric> {
        self.values.get(p.index())?.as_ref()
    }

    /// Metric of `p`, or [`MeshMetricError::MissingMetric`].
    pub fn try_get(&self, p: PointId) -> Result<&PointMetric, MeshMetricError> {
        self.get(p).ok_or(MeshMetricError::MissingMetric(p))
    }

    /// Mutable metric of `p`, if set.
    pub fn get_mut(&mut self, p: PointId) -> Option<&mut PointMetric> {
        self.values.get_mut(p.index())?.as_mut()
    }

    /// Stores the metric of `p`, growing the field if needed.
    pub fn set(&mut self, p: PointId, m: PointMetric) -> Result<(), MeshMetricError> {
        self.ensure_len(p.index() + 1)?;
        self.values[p.index()] = Some(m);
        Ok(())
    }

    /// Iterates over the points holding a value.
    pub fn iter(&self) -> impl Iterator<Item = (PointId, &PointMetric)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(k, m)| m.as_ref().map(|m| (PointId::from_index(k), m)))
    }

    /// Packed six-value form of every slot (zeros where unset).
    pub fn to_components(&self) -> Vec<[f64; 6]> {
        self.values
            .iter()
            .map(|m| m.map_or([0.0; 6], |m| m.components()))
            .collect()
    }

    /// Reads packed values, one per point slot of `mesh`.
    ///
    /// Ridge points read `[t, s1, s2, ..]`; every other point reads a tensor.
    /// Slots of deleted points and all-zero slots stay unset.
    pub fn from_components(
        mesh: &SurfaceMesh,
        values: &[[f64; 6]],
    ) -> Result<Self, MeshMetricError> {
        let mut field = Self::with_len(mesh.np().max(values.len()))?;
        for (p, point) in mesh.points() {
            let Some(c) = values.get(p.index()) else {
                continue;
            };
            if c.iter().all(|&x| x == 0.0) {
                continue;
            }
            let m = match point.tag.class() {
                PointClass::Ridge => PointMetric::Ridge(RidgeSizes {
                    tangent: c[0],
                    sheets: [c[1], c[2]],
                }),
                _ => PointMetric::Tensor(SymTensor3(*c)),
            };
            field.values[p.index()] = Some(m);
        }
        Ok(field)
    }
}

impl DebugInvariants for MetricField {
    fn validate_invariants(&self) -> Result<(), MeshMetricError> {
        for (p, m) in self.iter() {
            ensure(m.is_finite(), || format!("non-finite metric at point {p}"))?;
        }
        Ok(())
    }
}
