//! Geometry for metric computation.
//!
//! This module provides the local-frame linear algebra, the cubic Bezier
//! surface reconstruction used by the curvature estimators, and the metric
//! edge-length and area evaluators.

pub mod bezier;
pub mod linalg;
pub mod quality;
