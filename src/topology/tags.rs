//! Geometric feature tags carried by points and triangle edges.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Set of feature flags attached to a point.
///
/// The empty set is a regular (smooth) point.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointTag(u8);

impl PointTag {
    /// Smooth point, no feature.
    pub const REGULAR: Self = Self(0);
    /// Point on a ridge (sharp curve between two smooth sheets).
    pub const RIDGE: Self = Self(1 << 0);
    /// Point on a reference curve (non-sharp tagged curve).
    pub const REFERENCE: Self = Self(1 << 1);
    /// Corner point.
    pub const CORNER: Self = Self(1 << 2);
    /// Required point, kept as is by the remesher.
    pub const REQUIRED: Self = Self(1 << 3);
    /// Non-manifold point.
    pub const NON_MANIFOLD: Self = Self(1 << 4);

    const SINGULAR: Self = Self(Self::CORNER.0 | Self::REQUIRED.0 | Self::NON_MANIFOLD.0);

    /// Raw bit pattern.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// True when every flag in `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True when at least one flag in `other` is set.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// True for corner, required and non-manifold points.
    pub const fn is_singular(self) -> bool {
        self.intersects(Self::SINGULAR)
    }

    /// True for ridge points.
    pub const fn is_ridge(self) -> bool {
        self.intersects(Self::RIDGE)
    }

    /// True for reference points.
    pub const fn is_reference(self) -> bool {
        self.intersects(Self::REFERENCE)
    }

    /// True when no flag is set.
    pub const fn is_regular(self) -> bool {
        self.0 == 0
    }

    /// Feature class used to select a size estimator.
    pub const fn class(self) -> PointClass {
        if self.is_singular() {
            PointClass::Singular
        } else if self.is_ridge() {
            PointClass::Ridge
        } else if self.is_reference() {
            PointClass::Reference
        } else {
            PointClass::Regular
        }
    }
}

impl BitOr for PointTag {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for PointTag {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for PointTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(PointTag, &str); 5] = [
            (PointTag::RIDGE, "RIDGE"),
            (PointTag::REFERENCE, "REFERENCE"),
            (PointTag::CORNER, "CORNER"),
            (PointTag::REQUIRED, "REQUIRED"),
            (PointTag::NON_MANIFOLD, "NON_MANIFOLD"),
        ];
        if self.is_regular() {
            return f.write_str("PointTag(REGULAR)");
        }
        let names: Vec<&str> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "PointTag({})", names.join(" | "))
    }
}

/// Feature class of a point, in estimator dispatch priority order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointClass {
    /// Corner, required or non-manifold point: isotropic sizing.
    Singular,
    /// Ridge point: tangent size plus one conormal size per sheet.
    Ridge,
    /// Point on a reference curve over a smooth surface.
    Reference,
    /// Smooth point.
    Regular,
}

/// Feature tag of a triangle edge.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeTag {
    /// Ordinary edge.
    #[default]
    None,
    /// Sharp ridge edge.
    Ridge,
    /// Edge of a reference curve.
    Reference,
}

impl EdgeTag {
    /// True for ridge and reference edges (edges of a feature curve).
    pub const fn is_feature(self) -> bool {
        !matches!(self, EdgeTag::None)
    }

    /// True for ridge edges.
    pub const fn is_ridge(self) -> bool {
        matches!(self, EdgeTag::Ridge)
    }

    /// True for reference edges.
    pub const fn is_reference(self) -> bool {
        matches!(self, EdgeTag::Reference)
    }
}
