//! Small fixed-size linear algebra for metric tensors.
//!
//! Symmetric 3×3 tensors are stored as their six upper-triangular components
//! `[m00, m01, m02, m11, m12, m22]`; symmetric 2×2 tangential blocks as
//! `[a00, a01, a11]`. Local frames are rotation matrices whose rows are the
//! frame axes, so `R·n = e3` for the frame built from the normal `n`.

use nalgebra::{Matrix2, Matrix3, SymmetricEigen, Vector2, Vector3};
use serde::{Deserialize, Serialize};

const EPS_FRAME: f64 = 1e-6;
const EPS_DET: f64 = 1e-30;

/// Rotation matrix mapping the unit vector `n` onto `e3`.
///
/// Rodrigues form about the axis `n × e3`. When `n` is (anti)parallel to `e3`
/// the identity, or a half-turn about `e2`, is returned.
pub fn rotation_to_z(n: &Vector3<f64>) -> Matrix3<f64> {
    let aa = n.x * n.x;
    let bb = n.y * n.y;
    let ll = aa + bb;
    if ll < EPS_FRAME {
        return if n.z > 0.0 {
            Matrix3::identity()
        } else {
            Matrix3::from_diagonal(&Vector3::new(-1.0, 1.0, -1.0))
        };
    }
    let ab = n.x * n.y;
    let cos = n.z;
    let sin = (1.0 - (cos * cos).min(1.0)).sqrt();
    let l = ll.sqrt();
    #[rustfmt::skip]
    let r = Matrix3::new(
        (aa * cos + bb) / ll, ab * (cos - 1.0) / ll, -n.x * sin / l,
        ab * (cos - 1.0) / ll, (bb * cos + aa) / ll, -n.y * sin / l,
        n.x * sin / l,         n.y * sin / l,         cos,
    );
    r
}

/// Symmetric 3×3 tensor in packed upper-triangular form.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SymTensor3(pub [f64; 6]);

impl SymTensor3 {
    /// `a·I`.
    pub const fn scaled_identity(a: f64) -> Self {
        Self([a, 0.0, 0.0, a, 0.0, a])
    }

    /// Packed components.
    pub const fn components(&self) -> [f64; 6] {
        self.0
    }

    /// Dense symmetric matrix.
    pub fn to_matrix(&self) -> Matrix3<f64> {
        let [m0, m1, m2, m3, m4, m5] = self.0;
        Matrix3::new(m0, m1, m2, m1, m3, m4, m2, m4, m5)
    }

    /// Packs the upper triangle of a (nearly) symmetric matrix.
    pub fn from_matrix(m: &Matrix3<f64>) -> Self {
        Self([
            m[(0, 0)],
            m[(0, 1)],
            m[(0, 2)],
            m[(1, 1)],
            m[(1, 2)],
            m[(2, 2)],
        ])
    }

    /// `a ⊗ a` scaled by `w`.
    pub fn outer(a: &Vector3<f64>, w: f64) -> Self {
        Self([
            w * a.x * a.x,
            w * a.x * a.y,
            w * a.x * a.z,
            w * a.y * a.y,
            w * a.y * a.z,
            w * a.z * a.z,
        ])
    }

    /// Quadratic form `uᵀ M u`.
    pub fn quad(&self, u: &Vector3<f64>) -> f64 {
        let [m0, m1, m2, m3, m4, m5] = self.0;
        m0 * u.x * u.x
            + m3 * u.y * u.y
            + m5 * u.z * u.z
            + 2.0 * (m1 * u.x * u.y + m2 * u.x * u.z + m4 * u.y * u.z)
    }

    /// Eigenvalues in ascending order.
    pub fn eigenvalues(&self) -> [f64; 3] {
        let mut ev: [f64; 3] = SymmetricEigen::new(self.to_matrix()).eigenvalues.into();
        ev.sort_by(f64::total_cmp);
        ev
    }

    /// Tangential 2×2 block of `R M Rᵀ`.
    pub fn tangent_block(&self, r: &Matrix3<f64>) -> SymMat2 {
        let c = r * self.to_matrix() * r.transpose();
        SymMat2([c[(0, 0)], c[(0, 1)], c[(1, 1)]])
    }

    /// `Rᵀ [B 0; 0 0] R`: lifts a tangential block back to the ambient frame.
    ///
    /// The third frame axis (the normal) lies in the kernel of the result.
    pub fn embed(block: &SymMat2, r: &Matrix3<f64>) -> Self {
        let [a, b, c] = block.0;
        let lifted = Matrix3::new(a, b, 0.0, b, c, 0.0, 0.0, 0.0, 0.0);
        Self::from_matrix(&(r.transpose() * lifted * r))
    }

    /// Adds `w` to the three diagonal entries.
    pub fn add_diagonal(&mut self, w: f64) {
        self.0[0] += w;
        self.0[3] += w;
        self.0[5] += w;
    }
}

/// Symmetric 2×2 matrix `[[a, b], [b, c]]` packed as `[a, b, c]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SymMat2(pub [f64; 3]);

/// Ordered eigen decomposition of a [`SymMat2`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Eigen2 {
    /// Eigenvalues, ascending.
    pub values: [f64; 2],
    /// Unit eigenvectors; `vectors[1]` is `vectors[0]` turned by +90°.
    pub vectors: [Vector2<f64>; 2],
}

impl SymMat2 {
    /// Quadratic form `tᵀ A t`.
    pub fn quad(&self, t: &Vector2<f64>) -> f64 {
        let [a, b, c] = self.0;
        a * t.x * t.x + 2.0 * b * t.x * t.y + c * t.y * t.y
    }

    /// Eigen decomposition in canonical order.
    pub fn eigen(&self) -> Eigen2 {
        let [a, b, c] = self.0;
        let eig = SymmetricEigen::new(Matrix2::new(a, b, b, c));
        let (lo, hi) = if eig.eigenvalues[0] <= eig.eigenvalues[1] {
            (0, 1)
        } else {
            (1, 0)
        };
        let mut v0: Vector2<f64> = eig.eigenvectors.column(lo).into_owned();
        let len = v0.norm();
        v0 = if len > 0.0 { v0 / len } else { Vector2::x() };
        if v0.x < 0.0 || (v0.x == 0.0 && v0.y < 0.0) {
            v0 = -v0;
        }
        Eigen2 {
            values: [eig.eigenvalues[lo], eig.eigenvalues[hi]],
            vectors: [v0, Vector2::new(-v0.y, v0.x)],
        }
    }

    /// Recomposes `Σ λᵢ vᵢ vᵢᵀ`.
    pub fn from_eigen(values: [f64; 2], vectors: &[Vector2<f64>; 2]) -> Self {
        let [l0, l1] = values;
        let [v0, v1] = vectors;
        Self([
            l0 * v0.x * v0.x + l1 * v1.x * v1.x,
            l0 * v0.x * v0.y + l1 * v1.x * v1.y,
            l0 * v0.y * v0.y + l1 * v1.y * v1.y,
        ])
    }
}

/// Solves the symmetric system `A x = b` with `A` in packed form.
///
/// Returns `None` when `A` is numerically singular.
pub fn solve_sym3(a: &[f64; 6], b: &[f64; 3]) -> Option<Vector3<f64>> {
    let m = SymTensor3(*a).to_matrix();
    if m.determinant().abs() < EPS_DET {
        return None;
    }
    m.lu().solve(&Vector3::from(*b))
}
