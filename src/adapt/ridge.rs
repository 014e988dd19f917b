//! Tensor reconstruction at ridge points.

use crate::adapt::metric::RidgeSizes;
use crate::geometry::linalg::SymTensor3;
use crate::mesh_error::MeshMetricError;
use crate::topology::point::PointId;
use crate::topology::surface::SurfaceMesh;
use nalgebra::Vector3;

/// Picks the sheet seen by an edge leaving ridge point `p` along `u`.
///
/// The sheet whose normal is most orthogonal to `u` wins; returns its index
/// (0 for `n1`, 1 for `n2`) and its normal.
pub fn sheet_for_edge(
    mesh: &SurfaceMesh,
    p: PointId,
    u: &Vector3<f64>,
) -> Result<(usize, Vector3<f64>), MeshMetricError> {
    let (n1, n2) = mesh.ridge_normals(p)?;
    if u.dot(&n1).abs() < u.dot(&n2).abs() {
        Ok((0, n1))
    } else {
        Ok((1, n2))
    }
}

/// Full tensor of ridge point `p` along the edge direction `u`.
///
/// In the frame `(t, n × t, n)` of the selected sheet the tensor is
/// `diag(tangent size, sheet size, 0)`.
pub fn ridge_tensor(
    mesh: &SurfaceMesh,
    p: PointId,
    sizes: &RidgeSizes,
    u: &Vector3<f64>,
) -> Result<SymTensor3, MeshMetricError> {
    let t = mesh.point(p)?.tangent();
    let (side, n) = sheet_for_edge(mesh, p, u)?;
    let conormal = n.cross(&t);
    let mut m = SymTensor3::outer(&t, sizes.tangent);
    let c = SymTensor3::outer(&conormal, sizes.sheets[side]);
    for (a, b) in m.0.iter_mut().zip(c.0) {
        *a += b;
    }
    Ok(m)
}
