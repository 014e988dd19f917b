//! In-memory triangulated surface with feature tags and edge adjacency.
//!
//! # Conventions
//! - Triangle vertices are stored counter-clockwise with respect to the
//!   outward normal.
//! - Edge `i` of a triangle is the edge opposite local vertex `i`, i.e.
//!   `(v[i+1], v[i+2])` modulo 3.
//! - A point's `normal` is the unit surface normal for regular and reference
//!   points; its `tangent` is the unit feature-curve tangent for ridge and
//!   reference points. Ridge points additionally own an [`XPoint`] record
//!   holding one normal per incident surface sheet.
//! - Triangles with a non-positive region or marked deleted are inactive and
//!   skipped by every traversal.
//!
//! # Example
//! ```rust
//! use mesh_metric::topology::surface::SurfaceMesh;
//!
//! let mut mesh = SurfaceMesh::new();
//! let a = mesh.add_point([0.0, 0.0, 0.0]);
//! let b = mesh.add_point([1.0, 0.0, 0.0]);
//! let c = mesh.add_point([0.0, 1.0, 0.0]);
//! let t = mesh.add_tria([a, b, c])?;
//! let n = mesh.tria_normal(t).expect("non-degenerate");
//! assert!((n.z - 1.0).abs() < 1e-12);
//! # Ok::<(), mesh_metric::mesh_error::MeshMetricError>(())
//! ```

use crate::debug_invariants::{DebugInvariants, ensure};
use crate::mesh_error::MeshMetricError;
use crate::topology::point::{PointId, TriaId};
use crate::topology::tags::{EdgeTag, PointTag};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Squared-length threshold below which a vector is considered null.
pub(crate) const EPSD: f64 = 1e-30;

/// Local index of the next vertex in a triangle.
pub const NEXT: [usize; 3] = [1, 2, 0];
/// Local index of the previous vertex in a triangle.
pub const PREV: [usize; 3] = [2, 0, 1];

/// A surface point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Cartesian coordinates.
    pub coords: [f64; 3],
    /// Feature flags.
    pub tag: PointTag,
    /// Unit surface normal (regular and reference points).
    pub normal: [f64; 3],
    /// Unit feature tangent (ridge and reference points).
    pub tangent: [f64; 3],
    /// Index of the ridge normals record, if any.
    pub xpoint: Option<usize>,
    deleted: bool,
}

impl Point {
    /// Coordinates as a vector.
    #[inline]
    pub fn position(&self) -> Vector3<f64> {
        Vector3::from(self.coords)
    }

    /// Surface normal as a vector.
    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        Vector3::from(self.normal)
    }

    /// Feature tangent as a vector.
    #[inline]
    pub fn tangent(&self) -> Vector3<f64> {
        Vector3::from(self.tangent)
    }

    /// True when the point carries a feature-curve tangent.
    #[inline]
    pub fn has_tangent(&self) -> bool {
        !self.tag.is_singular() && (self.tag.is_ridge() || self.tag.is_reference())
    }
}

/// Normals of the two surface sheets meeting at a ridge point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct XPoint {
    /// Normal of the first sheet.
    pub n1: [f64; 3],
    /// Normal of the second sheet.
    pub n2: [f64; 3],
}

/// A surface triangle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tria {
    /// Vertices, counter-clockwise.
    pub v: [PointId; 3],
    /// Feature tag of edge `i` (opposite vertex `i`).
    pub edges: [EdgeTag; 3],
    /// Region id; non-positive regions are inactive.
    pub region: i32,
    deleted: bool,
}

impl Tria {
    /// Local index of `p` in this triangle.
    pub fn local_index(&self, p: PointId) -> Option<usize> {
        self.v.iter().position(|&q| q == p)
    }

    /// True when the triangle takes part in traversals.
    #[inline]
    pub fn is_active(&self) -> bool {
        !self.deleted && self.region > 0
    }
}

type EdgeKey = (PointId, PointId);

fn edge_key(a: PointId, b: PointId) -> EdgeKey {
    if a < b { (a, b) } else { (b, a) }
}

/// Triangulated surface store.
#[derive(Clone, Debug, Default)]
pub struct SurfaceMesh {
    points: Vec<Point>,
    xpoints: Vec<XPoint>,
    trias: Vec<Tria>,
    adja: Vec<[Option<(TriaId, u8)>; 3]>,
    open_edges: HashMap<EdgeKey, (TriaId, u8)>,
    shared_edges: HashSet<EdgeKey>,
}

impl SurfaceMesh {
    /// Creates an empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty surface with room for `np` points and `nt` triangles.
    pub fn with_capacity(np: usize, nt: usize) -> Self {
        Self {
            points: Vec::with_capacity(np),
            trias: Vec::with_capacity(nt),
            adja: Vec::with_capacity(nt),
            ..Self::default()
        }
    }

    /// Number of point slots (including deleted points).
    pub fn np(&self) -> usize {
        self.points.len()
    }

    /// Number of triangle slots (including deleted triangles).
    pub fn nt(&self) -> usize {
        self.trias.len()
    }

    /// Adds a regular point and returns its handle.
    pub fn add_point(&mut self, coords: [f64; 3]) -> PointId {
        self.points.push(Point {
            coords,
            tag: PointTag::REGULAR,
            normal: [0.0, 0.0, 1.0],
            tangent: [0.0; 3],
            xpoint: None,
            deleted: false,
        });
        PointId::from_index(self.points.len() - 1)
    }

    /// Marks a point as deleted; it no longer receives a metric.
    pub fn delete_point(&mut self, p: PointId) -> Result<(), MeshMetricError> {
        self.point_mut(p)?.deleted = true;
        Ok(())
    }

    /// Replaces the feature tag of a point.
    pub fn set_tag(&mut self, p: PointId, tag: PointTag) -> Result<(), MeshMetricError> {
        self.point_mut(p)?.tag = tag;
        Ok(())
    }

    /// Sets the unit normal of a point (normalized on input).
    pub fn set_normal(&mut self, p: PointId, n: [f64; 3]) -> Result<(), MeshMetricError> {
        self.point_mut(p)?.normal = unit_or_raw(n);
        Ok(())
    }

    /// Sets the unit feature tangent of a point (normalized on input).
    pub fn set_tangent(&mut self, p: PointId, t: [f64; 3]) -> Result<(), MeshMetricError> {
        self.point_mut(p)?.tangent = unit_or_raw(t);
        Ok(())
    }

    /// Attaches (or replaces) the two sheet normals of a ridge point.
    pub fn set_ridge_normals(
        &mut self,
        p: PointId,
        n1: [f64; 3],
        n2: [f64; 3],
    ) -> Result<(), MeshMetricError> {
        let record = XPoint {
            n1: unit_or_raw(n1),
            n2: unit_or_raw(n2),
        };
        let slot = self.point(p)?.xpoint;
        match slot {
            Some(ix) => self.xpoints[ix] = record,
            None => {
                self.xpoints.push(record);
                let ix = self.xpoints.len() - 1;
                self.point_mut(p)?.xpoint = Some(ix);
            }
        }
        Ok(())
    }

    /// Adds a triangle (region 1) and links it to its neighbours.
    pub fn add_tria(&mut self, v: [PointId; 3]) -> Result<TriaId, MeshMetricError> {
        for &p in &v {
            self.point(p)?;
        }
        let id = TriaId::from_index(self.trias.len());
        if v[0] == v[1] || v[1] == v[2] || v[0] == v[2] {
            return Err(MeshMetricError::DegenerateTria(id));
        }
        self.trias.push(Tria {
            v,
            edges: [EdgeTag::None; 3],
            region: 1,
            deleted: false,
        });
        self.adja.push([None; 3]);
        self.link(id);
        Ok(id)
    }

    /// Tags edge `i` of triangle `t`, and the matching edge of its neighbour.
    pub fn set_edge_tag(&mut self, t: TriaId, i: usize, tag: EdgeTag) -> Result<(), MeshMetricError> {
        self.tria_mut(t)?.edges[i % 3] = tag;
        if let Some((adj, j)) = self.adja[t.index()][i % 3] {
            self.trias[adj.index()].edges[j as usize] = tag;
        }
        Ok(())
    }

    /// Tags the edge `(a, b)` wherever it appears.
    pub fn tag_edge(&mut self, a: PointId, b: PointId, tag: EdgeTag) -> Result<(), MeshMetricError> {
        for k in 0..self.trias.len() {
            let tria = &self.trias[k];
            if let (Some(ia), Some(ib)) = (tria.local_index(a), tria.local_index(b)) {
                let opposite = 3 - ia - ib;
                self.trias[k].edges[opposite] = tag;
            }
        }
        Ok(())
    }

    /// Changes the region of a triangle.
    pub fn set_region(&mut self, t: TriaId, region: i32) -> Result<(), MeshMetricError> {
        self.tria_mut(t)?.region = region;
        Ok(())
    }

    /// Marks a triangle as deleted and unlinks it from its neighbours.
    pub fn delete_tria(&mut self, t: TriaId) -> Result<(), MeshMetricError> {
        self.tria_mut(t)?.deleted = true;
        let v = self.trias[t.index()].v;
        for i in 0..3 {
            let key = edge_key(v[NEXT[i]], v[PREV[i]]);
            match self.adja[t.index()][i].take() {
                Some((adj, j)) => {
                    self.adja[adj.index()][j as usize] = None;
                    self.shared_edges.remove(&key);
                    self.open_edges.insert(key, (adj, j));
                }
                None => {
                    if self.open_edges.get(&key) == Some(&(t, i as u8)) {
                        self.open_edges.remove(&key);
                    }
                }
            }
        }
        Ok(())
    }

    fn link(&mut self, t: TriaId) {
        let v = self.trias[t.index()].v;
        for i in 0..3 {
            let key = edge_key(v[NEXT[i]], v[PREV[i]]);
            if self.shared_edges.contains(&key) {
                log::warn!(
                    "Non-manifold edge detected: ({}, {}) in triangle {t}; left unlinked",
                    key.0,
                    key.1
                );
                continue;
            }
            match self.open_edges.remove(&key) {
                Some((adj, j)) => {
                    self.adja[t.index()][i] = Some((adj, j));
                    self.adja[adj.index()][j as usize] = Some((t, i as u8));
                    self.shared_edges.insert(key);
                }
                None => {
                    self.open_edges.insert(key, (t, i as u8));
                }
            }
        }
    }

    /// Access a point by handle.
    pub fn point(&self, p: PointId) -> Result<&Point, MeshMetricError> {
        self.points
            .get(p.index())
            .ok_or(MeshMetricError::UnknownPoint(p))
    }

    fn point_mut(&mut self, p: PointId) -> Result<&mut Point, MeshMetricError> {
        self.points
            .get_mut(p.index())
            .ok_or(MeshMetricError::UnknownPoint(p))
    }

    /// Access a triangle by handle.
    pub fn tria(&self, t: TriaId) -> Result<&Tria, MeshMetricError> {
        self.trias
            .get(t.index())
            .ok_or(MeshMetricError::UnknownTria(t))
    }

    fn tria_mut(&mut self, t: TriaId) -> Result<&mut Tria, MeshMetricError> {
        self.trias
            .get_mut(t.index())
            .ok_or(MeshMetricError::UnknownTria(t))
    }

    /// True when `p` exists and is not deleted.
    pub fn is_valid_point(&self, p: PointId) -> bool {
        self.points.get(p.index()).is_some_and(|pt| !pt.deleted)
    }

    /// True when `t` exists and is active.
    pub fn is_active_tria(&self, t: TriaId) -> bool {
        self.trias.get(t.index()).is_some_and(Tria::is_active)
    }

    /// Iterates over valid points.
    pub fn points(&self) -> impl Iterator<Item = (PointId, &Point)> + '_ {
        self.points
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.deleted)
            .map(|(k, p)| (PointId::from_index(k), p))
    }

    /// Iterates over active triangles.
    pub fn trias(&self) -> impl Iterator<Item = (TriaId, &Tria)> + '_ {
        self.trias
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_active())
            .map(|(k, t)| (TriaId::from_index(k), t))
    }

    /// Active neighbour across edge `i` of `t`, with the neighbour's local edge index.
    pub fn adjacent(&self, t: TriaId, i: usize) -> Option<(TriaId, usize)> {
        let (adj, j) = self.adja.get(t.index())?[i % 3]?;
        self.is_active_tria(adj).then_some((adj, j as usize))
    }

    /// Ridge normals record of a point.
    pub fn ridge_normals(&self, p: PointId) -> Result<(Vector3<f64>, Vector3<f64>), MeshMetricError> {
        let ix = self
            .point(p)?
            .xpoint
            .ok_or(MeshMetricError::MissingRidgeNormals(p))?;
        let xp = self
            .xpoints
            .get(ix)
            .ok_or(MeshMetricError::MissingRidgeNormals(p))?;
        Ok((Vector3::from(xp.n1), Vector3::from(xp.n2)))
    }

    /// Normal of `p` seen from a face with unit normal `face_normal`.
    ///
    /// Ridge points answer with whichever sheet normal is closest to the face
    /// normal; other points answer with their own normal.
    pub fn normal_for_face(
        &self,
        p: PointId,
        face_normal: &Vector3<f64>,
    ) -> Result<Vector3<f64>, MeshMetricError> {
        let point = self.point(p)?;
        if point.tag.is_ridge() && !point.tag.is_singular() {
            let (n1, n2) = self.ridge_normals(p)?;
            if face_normal.dot(&n1).abs() < face_normal.dot(&n2).abs() {
                Ok(n2)
            } else {
                Ok(n1)
            }
        } else {
            Ok(point.normal())
        }
    }

    /// Unit normal of an active triangle, `None` when degenerate.
    pub fn tria_normal(&self, t: TriaId) -> Option<Vector3<f64>> {
        let tria = self.trias.get(t.index())?;
        let [a, b, c] = tria.v.map(|p| self.points[p.index()].position());
        let n = (b - a).cross(&(c - a));
        let len2 = n.norm_squared();
        (len2 > EPSD).then(|| n / len2.sqrt())
    }

    /// Length of the diagonal of the bounding box of valid points.
    pub fn bounding_diagonal(&self) -> f64 {
        let mut min = Vector3::repeat(f64::INFINITY);
        let mut max = Vector3::repeat(f64::NEG_INFINITY);
        for (_, p) in self.points() {
            let x = p.position();
            min = min.inf(&x);
            max = max.sup(&x);
        }
        if min.x > max.x {
            return 0.0;
        }
        (max - min).norm()
    }
}

fn unit_or_raw(v: [f64; 3]) -> [f64; 3] {
    let v = Vector3::from(v);
    let len2 = v.norm_squared();
    if len2 > EPSD {
        (v / len2.sqrt()).into()
    } else {
        v.into()
    }
}

impl DebugInvariants for SurfaceMesh {
    fn validate_invariants(&self) -> Result<(), MeshMetricError> {
        for (t, tria) in self.trias() {
            for &p in &tria.v {
                if !self.is_valid_point(p) {
                    return Err(MeshMetricError::UnknownPoint(p));
                }
            }
            if tria.v[0] == tria.v[1] || tria.v[1] == tria.v[2] || tria.v[0] == tria.v[2] {
                return Err(MeshMetricError::DegenerateTria(t));
            }
            for i in 0..3 {
                if let Some((adj, j)) = self.adjacent(t, i) {
                    let back = self.adjacent(adj, j).map(|(b, _)| b);
                    ensure(back == Some(t), || {
                        format!("adjacency {t}:{i} -> {adj}:{j} is not mirrored")
                    })?;
                }
            }
        }
        for (p, point) in self.points() {
            if point.tag.is_ridge() && !point.tag.is_singular() {
                self.ridge_normals(p)?;
            }
        }
        Ok(())
    }
}
