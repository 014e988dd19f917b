//! Bounded vertex-ball traversal.
//!
//! A *ball* is the ordered fan of triangles around a vertex. Entries are
//! `(tria, local index of the vertex)` in counter-clockwise order: the next
//! entry shares the edge `(p, v[i+2])` of the current one. Open fans (on a
//! boundary) start at the boundary.
//!
//! Balls are stored in fixed-capacity arrays; a fan with more than
//! [`BALL_CAPACITY`] triangles is reported as [`MeshMetricError::BallOverflow`].

use crate::mesh_error::MeshMetricError;
use crate::topology::point::{PointId, TriaId};
use crate::topology::surface::{NEXT, PREV, SurfaceMesh};
use arrayvec::ArrayVec;

/// Maximum number of triangles in a vertex ball.
pub const BALL_CAPACITY: usize = 512;

/// One fan entry: triangle and local index of the centre vertex in it.
pub type FanEntry = (TriaId, usize);

/// Fixed-capacity sequence of fan entries.
pub type Fan = ArrayVec<FanEntry, BALL_CAPACITY>;

/// Ordered fan of triangles around a vertex.
#[derive(Clone, Debug)]
pub struct Ball {
    /// Centre vertex.
    pub center: PointId,
    /// Fan entries, counter-clockwise.
    pub fan: Fan,
    /// True when the fan wraps around the vertex.
    pub closed: bool,
}

impl Ball {
    /// Number of triangles in the ball.
    pub fn len(&self) -> usize {
        self.fan.len()
    }

    /// True when the ball is empty.
    pub fn is_empty(&self) -> bool {
        self.fan.is_empty()
    }

    /// Outer points of the fan in counter-clockwise order.
    ///
    /// A closed fan yields one point per triangle; an open fan yields one
    /// more, the far end of the last triangle.
    pub fn outer_points(&self, mesh: &SurfaceMesh) -> Result<Vec<PointId>, MeshMetricError> {
        outer_points(mesh, &self.fan, !self.closed)
    }
}

/// The two sides of a ridge vertex ball.
#[derive(Clone, Debug)]
pub struct HalfBalls {
    /// Centre vertex.
    pub center: PointId,
    /// Open fans; side 0 lies on the sheet of the first ridge normal.
    pub sides: [Fan; 2],
    /// Neighbours of the centre along the ridge line.
    pub ridge_ends: [PointId; 2],
}

/// Outer points of an open or closed fan.
pub(crate) fn outer_points(
    mesh: &SurfaceMesh,
    fan: &[FanEntry],
    with_last: bool,
) -> Result<Vec<PointId>, MeshMetricError> {
    let mut pts = Vec::with_capacity(fan.len() + 1);
    for &(t, i) in fan {
        pts.push(mesh.tria(t)?.v[NEXT[i]]);
    }
    if with_last {
        if let Some(&(t, i)) = fan.last() {
            pts.push(mesh.tria(t)?.v[PREV[i]]);
        }
    }
    Ok(pts)
}

fn push(fan: &mut Fan, entry: FanEntry, center: PointId) -> Result<(), MeshMetricError> {
    fan.try_push(entry).map_err(|_| MeshMetricError::BallOverflow {
        point: center,
        capacity: BALL_CAPACITY,
    })
}

/// Steps from `(t, i)` across edge `edge` to the triangle sharing it, if active.
fn step(
    mesh: &SurfaceMesh,
    t: TriaId,
    edge: usize,
    center: PointId,
) -> Result<Option<FanEntry>, MeshMetricError> {
    let Some((adj, _)) = mesh.adjacent(t, edge) else {
        return Ok(None);
    };
    let j = mesh
        .tria(adj)?
        .local_index(center)
        .ok_or(MeshMetricError::EmptyBall { point: center })?;
    Ok(Some((adj, j)))
}

/// Computes the ball of local vertex `local` of triangle `start`.
pub fn ball(mesh: &SurfaceMesh, start: TriaId, local: usize) -> Result<Ball, MeshMetricError> {
    let tria = mesh.tria(start)?;
    let center = tria.v[local % 3];
    if !mesh.is_active_tria(start) {
        return Err(MeshMetricError::EmptyBall { point: center });
    }

    let mut forward = Fan::new();
    push(&mut forward, (start, local % 3), center)?;
    let (mut t, mut i) = (start, local % 3);
    loop {
        match step(mesh, t, NEXT[i], center)? {
            Some((adj, _)) if adj == start => {
                return Ok(Ball {
                    center,
                    fan: forward,
                    closed: true,
                });
            }
            Some(next) => {
                push(&mut forward, next, center)?;
                (t, i) = next;
            }
            None => break,
        }
    }

    // open fan: walk clockwise from the start to the other boundary
    let mut backward = Fan::new();
    let (mut t, mut i) = (start, local % 3);
    while let Some(prev) = step(mesh, t, PREV[i], center)? {
        push(&mut backward, prev, center)?;
        (t, i) = prev;
    }
    let mut fan = Fan::new();
    for &entry in backward.iter().rev().chain(forward.iter()) {
        push(&mut fan, entry, center)?;
    }
    Ok(Ball {
        center,
        fan,
        closed: false,
    })
}

/// Splits the ball of a ridge vertex along its ridge (or boundary) edges.
///
/// # Errors
/// - [`MeshMetricError::MissingFeatureEdges`] when a closed fan has no ridge
///   edge to split along.
/// - [`MeshMetricError::MissingRidgeNormals`] when the vertex has no ridge
///   normals record.
pub fn half_balls(
    mesh: &SurfaceMesh,
    start: TriaId,
    local: usize,
) -> Result<HalfBalls, MeshMetricError> {
    let full = ball(mesh, start, local)?;
    let center = full.center;
    let fan = &full.fan;
    let n = fan.len();

    // edge shared with the next entry is `next(i)`; the one with the previous is `prev(i)`
    let ridge_after = |k: usize| -> Result<bool, MeshMetricError> {
        let (t, i) = fan[k];
        Ok(mesh.tria(t)?.edges[NEXT[i]].is_ridge())
    };

    let first = if full.closed {
        let mut cut = None;
        for k in 0..n {
            if ridge_after(k)? {
                cut = Some((k + 1) % n);
                break;
            }
        }
        cut.ok_or(MeshMetricError::MissingFeatureEdges { point: center })?
    } else {
        0
    };

    let mut sides = [Fan::new(), Fan::new()];
    let mut side = 0;
    for s in 0..n {
        let k = (first + s) % n;
        push(&mut sides[side], fan[k], center)?;
        if side == 0 && s + 1 < n && ridge_after(k)? {
            side = 1;
        } else if side == 1 && ridge_after(k)? {
            break;
        }
    }

    let (t0, i0) = sides[0][0];
    let (tl, il) = sides[0][sides[0].len() - 1];
    let ridge_ends = [mesh.tria(t0)?.v[NEXT[i0]], mesh.tria(tl)?.v[PREV[il]]];

    let (n1, n2) = mesh.ridge_normals(center)?;
    if let Some(nt) = mesh.tria_normal(t0) {
        if nt.dot(&n1).abs() < nt.dot(&n2).abs() {
            sides.swap(0, 1);
        }
    }

    Ok(HalfBalls {
        center,
        sides,
        ridge_ends,
    })
}
