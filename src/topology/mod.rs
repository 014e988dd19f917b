//! Surface topology: entity handles, feature tags, the triangle store and
//! bounded vertex-ball queries.
//!
//! Most users build a [`SurfaceMesh`] point by point and triangle by
//! triangle, tag its feature curves, and hand it to
//! [`define_size_map`](crate::adapt::define_size_map).

pub mod ball;
pub mod point;
pub mod surface;
pub mod tags;

pub use ball::{BALL_CAPACITY, Ball, HalfBalls, ball, half_balls};
pub use point::{PointId, TriaId};
pub use surface::{Point, SurfaceMesh, Tria, XPoint};
pub use tags::{EdgeTag, PointClass, PointTag};
