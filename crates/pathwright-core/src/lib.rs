//! **pathwright-core** — geometry primitives shared by the pathwright crates.
//!
//! Grid cells are addressed by integer [`Point`]s inside a half-open
//! [`Range`]. Scene geometry (walls, snapped token positions, gridless
//! waypoints) lives in pixel space as [`Vec2`] and [`Segment`]. A [`Token`]
//! describes the footprint of the piece being moved.

pub mod geom;
pub mod pixel;
pub mod token;

pub use geom::{Point, Range};
pub use pixel::{Segment, Vec2};
pub use token::Token;
