//! Pixel-space geometry: [`Vec2`] positions and [`Segment`] lines.

use std::fmt;
use std::ops::{Add, Mul, Sub};

/// Tolerance used when comparing pixel coordinates.
pub const EPSILON: f64 = 1e-6;

/// A position in continuous (pixel) space.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance_to(self, other: Vec2) -> f64 {
        (self.y - other.y).hypot(self.x - other.x)
    }

    /// Whether both coordinates are within [`EPSILON`] of `other`.
    #[inline]
    pub fn approx_eq(self, other: Vec2) -> bool {
        (self.x - other.x).abs() < EPSILON && (self.y - other.y).abs() < EPSILON
    }

    /// 2D cross product (z component of the 3D cross product).
    #[inline]
    pub fn cross(self, other: Vec2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Point at `distance` from `self` in direction `angle` (radians).
    #[inline]
    pub fn offset(self, angle: f64, distance: f64) -> Vec2 {
        Vec2::new(self.x + angle.cos() * distance, self.y + angle.sin() * distance)
    }
}

impl Add for Vec2 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Segment
// ---------------------------------------------------------------------------

/// A straight line between two pixel positions.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    pub a: Vec2,
    pub b: Vec2,
}

impl Segment {
    #[inline]
    pub const fn new(a: Vec2, b: Vec2) -> Self {
        Self { a, b }
    }

    /// Length of the segment.
    #[inline]
    pub fn len(&self) -> f64 {
        self.a.distance_to(self.b)
    }

    /// Whether both endpoints coincide.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.a.approx_eq(self.b)
    }

    /// Angle of the direction `a -> b`, in radians.
    #[inline]
    pub fn angle(&self) -> f64 {
        (self.b.y - self.a.y).atan2(self.b.x - self.a.x)
    }

    /// Whether the two segments share at least one point.
    ///
    /// Touching counts: a segment ending exactly on another one intersects it.
    pub fn intersects(&self, other: &Segment) -> bool {
        let d1 = orientation(other.a, other.b, self.a);
        let d2 = orientation(other.a, other.b, self.b);
        let d3 = orientation(self.a, self.b, other.a);
        let d4 = orientation(self.a, self.b, other.b);

        if d1 * d2 < 0.0 && d3 * d4 < 0.0 {
            return true;
        }
        (d1 == 0.0 && on_segment(other, self.a))
            || (d2 == 0.0 && on_segment(other, self.b))
            || (d3 == 0.0 && on_segment(self, other.a))
            || (d4 == 0.0 && on_segment(self, other.b))
    }
}

/// Signed area of the triangle (a, b, c), snapped to zero within [`EPSILON`].
fn orientation(a: Vec2, b: Vec2, c: Vec2) -> f64 {
    let v = (b - a).cross(c - a);
    if v.abs() < EPSILON { 0.0 } else { v }
}

/// Whether collinear point `p` lies within the bounding box of `s`.
fn on_segment(s: &Segment, p: Vec2) -> bool {
    p.x >= s.a.x.min(s.b.x) - EPSILON
        && p.x <= s.a.x.max(s.b.x) + EPSILON
        && p.y >= s.a.y.min(s.b.y) - EPSILON
        && p.y <= s.a.y.max(s.b.y) + EPSILON
}
