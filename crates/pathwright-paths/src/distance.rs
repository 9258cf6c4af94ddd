//! Step costs, the search heuristic and ruler measurement.

use pathwright_core::Point;

/// Cost of an orthogonal (or hex) step.
pub const ORTHOGONAL_COST: f64 = 1.0;

/// Cost of a diagonal step under the standard rule. Slightly above one so
/// that, among equally long paths, the one with fewer diagonals wins.
pub const DIAGONAL_COST: f64 = 1.0001;

/// Cost of a diagonal step under the 5-10-5 rule: two diagonals add up to 3.
pub const FIVE_TEN_FIVE_DIAGONAL_COST: f64 = 1.5;

/// How diagonal steps on a square grid are charged.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DiagonalRule {
    /// Every diagonal counts as one step.
    #[default]
    Standard,
    /// Every second diagonal counts as two steps.
    FiveTenFive,
}

impl DiagonalRule {
    /// Edge cost of one diagonal step.
    #[inline]
    pub fn diagonal_cost(self) -> f64 {
        match self {
            Self::Standard => DIAGONAL_COST,
            Self::FiveTenFive => FIVE_TEN_FIVE_DIAGONAL_COST,
        }
    }
}

/// Chebyshev (L∞) distance between two points.
#[inline]
pub fn chebyshev(a: Point, b: Point) -> i32 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}

/// Admissible estimate of the cost from `from` to `to`.
///
/// Under 5-10-5 every diagonal on the direct route is charged half a step
/// extra, which is exactly the cost of the direct route on an open grid.
#[inline]
pub fn estimate(from: Point, to: Point, rule: DiagonalRule) -> f64 {
    let dx = (from.x - to.x).abs();
    let dy = (from.y - to.y).abs();
    let base = dx.max(dy) as f64;
    match rule {
        DiagonalRule::Standard => base,
        DiagonalRule::FiveTenFive => base + dx.min(dy) as f64 * 0.5,
    }
}

/// Number of diagonal steps taken along a waypoint list.
pub fn diagonal_steps(waypoints: &[Point]) -> u32 {
    waypoints
        .windows(2)
        .map(|w| (w[0].x - w[1].x).abs().min((w[0].y - w[1].y).abs()) as u32)
        .sum()
}

/// Parity (0 or 1) of the diagonal steps among committed waypoints.
#[inline]
pub fn diagonal_parity(previous: &[Point]) -> u32 {
    diagonal_steps(previous) % 2
}

/// Initial search cost for a continuation of `previous` under `rule`.
///
/// With an odd number of diagonals already committed, the next diagonal is
/// a "long" one; half a step is charged up front to account for it.
pub fn start_cost(previous: &[Point], rule: DiagonalRule) -> f64 {
    match rule {
        DiagonalRule::Standard => 0.0,
        DiagonalRule::FiveTenFive => diagonal_parity(previous) as f64 * 0.5,
    }
}

/// Ruler distance along `waypoints`, in grid steps.
///
/// `parity` is the number of diagonals committed before the first waypoint
/// (only its parity matters). Under 5-10-5 every second diagonal costs two.
pub fn measure(waypoints: &[Point], rule: DiagonalRule, parity: u32) -> u32 {
    let mut straight = 0u32;
    let mut diagonals = 0u32;
    for w in waypoints.windows(2) {
        let dx = (w[0].x - w[1].x).unsigned_abs();
        let dy = (w[0].y - w[1].y).unsigned_abs();
        straight += dx.max(dy) - dx.min(dy);
        diagonals += dx.min(dy);
    }
    match rule {
        DiagonalRule::Standard => straight + diagonals,
        DiagonalRule::FiveTenFive => straight + diagonals + (diagonals + parity % 2) / 2,
    }
}
