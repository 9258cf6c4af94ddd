use pathwright_core::{Point, Range, Token, Vec2};

use crate::distance::DiagonalRule;
use crate::error::SceneError;

/// Cell layout of the play surface: bounds, adjacency and pixel conversion.
///
/// One implementation is selected per map; the engine never branches on
/// the grid type itself.
pub trait GridGeometry {
    /// The cells of the map.
    fn bounds(&self) -> Range;

    /// Append the cells adjacent to `p` into `buf`. The caller clears `buf`
    /// before calling. Cells outside [`bounds`](Self::bounds) may be
    /// included; the caller filters them.
    fn neighbors(&self, p: Point, buf: &mut Vec<Point>);

    /// Whether the step between two adjacent cells is a diagonal one.
    fn is_diagonal(&self, _from: Point, _to: Point) -> bool {
        false
    }

    /// Cost rule for diagonal steps.
    fn diagonal_rule(&self) -> DiagonalRule {
        DiagonalRule::Standard
    }

    /// Size of one cell in pixels.
    fn cell_size(&self) -> f64;

    /// Top-left pixel corner of cell `p`.
    fn to_pixels(&self, p: Point) -> Vec2;

    /// The cell containing pixel position `px`.
    fn to_cell(&self, px: Vec2) -> Point;

    /// Pixel center of cell `p`.
    fn center(&self, p: Point) -> Vec2 {
        let half = self.cell_size() / 2.0;
        self.to_pixels(p) + Vec2::new(half, half)
    }

    /// Pixel position a token standing on cell `p` snaps to.
    fn snap_point(&self, p: Point, _token: &Token) -> Vec2 {
        self.center(p)
    }
}

/// Obstacle query: whether a token can move in a straight line between the
/// snapped positions of two cells.
///
/// Must be deterministic and free of side effects for a fixed scene.
pub trait StepCollision {
    fn step_collides(&self, from: Point, to: Point, token: &Token) -> Result<bool, SceneError>;
}

/// An external continuous-space path solver built for one token footprint.
pub trait GridlessSolver {
    /// Shortest path from `from` to `to`, both endpoints included, or `None`
    /// when `to` cannot be reached.
    fn query(&mut self, from: Vec2, to: Vec2) -> Option<Vec<Vec2>>;

    /// Release the solver's resources.
    fn dispose(self)
    where
        Self: Sized,
    {
    }
}

/// Solver type for scenes that never use gridless pathfinding.
#[derive(Debug)]
pub enum NoSolver {}

impl GridlessSolver for NoSolver {
    fn query(&mut self, _from: Vec2, _to: Vec2) -> Option<Vec<Vec2>> {
        match *self {}
    }
}

/// Kind of play surface a scene exposes.
#[derive(Copy, Clone)]
pub enum Surface<'a> {
    /// Discrete cells laid out by a geometry provider.
    Grid(&'a dyn GridGeometry),
    /// Continuous space; `cell_size` converts token sizes to pixels.
    Gridless { cell_size: f64 },
}

/// Everything the engine needs to know about the current map.
///
/// Scenes are passed into every engine call; whenever their walls, layer or
/// geometry change the caller must wipe the engine's caches.
pub trait Scene: StepCollision {
    type Solver: GridlessSolver;

    fn surface(&self) -> Surface<'_>;

    /// Build a gridless solver for a token `footprint` pixels across.
    fn build_solver(&self, footprint: f64) -> Result<Self::Solver, SceneError>;
}
