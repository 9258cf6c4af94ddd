//! Scenes for tests: cell obstacles, open space and a brute-force baseline.
//!
//! Compiled for this crate's unit tests and, through the `test-util`
//! feature, for integration tests.

use std::cell::Cell;
use std::rc::Rc;

use pathwright_core::{Point, Token, Vec2};
use rustc_hash::FxHashSet;

use crate::distance::{ORTHOGONAL_COST, chebyshev};
use crate::error::SceneError;
use crate::grids::SquareGrid;
use crate::traits::{GridGeometry, GridlessSolver, NoSolver, Scene, StepCollision, Surface};

// ---------------------------------------------------------------------------
// CellScene
// ---------------------------------------------------------------------------

/// A square grid where whole cells are obstacles.
///
/// A step collides when the straight line between the two cell centers
/// touches a blocked cell. Lines running exactly along a cell border touch
/// both sides, so diagonals cannot cut blocked corners.
pub struct CellScene {
    pub grid: SquareGrid,
    pub blocked: FxHashSet<Point>,
    queries: Cell<usize>,
    // Number of upcoming collision queries that fail.
    failures: Cell<usize>,
}

impl CellScene {
    pub fn new(grid: SquareGrid, blocked: impl IntoIterator<Item = Point>) -> Self {
        Self {
            grid,
            blocked: blocked.into_iter().collect(),
            queries: Cell::new(0),
            failures: Cell::new(0),
        }
    }

    pub fn open(grid: SquareGrid) -> Self {
        Self::new(grid, [])
    }

    /// Parse a map drawn with `#` for walls and anything else for floor.
    pub fn parse(grid: SquareGrid, rows: &[&str]) -> Self {
        let blocked = rows.iter().enumerate().flat_map(|(y, row)| {
            row.chars()
                .enumerate()
                .filter(|&(_, c)| c == '#')
                .map(move |(x, _)| Point::new(x as i32, y as i32))
        });
        Self::new(grid, blocked)
    }

    pub fn with_blocked(mut self, cells: &[(i32, i32)]) -> Self {
        self.blocked
            .extend(cells.iter().map(|&(x, y)| Point::new(x, y)));
        self
    }

    /// Every collision query fails.
    pub fn failing(self) -> Self {
        self.fail_next(usize::MAX);
        self
    }

    /// Make the next `n` collision queries fail.
    pub fn fail_next(&self, n: usize) {
        self.failures.set(n);
    }

    /// Number of collision queries answered so far.
    pub fn queries(&self) -> usize {
        self.queries.get()
    }

    pub fn line_blocked(&self, a: Point, b: Point) -> bool {
        let steps = 8 * chebyshev(a, b).max(1);
        (0..=steps).any(|i| {
            let t = i as f64 / steps as f64;
            let x = a.x as f64 + (b.x - a.x) as f64 * t;
            let y = a.y as f64 + (b.y - a.y) as f64 * t;
            covering(x).into_iter().flatten().any(|cx| {
                covering(y)
                    .into_iter()
                    .flatten()
                    .any(|cy| self.blocked.contains(&Point::new(cx, cy)))
            })
        })
    }
}

fn covering(v: f64) -> [Option<i32>; 2] {
    let f = v.floor();
    if (v - f - 0.5).abs() < 1e-9 {
        [Some(f as i32), Some(f as i32 + 1)]
    } else {
        [Some(v.round() as i32), None]
    }
}

impl StepCollision for CellScene {
    fn step_collides(&self, from: Point, to: Point, _token: &Token) -> Result<bool, SceneError> {
        self.queries.set(self.queries.get() + 1);
        let failures = self.failures.get();
        if failures > 0 {
            if failures != usize::MAX {
                self.failures.set(failures - 1);
            }
            return Err(SceneError::new("wall data unavailable"));
        }
        Ok(self.line_blocked(from, to))
    }
}

impl Scene for CellScene {
    type Solver = NoSolver;

    fn surface(&self) -> Surface<'_> {
        Surface::Grid(&self.grid)
    }

    fn build_solver(&self, _footprint: f64) -> Result<NoSolver, SceneError> {
        Err(SceneError::new("grid scenes have no gridless solver"))
    }
}

/// Minimum cost from `from` to `to` over collision-free steps, by plain
/// Dijkstra over every cell.
pub fn dijkstra_cost(scene: &CellScene, from: Point, to: Point) -> Option<f64> {
    let bounds = scene.grid.bounds();
    let rule = scene.grid.diagonal_rule();
    let token = Token::medium();
    let cells: Vec<Point> = bounds.iter().collect();
    let index = |p: Point| ((p.y - bounds.min.y) * bounds.width() + (p.x - bounds.min.x)) as usize;

    let mut dist = vec![f64::INFINITY; cells.len()];
    let mut done = vec![false; cells.len()];
    dist[index(from)] = 0.0;
    let mut buf = Vec::new();
    loop {
        let current = (0..cells.len())
            .filter(|&i| !done[i] && dist[i].is_finite())
            .min_by(|&a, &b| dist[a].total_cmp(&dist[b]))?;
        if cells[current] == to {
            return Some(dist[current]);
        }
        done[current] = true;
        let p = cells[current];
        buf.clear();
        scene.grid.neighbors(p, &mut buf);
        for &n in &buf {
            if !bounds.contains(n) || scene.line_blocked(p, n) {
                continue;
            }
            let step = if scene.grid.is_diagonal(p, n) {
                rule.diagonal_cost()
            } else {
                ORTHOGONAL_COST
            };
            let candidate = dist[current] + step;
            if candidate < dist[index(n)] {
                dist[index(n)] = candidate;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// OpenSpace
// ---------------------------------------------------------------------------

/// Continuous space without obstacles, counting solver lifecycles.
pub struct OpenSpace {
    pub cell_size: f64,
    pub reachable: bool,
    pub built: Rc<Cell<usize>>,
    pub disposed: Rc<Cell<usize>>,
}

impl OpenSpace {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            reachable: true,
            built: Rc::default(),
            disposed: Rc::default(),
        }
    }
}

/// Answers every query with a straight line, or with nothing when the
/// space it was built for is unreachable.
pub struct StraightSolver {
    pub footprint: f64,
    reachable: bool,
    disposed: Rc<Cell<usize>>,
}

impl GridlessSolver for StraightSolver {
    fn query(&mut self, from: Vec2, to: Vec2) -> Option<Vec<Vec2>> {
        self.reachable.then(|| vec![from, to])
    }

    fn dispose(self) {
        self.disposed.set(self.disposed.get() + 1);
    }
}

impl StepCollision for OpenSpace {
    fn step_collides(&self, _from: Point, _to: Point, _token: &Token) -> Result<bool, SceneError> {
        Ok(false)
    }
}

impl Scene for OpenSpace {
    type Solver = StraightSolver;

    fn surface(&self) -> Surface<'_> {
        Surface::Gridless {
            cell_size: self.cell_size,
        }
    }

    fn build_solver(&self, footprint: f64) -> Result<StraightSolver, SceneError> {
        self.built.set(self.built.get() + 1);
        Ok(StraightSolver {
            footprint,
            reachable: self.reachable,
            disposed: Rc::clone(&self.disposed),
        })
    }
}
