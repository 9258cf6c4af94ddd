//! Shared model for the terminal demos.
//!
//! Builds a random wall layout on a square grid, asks the engine for a path
//! across it (warming the node cache between attempts when the per-request
//! budget runs out) and renders map and route as a grid of [`Glyph`]s.

use pathwright_core::{Point, Token, Vec2};
use pathwright_paths::{GridPath, JobLimit, PathConfig, PathResult, Pathfinder, SquareGrid};
use pathwright_scene::{DoorState, VisibilityGraph, Wall, WallScene, WallSet};
use rand::{Rng, RngExt, SeedableRng};

pub const WIDTH: i32 = 30;
pub const HEIGHT: i32 = 12;
pub const CELL: f64 = 100.0;

/// Per-request materialization budget; small enough that long routes need
/// a few warming slices.
const BUDGET: usize = 60;
const WARM_JOBS_PER_SLICE: usize = 4;

// ---------------------------------------------------------------------------
// Glyph / Canvas
// ---------------------------------------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Glyph {
    Blank,
    Floor,
    Wall,
    Door,
    Route,
    Waypoint,
    Origin,
    Target,
}

impl Glyph {
    pub fn ch(self) -> char {
        match self {
            Self::Blank => ' ',
            Self::Floor => '.',
            Self::Wall => '#',
            Self::Door => '+',
            Self::Route => '*',
            Self::Waypoint => 'o',
            Self::Origin => '@',
            Self::Target => 'X',
        }
    }
}

/// Map drawn at double resolution: cell `(x, y)` sits at `(2x+1, 2y+1)`
/// and walls run along the even rows and columns between cells.
pub struct Canvas {
    width: usize,
    glyphs: Vec<Glyph>,
}

impl Canvas {
    fn new(cells_w: i32, cells_h: i32) -> Self {
        let width = (2 * cells_w + 1) as usize;
        let height = (2 * cells_h + 1) as usize;
        let mut glyphs = vec![Glyph::Blank; width * height];
        for y in 0..cells_h {
            for x in 0..cells_w {
                glyphs[(2 * y + 1) as usize * width + (2 * x + 1) as usize] = Glyph::Floor;
            }
        }
        Self { width, glyphs }
    }

    fn set(&mut self, x: i32, y: i32, g: Glyph) {
        if x < 0 || y < 0 || x as usize >= self.width {
            return;
        }
        if let Some(slot) = self.glyphs.get_mut(y as usize * self.width + x as usize) {
            *slot = g;
        }
    }

    fn set_cell(&mut self, p: Point, g: Glyph) {
        self.set(2 * p.x + 1, 2 * p.y + 1, g);
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Glyph]> {
        self.glyphs.chunks(self.width)
    }

    pub fn to_text(&self) -> String {
        self.rows()
            .map(|row| row.iter().map(|g| g.ch()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ---------------------------------------------------------------------------
// Demo
// ---------------------------------------------------------------------------

/// A solved request and how many searches it took.
pub struct Solved {
    pub path: Option<GridPath>,
    pub attempts: usize,
    pub warmed: usize,
}

pub struct Demo {
    pub scene: WallScene,
    pub pathfinder: Pathfinder<VisibilityGraph>,
    pub from: Point,
    pub to: Point,
    pub token: Token,
}

impl Demo {
    pub fn new(seed: u64) -> Self {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        let walls = random_walls(&mut rng, (WIDTH * HEIGHT / 8) as usize);
        let from = Point::new(0, rng.random_range(0..HEIGHT));
        let to = Point::new(WIDTH - 1, rng.random_range(0..HEIGHT));
        Self {
            scene: WallScene::grid(SquareGrid::new(WIDTH, HEIGHT, CELL), walls),
            pathfinder: Pathfinder::new(PathConfig {
                materialize_budget: BUDGET,
                ..PathConfig::default()
            }),
            from,
            to,
            token: Token::medium(),
        }
    }

    /// Search, warming the cache between attempts, until a path is found
    /// or warming has nothing left to do.
    pub fn solve(&mut self) -> PathResult<Solved> {
        let mut solved = Solved {
            path: None,
            attempts: 0,
            warmed: 0,
        };
        loop {
            solved.attempts += 1;
            let found = self
                .pathfinder
                .find_grid_path(&self.scene, self.from, self.to, &self.token, &[])?;
            if found.is_some() {
                solved.path = found;
                return Ok(solved);
            }
            let report = self
                .pathfinder
                .run_idle(&self.scene, &mut JobLimit(WARM_JOBS_PER_SLICE))?;
            solved.warmed += report.nodes_warmed;
            if report.jobs_run == 0 {
                return Ok(solved);
            }
        }
    }

    pub fn render(&self, path: Option<&GridPath>) -> Canvas {
        let mut canvas = Canvas::new(WIDTH, HEIGHT);
        for wall in self.scene.walls() {
            let glyph = if wall.is_door() { Glyph::Door } else { Glyph::Wall };
            draw_wall(&mut canvas, wall, glyph);
        }
        if let Some(path) = path {
            for w in path.chain.windows(2) {
                let (a, b) = (w[0].pos, w[1].pos);
                canvas.set(a.x + b.x + 1, a.y + b.y + 1, Glyph::Route);
                canvas.set_cell(b, Glyph::Route);
            }
            for &p in &path.waypoints {
                canvas.set_cell(p, Glyph::Waypoint);
            }
        }
        canvas.set_cell(self.from, Glyph::Origin);
        canvas.set_cell(self.to, Glyph::Target);
        canvas
    }
}

/// Random grid-aligned walls; one in eight is a door, half of those open.
pub fn random_walls(rng: &mut impl Rng, count: usize) -> WallSet {
    let mut walls = WallSet::new();
    for _ in 0..count {
        let x = rng.random_range(1..WIDTH);
        let y = rng.random_range(1..HEIGHT);
        let len = rng.random_range(1..5);
        let end = if rng.random_range(0..2) == 0 {
            Point::new((x + len).min(WIDTH), y)
        } else {
            Point::new(x, (y + len).min(HEIGHT))
        };
        let (a, b) = (corner(Point::new(x, y)), corner(end));
        let wall = match rng.random_range(0..16) {
            0 => Wall::door(a, b, DoorState::Open),
            1 => Wall::door(a, b, DoorState::Closed),
            _ => Wall::new(a, b),
        };
        walls.push(wall);
    }
    walls
}

fn corner(p: Point) -> Vec2 {
    Vec2::new(p.x as f64 * CELL, p.y as f64 * CELL)
}

// Walls off the grid lines are not drawn.
fn draw_wall(canvas: &mut Canvas, wall: &Wall, glyph: Glyph) {
    let to_line = |v: f64| {
        let l = v / CELL;
        (l.fract() == 0.0).then_some(l as i32)
    };
    let s = wall.segment;
    let (Some(ax), Some(ay), Some(bx), Some(by)) =
        (to_line(s.a.x), to_line(s.a.y), to_line(s.b.x), to_line(s.b.y))
    else {
        return;
    };
    if ax == bx {
        for y in 2 * ay.min(by)..=2 * ay.max(by) {
            canvas.set(2 * ax, y, glyph);
        }
    } else if ay == by {
        for x in 2 * ax.min(bx)..=2 * ax.max(bx) {
            canvas.set(x, 2 * ay, glyph);
        }
    }
}
