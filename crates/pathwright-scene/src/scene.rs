//! [`WallScene`]: a wall set on a grid or in continuous space, exposed to
//! the engine as a [`Scene`].

use pathwright_core::{Point, Segment, Token, Vec2};
use pathwright_paths::{GridGeometry, Scene, SceneError, SquareGrid, StepCollision, Surface};

use crate::visibility::VisibilityGraph;
use crate::walls::WallSet;

#[derive(Clone, Debug)]
enum Layout<G> {
    Grid(G),
    Gridless { cell_size: f64 },
}

/// Walls on a map.
///
/// Grid steps collide when the line between the two cells' snapped points
/// touches a wall that blocks the token at its layer. Editing walls through
/// [`walls_mut`](Self::walls_mut) invalidates every engine cache built on
/// this scene.
#[derive(Clone, Debug)]
pub struct WallScene<G = SquareGrid> {
    layout: Layout<G>,
    walls: WallSet,
    elevation: f64,
}

impl<G: GridGeometry> WallScene<G> {
    /// A grid map laid out by `geometry`.
    pub fn grid(geometry: G, walls: WallSet) -> Self {
        Self {
            layout: Layout::Grid(geometry),
            walls,
            elevation: 0.0,
        }
    }
}

impl WallScene<SquareGrid> {
    /// A gridless map whose tokens are measured in `cell_size` pixels.
    pub fn gridless(cell_size: f64, walls: WallSet) -> Self {
        Self {
            layout: Layout::Gridless { cell_size },
            walls,
            elevation: 0.0,
        }
    }
}

impl<G> WallScene<G> {
    /// Set the elevation gridless solvers are built for.
    pub fn with_elevation(self, elevation: f64) -> Self {
        Self { elevation, ..self }
    }

    #[inline]
    pub fn elevation(&self) -> f64 {
        self.elevation
    }

    #[inline]
    pub fn walls(&self) -> &WallSet {
        &self.walls
    }

    pub fn walls_mut(&mut self) -> &mut WallSet {
        &mut self.walls
    }

    pub fn geometry(&self) -> Option<&G> {
        match &self.layout {
            Layout::Grid(g) => Some(g),
            Layout::Gridless { .. } => None,
        }
    }
}

impl<G: GridGeometry> WallScene<G> {
    fn snapped(&self, p: Point, token: &Token) -> Vec2 {
        match &self.layout {
            Layout::Grid(g) => g.snap_point(p, token),
            Layout::Gridless { cell_size } => Vec2::new(
                (p.x as f64 + 0.5) * cell_size,
                (p.y as f64 + 0.5) * cell_size,
            ),
        }
    }
}

impl<G: GridGeometry> StepCollision for WallScene<G> {
    fn step_collides(&self, from: Point, to: Point, token: &Token) -> Result<bool, SceneError> {
        let step = Segment::new(self.snapped(from, token), self.snapped(to, token));
        if !(step.a.x.is_finite() && step.a.y.is_finite() && step.b.x.is_finite() && step.b.y.is_finite()) {
            return Err(SceneError::new(format!("cannot snap step {from} -> {to}")));
        }
        Ok(self.walls.collides(&step, f64::from(token.layer)))
    }
}

impl<G: GridGeometry> Scene for WallScene<G> {
    type Solver = VisibilityGraph;

    fn surface(&self) -> Surface<'_> {
        match &self.layout {
            Layout::Grid(g) => Surface::Grid(g),
            Layout::Gridless { cell_size } => Surface::Gridless {
                cell_size: *cell_size,
            },
        }
    }

    fn build_solver(&self, footprint: f64) -> Result<VisibilityGraph, SceneError> {
        if !footprint.is_finite() {
            return Err(SceneError::new(format!("cannot build a solver for footprint {footprint}")));
        }
        Ok(VisibilityGraph::new(&self.walls, footprint, self.elevation))
    }
}
