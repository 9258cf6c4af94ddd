//! The [`Pathfinder`] engine object.

use std::collections::hash_map::Entry;

use log::{debug, trace, warn};
use pathwright_core::{Point, Token, Vec2};
use rustc_hash::FxHashMap;

use crate::astar::{PathNode, SearchOutcome, search, simplify};
use crate::cache::{EdgeSource, MaterializeBudget, NodeCache, NodeKey};
use crate::config::PathConfig;
use crate::distance::{DiagonalRule, diagonal_parity, measure, start_cost};
use crate::error::{PathError, PathResult};
use crate::gridless::SolverRegistry;
use crate::scheduler::IdleDeadline;
use crate::traits::{GridGeometry, GridlessSolver, Scene, Surface};
use crate::warmer::{CacheEntry, CacheKey, JobOutcome, Warmer};

/// A route on a grid map.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridPath {
    /// Simplified waypoints, origin first.
    pub waypoints: Vec<Point>,
    /// Every cell of the route with its search cost, origin first.
    pub chain: Vec<PathNode>,
}

impl GridPath {
    /// Total search cost, including any initial parity cost.
    pub fn cost(&self) -> f64 {
        self.chain.first().map_or(0.0, |n| n.cost)
    }

    pub fn origin(&self) -> Option<Point> {
        self.waypoints.first().copied()
    }

    pub fn destination(&self) -> Option<Point> {
        self.waypoints.last().copied()
    }

    /// Ruler distance of the route in grid steps.
    pub fn measure(&self, rule: DiagonalRule, parity: u32) -> u32 {
        let cells: Vec<Point> = self.chain.iter().map(|n| n.pos).collect();
        measure(&cells, rule, parity)
    }
}

/// Result of a successful path request.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Path {
    Grid(GridPath),
    /// Pixel waypoints from a gridless solver, endpoints included.
    Gridless(Vec<Vec2>),
}

impl Path {
    pub fn as_grid(&self) -> Option<&GridPath> {
        match self {
            Self::Grid(p) => Some(p),
            Self::Gridless(_) => None,
        }
    }

    /// Waypoints in pixel space; grid waypoints snap to where `token` stands.
    pub fn to_pixels(&self, geometry: &dyn GridGeometry, token: &Token) -> Vec<Vec2> {
        match self {
            Self::Grid(p) => p
                .waypoints
                .iter()
                .map(|&c| geometry.snap_point(c, token))
                .collect(),
            Self::Gridless(points) => points.clone(),
        }
    }
}

/// Snapshot of the engine's caches.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    /// Node caches (one per footprint and layer).
    pub caches: usize,
    pub nodes: usize,
    pub materialized: usize,
    /// Live gridless solvers.
    pub solvers: usize,
    /// Nodes waiting for the background warmer.
    pub queued: usize,
    pub generation: u64,
}

/// What one [`Pathfinder::run_idle`] call did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct IdleReport {
    pub jobs_run: usize,
    pub nodes_warmed: usize,
    pub stale_jobs: usize,
    /// Whether warming work is left for a later slice.
    pub pending: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct MemoKey {
    from: Point,
    to: Point,
    cache: CacheKey,
    parity: u32,
}

struct Memo {
    key: MemoKey,
    result: Option<GridPath>,
}

/// Pathfinding session for one map.
///
/// The engine owns every cache; the [`Scene`] is lent to each call. Call
/// [`wipe_cache`](Self::wipe_cache) whenever the scene's walls, layer or
/// geometry change.
pub struct Pathfinder<V: GridlessSolver> {
    config: PathConfig,
    caches: FxHashMap<CacheKey, CacheEntry>,
    warmer: Warmer,
    solvers: SolverRegistry<V>,
    generation: u64,
    active_layer: u16,
    memo: Option<Memo>,
}

impl<V: GridlessSolver> Pathfinder<V> {
    pub fn new(config: PathConfig) -> Self {
        Self {
            config,
            caches: FxHashMap::default(),
            warmer: Warmer::default(),
            solvers: SolverRegistry::new(),
            generation: 0,
            active_layer: 0,
            memo: None,
        }
    }

    #[inline]
    pub fn config(&self) -> &PathConfig {
        &self.config
    }

    /// Incremented by every wipe.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn active_layer(&self) -> u16 {
        self.active_layer
    }

    /// Switch the active elevation layer. With vertical layering enabled a
    /// change wipes every cache; returns whether that happened.
    ///
    /// The active layer only decides when that wipe happens. Nodes and
    /// caches are keyed by each token's own `layer`, so a token on another
    /// layer still gets its own cache while this one is active.
    pub fn set_active_layer(&mut self, layer: u16) -> bool {
        let changed = layer != self.active_layer;
        self.active_layer = layer;
        if changed && self.config.vertical_layers {
            self.wipe_cache();
            return true;
        }
        false
    }

    /// Drop every node, cancel background warming and dispose every
    /// gridless solver.
    pub fn wipe_cache(&mut self) {
        let cancelled = self.warmer.cancel();
        let disposed = self.solvers.dispose_all();
        let nodes: usize = self.caches.values().map(|e| e.cache.len()).sum();
        self.caches.clear();
        self.memo = None;
        self.generation += 1;
        debug!(
            "wiped {nodes} nodes and {disposed} gridless solvers, generation {} (warm job cancelled: {cancelled})",
            self.generation
        );
    }

    /// The node cache serving `token`, if one exists.
    pub fn node_cache(&self, token: &Token) -> Option<&NodeCache> {
        self.caches
            .get(&CacheKey::new(token, self.layer_of(token)))
            .map(|e| &e.cache)
    }

    pub fn stats(&self) -> Stats {
        let mut stats = Stats {
            caches: self.caches.len(),
            solvers: self.solvers.len(),
            queued: self.warmer.queued(),
            generation: self.generation,
            ..Stats::default()
        };
        for entry in self.caches.values() {
            stats.nodes += entry.cache.len();
            stats.materialized += entry.cache.materialized_count();
        }
        stats
    }

    /// Find a path between two pixel positions.
    ///
    /// On grid maps both positions (and `previous`, the waypoints already
    /// committed by the ruler) are converted to cells first. `Ok(None)`
    /// means no path was found.
    pub fn find_path<S>(
        &mut self,
        scene: &S,
        from: Vec2,
        to: Vec2,
        token: &Token,
        previous: &[Vec2],
    ) -> PathResult<Option<Path>>
    where
        S: Scene<Solver = V>,
    {
        match scene.surface() {
            Surface::Grid(geometry) => {
                let previous: Vec<Point> = previous.iter().map(|&p| geometry.to_cell(p)).collect();
                let path = self.find_grid_path(
                    scene,
                    geometry.to_cell(from),
                    geometry.to_cell(to),
                    token,
                    &previous,
                )?;
                Ok(path.map(Path::Grid))
            }
            Surface::Gridless { cell_size } => {
                let path = self
                    .solvers
                    .find_path(scene, cell_size, from, to, token)
                    .inspect_err(|e| warn!("gridless path request failed: {e}"))?;
                Ok(path.map(Path::Gridless))
            }
        }
    }

    /// Find a path between two cells of a grid map.
    pub fn find_grid_path<S>(
        &mut self,
        scene: &S,
        from: Point,
        to: Point,
        token: &Token,
        previous: &[Point],
    ) -> PathResult<Option<GridPath>>
    where
        S: Scene<Solver = V>,
    {
        let Surface::Grid(geometry) = scene.surface() else {
            return Err(PathError::NotAGrid);
        };
        if !token.is_valid() {
            return Err(PathError::InvalidFootprint(token.footprint()));
        }

        let layer = self.layer_of(token);
        let key = CacheKey::new(token, layer);
        let rule = geometry.diagonal_rule();
        let memo_key = MemoKey {
            from,
            to,
            cache: key,
            parity: diagonal_parity(previous),
        };
        if self.config.memoize {
            if let Some(memo) = self.memo.as_ref().filter(|m| m.key == memo_key) {
                trace!("reusing previous result for {from} -> {to}");
                return Ok(memo.result.clone());
            }
        }

        let origin = NodeKey::new(from, layer);
        let destination = NodeKey::new(to, layer);
        let entry = match self.caches.entry(key) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                debug!(
                    "creating node cache for {}x{} tokens on layer {layer}",
                    token.width, token.height
                );
                let entry = e.insert(CacheEntry {
                    cache: NodeCache::new(geometry.bounds()),
                    token: Token::new(token.width, token.height).on_layer(layer),
                });
                if self.config.background_warming {
                    if let Some(id) = entry.cache.get_or_insert(destination) {
                        self.warmer.seed(key, id, self.generation);
                    }
                }
                entry
            }
        };

        let src = EdgeSource {
            geometry,
            collision: scene,
            token: &entry.token,
        };
        let mut budget = MaterializeBudget::new(self.config.materialize_budget);
        let outcome = search(
            &mut entry.cache,
            &src,
            origin,
            destination,
            start_cost(previous, rule),
            &mut budget,
        )
        .inspect_err(|e| warn!("path search {from} -> {to} failed: {e}"))?;

        let result = match outcome {
            SearchOutcome::Found(chain) => {
                let waypoints = simplify(&chain, |a, b| scene.step_collides(a, b, &entry.token))
                    .inspect_err(|e| warn!("path simplification failed: {e}"))?;
                Some(GridPath { waypoints, chain })
            }
            SearchOutcome::Unreachable => None,
            SearchOutcome::OutOfBudget => {
                debug!(
                    "materialization budget of {} exhausted on {from} -> {to}",
                    self.config.materialize_budget
                );
                return Ok(None);
            }
        };

        if self.config.memoize {
            self.memo = Some(Memo {
                key: memo_key,
                result: result.clone(),
            });
        }
        Ok(result)
    }

    /// Run scheduled warming jobs until `deadline` says the idle slice is
    /// over or no job is left.
    pub fn run_idle<S>(&mut self, scene: &S, deadline: &mut impl IdleDeadline) -> PathResult<IdleReport>
    where
        S: Scene<Solver = V>,
    {
        let mut report = IdleReport::default();
        let Surface::Grid(geometry) = scene.surface() else {
            return Ok(report);
        };
        while self.warmer.has_pending() && deadline.has_time() {
            let Some(job) = self.warmer.next_job() else {
                break;
            };
            let outcome = self
                .warmer
                .run_job(
                    job,
                    self.generation,
                    &mut self.caches,
                    geometry,
                    scene,
                    self.config.warm_batch,
                )
                .inspect_err(|e| warn!("cache warming failed: {e}"))?;
            match outcome {
                JobOutcome::Stale => report.stale_jobs += 1,
                JobOutcome::Ran { processed, .. } => {
                    report.jobs_run += 1;
                    report.nodes_warmed += processed;
                }
            }
        }
        report.pending = self.warmer.has_pending();
        Ok(report)
    }

    #[inline]
    fn layer_of(&self, token: &Token) -> u16 {
        if self.config.vertical_layers {
            token.layer
        } else {
            0
        }
    }
}

impl<V: GridlessSolver> Default for Pathfinder<V> {
    fn default() -> Self {
        Self::new(PathConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grids::SquareGrid;
    use crate::scheduler::{JobLimit, Unbounded};
    use crate::testutil::{CellScene, OpenSpace, StraightSolver};
    use crate::traits::NoSolver;

    fn engine(config: PathConfig) -> Pathfinder<NoSolver> {
        Pathfinder::new(config)
    }

    #[test]
    fn open_grid_scenario() {
        let scene = CellScene::open(SquareGrid::new(5, 5, 100.0));
        let mut pf = engine(PathConfig::default());
        let path = pf
            .find_grid_path(&scene, Point::new(0, 0), Point::new(4, 4), &Token::medium(), &[])
            .unwrap()
            .unwrap();
        assert_eq!(path.chain.len(), 5);
        assert!((path.cost() - 4.0).abs() < 1e-3);
        assert_eq!(path.waypoints, vec![Point::new(0, 0), Point::new(4, 4)]);
        assert_eq!(path.measure(DiagonalRule::Standard, 0), 4);
    }

    #[test]
    fn pixel_entry_point_converts_cells() {
        let scene = CellScene::open(SquareGrid::new(5, 5, 100.0));
        let mut pf = engine(PathConfig::default());
        let token = Token::medium();
        let path = pf
            .find_path(&scene, Vec2::new(50.0, 50.0), Vec2::new(420.0, 10.0), &token, &[])
            .unwrap()
            .unwrap();
        let grid = path.as_grid().unwrap();
        assert_eq!(grid.origin(), Some(Point::new(0, 0)));
        assert_eq!(grid.destination(), Some(Point::new(4, 0)));
        assert_eq!(
            path.to_pixels(&scene.grid, &token),
            vec![Vec2::new(50.0, 50.0), Vec2::new(450.0, 50.0)]
        );
    }

    #[test]
    fn budget_exhaustion_recovers_after_warming() {
        let scene = CellScene::open(SquareGrid::new(20, 20, 100.0));
        let mut pf = engine(PathConfig {
            materialize_budget: 10,
            ..PathConfig::default()
        });
        let (a, b) = (Point::new(0, 0), Point::new(19, 19));
        let token = Token::medium();
        assert_eq!(pf.find_grid_path(&scene, a, b, &token, &[]).unwrap(), None);

        let report = pf.run_idle(&scene, &mut Unbounded).unwrap();
        assert!(!report.pending);
        assert_eq!(report.nodes_warmed, 400);
        assert_eq!(pf.stats().materialized, 400);

        let path = pf.find_grid_path(&scene, a, b, &token, &[]).unwrap();
        assert!(path.is_some());
    }

    #[test]
    fn idle_slices_respect_deadline() {
        let scene = CellScene::open(SquareGrid::new(10, 10, 100.0));
        let mut pf = engine(PathConfig::default());
        pf.find_grid_path(&scene, Point::new(0, 0), Point::new(9, 9), &Token::medium(), &[])
            .unwrap();
        let report = pf.run_idle(&scene, &mut JobLimit(1)).unwrap();
        assert_eq!(report.jobs_run, 1);
        assert_eq!(report.nodes_warmed, 10);
        assert!(report.pending);
    }

    #[test]
    fn identical_request_is_memoized() {
        let scene = CellScene::open(SquareGrid::new(8, 8, 100.0));
        let mut pf = engine(PathConfig::default());
        let token = Token::medium();
        let first = pf
            .find_grid_path(&scene, Point::new(0, 0), Point::new(7, 3), &token, &[])
            .unwrap();
        let queries = scene.queries();
        let second = pf
            .find_grid_path(&scene, Point::new(0, 0), Point::new(7, 3), &token, &[])
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(scene.queries(), queries);
    }

    #[test]
    fn diagonal_parity_changes_start_cost() {
        let grid = SquareGrid::new(6, 6, 100.0).with_rule(DiagonalRule::FiveTenFive);
        let scene = CellScene::open(grid);
        let mut pf = engine(PathConfig::default());
        let token = Token::medium();
        let (a, b) = (Point::new(0, 0), Point::new(4, 4));
        let even = pf.find_grid_path(&scene, a, b, &token, &[]).unwrap().unwrap();
        assert_eq!(even.cost(), 6.0);
        let committed = [Point::new(5, 5), Point::new(4, 4)];
        let odd = pf
            .find_grid_path(&scene, a, b, &token, &committed)
            .unwrap()
            .unwrap();
        assert_eq!(odd.cost(), 6.5);
    }

    #[test]
    fn wipe_clears_everything() {
        let scene = CellScene::open(SquareGrid::new(6, 6, 100.0));
        let mut pf = engine(PathConfig::default());
        pf.find_grid_path(&scene, Point::new(0, 0), Point::new(5, 5), &Token::medium(), &[])
            .unwrap();
        pf.find_grid_path(&scene, Point::new(0, 0), Point::new(5, 5), &Token::new(2.0, 2.0), &[])
            .unwrap();
        let before = pf.stats();
        assert_eq!(before.caches, 2);
        assert!(before.nodes > 0);
        assert!(before.queued > 0);

        pf.wipe_cache();
        assert_eq!(
            pf.stats(),
            Stats {
                generation: before.generation + 1,
                ..Stats::default()
            }
        );
        assert!(pf.node_cache(&Token::medium()).is_none());
        let report = pf.run_idle(&scene, &mut Unbounded).unwrap();
        assert_eq!(report, IdleReport::default());
    }

    #[test]
    fn layer_changes_wipe_only_with_vertical_layers() {
        let scene = CellScene::open(SquareGrid::new(4, 4, 100.0));
        let mut flat = engine(PathConfig::default());
        flat.find_grid_path(&scene, Point::new(0, 0), Point::new(3, 3), &Token::medium(), &[])
            .unwrap();
        assert!(!flat.set_active_layer(1));
        assert_eq!(flat.stats().caches, 1);

        let mut layered = engine(PathConfig {
            vertical_layers: true,
            ..PathConfig::default()
        });
        let token = Token::medium().on_layer(2);
        layered
            .find_grid_path(&scene, Point::new(0, 0), Point::new(3, 3), &token, &[])
            .unwrap();
        let cache = layered.node_cache(&token).unwrap();
        assert!(cache.iter().all(|(_, n)| n.key().layer == 2));
        assert!(!layered.set_active_layer(0));
        assert!(layered.set_active_layer(2));
        assert_eq!(layered.stats().caches, 0);
        assert_eq!(layered.generation(), 1);
    }

    #[test]
    fn token_layer_keys_the_cache() {
        let scene = CellScene::open(SquareGrid::new(4, 4, 100.0));
        let mut pf = engine(PathConfig {
            vertical_layers: true,
            ..PathConfig::default()
        });
        let low = Token::medium().on_layer(1);
        let high = Token::medium().on_layer(3);
        for token in [&low, &high] {
            pf.find_grid_path(&scene, Point::new(0, 0), Point::new(3, 3), token, &[])
                .unwrap();
        }
        assert_eq!(pf.active_layer(), 0);
        assert_eq!(pf.stats().caches, 2);
        assert!(pf.node_cache(&low).unwrap().iter().all(|(_, n)| n.key().layer == 1));
        assert!(pf.node_cache(&high).unwrap().iter().all(|(_, n)| n.key().layer == 3));
    }

    #[test]
    fn invalid_token_rejected() {
        let scene = CellScene::open(SquareGrid::new(4, 4, 100.0));
        let mut pf = engine(PathConfig::default());
        let err = pf
            .find_grid_path(&scene, Point::new(0, 0), Point::new(3, 3), &Token::new(0.0, 1.0), &[])
            .unwrap_err();
        assert_eq!(err, PathError::InvalidFootprint(1.0));
    }

    #[test]
    fn scene_failure_surfaces() {
        let scene = CellScene::open(SquareGrid::new(4, 4, 100.0)).failing();
        let mut pf = engine(PathConfig::default());
        let err = pf
            .find_grid_path(&scene, Point::new(0, 0), Point::new(3, 3), &Token::medium(), &[])
            .unwrap_err();
        assert!(matches!(err, PathError::Scene(_)));
    }

    #[test]
    fn gridless_requests_use_solvers() {
        let scene = OpenSpace::new(100.0);
        let mut pf: Pathfinder<StraightSolver> = Pathfinder::default();
        let (a, b) = (Vec2::new(10.0, 10.0), Vec2::new(400.0, 250.0));
        let path = pf.find_path(&scene, a, b, &Token::medium(), &[]).unwrap();
        assert_eq!(path, Some(Path::Gridless(vec![a, b])));
        pf.find_path(&scene, b, a, &Token::medium(), &[]).unwrap();
        pf.find_path(&scene, a, b, &Token::new(3.0, 3.0), &[]).unwrap();
        assert_eq!(scene.built.get(), 2);
        assert_eq!(pf.stats().solvers, 2);

        pf.wipe_cache();
        assert_eq!(scene.disposed.get(), 2);
        pf.find_path(&scene, a, b, &Token::medium(), &[]).unwrap();
        assert_eq!(scene.built.get(), 3);

        let err = pf
            .find_grid_path(&scene, Point::new(0, 0), Point::new(1, 1), &Token::medium(), &[])
            .unwrap_err();
        assert_eq!(err, PathError::NotAGrid);
    }
}
