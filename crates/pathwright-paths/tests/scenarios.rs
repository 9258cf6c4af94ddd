//! End-to-end behavior of the engine on small hand-drawn maps.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use pathwright_core::{Point, Token, Vec2};
use pathwright_paths::{
    ClockDeadline, DiagonalRule, GridGeometry, GridlessSolver, HexGrid, HexLayout, JobLimit,
    NoSolver, Path, PathConfig, PathError, Pathfinder, Scene, SceneError, SquareGrid,
    StepCollision, Surface, Unbounded,
};
use pathwright_paths::testutil::CellScene;
use rustc_hash::FxHashMap;

fn pathfinder() -> Pathfinder<NoSolver> {
    Pathfinder::new(PathConfig::default())
}

fn center(scene: &CellScene, x: i32, y: i32) -> Vec2 {
    scene.grid.center(Point::new(x, y))
}

#[test]
fn open_five_by_five() {
    let scene = CellScene::new(SquareGrid::new(5, 5, 100.0), []);
    let mut pf = pathfinder();
    let path = pf
        .find_grid_path(&scene, Point::new(0, 0), Point::new(4, 4), &Token::medium(), &[])
        .unwrap()
        .unwrap();
    let diagonals = path
        .chain
        .windows(2)
        .filter(|w| scene.grid.is_diagonal(w[0].pos, w[1].pos))
        .count();
    assert_eq!(diagonals, 4);
    assert!((path.cost() - 4.0).abs() < 1e-3);
    assert_eq!(path.measure(DiagonalRule::Standard, 0), 4);
}

#[test]
fn blocked_diagonal_corridor_forces_a_detour() {
    let scene = CellScene::parse(
        SquareGrid::new(5, 5, 100.0),
        &[".....", ".....", "..#..", ".....", "....."],
    );
    let mut pf = pathfinder();
    let path = pf
        .find_grid_path(&scene, Point::new(0, 0), Point::new(4, 4), &Token::medium(), &[])
        .unwrap()
        .unwrap();
    assert!(path.cost() > 4.0 + 1e-3, "cost {}", path.cost());
    assert!(path.chain.iter().all(|n| n.pos != Point::new(2, 2)));
    for w in path.waypoints.windows(2) {
        assert!(!scene.line_blocked(w[0], w[1]), "{} -> {} crosses the wall", w[0], w[1]);
    }
}

#[test]
fn walled_in_origin_has_no_path() {
    let scene = CellScene::parse(
        SquareGrid::new(7, 7, 100.0),
        &[
            ".......",
            ".......",
            "..###..",
            "..#.#..",
            "..###..",
            ".......",
            ".......",
        ],
    );
    let mut pf = pathfinder();
    let token = Token::medium();
    let out = pf
        .find_path(&scene, center(&scene, 3, 3), center(&scene, 0, 0), &token, &[])
        .unwrap();
    assert_eq!(out, None);
    let back = pf
        .find_path(&scene, center(&scene, 6, 6), center(&scene, 3, 3), &token, &[])
        .unwrap();
    assert_eq!(back, None);
    // Outside the enclosure everything stays reachable.
    let around = pf
        .find_path(&scene, center(&scene, 0, 3), center(&scene, 6, 3), &token, &[])
        .unwrap();
    assert!(around.is_some());
}

#[test]
fn shortcuts_never_cross_walls() {
    let scene = CellScene::parse(
        SquareGrid::new(10, 8, 100.0),
        &[
            "..........",
            ".#######..",
            ".#.....#..",
            ".#.###.#..",
            ".#.#...#..",
            ".#.#.###..",
            "...#......",
            "###.......",
        ],
    );
    let mut pf = Pathfinder::new(PathConfig::unbounded());
    let token = Token::medium();
    for (from, to) in [
        (Point::new(2, 2), Point::new(9, 7)),
        (Point::new(4, 4), Point::new(0, 0)),
        (Point::new(0, 6), Point::new(8, 0)),
    ] {
        let path = pf
            .find_grid_path(&scene, from, to, &token, &[])
            .unwrap()
            .unwrap_or_else(|| panic!("{from} -> {to} should be reachable"));
        assert!(path.waypoints.len() <= path.chain.len());
        assert_eq!(path.origin(), Some(from));
        assert_eq!(path.destination(), Some(to));
        for w in path.waypoints.windows(2) {
            assert!(
                !scene.line_blocked(w[0], w[1]),
                "{from} -> {to}: shortcut {} -> {} collides",
                w[0],
                w[1]
            );
        }
        // Waypoints are cells of the chain, in order.
        let mut cells = path.chain.iter().map(|n| n.pos);
        for w in &path.waypoints {
            assert!(cells.any(|c| c == *w), "{w} is not on the chain");
        }
    }
}

#[test]
fn search_budget_recovers_through_idle_warming() {
    let scene = CellScene::new(SquareGrid::new(30, 30, 50.0), []);
    let mut pf = Pathfinder::new(PathConfig {
        materialize_budget: 20,
        ..PathConfig::default()
    });
    let token = Token::medium();
    let (a, b) = (Point::new(0, 0), Point::new(29, 29));
    assert!(pf.find_grid_path(&scene, a, b, &token, &[]).unwrap().is_none());

    let mut deadline = ClockDeadline::after(Duration::from_secs(30));
    let report = pf.run_idle(&scene, &mut deadline).unwrap();
    assert!(!report.pending);
    assert_eq!(pf.stats().materialized, 900);

    let queries = scene.queries();
    let path = pf.find_grid_path(&scene, a, b, &token, &[]).unwrap().unwrap();
    assert!((path.cost() - 29.0 * 1.0001).abs() < 1e-9);
    // Only the simplification pass asked the scene anything.
    assert!(scene.queries() - queries <= path.chain.len());
}

/// Edges of every materialized node, by position.
fn edge_table(pf: &Pathfinder<NoSolver>, token: &Token) -> FxHashMap<Point, Vec<(Point, u64)>> {
    let cache = pf.node_cache(token).expect("cache exists");
    cache
        .iter()
        .filter_map(|(_, node)| {
            let edges = node.edges()?;
            let mut out: Vec<(Point, u64)> = edges
                .iter()
                .map(|e| (cache.node(e.target).pos(), e.cost.to_bits()))
                .collect();
            out.sort();
            Some((node.pos(), out))
        })
        .collect()
}

#[test]
fn warming_and_searching_agree_on_edges() {
    let rows = [
        "..........",
        "..#.......",
        "..#..###..",
        "..#....#..",
        "......#...",
        "...##.....",
    ];
    let token = Token::medium();
    let (a, b) = (Point::new(0, 0), Point::new(9, 5));

    // Search first, then warm.
    let scene_a = CellScene::parse(SquareGrid::new(10, 6, 100.0), &rows);
    let mut first = pathfinder();
    first.find_grid_path(&scene_a, a, b, &token, &[]).unwrap();
    first.run_idle(&scene_a, &mut Unbounded).unwrap();

    // Warm a little, search, then finish warming.
    let scene_b = CellScene::parse(SquareGrid::new(10, 6, 100.0), &rows);
    let mut second = pathfinder();
    second.find_grid_path(&scene_b, b, b, &token, &[]).unwrap();
    second.run_idle(&scene_b, &mut JobLimit(2)).unwrap();
    second.find_grid_path(&scene_b, a, b, &token, &[]).unwrap();
    second.run_idle(&scene_b, &mut Unbounded).unwrap();

    let stats = first.stats();
    assert_eq!(stats.nodes, stats.materialized);
    assert_eq!(edge_table(&first, &token), edge_table(&second, &token));
}

#[test]
fn warming_is_deterministic() {
    let scene = CellScene::new(SquareGrid::new(12, 12, 100.0), []);
    let token = Token::medium();
    let mut a = pathfinder();
    let mut b = pathfinder();
    for pf in [&mut a, &mut b] {
        pf.find_grid_path(&scene, Point::new(0, 0), Point::new(6, 6), &token, &[])
            .unwrap();
    }
    loop {
        let ra = a.run_idle(&scene, &mut JobLimit(1)).unwrap();
        let rb = b.run_idle(&scene, &mut JobLimit(1)).unwrap();
        assert_eq!(ra, rb);
        assert_eq!(a.stats(), b.stats());
        if !ra.pending {
            break;
        }
    }
    assert_eq!(a.stats().materialized, 144);
}

#[test]
fn wipe_discards_every_node() {
    let scene = CellScene::new(SquareGrid::new(6, 6, 100.0), []);
    let mut pf = pathfinder();
    let token = Token::medium();
    let (a, b) = (Point::new(0, 0), Point::new(5, 2));
    pf.find_grid_path(&scene, a, b, &token, &[]).unwrap();
    pf.run_idle(&scene, &mut Unbounded).unwrap();
    let warm = pf.stats();
    assert_eq!(warm.materialized, 36);

    pf.wipe_cache();
    assert!(pf.node_cache(&token).is_none());
    let queries = scene.queries();
    pf.find_grid_path(&scene, a, b, &token, &[]).unwrap();
    let cold = pf.stats();
    assert_eq!(cold.generation, warm.generation + 1);
    assert!(cold.materialized < warm.materialized);
    // Edges were recomputed rather than carried over.
    assert!(scene.queries() > queries);
}

#[test]
fn warming_resumes_after_a_scene_failure() {
    let scene = CellScene::new(SquareGrid::new(6, 6, 100.0), []);
    let mut pf = pathfinder();
    pf.find_grid_path(&scene, Point::new(0, 0), Point::new(5, 2), &Token::medium(), &[])
        .unwrap();

    scene.fail_next(1);
    assert!(matches!(
        pf.run_idle(&scene, &mut Unbounded),
        Err(PathError::Scene(_))
    ));
    let report = pf.run_idle(&scene, &mut Unbounded).unwrap();
    assert!(report.jobs_run > 0);
    assert!(!report.pending);
    assert_eq!(pf.stats().materialized, 36);
}

#[test]
fn failed_search_is_not_remembered() {
    let scene = CellScene::new(SquareGrid::new(6, 6, 100.0), []);
    let mut pf = pathfinder();
    let token = Token::medium();
    let (a, b) = (Point::new(0, 0), Point::new(4, 4));

    scene.fail_next(1);
    assert!(matches!(
        pf.find_grid_path(&scene, a, b, &token, &[]),
        Err(PathError::Scene(_))
    ));
    let path = pf
        .find_grid_path(&scene, a, b, &token, &[])
        .unwrap()
        .expect("scene answers again");
    assert!((path.cost() - 4.0).abs() < 1e-3);
    assert_eq!(path.waypoints, vec![a, b]);
}

#[test]
fn five_ten_five_straight_diagonal() {
    let scene = CellScene::new(SquareGrid::new(8, 8, 100.0).with_rule(DiagonalRule::FiveTenFive), []);
    let mut pf = pathfinder();
    let path = pf
        .find_grid_path(&scene, Point::new(0, 0), Point::new(6, 6), &Token::medium(), &[])
        .unwrap()
        .unwrap();
    assert_eq!(path.cost(), 9.0);
    assert_eq!(path.measure(DiagonalRule::FiveTenFive, 0), 9);
    assert_eq!(path.measure(DiagonalRule::FiveTenFive, 1), 9);
    assert_eq!(path.measure(DiagonalRule::Standard, 0), 6);
}

// ---------------------------------------------------------------------------
// Hex maps
// ---------------------------------------------------------------------------

struct HexScene(HexGrid);

impl StepCollision for HexScene {
    fn step_collides(&self, _from: Point, _to: Point, _token: &Token) -> Result<bool, SceneError> {
        Ok(false)
    }
}

impl Scene for HexScene {
    type Solver = NoSolver;

    fn surface(&self) -> Surface<'_> {
        Surface::Grid(&self.0)
    }

    fn build_solver(&self, _footprint: f64) -> Result<NoSolver, SceneError> {
        Err(SceneError::new("no gridless solver"))
    }
}

#[test]
fn hex_paths_step_between_neighbors() {
    let scene = HexScene(HexGrid::new(8, 8, 100.0, HexLayout::OddRows));
    let mut pf = pathfinder();
    let path = pf
        .find_grid_path(&scene, Point::new(0, 0), Point::new(5, 6), &Token::medium(), &[])
        .unwrap()
        .unwrap();
    let mut buf = Vec::new();
    for w in path.chain.windows(2) {
        buf.clear();
        scene.0.neighbors(w[0].pos, &mut buf);
        assert!(buf.contains(&w[1].pos));
    }
    // Every hex step costs one.
    assert_eq!(path.cost(), (path.chain.len() - 1) as f64);
}

// ---------------------------------------------------------------------------
// Gridless maps
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Counters {
    built: Cell<usize>,
    disposed: Cell<usize>,
}

struct OpenField {
    counters: Rc<Counters>,
}

struct Direct {
    counters: Rc<Counters>,
}

impl GridlessSolver for Direct {
    fn query(&mut self, from: Vec2, to: Vec2) -> Option<Vec<Vec2>> {
        (to.x >= 0.0).then(|| vec![from, to])
    }

    fn dispose(self) {
        self.counters.disposed.set(self.counters.disposed.get() + 1);
    }
}

impl StepCollision for OpenField {
    fn step_collides(&self, _from: Point, _to: Point, _token: &Token) -> Result<bool, SceneError> {
        Ok(false)
    }
}

impl Scene for OpenField {
    type Solver = Direct;

    fn surface(&self) -> Surface<'_> {
        Surface::Gridless { cell_size: 100.0 }
    }

    fn build_solver(&self, _footprint: f64) -> Result<Direct, SceneError> {
        self.counters.built.set(self.counters.built.get() + 1);
        Ok(Direct {
            counters: Rc::clone(&self.counters),
        })
    }
}

#[test]
fn gridless_handles_live_until_wipe() {
    let scene = OpenField {
        counters: Rc::default(),
    };
    let mut pf: Pathfinder<Direct> = Pathfinder::default();
    let (a, b) = (Vec2::new(0.0, 0.0), Vec2::new(120.0, 340.0));

    for _ in 0..3 {
        let path = pf.find_path(&scene, a, b, &Token::medium(), &[]).unwrap();
        assert_eq!(path, Some(Path::Gridless(vec![a, b])));
    }
    pf.find_path(&scene, a, b, &Token::new(2.0, 2.0), &[]).unwrap();
    assert_eq!(scene.counters.built.get(), 2);

    // Unreachable targets are "no path", not errors.
    let none = pf
        .find_path(&scene, a, Vec2::new(-5.0, 0.0), &Token::medium(), &[])
        .unwrap();
    assert_eq!(none, None);

    pf.wipe_cache();
    assert_eq!(scene.counters.disposed.get(), 2);
    assert_eq!(pf.stats().solvers, 0);

    pf.find_path(&scene, a, b, &Token::medium(), &[]).unwrap();
    assert_eq!(scene.counters.built.get(), 3);

    let err = pf
        .find_path(&scene, a, b, &Token::new(-1.0, 1.0), &[])
        .unwrap_err();
    assert!(matches!(err, PathError::InvalidFootprint(_)));
}
