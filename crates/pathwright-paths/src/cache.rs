//! Lazily materialized graph over the cells of a map.
//!
//! A [`NodeCache`] hands out one [`Node`] per `(x, y, layer)` and computes
//! each node's outgoing edges the first time they are needed. Edge lists
//! never change once set; the whole cache is dropped when walls, layers or
//! geometry change.

use pathwright_core::{Point, Range, Token};

use crate::distance::ORTHOGONAL_COST;
use crate::error::SceneError;
use crate::traits::{GridGeometry, StepCollision};

/// Handle of a node inside one [`NodeCache`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identity of a node: a cell on an elevation layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeKey {
    pub pos: Point,
    pub layer: u16,
}

impl NodeKey {
    #[inline]
    pub const fn new(pos: Point, layer: u16) -> Self {
        Self { pos, layer }
    }
}

/// A directed, costed connection to an adjacent reachable cell.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Edge {
    pub target: NodeId,
    pub cost: f64,
}

/// A cached graph vertex.
#[derive(Debug)]
pub struct Node {
    key: NodeKey,
    edges: Option<Box<[Edge]>>,
}

impl Node {
    #[inline]
    pub fn key(&self) -> NodeKey {
        self.key
    }

    #[inline]
    pub fn pos(&self) -> Point {
        self.key.pos
    }

    /// Outgoing edges, or `None` while not yet materialized.
    #[inline]
    pub fn edges(&self) -> Option<&[Edge]> {
        self.edges.as_deref()
    }

    #[inline]
    pub fn is_materialized(&self) -> bool {
        self.edges.is_some()
    }
}

/// How many edge lists a caller may still compute.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MaterializeBudget {
    remaining: usize,
}

impl MaterializeBudget {
    pub fn new(limit: usize) -> Self {
        Self { remaining: limit }
    }

    pub fn unlimited() -> Self {
        Self::new(usize::MAX)
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Consume one unit; `false` when nothing was left.
    #[inline]
    fn take(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}

/// Collaborators consulted while computing edges.
#[derive(Copy, Clone)]
pub struct EdgeSource<'a> {
    pub geometry: &'a dyn GridGeometry,
    pub collision: &'a dyn StepCollision,
    pub token: &'a Token,
}

/// Node table for one token footprint on one map.
pub struct NodeCache {
    bounds: Range,
    nodes: Vec<Node>,
    // [layer][row][column], rows and columns grown on first touch.
    slots: Vec<Vec<Vec<Option<NodeId>>>>,
    materialized: usize,
    scratch: Vec<Point>,
}

impl NodeCache {
    /// An empty cache covering the cells in `bounds`.
    pub fn new(bounds: Range) -> Self {
        Self {
            bounds,
            nodes: Vec::new(),
            slots: Vec::new(),
            materialized: 0,
            scratch: Vec::with_capacity(8),
        }
    }

    #[inline]
    pub fn bounds(&self) -> Range {
        self.bounds
    }

    /// Number of nodes created so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of nodes whose edges have been computed.
    #[inline]
    pub fn materialized_count(&self) -> usize {
        self.materialized
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Outgoing edges of `id`, if materialized.
    #[inline]
    pub fn edges(&self, id: NodeId) -> Option<&[Edge]> {
        self.nodes[id.index()].edges()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }

    /// The node for `key`, if it was created.
    pub fn lookup(&self, key: NodeKey) -> Option<NodeId> {
        let (layer, x, y) = self.slot_coords(key)?;
        *self.slots.get(layer)?.get(y)?.get(x)?
    }

    /// The singleton node for `key`, created on first reference. `None` when
    /// the cell lies outside the map.
    pub fn get_or_insert(&mut self, key: NodeKey) -> Option<NodeId> {
        let (layer, x, y) = self.slot_coords(key)?;
        if self.slots.len() <= layer {
            self.slots.resize_with(layer + 1, Vec::new);
        }
        let rows = &mut self.slots[layer];
        if rows.len() <= y {
            rows.resize_with(y + 1, Vec::new);
        }
        let row = &mut rows[y];
        if row.len() <= x {
            row.resize(x + 1, None);
        }
        if let Some(id) = row[x] {
            return Some(id);
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node { key, edges: None });
        row[x] = Some(id);
        Some(id)
    }

    /// Look up or create the node for `key`, materializing its edges when
    /// `materialize` is set and `budget` allows.
    ///
    /// An exhausted budget leaves the edges unset; callers treat that as
    /// "try again later".
    pub fn get_node(
        &mut self,
        key: NodeKey,
        materialize: bool,
        src: &EdgeSource<'_>,
        budget: &mut MaterializeBudget,
    ) -> Result<Option<NodeId>, SceneError> {
        let Some(id) = self.get_or_insert(key) else {
            return Ok(None);
        };
        if materialize {
            self.materialize(id, src, budget)?;
        }
        Ok(Some(id))
    }

    /// Compute the edges of `id` unless already known. Returns whether the
    /// edges are available afterwards.
    ///
    /// Idempotent: an edge list, once set, is never recomputed.
    pub fn materialize(
        &mut self,
        id: NodeId,
        src: &EdgeSource<'_>,
        budget: &mut MaterializeBudget,
    ) -> Result<bool, SceneError> {
        if self.nodes[id.index()].is_materialized() {
            return Ok(true);
        }
        if !budget.take() {
            return Ok(false);
        }

        let key = self.nodes[id.index()].key;
        let rule = src.geometry.diagonal_rule();
        let mut neighbors = std::mem::take(&mut self.scratch);
        neighbors.clear();
        src.geometry.neighbors(key.pos, &mut neighbors);

        let mut edges = Vec::with_capacity(neighbors.len());
        for &n in &neighbors {
            if !self.bounds.contains(n) {
                continue;
            }
            if src.collision.step_collides(key.pos, n, src.token)? {
                continue;
            }
            let cost = if src.geometry.is_diagonal(key.pos, n) {
                rule.diagonal_cost()
            } else {
                ORTHOGONAL_COST
            };
            if let Some(target) = self.get_or_insert(NodeKey::new(n, key.layer)) {
                edges.push(Edge { target, cost });
            }
        }
        self.scratch = neighbors;

        self.nodes[id.index()].edges = Some(edges.into_boxed_slice());
        self.materialized += 1;
        Ok(true)
    }

    #[inline]
    fn slot_coords(&self, key: NodeKey) -> Option<(usize, usize, usize)> {
        if !self.bounds.contains(key.pos) {
            return None;
        }
        let x = (key.pos.x - self.bounds.min.x) as usize;
        let y = (key.pos.y - self.bounds.min.y) as usize;
        Some((key.layer as usize, x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::{DIAGONAL_COST, DiagonalRule, FIVE_TEN_FIVE_DIAGONAL_COST};
    use crate::grids::SquareGrid;
    use crate::testutil::CellScene;

    fn source<'a>(scene: &'a CellScene, token: &'a Token) -> EdgeSource<'a> {
        EdgeSource {
            geometry: &scene.grid,
            collision: scene,
            token,
        }
    }

    #[test]
    fn nodes_are_singletons() {
        let mut cache = NodeCache::new(Range::sized(5, 5));
        let a = cache.get_or_insert(NodeKey::new(Point::new(2, 3), 0)).unwrap();
        let b = cache.get_or_insert(NodeKey::new(Point::new(2, 3), 0)).unwrap();
        assert_eq!(a, b);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.lookup(NodeKey::new(Point::new(2, 3), 0)), Some(a));
        assert_eq!(cache.lookup(NodeKey::new(Point::new(3, 2), 0)), None);
    }

    #[test]
    fn layers_are_distinct_nodes() {
        let mut cache = NodeCache::new(Range::sized(5, 5));
        let a = cache.get_or_insert(NodeKey::new(Point::new(1, 1), 0)).unwrap();
        let b = cache.get_or_insert(NodeKey::new(Point::new(1, 1), 2)).unwrap();
        assert_ne!(a, b);
        assert_eq!(cache.node(b).key().layer, 2);
    }

    #[test]
    fn out_of_bounds_has_no_node() {
        let mut cache = NodeCache::new(Range::sized(5, 5));
        assert!(cache.get_or_insert(NodeKey::new(Point::new(-1, 0), 0)).is_none());
        assert!(cache.get_or_insert(NodeKey::new(Point::new(0, 5), 0)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn edges_skip_bounds_and_obstacles() {
        let scene = CellScene::open(SquareGrid::new(3, 3, 100.0)).with_blocked(&[(1, 0)]);
        let token = Token::medium();
        let mut cache = NodeCache::new(scene.grid.bounds());
        let mut budget = MaterializeBudget::unlimited();
        let id = cache
            .get_node(NodeKey::new(Point::new(0, 0), 0), true, &source(&scene, &token), &mut budget)
            .unwrap()
            .unwrap();
        let targets: Vec<Point> = cache
            .edges(id)
            .unwrap()
            .iter()
            .map(|e| cache.node(e.target).pos())
            .collect();
        // (1, 0) is blocked and (1, 1) would cut its corner.
        assert_eq!(targets, vec![Point::new(0, 1)]);
    }

    #[test]
    fn edge_costs_follow_diagonal_rule() {
        for (rule, diagonal) in [
            (DiagonalRule::Standard, DIAGONAL_COST),
            (DiagonalRule::FiveTenFive, FIVE_TEN_FIVE_DIAGONAL_COST),
        ] {
            let scene = CellScene::open(SquareGrid::new(3, 3, 100.0).with_rule(rule));
            let token = Token::medium();
            let mut cache = NodeCache::new(scene.grid.bounds());
            let mut budget = MaterializeBudget::unlimited();
            let id = cache
                .get_node(NodeKey::new(Point::new(1, 1), 0), true, &source(&scene, &token), &mut budget)
                .unwrap()
                .unwrap();
            let edges = cache.edges(id).unwrap();
            assert_eq!(edges.len(), 8);
            for e in edges {
                let d = cache.node(e.target).pos() - Point::new(1, 1);
                let expected = if d.x != 0 && d.y != 0 { diagonal } else { 1.0 };
                assert_eq!(e.cost, expected);
            }
        }
    }

    #[test]
    fn materialization_is_idempotent() {
        let scene = CellScene::open(SquareGrid::new(4, 4, 100.0));
        let token = Token::medium();
        let mut cache = NodeCache::new(scene.grid.bounds());
        let mut budget = MaterializeBudget::unlimited();
        let key = NodeKey::new(Point::new(2, 2), 0);
        let src = source(&scene, &token);

        let id = cache.get_node(key, true, &src, &mut budget).unwrap().unwrap();
        let first: Vec<Edge> = cache.edges(id).unwrap().to_vec();
        let queries = scene.queries();

        let again = cache.get_node(key, true, &src, &mut budget).unwrap().unwrap();
        assert_eq!(id, again);
        assert_eq!(cache.edges(id).unwrap(), first.as_slice());
        assert_eq!(scene.queries(), queries, "edges were recomputed");
        assert_eq!(cache.materialized_count(), 1);
    }

    #[test]
    fn exhausted_budget_leaves_edges_unset() {
        let scene = CellScene::open(SquareGrid::new(4, 4, 100.0));
        let token = Token::medium();
        let mut cache = NodeCache::new(scene.grid.bounds());
        let mut budget = MaterializeBudget::new(1);
        let src = source(&scene, &token);

        let a = cache.get_node(NodeKey::new(Point::new(0, 0), 0), true, &src, &mut budget).unwrap().unwrap();
        let b = cache.get_node(NodeKey::new(Point::new(3, 3), 0), true, &src, &mut budget).unwrap().unwrap();
        assert!(cache.node(a).is_materialized());
        assert!(!cache.node(b).is_materialized());
        assert!(budget.is_exhausted());
        // Already materialized nodes need no budget.
        assert!(cache.materialize(a, &src, &mut budget).unwrap());
        assert!(!cache.materialize(b, &src, &mut budget).unwrap());
    }

    #[test]
    fn scene_failure_propagates() {
        let scene = CellScene::open(SquareGrid::new(3, 3, 100.0)).failing();
        let token = Token::medium();
        let mut cache = NodeCache::new(scene.grid.bounds());
        let mut budget = MaterializeBudget::unlimited();
        let err = cache
            .get_node(NodeKey::new(Point::new(1, 1), 0), true, &source(&scene, &token), &mut budget)
            .unwrap_err();
        assert_eq!(err.message(), "wall data unavailable");
    }
}
