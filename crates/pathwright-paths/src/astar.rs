//! Backward A* over a [`NodeCache`] and line-of-sight simplification.
//!
//! The search is rooted at the destination and stops when it pops the
//! origin, so following `previous` links from the terminal entry yields the
//! route in walking order, origin first.

use pathwright_core::Point;
use rustc_hash::FxHashSet;

use crate::cache::{EdgeSource, MaterializeBudget, NodeCache, NodeId, NodeKey};
use crate::distance::estimate;
use crate::error::SceneError;
use crate::priority::PriorityOrderedSet;

/// One cell of a search result, labeled with the search cost at that cell
/// (cost to the destination plus the initial cost).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathNode {
    pub pos: Point,
    pub cost: f64,
}

#[derive(Copy, Clone, Debug)]
struct SearchEntry {
    node: NodeId,
    cost: f64,
    // Index into the settled entries of the current search.
    previous: Option<usize>,
}

/// Result of one search.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SearchOutcome {
    /// Cost-labeled chain from origin to destination.
    Found(Vec<PathNode>),
    /// The frontier ran dry: the origin cannot reach the destination.
    Unreachable,
    /// The materialization budget ran out before the origin was reached.
    OutOfBudget,
}

/// Find the cheapest route from `origin` to `destination`.
///
/// Nodes are materialized when popped for expansion; the first node that
/// cannot be materialized within `budget` aborts the search.
pub(crate) fn search(
    cache: &mut NodeCache,
    src: &EdgeSource<'_>,
    origin: NodeKey,
    destination: NodeKey,
    start_cost: f64,
    budget: &mut MaterializeBudget,
) -> Result<SearchOutcome, SceneError> {
    let (Some(start), true) = (
        cache.get_or_insert(destination),
        cache.bounds().contains(origin.pos),
    ) else {
        return Ok(SearchOutcome::Unreachable);
    };
    let rule = src.geometry.diagonal_rule();

    let mut frontier = PriorityOrderedSet::new(|e: &SearchEntry| e.node);
    let mut settled: FxHashSet<NodeId> = FxHashSet::default();
    let mut expanded: Vec<SearchEntry> = Vec::new();

    let h = estimate(destination.pos, origin.pos, rule);
    frontier.insert_with_tie(
        SearchEntry {
            node: start,
            cost: start_cost,
            previous: None,
        },
        start_cost + h,
        h,
    );

    while let Some(entry) = frontier.pop_min() {
        if cache.node(entry.node).key() == origin {
            expanded.push(entry);
            return Ok(SearchOutcome::Found(trace(cache, &expanded)));
        }
        settled.insert(entry.node);
        if !cache.materialize(entry.node, src, budget)? {
            return Ok(SearchOutcome::OutOfBudget);
        }
        expanded.push(entry);
        let here = expanded.len() - 1;

        let Some(edges) = cache.edges(entry.node) else {
            continue;
        };
        for edge in edges {
            if settled.contains(&edge.target) {
                continue;
            }
            let cost = entry.cost + edge.cost;
            let h = estimate(cache.node(edge.target).pos(), origin.pos, rule);
            frontier.insert_with_tie(
                SearchEntry {
                    node: edge.target,
                    cost,
                    previous: Some(here),
                },
                cost + h,
                h,
            );
        }
    }
    Ok(SearchOutcome::Unreachable)
}

/// Walk `previous` links back from the last entry.
fn trace(cache: &NodeCache, expanded: &[SearchEntry]) -> Vec<PathNode> {
    let mut chain = Vec::new();
    let mut cursor = expanded.len().checked_sub(1);
    while let Some(i) = cursor {
        let e = expanded[i];
        chain.push(PathNode {
            pos: cache.node(e.node).pos(),
            cost: e.cost,
        });
        cursor = e.previous;
    }
    chain
}

/// Drop intermediate waypoints that a straight, collision-free step can
/// replace.
///
/// For each cell of `chain`, if the step from the waypoint before the last
/// one to that cell is free, the last waypoint is moved there instead of
/// appending a new one.
pub fn simplify<F>(chain: &[PathNode], mut collides: F) -> Result<Vec<Point>, SceneError>
where
    F: FnMut(Point, Point) -> Result<bool, SceneError>,
{
    let mut waypoints: Vec<Point> = Vec::with_capacity(chain.len());
    for node in chain {
        let n = waypoints.len();
        if n >= 2 && !collides(waypoints[n - 2], node.pos)? {
            waypoints[n - 1] = node.pos;
        } else {
            waypoints.push(node.pos);
        }
    }
    Ok(waypoints)
}
