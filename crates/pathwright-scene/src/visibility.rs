//! Continuous-space routing over a visibility graph of wall corners.
//!
//! Every wall endpoint contributes one waypoint per gap between the walls
//! meeting there, pushed out along the gap's bisector by the token's
//! clearance. Two waypoints are connected when the straight line between
//! them crosses no wall. Edges are computed on first use.

use std::f64::consts::TAU;

use log::debug;
use pathwright_core::{Segment, Vec2};
use pathwright_paths::{GridlessSolver, PriorityOrderedSet};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::walls::WallSet;

/// Smallest distance between a corner waypoint and its wall endpoint.
pub const MIN_CLEARANCE: f64 = 10.0;

struct Waypoint {
    pos: Vec2,
    // Visible waypoints with their distances.
    edges: Option<Vec<(usize, f64)>>,
}

#[derive(Copy, Clone)]
struct Entry {
    node: usize,
    cost: f64,
    previous: Option<usize>,
}

/// A [`GridlessSolver`] for one token footprint and elevation.
pub struct VisibilityGraph {
    walls: Vec<Segment>,
    waypoints: Vec<Waypoint>,
    clearance: f64,
}

impl VisibilityGraph {
    /// Build the graph for a token `footprint` pixels across standing at
    /// `elevation`.
    pub fn new(walls: &WallSet, footprint: f64, elevation: f64) -> Self {
        let clearance = (footprint / 2.0).max(MIN_CLEARANCE);
        let segments: Vec<Segment> = walls
            .blocking(elevation)
            .map(|w| w.segment)
            .filter(|s| !s.is_degenerate())
            .collect();

        // Outgoing wall directions at every endpoint.
        let mut corners: FxHashMap<(u64, u64), (Vec2, Vec<f64>)> = FxHashMap::default();
        for s in &segments {
            let forward = s.angle().rem_euclid(TAU);
            let backward = (forward + std::f64::consts::PI).rem_euclid(TAU);
            for (p, angle) in [(s.a, forward), (s.b, backward)] {
                corners
                    .entry((p.x.to_bits(), p.y.to_bits()))
                    .or_insert_with(|| (p, Vec::new()))
                    .1
                    .push(angle);
            }
        }

        let mut waypoints = Vec::new();
        let mut keys: Vec<_> = corners.keys().copied().collect();
        keys.sort_unstable();
        for key in keys {
            let Some((p, angles)) = corners.get_mut(&key) else {
                continue;
            };
            angles.sort_by(f64::total_cmp);
            for pair in angles.windows(2) {
                if pair[0] == pair[1] {
                    continue;
                }
                let bisector = (pair[0] + pair[1]) / 2.0;
                waypoints.push(Waypoint {
                    pos: p.offset(bisector, clearance),
                    edges: None,
                });
            }
            if let (Some(&first), Some(&last)) = (angles.first(), angles.last()) {
                let bisector = ((last + first + TAU) / 2.0).rem_euclid(TAU);
                waypoints.push(Waypoint {
                    pos: p.offset(bisector, clearance),
                    edges: None,
                });
            }
        }

        debug!(
            "visibility graph: {} walls, {} waypoints, clearance {clearance}",
            segments.len(),
            waypoints.len()
        );
        Self {
            walls: segments,
            waypoints,
            clearance,
        }
    }

    #[inline]
    pub fn clearance(&self) -> f64 {
        self.clearance
    }

    /// Number of corner waypoints.
    #[inline]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn waypoints(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.waypoints.iter().map(|w| w.pos)
    }

    /// Whether a straight move from `a` to `b` crosses no wall.
    pub fn visible(&self, a: Vec2, b: Vec2) -> bool {
        let line = Segment::new(a, b);
        !self.walls.iter().any(|w| w.intersects(&line))
    }

    fn materialize(&mut self, i: usize) {
        if self.waypoints[i].edges.is_some() {
            return;
        }
        let from = self.waypoints[i].pos;
        let edges = (0..self.waypoints.len())
            .filter(|&j| j != i)
            .filter_map(|j| {
                let to = self.waypoints[j].pos;
                self.visible(from, to).then(|| (j, from.distance_to(to)))
            })
            .collect();
        self.waypoints[i].edges = Some(edges);
    }
}

impl GridlessSolver for VisibilityGraph {
    /// Backward A* from `to`, with `from` and `to` added as temporary
    /// waypoints for this query only.
    fn query(&mut self, from: Vec2, to: Vec2) -> Option<Vec<Vec2>> {
        let n = self.waypoints.len();
        let (origin, target) = (n, n + 1);
        let pos = |g: &Self, i: usize| match i {
            i if i == origin => from,
            i if i == target => to,
            i => g.waypoints[i].pos,
        };

        let mut frontier = PriorityOrderedSet::new(|e: &Entry| e.node);
        let mut settled: FxHashSet<usize> = FxHashSet::default();
        let mut expanded: Vec<Entry> = Vec::new();
        let h = to.distance_to(from);
        frontier.insert_with_tie(
            Entry {
                node: target,
                cost: 0.0,
                previous: None,
            },
            h,
            h,
        );

        while let Some(entry) = frontier.pop_min() {
            expanded.push(entry);
            if entry.node == origin {
                let mut route = Vec::new();
                let mut cursor = Some(expanded.len() - 1);
                while let Some(i) = cursor {
                    route.push(pos(self, expanded[i].node));
                    cursor = expanded[i].previous;
                }
                return Some(route);
            }
            settled.insert(entry.node);
            let here = expanded.len() - 1;
            let at = pos(self, entry.node);

            let mut neighbors: Vec<(usize, f64)> = if entry.node == target {
                (0..n)
                    .filter_map(|j| {
                        let p = self.waypoints[j].pos;
                        self.visible(at, p).then(|| (j, at.distance_to(p)))
                    })
                    .collect()
            } else {
                self.materialize(entry.node);
                self.waypoints[entry.node].edges.clone().unwrap_or_default()
            };
            if self.visible(at, from) {
                neighbors.push((origin, at.distance_to(from)));
            }

            for (j, step) in neighbors {
                if settled.contains(&j) {
                    continue;
                }
                let cost = entry.cost + step;
                let h = pos(self, j).distance_to(from);
                frontier.insert_with_tie(
                    Entry {
                        node: j,
                        cost,
                        previous: Some(here),
                    },
                    cost + h,
                    h,
                );
            }
        }
        None
    }

    fn dispose(self) {
        debug!("disposing visibility graph with {} waypoints", self.waypoints.len());
    }
}
