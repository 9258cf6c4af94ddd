//! Incremental pathfinding for moving tokens around walls.
//!
//! A [`Pathfinder`] answers ruler-style path requests on grid maps and in
//! continuous space:
//!
//! - **Grid maps** are searched with a backward A\* over a [`NodeCache`]
//!   whose edges are computed lazily, at most
//!   [`PathConfig::materialize_budget`] per request. The resulting cell
//!   chain is shortened by a line-of-sight pass.
//! - **Background warming** fills node caches from idle time. The host
//!   drives it through [`Pathfinder::run_idle`] with an [`IdleDeadline`].
//! - **Gridless maps** are delegated to one [`GridlessSolver`] per token
//!   footprint, built and disposed by the engine.
//!
//! The engine owns no scene state. Walls and grid layout reach it through
//! the [`Scene`] passed to every call, and [`Pathfinder::wipe_cache`] must
//! be called whenever they change.
//!
//! # Collaborators
//!
//! | Trait | Provides |
//! |---|---|
//! | [`GridGeometry`] | bounds, adjacency, pixel conversion, snapping |
//! | [`StepCollision`] | obstacle test for one step |
//! | [`GridlessSolver`] | continuous-space routing |
//! | [`Scene`] : [`StepCollision`] | surface kind and solver construction |
//!
//! [`SquareGrid`] and [`HexGrid`] are ready-made geometry providers.

mod astar;
mod cache;
mod config;
mod distance;
mod engine;
mod error;
mod gridless;
mod grids;
mod policy;
mod priority;
mod queue;
mod scheduler;
mod traits;
mod warmer;

#[cfg(any(test, feature = "test-util"))]
pub mod testutil;

pub use astar::{PathNode, simplify};
pub use cache::{Edge, EdgeSource, MaterializeBudget, Node, NodeCache, NodeId, NodeKey};
pub use config::{DEFAULT_MATERIALIZE_BUDGET, DEFAULT_WARM_BATCH, PathConfig};
pub use distance::{
    DIAGONAL_COST, DiagonalRule, FIVE_TEN_FIVE_DIAGONAL_COST, ORTHOGONAL_COST, chebyshev,
    diagonal_parity, diagonal_steps, estimate, measure, start_cost,
};
pub use engine::{GridPath, IdleReport, Path, Pathfinder, Stats};
pub use error::{PathError, PathResult, SceneError};
pub use gridless::SolverRegistry;
pub use grids::{HexGrid, HexLayout, SquareGrid};
pub use policy::{PathfindingContext, is_pathfinding_enabled};
pub use priority::PriorityOrderedSet;
pub use queue::WorkQueue;
pub use scheduler::{ClockDeadline, IdleDeadline, IdleScheduler, JobId, JobLimit, Unbounded};
pub use traits::{GridGeometry, GridlessSolver, NoSolver, Scene, StepCollision, Surface};
