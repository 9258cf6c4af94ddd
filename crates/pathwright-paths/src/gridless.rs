//! Lifecycle of continuous-space solvers.
//!
//! The geometry is the solver's business. This module only makes sure that
//! exactly one solver exists per token footprint and that every solver is
//! disposed when the caches are wiped.

use log::debug;
use pathwright_core::{Token, Vec2};
use rustc_hash::FxHashMap;

use crate::error::{PathError, SceneError};
use crate::traits::{GridlessSolver, Scene};

/// One [`GridlessSolver`] per token footprint.
pub struct SolverRegistry<V> {
    // Keyed by the footprint's bit pattern, in grid units.
    solvers: FxHashMap<u64, V>,
}

impl<V: GridlessSolver> SolverRegistry<V> {
    pub fn new() -> Self {
        Self {
            solvers: FxHashMap::default(),
        }
    }

    /// Number of live solvers.
    #[inline]
    pub fn len(&self) -> usize {
        self.solvers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.solvers.is_empty()
    }

    /// The solver for footprint `size`, built with `build` on first use.
    pub fn get_or_build<B>(&mut self, size: f64, build: B) -> Result<&mut V, SceneError>
    where
        B: FnOnce(f64) -> Result<V, SceneError>,
    {
        use std::collections::hash_map::Entry;

        match self.solvers.entry(size.to_bits()) {
            Entry::Occupied(e) => Ok(e.into_mut()),
            Entry::Vacant(e) => {
                debug!("building gridless solver for footprint {size}");
                Ok(e.insert(build(size)?))
            }
        }
    }

    /// Route `token` from `from` to `to` through the solver for its
    /// footprint. `cell_size` converts the footprint to pixels for a newly
    /// built solver.
    pub fn find_path<S>(
        &mut self,
        scene: &S,
        cell_size: f64,
        from: Vec2,
        to: Vec2,
        token: &Token,
    ) -> Result<Option<Vec<Vec2>>, PathError>
    where
        S: Scene<Solver = V>,
    {
        if !token.is_valid() {
            return Err(PathError::InvalidFootprint(token.footprint()));
        }
        let solver = self.get_or_build(token.footprint(), |size| {
            scene.build_solver(size * cell_size)
        })?;
        Ok(solver.query(from, to))
    }

    /// Dispose every solver. Returns how many were released.
    pub fn dispose_all(&mut self) -> usize {
        let n = self.solvers.len();
        for (_, solver) in self.solvers.drain() {
            solver.dispose();
        }
        n
    }
}

impl<V: GridlessSolver> Default for SolverRegistry<V> {
    fn default() -> Self {
        Self::new()
    }
}
