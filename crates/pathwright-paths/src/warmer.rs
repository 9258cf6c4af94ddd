//! Idle-time pre-materialization of node caches.
//!
//! Warming floods outward from a request's destination, a small batch per
//! idle job, so that later searches toward the same area find their edges
//! already computed. Searches never depend on it for correctness.

use log::{debug, trace};
use pathwright_core::Token;
use rustc_hash::FxHashMap;

use crate::cache::{EdgeSource, MaterializeBudget, NodeCache, NodeId};
use crate::error::SceneError;
use crate::queue::WorkQueue;
use crate::scheduler::{IdleScheduler, JobId};
use crate::traits::{GridGeometry, StepCollision};

/// Identity of one node cache: token footprint bits and layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct CacheKey {
    width: u64,
    height: u64,
    layer: u16,
}

impl CacheKey {
    pub fn new(token: &Token, layer: u16) -> Self {
        Self {
            width: token.width.to_bits(),
            height: token.height.to_bits(),
            layer,
        }
    }
}

/// A node cache together with the token its edges were computed for.
pub(crate) struct CacheEntry {
    pub cache: NodeCache,
    pub token: Token,
}

/// A scheduled warming job, tagged with the cache generation it belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct WarmJob {
    pub generation: u64,
}

/// What running one job did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum JobOutcome {
    /// The caches the job was scheduled for are gone.
    Stale,
    /// `processed` queued nodes were handled.
    Ran { processed: usize, rescheduled: bool },
}

#[derive(Default)]
pub(crate) struct Warmer {
    queue: WorkQueue<(CacheKey, NodeId)>,
    scheduler: IdleScheduler<WarmJob>,
    pending: Option<JobId>,
}

impl Warmer {
    /// Queue `node` for warming and make sure a job will pick it up.
    pub fn seed(&mut self, key: CacheKey, node: NodeId, generation: u64) {
        self.queue.push((key, node));
        if self.pending.is_none() {
            self.pending = Some(self.scheduler.schedule(WarmJob { generation }));
        }
    }

    #[inline]
    pub fn has_pending(&self) -> bool {
        !self.scheduler.is_empty()
    }

    /// Number of nodes waiting to be warmed.
    #[inline]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Take the next scheduled job.
    pub fn next_job(&mut self) -> Option<WarmJob> {
        let (id, job) = self.scheduler.pop()?;
        if self.pending == Some(id) {
            self.pending = None;
        }
        Some(job)
    }

    /// Cancel the pending job and forget every queued node.
    pub fn cancel(&mut self) -> bool {
        let cancelled = match self.pending.take() {
            Some(id) => self.scheduler.cancel(id),
            None => false,
        };
        self.scheduler.clear();
        self.queue.reset();
        cancelled
    }

    /// Process up to `batch` queued nodes for `job`, rescheduling while work
    /// remains.
    pub fn run_job(
        &mut self,
        job: WarmJob,
        generation: u64,
        caches: &mut FxHashMap<CacheKey, CacheEntry>,
        geometry: &dyn GridGeometry,
        collision: &dyn StepCollision,
        batch: usize,
    ) -> Result<JobOutcome, SceneError> {
        if job.generation != generation {
            debug!(
                "dropping warm job from generation {} (current {generation})",
                job.generation
            );
            return Ok(JobOutcome::Stale);
        }

        let mut budget = MaterializeBudget::unlimited();
        let mut processed = 0;
        while processed < batch {
            let Some((key, id)) = self.queue.pop() else {
                break;
            };
            processed += 1;
            let Some(entry) = caches.get_mut(&key) else {
                continue;
            };
            let src = EdgeSource {
                geometry,
                collision,
                token: &entry.token,
            };
            if let Err(e) = entry.cache.materialize(id, &src, &mut budget) {
                self.queue.retry((key, id));
                self.reschedule(job);
                return Err(e);
            }
            if let Some(edges) = entry.cache.edges(id) {
                for edge in edges {
                    self.queue.push((key, edge.target));
                }
            }
        }

        let rescheduled = self.queue.has_next();
        if rescheduled {
            self.reschedule(job);
        }
        trace!(
            "warmed {processed} nodes, {} queued, rescheduled: {rescheduled}",
            self.queue.len()
        );
        Ok(JobOutcome::Ran {
            processed,
            rescheduled,
        })
    }

    fn reschedule(&mut self, job: WarmJob) {
        if self.pending.is_none() {
            self.pending = Some(self.scheduler.schedule(job));
        }
    }
}
