//! Cooperative idle-time job queue.
//!
//! Nothing here runs on its own: the host drains the queue from its idle or
//! tick loop, handing in an [`IdleDeadline`] that says when the current
//! slice is used up.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Handle of a scheduled job, usable for cancellation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct JobId(u64);

/// FIFO queue of pending idle-time jobs.
pub struct IdleScheduler<J> {
    jobs: VecDeque<(JobId, J)>,
    next: u64,
}

impl<J> IdleScheduler<J> {
    pub fn new() -> Self {
        Self {
            jobs: VecDeque::new(),
            next: 0,
        }
    }

    /// Queue `job` behind every job already scheduled.
    pub fn schedule(&mut self, job: J) -> JobId {
        let id = JobId(self.next);
        self.next += 1;
        self.jobs.push_back((id, job));
        id
    }

    /// Unregister a pending job. Returns whether it was still pending.
    pub fn cancel(&mut self, id: JobId) -> bool {
        let before = self.jobs.len();
        self.jobs.retain(|(other, _)| *other != id);
        self.jobs.len() != before
    }

    /// Take the oldest pending job.
    pub fn pop(&mut self) -> Option<(JobId, J)> {
        self.jobs.pop_front()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Drop every pending job.
    pub fn clear(&mut self) {
        self.jobs.clear();
    }
}

impl<J> Default for IdleScheduler<J> {
    fn default() -> Self {
        Self::new()
    }
}

/// Remaining allowance of one idle slice.
///
/// `has_time` is asked before each job; returning `false` ends the slice.
pub trait IdleDeadline {
    fn has_time(&mut self) -> bool;
}

/// Wall-clock deadline.
#[derive(Copy, Clone, Debug)]
pub struct ClockDeadline {
    until: Instant,
}

impl ClockDeadline {
    /// A slice ending `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self {
            until: Instant::now() + budget,
        }
    }

    pub fn remaining(&self) -> Duration {
        self.until.saturating_duration_since(Instant::now())
    }
}

impl IdleDeadline for ClockDeadline {
    fn has_time(&mut self) -> bool {
        Instant::now() < self.until
    }
}

/// Deterministic deadline allowing a fixed number of jobs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct JobLimit(pub usize);

impl IdleDeadline for JobLimit {
    fn has_time(&mut self) -> bool {
        if self.0 == 0 {
            return false;
        }
        self.0 -= 1;
        true
    }
}

/// Runs until no job is left.
#[derive(Copy, Clone, Debug, Default)]
pub struct Unbounded;

impl IdleDeadline for Unbounded {
    fn has_time(&mut self) -> bool {
        true
    }
}
