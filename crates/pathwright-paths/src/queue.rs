//! FIFO work list for the background cache warmer.

use std::collections::VecDeque;
use std::hash::Hash;

use rustc_hash::FxHashSet;

/// A FIFO queue that accepts each value at most once until [`reset`].
///
/// Pushing a value that was already queued (or already popped) is a no-op,
/// which bounds a flood fill to one visit per node.
///
/// [`reset`]: WorkQueue::reset
pub struct WorkQueue<T> {
    items: VecDeque<T>,
    queued: FxHashSet<T>,
}

impl<T: Copy + Eq + Hash> WorkQueue<T> {
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
            queued: FxHashSet::default(),
        }
    }

    /// Append `value` unless it was queued before. Returns whether it was.
    pub fn push(&mut self, value: T) -> bool {
        if !self.queued.insert(value) {
            return false;
        }
        self.items.push_back(value);
        true
    }

    /// Put a popped `value` back at the front, ahead of everything queued.
    pub fn retry(&mut self, value: T) {
        self.queued.insert(value);
        self.items.push_front(value);
    }

    /// Remove and return the oldest value.
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    #[inline]
    pub fn has_next(&self) -> bool {
        !self.items.is_empty()
    }

    /// Number of values waiting to be popped.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop all values and forget which ones were seen.
    pub fn reset(&mut self) {
        self.items.clear();
        self.queued.clear();
    }
}

impl<T: Copy + Eq + Hash> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
