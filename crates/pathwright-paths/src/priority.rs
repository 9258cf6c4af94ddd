//! A priority queue that holds at most one entry per logical element.
//!
//! Entries are ordered by `(priority, tie, insertion order)`, lowest first.
//! Element identity comes from a caller-supplied key function rather than
//! from value equality, so two search entries for the same node collapse
//! into one no matter what route they describe.
//!
//! Backed by an indexed binary heap: a side table maps each key to its
//! heap slot, which keeps inserts and pops at O(log n) while improving an
//! existing element happens in place.

use std::cmp::Ordering;
use std::hash::Hash;

use rustc_hash::FxHashMap;

struct Slot<K, V> {
    key: K,
    value: V,
    priority: f64,
    tie: f64,
    seq: u64,
}

impl<K, V> Slot<K, V> {
    #[inline]
    fn order(&self, other: &Self) -> Ordering {
        self.priority
            .total_cmp(&other.priority)
            .then_with(|| self.tie.total_cmp(&other.tie))
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Priority-ordered set keyed by `F(&V) -> K`.
pub struct PriorityOrderedSet<V, K, F>
where
    K: Copy + Eq + Hash,
    F: Fn(&V) -> K,
{
    heap: Vec<Slot<K, V>>,
    index: FxHashMap<K, usize>,
    key_of: F,
    seq: u64,
}

impl<V, K, F> PriorityOrderedSet<V, K, F>
where
    K: Copy + Eq + Hash,
    F: Fn(&V) -> K,
{
    /// Create an empty set whose element identity is given by `key_of`.
    pub fn new(key_of: F) -> Self {
        Self {
            heap: Vec::new(),
            index: FxHashMap::default(),
            key_of,
            seq: 0,
        }
    }

    /// Insert `value` at `priority`, with no secondary ordering.
    ///
    /// See [`insert_with_tie`](Self::insert_with_tie).
    pub fn insert(&mut self, value: V, priority: f64) -> bool {
        self.insert_with_tie(value, priority, 0.0)
    }

    /// Insert `value` at `priority`, ordering equal priorities by `tie`.
    ///
    /// If an equivalent element is already present with a priority at or
    /// below `priority`, nothing changes and `false` is returned. Otherwise
    /// the new value takes the place of any equivalent element and `true`
    /// is returned.
    pub fn insert_with_tie(&mut self, value: V, priority: f64, tie: f64) -> bool {
        let key = (self.key_of)(&value);
        let seq = self.seq;
        self.seq += 1;

        if let Some(&pos) = self.index.get(&key) {
            if self.heap[pos].priority <= priority {
                return false;
            }
            self.heap[pos] = Slot {
                key,
                value,
                priority,
                tie,
                seq,
            };
            // Strictly lower priority than before: only upward moves needed.
            self.sift_up(pos);
            return true;
        }

        let pos = self.heap.len();
        self.heap.push(Slot {
            key,
            value,
            priority,
            tie,
            seq,
        });
        self.index.insert(key, pos);
        self.sift_up(pos);
        true
    }

    /// Whether any element is left.
    #[inline]
    pub fn has_next(&self) -> bool {
        !self.heap.is_empty()
    }

    /// Remove and return the lowest-priority element.
    pub fn pop_min(&mut self) -> Option<V> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.swap(0, last);
        let slot = self.heap.pop()?;
        self.index.remove(&slot.key);
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some(slot.value)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.index.clear();
    }

    // -----------------------------------------------------------------------
    // Heap maintenance
    // -----------------------------------------------------------------------

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.heap.swap(a, b);
        self.index.insert(self.heap[a].key, a);
        self.index.insert(self.heap[b].key, b);
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if self.heap[pos].order(&self.heap[parent]) != Ordering::Less {
                break;
            }
            self.swap(pos, parent);
            pos = parent;
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * pos + 1;
            let right = left + 1;
            let mut smallest = pos;
            if left < len && self.heap[left].order(&self.heap[smallest]) == Ordering::Less {
                smallest = left;
            }
            if right < len && self.heap[right].order(&self.heap[smallest]) == Ordering::Less {
                smallest = right;
            }
            if smallest == pos {
                break;
            }
            self.swap(pos, smallest);
            pos = smallest;
        }
    }
}
