//! Boundary priority queue with lazy invalidation
//!
//! Boundary vertices are reprioritized constantly as the fill advances, so
//! the queue never reheapifies in place. Instead each push appends a fresh
//! heap entry, and a per-vertex liveness bit decides at pop time whether an
//! entry still represents the frontier. Stale entries are discarded when
//! popped; invalidation is a single bit clear.

use bitvec::vec::BitVec;
use std::collections::BinaryHeap;

use crate::spatial::grid::{Dimensions, Vertex};

/// One heap entry: a vertex with the priority it was pushed at
#[derive(Debug, Clone, Copy)]
struct Entry {
    priority: f64,
    sequence: u64,
    vertex: Vertex,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Highest priority first; equal priorities resolve to the earliest
        // insertion so runs are reproducible.
        self.priority
            .total_cmp(&other.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Mutable-priority queue over boundary vertices
///
/// Liveness is tracked in a side table of one bit per pixel: `push` sets the
/// bit, `invalidate` clears it, and `pop` skips any entry whose bit is clear.
/// Duplicate entries for one vertex are expected; the highest-priority live
/// one wins and the rest die as stale.
#[derive(Debug)]
pub struct BoundaryQueue {
    heap: BinaryHeap<Entry>,
    live: BitVec,
    cols: usize,
    sequence: u64,
}

impl BoundaryQueue {
    /// Create an empty queue for an image of the given dimensions
    pub fn new(dims: Dimensions) -> Self {
        Self {
            heap: BinaryHeap::new(),
            live: BitVec::repeat(false, dims.0 * dims.1),
            cols: dims.1,
            sequence: 0,
        }
    }

    fn bit_index(&self, v: Vertex) -> Option<usize> {
        if v[1] >= self.cols {
            return None;
        }
        let index = v[0] * self.cols + v[1];
        (index < self.live.len()).then_some(index)
    }

    /// Enqueue a vertex at the given priority and mark it live
    ///
    /// Re-pushing an already-live vertex is the supported way to raise or
    /// lower its priority; the old entry becomes stale only if the new one
    /// pops first.
    pub fn push(&mut self, vertex: Vertex, priority: f64) {
        let Some(index) = self.bit_index(vertex) else {
            return;
        };
        self.live.set(index, true);
        self.heap.push(Entry {
            priority,
            sequence: self.sequence,
            vertex,
        });
        self.sequence += 1;
    }

    /// Mark a vertex stale without touching the heap
    pub fn invalidate(&mut self, vertex: Vertex) {
        if let Some(index) = self.bit_index(vertex) {
            self.live.set(index, false);
        }
    }

    /// Whether the vertex is currently live
    pub fn is_live(&self, vertex: Vertex) -> bool {
        self.bit_index(vertex)
            .is_some_and(|index| self.live.get(index).is_some_and(|bit| *bit))
    }

    /// Pop the highest-priority live vertex, discarding stale entries
    ///
    /// Returns `None` when no live entry remains, which signals completion.
    pub fn pop(&mut self) -> Option<(Vertex, f64)> {
        while let Some(entry) = self.heap.pop() {
            if self.is_live(entry.vertex) {
                return Some((entry.vertex, entry.priority));
            }
        }
        None
    }

    /// Number of live vertices (not heap entries)
    pub fn live_count(&self) -> usize {
        self.live.count_ones()
    }

    /// Enumerate live vertices in row-major order
    pub fn live_vertices(&self) -> Vec<Vertex> {
        self.live
            .iter_ones()
            .map(|index| [index / self.cols, index % self.cols])
            .collect()
    }
}
