//! Priority collections used by the layered graph traversals.
//!
//! A traversal owns two queues: a min-heap of candidates still to expand
//! ([`CandidateQueue`]) and a bounded max-heap of the nearest nodes found so
//! far ([`ResultQueue`]), whose root is the exact furthest element and serves
//! as the pruning bound. Neither is thread-safe; every traversal allocates or
//! reuses its own instances.
//!
//! [`VisitedSet`] is the traversal's dense visited table, sized from a
//! snapshot of the id space so that nodes inserted concurrently with the
//! traversal are ignored rather than chased.

use crate::node::NodeRef;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// A node paired with its distance to the traversal target.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    /// Distance to the target (lower is closer).
    pub distance: f64,
    /// The node itself.
    pub node: NodeRef,
}

impl Candidate {
    pub fn new(distance: f64, node: NodeRef) -> Self {
        Self { distance, node }
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance && self.node.id == other.node.id
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Distances are finite for any well-behaved metric; ids break ties
        // so the order is total and deterministic.
        self.distance
            .partial_cmp(&other.distance)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.node.id.cmp(&other.node.id))
    }
}

/// Min-heap frontier: pops the nearest unexpanded candidate first.
#[derive(Debug, Default)]
pub(crate) struct CandidateQueue {
    heap: BinaryHeap<Reverse<Candidate>>,
}

impl CandidateQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, candidate: Candidate) {
        self.heap.push(Reverse(candidate));
    }

    /// Remove and return the nearest candidate.
    pub fn pop_nearest(&mut self) -> Option<Candidate> {
        self.heap.pop().map(|Reverse(c)| c)
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

/// Bounded max-heap result set: the root is the furthest element kept.
///
/// Callers keep it at `ef` elements by pushing and then popping the furthest
/// when the length exceeds the bound.
#[derive(Debug, Default)]
pub(crate) struct ResultQueue {
    heap: BinaryHeap<Candidate>,
}

impl ResultQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, candidate: Candidate) {
        self.heap.push(candidate);
    }

    /// Distance of the furthest element, or infinity when empty.
    ///
    /// An upper bound on every enqueued distance; used as the pruning bound
    /// during traversal.
    pub fn furthest_distance(&self) -> f64 {
        self.heap.peek().map_or(f64::INFINITY, |c| c.distance)
    }

    /// Remove the furthest element.
    pub fn pop_furthest(&mut self) -> Option<Candidate> {
        self.heap.pop()
    }

    /// The nearest element currently held. O(n) scan; the heap only
    /// addresses the furthest end in O(1).
    pub fn nearest(&self) -> Option<&Candidate> {
        self.heap.iter().min()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    /// Drain into a vector sorted ascending by distance.
    pub fn take_sorted(&mut self) -> Vec<Candidate> {
        std::mem::take(&mut self.heap).into_sorted_vec()
    }
}

/// Dense visited table keyed by node id, bounded by an id-space snapshot.
///
/// Ids at or beyond the bound are reported as already visited, so an
/// in-flight traversal silently skips nodes inserted after it started.
#[derive(Debug)]
pub(crate) struct VisitedSet {
    seen: Vec<bool>,
}

impl VisitedSet {
    /// Create a table covering ids `0..bound`.
    pub fn new(bound: usize) -> Self {
        Self {
            seen: vec![false; bound],
        }
    }

    /// Mark `id` visited. Returns `true` if the id is inside the bound and
    /// had not been visited before.
    pub fn insert(&mut self, id: u32) -> bool {
        match self.seen.get_mut(id as usize) {
            Some(slot) if !*slot => {
                *slot = true;
                true
            }
            _ => false,
        }
    }

    /// Reset all marks, keeping the bound.
    pub fn clear(&mut self) {
        self.seen.fill(false);
    }
}
