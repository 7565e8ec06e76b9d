//! Max-heap of scored candidates, shared by the lazy optimizers.
//!
//! The heap holds element ids with cached marginal scores, never owned
//! elements. Ordering is a total order on the score (`f64::total_cmp`) with
//! ties broken toward the lower id, so heap-driven and scan-driven
//! selection agree on deterministic inputs.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::element::ElementId;

/// A candidate id with its cached (possibly stale) marginal score.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Scored {
    pub id: ElementId,
    pub score: f64,
}

impl Scored {
    pub fn new(id: ElementId, score: f64) -> Self {
        Self { id, score }
    }
}

impl PartialEq for Scored {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scored {}

impl PartialOrd for Scored {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scored {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Max-priority queue keyed on marginal score.
pub(crate) type MarginalQueue = BinaryHeap<Scored>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highest_score_at_top() {
        let mut heap = MarginalQueue::new();
        heap.push(Scored::new(1, 0.5));
        heap.push(Scored::new(2, 2.0));
        heap.push(Scored::new(3, -1.0));
        assert_eq!(heap.pop().map(|s| s.id), Some(2));
        assert_eq!(heap.pop().map(|s| s.id), Some(1));
        assert_eq!(heap.pop().map(|s| s.id), Some(3));
    }

    #[test]
    fn test_ties_break_toward_lower_id() {
        let mut heap = MarginalQueue::new();
        heap.push(Scored::new(9, 1.0));
        heap.push(Scored::new(4, 1.0));
        heap.push(Scored::new(7, 1.0));
        assert_eq!(heap.pop().map(|s| s.id), Some(4));
        assert_eq!(heap.pop().map(|s| s.id), Some(7));
        assert_eq!(heap.pop().map(|s| s.id), Some(9));
    }

    #[test]
    fn test_nan_orders_consistently() {
        // total_cmp places NaN above every finite score; the heap must not
        // panic or lose entries when an oracle misbehaves.
        let mut heap = MarginalQueue::new();
        heap.push(Scored::new(1, f64::NAN));
        heap.push(Scored::new(2, 1.0));
        assert_eq!(heap.len(), 2);
        assert_eq!(heap.pop().map(|s| s.id), Some(1));
    }
}
