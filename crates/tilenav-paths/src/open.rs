//! The search frontier.
//!
//! A min-heap keyed by `(key, seq)`. `seq` is the order in which a node first
//! entered the frontier, so among equal keys the earliest arrival wins. A
//! node whose cost improves is pushed again with its original `seq`; the
//! outdated entry stays in the heap and is discarded by the caller when
//! popped (lazy deletion).

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Entry {
    key: OrderedFloat<f32>,
    seq: u64,
    idx: usize,
}

#[derive(Debug, Default)]
pub(crate) struct OpenSet {
    heap: BinaryHeap<Reverse<Entry>>,
    next_seq: u64,
}

impl OpenSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn clear(&mut self) {
        self.heap.clear();
        self.next_seq = 0;
    }

    /// Hand out the next insertion sequence number.
    pub(crate) fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    pub(crate) fn push(&mut self, idx: usize, key: f32, seq: u64) {
        self.heap.push(Reverse(Entry {
            key: OrderedFloat(key),
            seq,
            idx,
        }));
    }

    /// Index of the entry with the smallest `(key, seq)`.
    pub(crate) fn pop(&mut self) -> Option<usize> {
        self.heap.pop().map(|Reverse(e)| e.idx)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(open: &mut OpenSet, items: &[(usize, f32)]) {
        for &(idx, key) in items {
            let seq = open.next_seq();
            open.push(idx, key, seq);
        }
    }

    #[test]
    fn lowest_key_first() {
        let mut open = OpenSet::new();
        fill(&mut open, &[(0, 3.0), (1, 1.0), (2, 2.0)]);
        let order: Vec<usize> = std::iter::from_fn(|| open.pop()).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn ties_go_to_first_inserted() {
        let mut open = OpenSet::new();
        fill(&mut open, &[(7, 5.0), (3, 5.0), (9, 5.0), (1, 6.0)]);
        let order: Vec<usize> = std::iter::from_fn(|| open.pop()).collect();
        assert_eq!(order, vec![7, 3, 9, 1]);
    }

    #[test]
    fn improved_entry_keeps_its_place_among_ties() {
        let mut open = OpenSet::new();
        let a = open.next_seq();
        open.push(10, 9.0, a);
        let b = open.next_seq();
        open.push(11, 4.0, b);
        // node 10 improves to tie with node 11; it arrived first so it wins
        open.push(10, 4.0, a);
        assert_eq!(open.len(), 3);
        assert_eq!(open.pop(), Some(10));
        assert_eq!(open.pop(), Some(11));
        // the stale entry is still there for the caller to skip
        assert_eq!(open.pop(), Some(10));
        assert_eq!(open.pop(), None);
    }

    #[test]
    fn clear_resets_sequence() {
        let mut open = OpenSet::new();
        fill(&mut open, &[(0, 1.0), (1, 1.0)]);
        open.clear();
        assert_eq!(open.pop(), None);
        assert_eq!(open.next_seq(), 0);
    }
}
