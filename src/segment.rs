//! Per-segment prime tables.
//!
//! Each completed segment owns the records of the primes it contributed.
//! Segment 0's table is swept linearly: all of its primes are below B and
//! strike every later segment. Every later table is a min-heap on offset, so
//! a sweep only touches the primes whose next strike falls in the segment.

use crate::buffer::Candidates;
use crate::entry::Entry;

#[derive(Debug, Clone)]
pub struct SegmentTable {
    index: u64,
    base: u64,
    entries: Vec<Entry>,
}

impl SegmentTable {
    /// Wrap segment `index`'s records. Tables after segment 0 are heapified.
    pub fn new(index: u64, base: u64, entries: Vec<Entry>) -> Self {
        let mut table = Self {
            index,
            base,
            entries,
        };
        if table.is_heap_ordered() {
            table.heapify();
        }
        table
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Whether sweeps over this table go through the heap.
    pub fn is_heap_ordered(&self) -> bool {
        self.index > 0
    }

    /// Reconstructed primes in storage order.
    pub fn primes(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.iter().map(move |e| e.prime(self.base))
    }

    /// Strike with every prime in stored order.
    pub fn sweep_linear(&mut self, cands: &mut Candidates<'_>) {
        let base = self.base;
        for entry in &mut self.entries {
            let next = cands.strike(entry.prime(base), entry.offset());
            entry.set_offset(next);
        }
    }

    /// Strike with every prime whose next offset is below `end`, taking them
    /// from the heap root. Returns the number of primes that struck.
    pub fn sweep_heap(&mut self, cands: &mut Candidates<'_>, end: u64) -> usize {
        let mut struck = 0;
        while let Some(top) = self.entries.first().copied() {
            if top.offset() >= end {
                break;
            }
            let next = cands.strike(top.prime(self.base), top.offset());
            self.entries[0].set_offset(next);
            self.sift_down(0);
            struck += 1;
        }
        struck
    }

    /// Restore the heap below `parent` after its offset grew.
    fn sift_down(&mut self, mut parent: usize) {
        let entries = &mut self.entries;
        let count = entries.len();
        loop {
            let first = parent * 2 + 1;
            if first >= count {
                break;
            }
            let second = first + 1;
            let mut child = first;
            if second < count && entries[first].offset() > entries[second].offset() {
                child = second;
            }
            if entries[parent].offset() <= entries[child].offset() {
                break;
            }
            entries.swap(parent, child);
            parent = child;
        }
    }

    fn heapify(&mut self) {
        for parent in (0..self.entries.len() / 2).rev() {
            self.sift_down(parent);
        }
    }

    /// `offset(parent) <= offset(child)` throughout.
    pub fn is_heap(&self) -> bool {
        (1..self.entries.len())
            .all(|child| self.entries[(child - 1) / 2].offset() <= self.entries[child].offset())
    }
}
