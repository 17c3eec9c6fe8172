//! Segmented Sieve of Eratosthenes with heap-ordered prime records.
//!
//! Segment i covers `[i*B, (i+1)*B)`. Segment 0 is sieved classically; each
//! later segment is struck by every previously found prime and its survivors
//! are compacted into a new table of records.
//! - Memory: one B-word buffer plus 8 bytes per prime found
//! - Segment 0 primes strike every segment and are swept linearly
//! - Later primes sit in per-segment min-heaps keyed on their next strike,
//!   so primes with nothing to strike in the current segment are never visited

use tracing::{debug, trace};

use crate::buffer::SieveBuffer;
use crate::config::SieveConfig;
use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::segment::SegmentTable;

pub struct SieveState {
    config: SieveConfig,
    buffer: SieveBuffer,
    tables: Vec<SegmentTable>,
    count: u64,
}

impl SieveState {
    /// Allocate the shared buffer and an empty list of segment tables.
    pub fn init(config: SieveConfig) -> Result<Self> {
        config.validate()?;
        let buffer = SieveBuffer::with_len(config.block_size() as usize)?;
        Ok(Self {
            config,
            buffer,
            tables: Vec::new(),
            count: 0,
        })
    }

    pub fn with_block_size_log2(block_size_log2: u32) -> Result<Self> {
        Self::init(SieveConfig::with_block_size_log2(block_size_log2)?)
    }

    pub fn config(&self) -> &SieveConfig {
        &self.config
    }

    pub fn block_size(&self) -> u64 {
        self.config.block_size()
    }

    pub fn segments_done(&self) -> u64 {
        self.tables.len() as u64
    }

    /// Every prime below this bound has been recorded.
    pub fn upper_bound(&self) -> u64 {
        self.segments_done() * self.block_size()
    }

    pub fn max_segments(&self) -> u64 {
        self.config.max_segments()
    }

    pub fn tables(&self) -> &[SegmentTable] {
        &self.tables
    }

    /// Total primes recorded so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Sieve `[0, B)` and record its primes. Returns how many were found.
    pub fn run_first_segment(&mut self) -> Result<u64> {
        if !self.tables.is_empty() {
            return Err(Error::OutOfOrder {
                expected: self.segments_done(),
                requested: 0,
            });
        }
        let mut entries = self.reserve_segment()?;

        let block_size = self.block_size();
        let mut cands = self.buffer.candidates(0);
        for j in 2..block_size as usize {
            let p = cands.get(j);
            if p != 0 && 2 * p < block_size {
                cands.strike(p, 2 * p);
            }
        }

        // Slots 0 and 1 hold 0 and 1, neither prime.
        let records = cands.compact(2, |p| Entry::new(p as u16, block_size.div_ceil(p) * p));
        records.write_to(&mut entries);
        Ok(self.push_table(0, 0, entries))
    }

    /// Sieve segment `index` using every table recorded so far, then record
    /// its primes. `index` must be the next pending segment.
    ///
    /// On error nothing has been swept, so the same call can be retried.
    pub fn run_segment(&mut self, index: u64) -> Result<u64> {
        if self.tables.is_empty() {
            return Err(Error::NotStarted);
        }
        if index >= self.max_segments() {
            return Err(Error::RangeOverflow { index });
        }
        let expected = self.segments_done();
        if index != expected {
            return Err(Error::OutOfOrder {
                expected,
                requested: index,
            });
        }
        let entries = self.reserve_segment()?;
        Ok(self.sieve_segment(index, entries))
    }

    /// Every allocation a segment needs: a slot in `tables` and room for up
    /// to B records. Sweeps advance offsets in place and cannot be undone, so
    /// this runs before any of them.
    fn reserve_segment(&mut self) -> Result<Vec<Entry>> {
        self.tables.try_reserve(1)?;
        let mut entries = Vec::new();
        entries.try_reserve_exact(self.block_size() as usize)?;
        Ok(entries)
    }

    fn sieve_segment(&mut self, index: u64, mut entries: Vec<Entry>) -> u64 {
        let block_size = self.block_size();
        let base = index * block_size;
        let end = base + block_size;

        let mut cands = self.buffer.candidates(base);
        let (first, rest) = self.tables.split_at_mut(1);
        first[0].sweep_linear(&mut cands);
        let mut struck = 0;
        for table in rest.iter_mut() {
            struck += table.sweep_heap(&mut cands, end);
        }
        trace!(segment = index, struck, "heap tables swept");

        let records = cands.compact(0, |q| {
            // q >= i*B and i >= 1 give 2q >= 2iB >= (i+1)B
            debug_assert!(2 * q >= end);
            Entry::new((q - base) as u16, 2 * q)
        });
        records.write_to(&mut entries);
        self.push_table(index, base, entries)
    }

    fn push_table(&mut self, index: u64, base: u64, mut entries: Vec<Entry>) -> u64 {
        entries.shrink_to_fit();
        let found = entries.len() as u64;
        self.tables.push(SegmentTable::new(index, base, entries));
        self.count += found;
        debug!(segment = index, found, total = self.count, "segment sieved");
        found
    }

    /// Drive the sieve until `total` segments are done. Returns the prime count.
    pub fn run_segments(&mut self, total: u64) -> Result<u64> {
        if total == 0 {
            return Ok(self.count);
        }
        self.config.check_segments(total)?;
        if self.tables.is_empty() {
            self.run_first_segment()?;
        }
        for index in self.segments_done()..total {
            self.run_segment(index)?;
        }
        Ok(self.count)
    }

    /// Walk every table in segment order, yielding primes in ascending order.
    pub fn enumerate(&self) -> Primes<'_> {
        Primes {
            tables: self.tables.iter(),
            current: Vec::new().into_iter(),
        }
    }
}

/// Lazy iterator over the recorded primes.
///
/// Heap-ordered tables are sorted one segment at a time as the walk reaches
/// them; the state itself is not modified.
pub struct Primes<'a> {
    tables: std::slice::Iter<'a, SegmentTable>,
    current: std::vec::IntoIter<u64>,
}

impl Iterator for Primes<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        loop {
            if let Some(p) = self.current.next() {
                return Some(p);
            }
            let table = self.tables.next()?;
            let mut primes: Vec<u64> = table.primes().collect();
            if table.is_heap_ordered() {
                primes.sort_unstable();
            }
            self.current = primes.into_iter();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::simple_sieve;
    use crate::error::ErrorKind;

    #[test]
    fn test_block_16_two_segments() {
        let mut state = SieveState::with_block_size_log2(4).unwrap();
        assert_eq!(state.run_first_segment().unwrap(), 6);
        assert_eq!(state.run_segment(1).unwrap(), 5);
        let primes: Vec<u64> = state.enumerate().collect();
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31]);
        assert_eq!(state.count(), 11);
    }

    #[test]
    fn test_block_64_two_segments() {
        let mut state = SieveState::with_block_size_log2(6).unwrap();
        assert_eq!(state.run_segments(2).unwrap(), 31);
        assert_eq!(state.enumerate().last(), Some(127));
        assert_eq!(state.upper_bound(), 128);
    }

    #[test]
    fn test_smallest_block_size() {
        let mut state = SieveState::with_block_size_log2(2).unwrap();
        state.run_segments(64).unwrap();
        let primes: Vec<u64> = state.enumerate().collect();
        assert_eq!(primes, simple_sieve(256));
    }

    #[test]
    fn test_segment_zero_offsets_are_first_strike_past_block() {
        let mut state = SieveState::with_block_size_log2(4).unwrap();
        state.run_first_segment().unwrap();
        let table = &state.tables()[0];
        let pairs: Vec<(u64, u64)> =
            table.entries().iter().map(|e| (e.prime(0), e.offset())).collect();
        assert_eq!(pairs, vec![(2, 16), (3, 18), (5, 20), (7, 21), (11, 22), (13, 26)]);
    }

    #[test]
    fn test_later_segment_offsets_start_at_double() {
        let mut state = SieveState::with_block_size_log2(4).unwrap();
        state.run_segments(2).unwrap();
        let table = &state.tables()[1];
        assert_eq!(table.index(), 1);
        for e in table.entries() {
            assert_eq!(e.offset(), 2 * e.prime(16));
        }
    }

    #[test]
    fn test_run_segment_before_first_is_misuse() {
        let mut state = SieveState::with_block_size_log2(4).unwrap();
        let err = state.run_segment(1).unwrap_err();
        assert!(matches!(err, Error::NotStarted));
        assert_eq!(err.kind(), ErrorKind::Misuse);
        assert_eq!(state.segments_done(), 0);
    }

    #[test]
    fn test_out_of_order_segment_leaves_state_unchanged() {
        let mut state = SieveState::with_block_size_log2(4).unwrap();
        state.run_segments(2).unwrap();
        let before: Vec<u64> = state.enumerate().collect();

        let err = state.run_segment(3).unwrap_err();
        assert!(matches!(err, Error::OutOfOrder { expected: 2, requested: 3 }));
        assert!(matches!(
            state.run_segment(1),
            Err(Error::OutOfOrder { expected: 2, requested: 1 })
        ));
        assert!(matches!(
            state.run_first_segment(),
            Err(Error::OutOfOrder { expected: 2, requested: 0 })
        ));

        assert_eq!(state.segments_done(), 2);
        assert_eq!(state.count(), 11);
        assert_eq!(state.enumerate().collect::<Vec<_>>(), before);
    }

    #[test]
    fn test_segment_past_offset_range_is_rejected() {
        let mut state = SieveState::with_block_size_log2(16).unwrap();
        state.run_first_segment().unwrap();
        assert_eq!(state.max_segments(), 1 << 31);
        let err = state.run_segment(1 << 31).unwrap_err();
        assert!(matches!(err, Error::RangeOverflow { index } if index == 1 << 31));
        assert_eq!(err.kind(), ErrorKind::RangeOverflow);
        assert_eq!(state.count(), 6542);

        let mut state = SieveState::with_block_size_log2(2).unwrap();
        state.run_first_segment().unwrap();
        assert!(matches!(
            state.run_segment(u64::MAX),
            Err(Error::RangeOverflow { .. })
        ));
    }

    fn offsets(state: &SieveState) -> Vec<u64> {
        state
            .tables()
            .iter()
            .flat_map(|t| t.entries().iter().map(|e| e.offset()))
            .collect()
    }

    #[test]
    fn test_segment_reservation_leaves_offsets_untouched() {
        let mut state = SieveState::with_block_size_log2(4).unwrap();
        state.run_segments(2).unwrap();
        let before = offsets(&state);

        // A failed reservation returns before this point; dropping the
        // reservation leaves the state as a failed run_segment would.
        let entries = state.reserve_segment().unwrap();
        assert!(entries.capacity() >= 16);
        drop(entries);
        assert_eq!(offsets(&state), before);
        assert_eq!(state.segments_done(), 2);

        assert_eq!(state.run_segment(2).unwrap(), 4);
        let primes: Vec<u64> = state.enumerate().skip(11).collect();
        assert_eq!(primes, vec![37, 41, 43, 47]);
        assert_eq!(state.count(), 15);
    }

    #[test]
    fn test_run_segments_checks_range_up_front() {
        let mut state = SieveState::with_block_size_log2(16).unwrap();
        let err = state.run_segments((1 << 31) + 1).unwrap_err();
        assert!(matches!(err, Error::RangeOverflow { index } if index == 1 << 31));
        assert_eq!(state.segments_done(), 0);
    }

    #[test]
    fn test_enumerate_is_restartable() {
        let mut state = SieveState::with_block_size_log2(5).unwrap();
        state.run_segments(12).unwrap();
        let first: Vec<u64> = state.enumerate().collect();
        let second: Vec<u64> = state.enumerate().collect();
        assert_eq!(first, second);
        assert_eq!(first.len() as u64, state.count());
    }

    #[test]
    fn test_empty_state() {
        let mut state = SieveState::init(SieveConfig::default()).unwrap();
        assert_eq!(state.count(), 0);
        assert_eq!(state.enumerate().next(), None);
        assert_eq!(state.run_segments(0).unwrap(), 0);
    }

    #[test]
    fn test_invalid_block_size_rejected() {
        let err = SieveState::with_block_size_log2(17).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
