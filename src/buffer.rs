//! The shared sieve buffer.
//!
//! One allocation of B words serves every segment. While a segment is being
//! swept the words are candidate integers ([`Candidates`]); compaction packs
//! the surviving primes into [`Entry`] records at the low end of the same
//! words ([`Records`]). The phase types borrow the buffer exclusively, so a
//! slot is only ever read as the type the current phase says it holds.

use crate::entry::Entry;
use crate::error::Result;

pub struct SieveBuffer {
    slots: Vec<u64>,
}

impl SieveBuffer {
    pub fn with_len(len: usize) -> Result<Self> {
        let mut slots = Vec::new();
        slots.try_reserve_exact(len)?;
        slots.resize(len, 0);
        Ok(Self { slots })
    }

    /// Load the identity map `slot[j] = base + j` and enter the candidate phase.
    pub fn candidates(&mut self, base: u64) -> Candidates<'_> {
        for (j, slot) in self.slots.iter_mut().enumerate() {
            *slot = base + j as u64;
        }
        Candidates {
            slots: &mut self.slots,
            base,
        }
    }
}

/// Candidate phase: slot `j` holds `base + j`, or 0 once struck.
pub struct Candidates<'a> {
    slots: &'a mut [u64],
    base: u64,
}

impl<'a> Candidates<'a> {
    pub fn base(&self) -> u64 {
        self.base
    }

    /// Global coordinate one past the last slot.
    pub fn end(&self) -> u64 {
        self.base + self.slots.len() as u64
    }

    #[inline]
    pub fn get(&self, j: usize) -> u64 {
        self.slots[j]
    }

    /// Zero every multiple of `prime` from global position `offset` to the
    /// end of the buffer. Returns the global position of the first multiple
    /// past the buffer, which is where this prime strikes next.
    #[inline]
    pub fn strike(&mut self, prime: u64, offset: u64) -> u64 {
        debug_assert!(offset >= self.base, "offset {} behind base {}", offset, self.base);
        let len = self.slots.len() as u64;
        let mut j = offset - self.base;
        while j < len {
            self.slots[j as usize] = 0;
            j += prime;
        }
        self.base + j
    }

    /// Pack every surviving candidate at or after slot `from` into a record
    /// built by `make`, writing from slot 0 upward.
    ///
    /// The write index never passes the read index, so no unread candidate
    /// is overwritten.
    pub fn compact<F>(self, from: usize, mut make: F) -> Records<'a>
    where
        F: FnMut(u64) -> Entry,
    {
        let mut written = 0;
        for read in from..self.slots.len() {
            let q = self.slots[read];
            if q != 0 {
                debug_assert!(written <= read);
                self.slots[written] = make(q).to_bits();
                written += 1;
            }
        }
        let slots: &'a [u64] = self.slots;
        Records {
            slots: &slots[..written],
        }
    }
}

/// Record phase: the low slots hold packed entries for one segment's primes.
pub struct Records<'a> {
    slots: &'a [u64],
}

impl Records<'_> {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Entry> + '_ {
        self.slots.iter().map(|&bits| Entry::from_bits(bits))
    }

    /// Append the records to `table`, which must already have room for
    /// them so that nothing allocates here.
    pub fn write_to(&self, table: &mut Vec<Entry>) {
        debug_assert!(table.capacity() - table.len() >= self.slots.len());
        table.extend(self.iter());
    }
}
