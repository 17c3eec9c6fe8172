/// Exclusive upper bound on a strike offset: offsets are stored in 48 bits.
pub const OFFSET_LIMIT: u64 = 1 << 48;

const P_BITS: u32 = 16;
const P_MASK: u64 = (1 << P_BITS) - 1;

/// A prime record packed into 64 bits.
///
/// The low 16 bits hold the prime relative to its owning segment's base
/// (`p = p_repr + index * B`); the high 48 bits hold the global position of
/// the next composite this prime will strike.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
#[repr(transparent)]
pub struct Entry(u64);

impl Entry {
    #[inline]
    pub fn new(p_repr: u16, offset: u64) -> Self {
        debug_assert!(offset < OFFSET_LIMIT, "offset {} exceeds 48 bits", offset);
        Entry((offset << P_BITS) | p_repr as u64)
    }

    #[inline]
    pub fn from_bits(bits: u64) -> Self {
        Entry(bits)
    }

    #[inline]
    pub fn to_bits(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn p_repr(self) -> u16 {
        (self.0 & P_MASK) as u16
    }

    #[inline]
    pub fn offset(self) -> u64 {
        self.0 >> P_BITS
    }

    #[inline]
    pub fn set_offset(&mut self, offset: u64) {
        debug_assert!(offset < OFFSET_LIMIT, "offset {} exceeds 48 bits", offset);
        self.0 = (offset << P_BITS) | (self.0 & P_MASK);
    }

    /// Reconstruct the prime given the base of the segment owning this record.
    #[inline]
    pub fn prime(self, base: u64) -> u64 {
        base + self.p_repr() as u64
    }
}

impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry")
            .field("p_repr", &self.p_repr())
            .field("offset", &self.offset())
            .finish()
    }
}
