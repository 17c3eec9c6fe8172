use crate::entry::OFFSET_LIMIT;
use crate::error::{Error, Result};

/// Smallest supported block size exponent (B = 4).
pub const MIN_BLOCK_SIZE_LOG2: u32 = 2;
/// Largest supported block size exponent. `Entry::p_repr` is 16 bits wide.
pub const MAX_BLOCK_SIZE_LOG2: u32 = 16;

pub const DEFAULT_BLOCK_SIZE_LOG2: u32 = 16;
pub const DEFAULT_MR_SMALL_THRESHOLD: u64 = 1024;

/// Tuning knobs shared by the sieve engine and the primality tester.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SieveConfig {
    /// Segment width is `2^block_size_log2`.
    pub block_size_log2: u32,
    /// Inputs strictly below this are decided by trial division.
    pub mr_small_threshold: u64,
}

impl Default for SieveConfig {
    fn default() -> Self {
        Self {
            block_size_log2: DEFAULT_BLOCK_SIZE_LOG2,
            mr_small_threshold: DEFAULT_MR_SMALL_THRESHOLD,
        }
    }
}

impl SieveConfig {
    pub fn new(block_size_log2: u32, mr_small_threshold: u64) -> Result<Self> {
        let config = Self {
            block_size_log2,
            mr_small_threshold,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_block_size_log2(block_size_log2: u32) -> Result<Self> {
        Self::new(block_size_log2, DEFAULT_MR_SMALL_THRESHOLD)
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_BLOCK_SIZE_LOG2..=MAX_BLOCK_SIZE_LOG2).contains(&self.block_size_log2) {
            return Err(Error::InvalidConfig(format!(
                "block_size_log2 must be in [{}, {}], got {}",
                MIN_BLOCK_SIZE_LOG2, MAX_BLOCK_SIZE_LOG2, self.block_size_log2
            )));
        }
        Ok(())
    }

    pub fn block_size(&self) -> u64 {
        1 << self.block_size_log2
    }

    /// Segments `0..max_segments()` can be sieved without a strike offset
    /// leaving 48 bits. Offsets after sweeping segment i stay below
    /// `2 * (i + 1) * B`.
    pub fn max_segments(&self) -> u64 {
        (OFFSET_LIMIT / 2) / self.block_size()
    }

    /// Reject a run of `segments` segments that would pass `max_segments`.
    pub fn check_segments(&self, segments: u64) -> Result<()> {
        if segments > self.max_segments() {
            return Err(Error::RangeOverflow {
                index: segments - 1,
            });
        }
        Ok(())
    }
}
