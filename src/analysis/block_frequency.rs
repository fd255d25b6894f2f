use std::collections::HashMap;

use crate::{block::BlockId, WeightSource};

/// Source of per-block execution estimates. Computing them is somebody else's job; this is
/// only how the profiler asks.
pub trait BlockFrequency {
    /// Relative frequency of `block`, with the entry block at some fixed scale.
    fn block_freq(&self, block: BlockId) -> Option<u64>;

    /// Estimated absolute execution count of `block`. Oracles that only know one kind of
    /// number answer the same for both.
    fn block_profile_count(&self, block: BlockId) -> Option<u64> {
        self.block_freq(block)
    }
}

impl<F> BlockFrequency for F
where
    F: Fn(BlockId) -> Option<u64>,
{
    fn block_freq(&self, block: BlockId) -> Option<u64> {
        self(block)
    }
}

pub fn block_weight<B: BlockFrequency + ?Sized>(
    bfi: &B,
    block: BlockId,
    source: WeightSource,
) -> Option<u64> {
    match source {
        WeightSource::ProfileCount => bfi.block_profile_count(block),
        WeightSource::RelativeFrequency => bfi.block_freq(block),
    }
}

/// Table of externally computed block frequencies.
///
/// Profile counts are derived the usual way: `entry_count * freq(block) / freq(entry)`. Without
/// an entry count, or without a non-zero entry frequency, there is no profile count.
#[derive(Debug, Clone)]
pub struct BlockFrequencyInfo {
    freqs: HashMap<BlockId, u64>,
    entry_count: Option<u64>,
}

impl BlockFrequencyInfo {
    pub fn new() -> Self {
        Self {
            freqs: HashMap::new(),
            entry_count: None,
        }
    }

    pub fn with_entry_count(mut self, count: u64) -> Self {
        self.entry_count = Some(count);
        self
    }

    pub fn entry_count(&self) -> Option<u64> {
        self.entry_count
    }

    pub fn set_block_freq(&mut self, block: BlockId, freq: u64) {
        self.freqs.insert(block, freq);
    }

    /// Frequency of the entry block, which is always the first block.
    pub fn entry_freq(&self) -> Option<u64> {
        self.freqs.get(&BlockId(0)).copied()
    }
}

impl Default for BlockFrequencyInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<(BlockId, u64)> for BlockFrequencyInfo {
    fn from_iter<T: IntoIterator<Item = (BlockId, u64)>>(iter: T) -> Self {
        let mut bfi = Self::new();
        for (block, freq) in iter {
            bfi.set_block_freq(block, freq);
        }
        bfi
    }
}

impl BlockFrequency for BlockFrequencyInfo {
    fn block_freq(&self, block: BlockId) -> Option<u64> {
        self.freqs.get(&block).copied()
    }

    fn block_profile_count(&self, block: BlockId) -> Option<u64> {
        let entry_count = self.entry_count?;
        let entry_freq = self.entry_freq().filter(|freq| *freq != 0)?;
        let freq = self.block_freq(block)?;

        // Round to nearest; the intermediate product does not fit in u64 in general.
        let scaled = (entry_count as u128 * freq as u128 + entry_freq as u128 / 2) / entry_freq as u128;
        Some(u64::try_from(scaled).unwrap_or(u64::MAX))
    }
}
