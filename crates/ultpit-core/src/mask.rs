//! Relevance mask over grid blocks.

use tracing::info;

use crate::precedence::Precedence;
use crate::values::BlockValues;

/// Values at or above this threshold keep a block relevant.
pub const AIR_THRESHOLD: f64 = 0.0;

/// Marks blocks that cannot be ruled out of the pit before solving.
///
/// Built once from the block values, then closed under precedence once;
/// after that it only maps between full-grid and compacted positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    bits: Vec<bool>,
}

impl Mask {
    /// Builds the initial mask for `block_count` blocks.
    ///
    /// A block is relevant when any realization has a value at or above
    /// [`AIR_THRESHOLD`]. Then, walking back from the last block, blocks that
    /// are zero in every realization are cleared until the first non-zero
    /// block. Only trailing air is trimmed; block 0 is never cleared.
    pub fn build(values: &BlockValues, block_count: usize) -> Self {
        let mut bits: Vec<bool> = (0..block_count)
            .map(|i| {
                values
                    .realizations()
                    .any(|row| row.get(i).is_some_and(|&v| v >= AIR_THRESHOLD))
            })
            .collect();

        for i in (1..block_count).rev() {
            let air = values
                .realizations()
                .all(|row| row.get(i).map_or(true, |&v| v == 0.0));
            if !air {
                break;
            }
            bits[i] = false;
        }

        let mask = Self { bits };
        info!(event = "mask_built", blocks = block_count, relevant = mask.count());
        mask
    }

    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// Every block relevant.
    pub fn full(n: usize) -> Self {
        Self { bits: vec![true; n] }
    }

    #[inline]
    pub fn get(&self, i: usize) -> bool {
        self.bits[i]
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Number of relevant blocks.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    /// Marks the supports of every relevant keyed block relevant too.
    pub fn close_under(&mut self, precedence: &Precedence) {
        precedence.close(&mut self.bits);
    }

    /// Full-grid indices of relevant blocks, in order.
    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter_map(|(i, &b)| b.then_some(i))
    }

    /// Scatters a compacted selection back onto full-grid positions.
    ///
    /// `compacted` must have [`Mask::count`] entries; masked-out blocks come
    /// back unselected.
    pub fn expand(&self, compacted: &[bool]) -> Vec<bool> {
        debug_assert_eq!(compacted.len(), self.count());
        let mut full = vec![false; self.bits.len()];
        for (j, i) in self.positions().enumerate() {
            full[i] = compacted[j];
        }
        full
    }
}

#[cfg(test)]
#[path = "mask_tests.rs"]
mod tests;
