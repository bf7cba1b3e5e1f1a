//! Removal of masked-out blocks and remapping of support offsets.

use tracing::info;

use crate::mask::Mask;
use crate::precedence::Precedence;
use crate::values::BlockValues;

/// Values and precedence re-indexed over the relevant blocks only.
#[derive(Debug, Clone, PartialEq)]
pub struct CompactProblem {
    pub values: BlockValues,
    pub precedence: Precedence,
}

impl CompactProblem {
    /// Number of blocks in the compacted index space.
    pub fn block_count(&self) -> usize {
        self.precedence.block_count()
    }
}

/// Compacts `values` and `precedence` to the blocks selected by `mask`.
///
/// Value rows keep relevant positions in their original order. A support
/// offset `o` of block `i` survives only if `i + o` is relevant, and shrinks by
/// the number of masked-out blocks strictly between the two. Blocks whose
/// rewritten definition is empty lose their key. Rewritten definitions are
/// deduplicated by sequence equality.
///
/// # Panics
///
/// Panics if `mask`, `precedence` and the value rows disagree on block count.
pub fn compact(mask: &Mask, values: &BlockValues, precedence: &Precedence) -> CompactProblem {
    let n = mask.len();
    assert_eq!(precedence.block_count(), n, "precedence/mask size mismatch");
    assert_eq!(values.block_count(), n, "values/mask size mismatch");

    let count = mask.count();
    info!(
        event = "compaction_start",
        original = n,
        compacted = count,
        reduction_pct = if n == 0 { 0.0 } else { (n - count) as f64 / n as f64 * 100.0 },
    );

    let rows = values
        .realizations()
        .map(|row| mask.positions().map(|i| row[i]).collect())
        .collect();

    let compacted = CompactProblem {
        values: BlockValues::from_rows_unchecked(rows),
        precedence: compact_precedence(mask, count, precedence),
    };
    compacted.precedence.log_summary("compacted");
    compacted
}

fn compact_precedence(mask: &Mask, count: usize, precedence: &Precedence) -> Precedence {
    let n = mask.len();
    let mut out = Precedence::with_block_count(count);
    // Masked-out blocks at or above each index.
    let mut zeros_above = vec![0usize; n];
    let mut zeros = 0usize;
    let mut j = count;
    let mut def = Vec::new();

    for i in (0..n).rev() {
        if !mask.get(i) {
            zeros += 1;
            zeros_above[i] = zeros;
            continue;
        }
        zeros_above[i] = zeros;
        j -= 1;

        let Some(old) = precedence.definition(i) else {
            continue;
        };

        // Targets lie above `i`, so their counts are already known.
        def.clear();
        for &off in old {
            let target = i.wrapping_add_signed(off);
            if mask.get(target) {
                def.push(off - zeros as isize + zeros_above[target] as isize);
            }
        }
        if !def.is_empty() {
            let key = out.add_definition(def.clone());
            out.set_key(j, Some(key));
        }
    }

    out
}

#[cfg(test)]
#[path = "compact_tests.rs"]
mod tests;
