//! Brute-force maximum closure for tiny problems.
//!
//! `supports[i]` lists the blocks that must be selected whenever block `i` is.

/// Largest problem the oracle will enumerate.
pub const MAX_ORACLE_BLOCKS: usize = 22;

/// True if every selected block has all of its supports selected.
pub fn is_closed(selection: &[bool], supports: &[Vec<usize>]) -> bool {
    selection
        .iter()
        .enumerate()
        .filter(|(_, &s)| s)
        .all(|(i, _)| supports[i].iter().all(|&t| selection[t]))
}

/// Sum of the values of selected blocks.
pub fn selection_value(values: &[f64], selection: &[bool]) -> f64 {
    values
        .iter()
        .zip(selection)
        .filter(|(_, &s)| s)
        .map(|(v, _)| v)
        .sum()
}

/// Value of the best closed selection, by enumeration of all subsets.
///
/// # Panics
///
/// Panics if the problem has more than [`MAX_ORACLE_BLOCKS`] blocks.
pub fn max_closure_value(values: &[f64], supports: &[Vec<usize>]) -> f64 {
    let n = values.len();
    assert!(n <= MAX_ORACLE_BLOCKS, "oracle limited to {MAX_ORACLE_BLOCKS} blocks");
    let support_bits: Vec<u32> = supports
        .iter()
        .map(|s| s.iter().fold(0u32, |acc, &t| acc | (1 << t)))
        .collect();

    let mut best = 0.0f64;
    for set in 0u32..(1u32 << n) {
        let closed = (0..n)
            .filter(|&i| set & (1 << i) != 0)
            .all(|i| set & support_bits[i] == support_bits[i]);
        if !closed {
            continue;
        }
        let value: f64 = (0..n)
            .filter(|&i| set & (1 << i) != 0)
            .map(|i| values[i])
            .sum();
        if value > best {
            best = value;
        }
    }
    best
}

/// Supports of a chain where block `i` needs block `i + 1`.
pub fn chain_supports(n: usize) -> Vec<Vec<usize>> {
    (0..n)
        .map(|i| if i + 1 < n { vec![i + 1] } else { Vec::new() })
        .collect()
}
