//! Tests for the relevance mask.

use proptest::prelude::*;

use super::*;

fn values(rows: Vec<Vec<f64>>) -> BlockValues {
    let n = rows[0].len();
    BlockValues::new(rows, n).unwrap()
}

#[test]
fn test_build_marks_non_negative_blocks() {
    let mask = Mask::build(&values(vec![vec![5.0, -1.0, 0.0, -2.0, 1.0]]), 5);
    assert_eq!(mask.as_slice(), &[true, false, true, false, true]);
    assert_eq!(mask.count(), 3);
}

#[test]
fn test_any_realization_keeps_block() {
    let mask = Mask::build(&values(vec![vec![-1.0, -1.0, 3.0], vec![-1.0, 2.0, 3.0]]), 3);
    assert_eq!(mask.as_slice(), &[false, true, true]);
}

#[test]
fn test_trailing_air_is_trimmed() {
    let mask = Mask::build(&values(vec![vec![-1.0, 4.0, 0.0, 0.0], vec![-1.0, 4.0, 0.0, 0.0]]), 4);
    assert_eq!(mask.as_slice(), &[false, true, false, false]);
}

#[test]
fn test_trim_stops_at_first_non_zero() {
    let mask = Mask::build(&values(vec![vec![0.0, 0.0, -3.0, 0.0]]), 4);
    assert_eq!(mask.as_slice(), &[true, true, false, false]);
}

#[test]
fn test_leading_air_is_not_trimmed() {
    // Trimming only walks back from the last block; zeros at the start stay.
    let mask = Mask::build(&values(vec![vec![0.0, 0.0, 7.0, -1.0]]), 4);
    assert_eq!(mask.as_slice(), &[true, true, true, false]);
}

#[test]
fn test_block_zero_never_trimmed() {
    let mask = Mask::build(&values(vec![vec![0.0, 0.0, 0.0]]), 3);
    assert_eq!(mask.as_slice(), &[true, false, false]);
}

#[test]
fn test_close_under_precedence() {
    let pre = Precedence::from_parts(vec![Some(0), Some(0), None, None], vec![vec![2]]);
    let mut mask = Mask::from_bits(vec![true, false, false, false]);
    mask.close_under(&pre);
    assert_eq!(mask.as_slice(), &[true, false, true, false]);
}

#[test]
fn test_expand_scatters_selection() {
    let mask = Mask::from_bits(vec![true, false, true, true, false]);
    assert_eq!(mask.positions().collect::<Vec<_>>(), vec![0, 2, 3]);
    assert_eq!(
        mask.expand(&[false, true, true]),
        vec![false, false, true, true, false]
    );
    assert_eq!(mask.expand(&[true; 3]), mask.as_slice());
}

fn forward_precedence(n: usize) -> impl Strategy<Value = Precedence> {
    let def = prop::collection::vec(1isize..4, 0..3);
    (prop::collection::vec(def, 1..4), prop::collection::vec(any::<u8>(), n)).prop_map(
        move |(defs, picks)| {
            let mut pre = Precedence::with_block_count(n);
            let keys: Vec<usize> = defs.into_iter().map(|d| pre.add_definition(d)).collect();
            for (i, pick) in picks.into_iter().enumerate() {
                let key = keys[pick as usize % keys.len()];
                let fits = pre.definitions()[key].iter().all(|&o| i as isize + o < n as isize);
                if pick % 3 != 0 && fits {
                    pre.set_key(i, Some(key));
                }
            }
            pre
        },
    )
}

proptest! {
    #[test]
    fn test_close_is_idempotent(
        pre in forward_precedence(24),
        bits in prop::collection::vec(any::<bool>(), 24),
    ) {
        let mut once = Mask::from_bits(bits);
        once.close_under(&pre);
        prop_assert!(pre.is_closed(once.as_slice()));

        let mut twice = once.clone();
        twice.close_under(&pre);
        prop_assert_eq!(once, twice);
    }
}
