//! Small grids with hand-enumerated optimal pits.
//!
//! Grids use unit blocks. With one bench and a 60 degree slope the cone radius
//! is below one block, so every block outside the top layer depends only on
//! the block directly above it.

/// A single-realization problem with its expected outcome.
#[derive(Clone, Debug, PartialEq)]
pub struct Scenario {
    /// Block counts `[x, y, z]`.
    pub dims: [usize; 3],
    /// One value per block in grid index order.
    pub values: Vec<f64>,
    pub slope: f64,
    pub benches: u32,
    /// Optimal selection in grid index order, when it is unique.
    pub expected: Option<Vec<bool>>,
    /// Value of the optimal pit.
    pub optimum: f64,
}

/// Slope giving a single vertical support per block with one bench.
pub const VERTICAL_SLOPE: f64 = 60.0;

/// 2x2x2 grid: a rich bottom-corner block under cheap waste.
///
/// Block 0 (value 5) needs block 4 (value 2); everything else is -1 waste,
/// so the pit is exactly blocks 0 and 4.
pub fn two_by_two() -> Scenario {
    Scenario {
        dims: [2, 2, 2],
        values: vec![5.0, -1.0, -1.0, -1.0, 2.0, -1.0, -1.0, -1.0],
        slope: VERTICAL_SLOPE,
        benches: 1,
        expected: Some(vec![true, false, false, false, true, false, false, false]),
        optimum: 7.0,
    }
}

/// 3x3x2 grid of independent two-block columns.
///
/// Columns pay off at positions 0 (4-1), 4 (6-2) and 8 (2-1); the lone top
/// block 16 is worth 1. Block 14 is worth zero, so the optimum is not unique.
pub fn three_by_three() -> Scenario {
    let bottom = [4.0, -2.0, 1.0, 0.0, 6.0, -1.0, 3.0, -5.0, 2.0];
    let top = [-1.0, -1.0, -2.0, -3.0, -2.0, 0.0, -4.0, 1.0, -1.0];
    Scenario {
        dims: [3, 3, 2],
        values: bottom.iter().chain(top.iter()).copied().collect(),
        slope: VERTICAL_SLOPE,
        benches: 1,
        expected: None,
        optimum: 9.0,
    }
}

/// A pit that only pays when a deep block drags its whole column with it.
///
/// 1x1x4 column: the bottom block is worth 10, the three above cost 3 each.
pub fn deep_column() -> Scenario {
    Scenario {
        dims: [1, 1, 4],
        values: vec![10.0, -3.0, -3.0, -3.0],
        slope: VERTICAL_SLOPE,
        benches: 1,
        expected: Some(vec![true; 4]),
        optimum: 1.0,
    }
}
