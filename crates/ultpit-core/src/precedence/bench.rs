//! Bench/slope-cone precedence generation.
//!
//! The cone above a block is sampled at `num_benches` levels. Each level is a
//! disk of radius `level_height / tan(slope)`. Offsets already covered by the
//! level directly below are implied transitively and are removed, except the
//! vertical offset which keeps consecutive benches chained.

use std::f64::consts::PI;

use tracing::info;

use super::Precedence;
use crate::error::{Result, UltpitError};
use crate::grid::Grid;
use crate::mask::Mask;

pub const MIN_BENCHES: u32 = 1;
pub const MAX_BENCHES: u32 = 15;
pub const MIN_SLOPE: f64 = 10.0;
pub const MAX_SLOPE: f64 = 80.0;

/// Precedence generation method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PrecedenceMethod {
    /// Slope cone sampled over a number of benches.
    #[default]
    Bench,
}

#[cfg(feature = "serde")]
impl crate::coded::Coded for PrecedenceMethod {
    const EXPECTING: &'static str = "precedence method `bench` or code 1";

    fn from_code(code: u64) -> Option<Self> {
        (code == 1).then_some(Self::Bench)
    }

    fn from_name(name: &str) -> Option<Self> {
        (name == "bench").then_some(Self::Bench)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for PrecedenceMethod {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        crate::coded::deserialize(deserializer)
    }
}

/// Slope and bench count of the precedence cone.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrecedenceParams {
    #[cfg_attr(feature = "serde", serde(default))]
    pub method: PrecedenceMethod,

    /// Pit slope in degrees from horizontal.
    pub slope: f64,

    /// Number of benches sampled by the template.
    pub num_benches: u32,
}

impl PrecedenceParams {
    pub fn new(slope: f64, num_benches: u32) -> Self {
        Self {
            method: PrecedenceMethod::Bench,
            slope,
            num_benches,
        }
    }

    /// # Errors
    ///
    /// Returns [`UltpitError::Config`] when slope or bench count are out of range.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_BENCHES..=MAX_BENCHES).contains(&self.num_benches) {
            return Err(UltpitError::Config(format!(
                "benches must be between {MIN_BENCHES} and {MAX_BENCHES}. Supplied: {}",
                self.num_benches
            )));
        }
        if !(MIN_SLOPE..=MAX_SLOPE).contains(&self.slope) {
            return Err(UltpitError::Config(format!(
                "slope must be between {MIN_SLOPE} and {MAX_SLOPE}. Supplied: {}",
                self.slope
            )));
        }
        Ok(())
    }
}

impl Default for PrecedenceParams {
    fn default() -> Self {
        Self::new(45.0, 8)
    }
}

/// The trimmed cone of support offsets shared by unconstrained blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchTemplate {
    /// Support offsets `(dx, dy, dz)`, ordered by level, then row, then column.
    pub offsets: Vec<(isize, isize, isize)>,
    /// Footprint size in blocks `(x, y, z)`.
    pub extent: (usize, usize, usize),
    /// Cells in the untrimmed cone.
    pub naive_arcs: usize,
}

impl BenchTemplate {
    /// Samples and trims the cone for `grid` blocks.
    pub fn build(grid: &Grid, params: &PrecedenceParams) -> Self {
        let theta = params.slope * PI / 180.0;
        let tan = theta.tan();
        let benches = params.num_benches as usize;
        let max_radius = benches as f64 * grid.siz_z / tan;

        let xhalf = (max_radius / grid.siz_x) as usize;
        let yhalf = (max_radius / grid.siz_y) as usize;
        let xblocks = 2 * xhalf + 1;
        let yblocks = 2 * yhalf + 1;

        let mut levels: Vec<Vec<Vec<bool>>> = (0..benches)
            .map(|z| {
                let rad = (z + 1) as f64 * grid.siz_z / tan;
                let rad2 = rad * rad;
                (0..yblocks)
                    .map(|y| {
                        let yloc = (y as isize - yhalf as isize) as f64 * grid.siz_y;
                        (0..xblocks)
                            .map(|x| {
                                let xloc = (x as isize - xhalf as isize) as f64 * grid.siz_x;
                                xloc * xloc + yloc * yloc <= rad2
                            })
                            .collect()
                    })
                    .collect()
            })
            .collect();

        let naive_arcs = count_cells(&levels);

        for z in (1..benches).rev() {
            for y in 0..yblocks {
                for x in 0..xblocks {
                    if levels[z - 1][y][x] {
                        levels[z][y][x] = false;
                    }
                }
            }
            levels[z][yhalf][xhalf] = true;
        }

        let mut offsets = Vec::new();
        for (z, level) in levels.iter().enumerate() {
            for (y, row) in level.iter().enumerate() {
                for (x, &cell) in row.iter().enumerate() {
                    if cell {
                        offsets.push((
                            x as isize - xhalf as isize,
                            y as isize - yhalf as isize,
                            z as isize + 1,
                        ));
                    }
                }
            }
        }

        Self {
            offsets,
            extent: (xblocks, yblocks, benches),
            naive_arcs,
        }
    }

    /// 1D offsets of the full template.
    pub fn base_definition(&self, grid: &Grid) -> Vec<isize> {
        self.offsets
            .iter()
            .map(|&(dx, dy, dz)| grid.offset(dx, dy, dz))
            .collect()
    }
}

fn count_cells(levels: &[Vec<Vec<bool>>]) -> usize {
    levels.iter().flatten().flatten().filter(|&&c| c).count()
}

/// Generates per-block precedence keys over the full grid.
///
/// Blocks outside the top layer get the template clipped to the grid when
/// they are in `mask` or are a support of an earlier keyed block. The base
/// template always occupies key 0.
///
/// # Errors
///
/// Returns [`UltpitError::Config`] for out-of-range parameters or a mask whose
/// length differs from the grid's block count. No partial state is produced.
pub fn generate(grid: &Grid, params: &PrecedenceParams, mask: &Mask) -> Result<Precedence> {
    params.validate()?;
    let n = grid.block_count();
    if mask.len() != n {
        return Err(UltpitError::Config(format!(
            "mask size {} does not equal grid size {n}",
            mask.len()
        )));
    }

    let template = BenchTemplate::build(grid, params);
    info!(
        event = "template_built",
        x = template.extent.0,
        y = template.extent.1,
        z = template.extent.2,
        naive_arcs = template.naive_arcs,
        trimmed_arcs = template.offsets.len(),
    );

    let mut pre = Precedence::with_block_count(n);
    pre.add_definition(template.base_definition(grid));

    let mut hit = vec![false; n];
    let mut def = Vec::with_capacity(template.offsets.len());

    for iz in 0..grid.num_z.saturating_sub(1) {
        for iy in 0..grid.num_y {
            for ix in 0..grid.num_x {
                let loc = grid.index(ix, iy, iz);
                if !hit[loc] && !mask.get(loc) {
                    continue;
                }

                def.clear();
                for &(dx, dy, dz) in &template.offsets {
                    let (tx, ty, tz) = (ix as isize + dx, iy as isize + dy, iz as isize + dz);
                    if grid.contains(tx, ty, tz) {
                        let off = grid.offset(dx, dy, dz);
                        def.push(off);
                        hit[loc.wrapping_add_signed(off)] = true;
                    }
                }

                if !def.is_empty() {
                    let key = pre.add_definition(def.clone());
                    pre.set_key(loc, Some(key));
                }
            }
        }
    }

    pre.log_summary("generated");
    Ok(pre)
}
