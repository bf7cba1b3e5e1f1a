//! Economic block values, one row per realization.

use crate::error::{Result, UltpitError};

/// Block values indexed by `(realization, block)`.
///
/// Realizations are independent scenarios over the same grid; each row holds
/// one value per block in grid index order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockValues {
    rows: Vec<Vec<f64>>,
}

impl BlockValues {
    /// Wraps realization rows, checking that every row has `block_count` values.
    ///
    /// # Errors
    ///
    /// Returns [`UltpitError::InputData`] if there are no rows, a row is empty,
    /// or a row length differs from `block_count`.
    pub fn new(rows: Vec<Vec<f64>>, block_count: usize) -> Result<Self> {
        if rows.is_empty() {
            return Err(UltpitError::InputData("no data".to_string()));
        }
        for (r, row) in rows.iter().enumerate() {
            if row.is_empty() {
                return Err(UltpitError::InputData(format!(
                    "realization {r} has no values"
                )));
            }
            if row.len() != block_count {
                return Err(UltpitError::InputData(format!(
                    "realization {r} has {} values, grid has {block_count} blocks",
                    row.len()
                )));
            }
        }
        Ok(Self { rows })
    }

    /// Wraps rows without validation. Used for already-consistent derived data.
    pub(crate) fn from_rows_unchecked(rows: Vec<Vec<f64>>) -> Self {
        Self { rows }
    }

    /// Splits a flat stream into realizations of `block_count` values.
    ///
    /// # Errors
    ///
    /// Fails if the stream is empty or ends with a partial realization.
    pub fn from_stream(stream: Vec<f64>, block_count: usize) -> Result<Self> {
        if block_count == 0 {
            return Err(UltpitError::Config("grid has no blocks".to_string()));
        }
        if stream.is_empty() {
            return Err(UltpitError::InputData("no data".to_string()));
        }
        if stream.len() % block_count != 0 {
            return Err(UltpitError::InputData(format!(
                "{} values do not divide into realizations of {block_count} blocks",
                stream.len()
            )));
        }
        let rows = stream.chunks(block_count).map(<[f64]>::to_vec).collect();
        Self::new(rows, block_count)
    }

    pub fn realization_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of blocks per realization.
    pub fn block_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn realization(&self, r: usize) -> &[f64] {
        &self.rows[r]
    }

    pub fn realizations(&self) -> impl Iterator<Item = &[f64]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Value of block `i` in realization `r`, if present.
    pub fn get(&self, r: usize, i: usize) -> Option<f64> {
        self.rows.get(r).and_then(|row| row.get(i)).copied()
    }
}

#[cfg(test)]
#[path = "values_tests.rs"]
mod tests;
