//! ultpit Core - Block model and precedence types for ultimate pit problems
//!
//! This crate provides the data that every engine consumes:
//! - [`Grid`] geometry and 1D block indexing
//! - [`BlockValues`] for one or more realizations
//! - Slope-cone [`Precedence`] generation with a deduplicated definition table
//! - The relevance [`Mask`] and [`compact`]ion onto relevant blocks

#[cfg(feature = "serde")]
pub mod coded;
pub mod compact;
pub mod error;
pub mod grid;
pub mod mask;
pub mod precedence;
pub mod values;

pub use compact::{compact, CompactProblem};
pub use error::{Result, UltpitError};
pub use grid::Grid;
pub use mask::{Mask, AIR_THRESHOLD};
pub use precedence::{
    generate, BenchTemplate, Precedence, PrecedenceMethod, PrecedenceParams, MAX_BENCHES,
    MAX_SLOPE, MIN_BENCHES, MIN_SLOPE,
};
pub use values::BlockValues;
