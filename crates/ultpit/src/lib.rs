//! ultpit - Ultimate open-pit limits in Rust
//!
//! Describe the block grid and slope, hand over block values, get back the
//! maximum-value pit for every realization.
//!
//! # Example
//!
//! ```rust
//! use ultpit::prelude::*;
//!
//! let config = UltpitConfig::new(Grid::unit(2, 2, 2)).with_precedence(60.0, 1);
//! let values = BlockValues::new(
//!     vec![vec![5.0, -1.0, -1.0, -1.0, 2.0, -1.0, -1.0, -1.0]],
//!     config.grid.block_count(),
//! ).unwrap();
//!
//! let pit = ultpit::optimize(&config, &values).unwrap();
//! assert_eq!(pit.selected_count(0), 2);
//! ```

// Block model
pub use ultpit_core::{
    compact, generate, BlockValues, CompactProblem, Grid, Mask, Precedence, PrecedenceMethod,
    PrecedenceParams, Result, UltpitError,
};

// Configuration
pub use ultpit_config::{
    ConfigError, ConfigFormat, CutSide, EngineKind, InputConfig, InputFormat,
    OptimizationConfig, UltpitConfig,
};

// Engines and pipeline
pub use ultpit_solver::{
    build_engine, DimacsEngine, Engine, EngineContext, EngineError, LerchsGrossmannEngine,
    MaxFlowEngine, Pipeline, PitSolution, RealizationReport, TreeStats,
};

#[cfg(feature = "console")]
pub use ultpit_console as console;

mod solver;
pub use solver::{optimize, optimize_named};

pub mod prelude {
    pub use super::{BlockValues, Grid, PrecedenceParams};
    pub use super::{EngineKind, UltpitConfig};
    pub use super::{Engine, Pipeline, PitSolution};
}
