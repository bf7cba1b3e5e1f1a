//! ultpit Solver Engine
//!
//! This crate turns a block model into an ultimate pit:
//! - The [`Engine`] contract and its three implementations
//!   (normalized tree, in-process max-flow, external DIMACS program)
//! - [`build_engine`] to create engines from configuration
//! - The [`Pipeline`] that masks, generates precedence, compacts, solves
//!   each realization and expands the result back onto the grid

pub mod engine;
pub mod error;
pub mod pipeline;

pub use engine::{
    build_engine, DimacsEngine, Engine, EngineContext, FlowArc, FlowNetwork,
    LerchsGrossmannEngine, MaxFlowEngine, NormalizedTree, TreeStats,
};
pub use error::{EngineError, STATUS_OK};
pub use pipeline::{Pipeline, PitSolution, RealizationReport};
