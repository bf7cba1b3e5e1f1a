//! Optimization engines.
//!
//! Every engine answers the same question: given one realization of
//! compacted block values and the compacted precedence table, which blocks
//! form the maximum-value closed set?

mod flow;
mod tree;

use std::fmt::Debug;

use ultpit_config::{EngineKind, OptimizationConfig};
use ultpit_core::Precedence;

use crate::error::EngineError;

pub use flow::{DimacsEngine, FlowArc, FlowNetwork, MaxFlowEngine};
pub use tree::{LerchsGrossmannEngine, NormalizedTree, TreeStats};

/// Maximum closure solver for one realization.
///
/// `solve` returns one flag per value, `true` for blocks in the pit. Any
/// error aborts the realization; its [`EngineError::status`] is non-zero.
pub trait Engine: Send + Debug {
    /// Short name used in logs and reports.
    fn engine_name(&self) -> &'static str;

    fn solve(&mut self, values: &[f64], precedence: &Precedence)
        -> Result<Vec<bool>, EngineError>;
}

/// Run information handed to engines at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineContext {
    /// Name of the problem, usually the input file name.
    pub problem_name: String,
}

impl EngineContext {
    pub fn new(problem_name: impl Into<String>) -> Self {
        Self {
            problem_name: problem_name.into(),
        }
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new("ultpit")
    }
}

/// Creates a fresh engine as configured.
///
/// # Errors
///
/// Returns [`EngineError::InvalidProblem`] if the DIMACS engine has no
/// program path.
pub fn build_engine(
    config: &OptimizationConfig,
    context: &EngineContext,
) -> Result<Box<dyn Engine>, EngineError> {
    let precision = config.effective_precision();
    match config.engine {
        EngineKind::LerchsGrossmann => Ok(Box::new(LerchsGrossmannEngine::new())),
        EngineKind::MaxFlow => Ok(Box::new(
            MaxFlowEngine::new(precision).with_problem_name(&context.problem_name),
        )),
        EngineKind::Dimacs => {
            let program = config.dimacs_path.as_ref().ok_or_else(|| {
                EngineError::InvalidProblem("dimacs engine requires dimacs_path".to_string())
            })?;
            Ok(Box::new(
                DimacsEngine::new(program)
                    .with_args(config.dimacs_args.iter().cloned())
                    .with_precision(precision)
                    .with_timeout(config.timeout())
                    .with_reported_side(config.reported_side)
                    .with_problem_name(&context.problem_name),
            ))
        }
    }
}

/// Checks that `precedence` fits `values` before an engine builds state.
pub(crate) fn check_problem(values: &[f64], precedence: &Precedence) -> Result<(), EngineError> {
    precedence
        .validate(values.len())
        .map_err(|e| EngineError::InvalidProblem(e.to_string()))?;
    if let Some(i) = values.iter().position(|v| !v.is_finite()) {
        return Err(EngineError::InvalidProblem(format!(
            "block {i} has non-finite value {}",
            values[i]
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests;
