//! One-call optimization from a configuration.

use ultpit_config::UltpitConfig;
use ultpit_core::{BlockValues, Result};
use ultpit_solver::{EngineContext, Pipeline, PitSolution};

/// Validates `config` and solves every realization of `values`.
///
/// # Errors
///
/// Returns a configuration error before any work if `config` is invalid,
/// otherwise whatever the pipeline reports.
pub fn optimize(config: &UltpitConfig, values: &BlockValues) -> Result<PitSolution> {
    optimize_named(config, values, EngineContext::default().problem_name)
}

/// Like [`optimize`], naming the problem for engines and logs.
pub fn optimize_named(
    config: &UltpitConfig,
    values: &BlockValues,
    problem_name: impl Into<String>,
) -> Result<PitSolution> {
    config.validate()?;
    Pipeline::from_config(config)
        .with_context(EngineContext::new(problem_name))
        .run(values)
}

#[cfg(test)]
#[path = "solver_tests.rs"]
mod tests;
