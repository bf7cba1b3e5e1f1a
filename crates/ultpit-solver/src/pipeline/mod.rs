//! Per-run orchestration from block values to full-grid pits.
//!
//! Stages: build the relevance mask from all realizations, generate slope
//! precedence over the grid, close the mask under that precedence, compact,
//! solve every realization with a fresh engine, then expand each selection
//! back onto the grid and close it under precedence once more.

use std::time::{Duration, Instant};

use tracing::{error, info};
use ultpit_config::{EngineKind, OptimizationConfig, UltpitConfig};
use ultpit_core::{
    compact, generate, BlockValues, Grid, Mask, PrecedenceParams, Result, UltpitError,
};

use crate::engine::{build_engine, Engine, EngineContext};
use crate::error::EngineError;

/// Outcome of one realization's solve, on compacted values.
#[derive(Debug, Clone, PartialEq)]
pub struct RealizationReport {
    pub realization: usize,
    /// Blocks selected by the engine.
    pub blocks: usize,
    /// Total value of the selected blocks.
    pub value: f64,
    pub engine: &'static str,
    pub elapsed: Duration,
}

/// Full-grid pits, one per realization.
#[derive(Debug, Clone, PartialEq)]
pub struct PitSolution {
    /// `selections[r][i]` is true when block `i` is mined in realization `r`.
    pub selections: Vec<Vec<bool>>,
    pub reports: Vec<RealizationReport>,
    /// Blocks left after masking and closure.
    pub relevant_blocks: usize,
}

impl PitSolution {
    pub fn realization_count(&self) -> usize {
        self.selections.len()
    }

    pub fn selection(&self, realization: usize) -> &[bool] {
        &self.selections[realization]
    }

    /// Number of full-grid blocks mined in `realization`.
    pub fn selected_count(&self, realization: usize) -> usize {
        self.selections[realization].iter().filter(|&&s| s).count()
    }

    /// Value of the full-grid pit of `realization` under `values`.
    pub fn pit_value(&self, values: &BlockValues, realization: usize) -> f64 {
        values
            .realization(realization)
            .iter()
            .zip(&self.selections[realization])
            .filter(|(_, &s)| s)
            .map(|(v, _)| v)
            .sum()
    }
}

/// Runs the full optimization for one grid and precedence setup.
///
/// # Example
///
/// ```
/// use ultpit_core::{BlockValues, Grid, PrecedenceParams};
/// use ultpit_solver::Pipeline;
///
/// let grid = Grid::unit(2, 2, 2);
/// let values = BlockValues::new(
///     vec![vec![5.0, -1.0, -1.0, -1.0, 2.0, -1.0, -1.0, -1.0]],
///     grid.block_count(),
/// ).unwrap();
///
/// let pit = Pipeline::new(grid, PrecedenceParams::new(60.0, 1)).run(&values).unwrap();
/// assert_eq!(pit.selection(0), &[true, false, false, false, true, false, false, false]);
/// assert_eq!(pit.pit_value(&values, 0), 7.0);
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    grid: Grid,
    precedence: PrecedenceParams,
    optimization: OptimizationConfig,
    context: EngineContext,
}

impl Pipeline {
    /// A pipeline using the normalized-tree engine.
    pub fn new(grid: Grid, precedence: PrecedenceParams) -> Self {
        Self {
            grid,
            precedence,
            optimization: OptimizationConfig::default(),
            context: EngineContext::default(),
        }
    }

    pub fn from_config(config: &UltpitConfig) -> Self {
        Self::new(config.grid, config.precedence).with_optimization(config.optimization.clone())
    }

    pub fn with_optimization(mut self, optimization: OptimizationConfig) -> Self {
        self.optimization = optimization;
        self
    }

    pub fn with_engine(mut self, engine: EngineKind) -> Self {
        self.optimization.engine = engine;
        self
    }

    pub fn with_context(mut self, context: EngineContext) -> Self {
        self.context = context;
        self
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Solves every realization with engines built from the configuration.
    ///
    /// # Errors
    ///
    /// Fails on values that don't fit the grid, invalid precedence
    /// parameters, or the first realization whose engine fails.
    pub fn run(&self, values: &BlockValues) -> Result<PitSolution> {
        self.run_with(values, || build_engine(&self.optimization, &self.context))
    }

    /// Like [`run`](Self::run), taking a fresh engine from `make_engine` for
    /// every realization.
    pub fn run_with<F>(&self, values: &BlockValues, mut make_engine: F) -> Result<PitSolution>
    where
        F: FnMut() -> std::result::Result<Box<dyn Engine>, EngineError>,
    {
        let n = self.grid.block_count();
        if values.block_count() != n {
            return Err(UltpitError::InputData(format!(
                "{} values per realization, grid has {n} blocks",
                values.block_count()
            )));
        }
        let realizations = values.realization_count();
        info!(
            event = "pipeline_start",
            problem = %self.context.problem_name,
            realizations,
            blocks = n,
            grid = %self.grid,
        );

        let mut mask = Mask::build(values, n);
        let precedence = generate(&self.grid, &self.precedence, &mask)?;
        mask.close_under(&precedence);
        info!(event = "mask_closed", relevant = mask.count());

        let problem = compact(&mask, values, &precedence);

        let mut solutions = Vec::with_capacity(realizations);
        let mut reports = Vec::with_capacity(realizations);
        for r in 0..realizations {
            let row = problem.values.realization(r);
            let started = Instant::now();
            let mut engine = make_engine().map_err(|e| realization_error(r, e))?;
            let selection = engine
                .solve(row, &problem.precedence)
                .map_err(|e| realization_error(r, e))?;
            if selection.len() != row.len() {
                return Err(UltpitError::Internal(format!(
                    "realization {r}: engine returned {} flags for {} blocks",
                    selection.len(),
                    row.len()
                )));
            }

            let report = RealizationReport {
                realization: r,
                blocks: selection.iter().filter(|&&s| s).count(),
                value: row
                    .iter()
                    .zip(&selection)
                    .filter(|(_, &s)| s)
                    .map(|(v, _)| v)
                    .sum(),
                engine: engine.engine_name(),
                elapsed: started.elapsed(),
            };
            info!(
                event = "realization_end",
                realization = r,
                engine = report.engine,
                blocks = report.blocks,
                value = report.value,
                duration_ms = report.elapsed.as_millis() as u64,
            );
            solutions.push(selection);
            reports.push(report);
        }

        // Trimmed air never reached the engines; re-close on the full grid.
        let selections: Vec<Vec<bool>> = solutions
            .iter()
            .map(|solution| {
                let mut full = mask.expand(solution);
                precedence.close(&mut full);
                full
            })
            .collect();

        info!(event = "pipeline_end", realizations, relevant = mask.count());
        Ok(PitSolution {
            selections,
            reports,
            relevant_blocks: mask.count(),
        })
    }
}

fn realization_error(realization: usize, err: EngineError) -> UltpitError {
    error!(
        event = "realization_failed",
        realization,
        status = err.status(),
        error = %err,
    );
    match err {
        EngineError::Internal(msg) => {
            UltpitError::Internal(format!("realization {realization}: {msg}"))
        }
        other => UltpitError::Engine(format!("realization {realization}: {other}")),
    }
}

#[cfg(test)]
mod tests;
