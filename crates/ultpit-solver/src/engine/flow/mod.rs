//! Max-flow formulations of the closure problem.
//!
//! Both engines build the same [`FlowNetwork`]; one solves it in process,
//! the other hands it to an external DIMACS program. A block is in the pit
//! when it lies on the source side of the minimum cut.

mod dimacs;
mod dinic;
mod network;

use tracing::debug;
use ultpit_config::DEFAULT_PRECISION;
use ultpit_core::Precedence;

use self::dinic::Dinic;
use super::Engine;
use crate::error::EngineError;

pub use dimacs::DimacsEngine;
pub use network::{FlowArc, FlowNetwork};

/// In-process max-flow engine.
#[derive(Debug, Clone)]
pub struct MaxFlowEngine {
    precision: f64,
    problem_name: String,
    last_flow: Option<u64>,
}

impl MaxFlowEngine {
    /// Non-positive precision falls back to [`DEFAULT_PRECISION`].
    pub fn new(precision: f64) -> Self {
        Self {
            precision: if precision > 0.0 { precision } else { DEFAULT_PRECISION },
            problem_name: "ultpit".to_string(),
            last_flow: None,
        }
    }

    pub fn with_problem_name(mut self, name: &str) -> Self {
        self.problem_name = name.to_string();
        self
    }

    pub fn precision(&self) -> f64 {
        self.precision
    }

    /// Value of the maximum flow of the most recent solve.
    pub fn last_flow(&self) -> Option<u64> {
        self.last_flow
    }
}

impl Default for MaxFlowEngine {
    fn default() -> Self {
        Self::new(DEFAULT_PRECISION)
    }
}

impl Engine for MaxFlowEngine {
    fn engine_name(&self) -> &'static str {
        "max_flow"
    }

    fn solve(
        &mut self,
        values: &[f64],
        precedence: &Precedence,
    ) -> Result<Vec<bool>, EngineError> {
        let network = FlowNetwork::build(values, precedence, self.precision)?;
        let mut dinic = Dinic::from_network(&network);
        let flow = dinic.max_flow(network.source(), network.sink());
        let side = dinic.reachable_from(network.source());

        debug!(
            event = "max_flow_solved",
            problem = %self.problem_name,
            nodes = network.node_count(),
            arcs = network.arcs().len(),
            flow,
        );
        self.last_flow = Some(flow);
        Ok((1..=network.block_count()).map(|node| side[node]).collect())
    }
}
