//! Source/sink flow network for the closure problem.
//!
//! Node 0 is the source, block `i` is node `i + 1` and node `n + 1` is the
//! sink. Blocks with non-negative value get an arc from the source, negative
//! blocks an arc to the sink, each with capacity `floor(|value| * precision)`.
//! Every support becomes an arc from the block to its support with a capacity
//! larger than all value arcs together, so no minimum cut ever crosses it.

use std::io::{self, Write};

use ultpit_core::Precedence;

use crate::engine::check_problem;
use crate::error::EngineError;

/// One directed arc of the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowArc {
    pub from: usize,
    pub to: usize,
    pub capacity: u64,
}

/// The max-flow formulation of one realization.
///
/// # Example
///
/// ```
/// use ultpit_core::Precedence;
/// use ultpit_solver::FlowNetwork;
///
/// let mut pre = Precedence::with_block_count(2);
/// let above = pre.add_definition(vec![1]);
/// pre.set_key(0, Some(above));
///
/// let net = FlowNetwork::build(&[5.0, -2.0], &pre, 100.0).unwrap();
/// assert_eq!(net.node_count(), 4);
/// assert_eq!(net.arcs().len(), 3);
/// assert_eq!(net.infinite_capacity(), 701);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowNetwork {
    block_count: usize,
    arcs: Vec<FlowArc>,
    value_arcs: usize,
    infinite: u64,
}

impl FlowNetwork {
    /// Builds the network for `values` scaled by `precision`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidProblem`] if `precedence` doesn't fit
    /// `values` or a value is not finite.
    pub fn build(
        values: &[f64],
        precedence: &Precedence,
        precision: f64,
    ) -> Result<Self, EngineError> {
        check_problem(values, precedence)?;
        let n = values.len();
        let (source, sink) = (0, n + 1);

        let mut arcs = Vec::with_capacity(n + precedence.arc_count() as usize);
        let mut finite_total = 0u64;
        for (i, &v) in values.iter().enumerate() {
            let capacity = (v.abs() * precision).floor() as u64;
            finite_total = finite_total.saturating_add(capacity);
            let arc = if v >= 0.0 {
                FlowArc { from: source, to: i + 1, capacity }
            } else {
                FlowArc { from: i + 1, to: sink, capacity }
            };
            arcs.push(arc);
        }

        let infinite = finite_total.saturating_add(1);
        for i in 0..n {
            arcs.extend(precedence.supports(i).map(|t| FlowArc {
                from: i + 1,
                to: t + 1,
                capacity: infinite,
            }));
        }

        Ok(Self {
            block_count: n,
            arcs,
            value_arcs: n,
            infinite,
        })
    }

    pub fn block_count(&self) -> usize {
        self.block_count
    }

    /// Blocks plus source and sink.
    pub fn node_count(&self) -> usize {
        self.block_count + 2
    }

    pub fn source(&self) -> usize {
        0
    }

    pub fn sink(&self) -> usize {
        self.block_count + 1
    }

    pub fn arcs(&self) -> &[FlowArc] {
        &self.arcs
    }

    /// Arcs derived from supports rather than block values.
    pub fn precedence_arcs(&self) -> &[FlowArc] {
        &self.arcs[self.value_arcs..]
    }

    /// Capacity used for support arcs.
    pub fn infinite_capacity(&self) -> u64 {
        self.infinite
    }

    /// Block behind a 1-based DIMACS node id, if it is not source or sink.
    pub fn block_of_dimacs_node(&self, id: usize) -> Option<usize> {
        (2..=self.block_count + 1).contains(&id).then(|| id - 2)
    }

    /// Writes the network as a DIMACS max-flow problem with 1-based ids.
    pub fn write_dimacs<W: Write>(&self, out: &mut W, problem_name: &str) -> io::Result<()> {
        writeln!(out, "c {problem_name}")?;
        writeln!(out, "p max {} {}", self.node_count(), self.arcs.len())?;
        writeln!(out, "n {} s", self.source() + 1)?;
        writeln!(out, "n {} t", self.sink() + 1)?;
        for arc in &self.arcs {
            writeln!(out, "a {} {} {}", arc.from + 1, arc.to + 1, arc.capacity)?;
        }
        out.flush()
    }
}
