use super::graph::SignalGraph;
use super::report::TransferReport;
use common::error::Error;

/// Trait for solvers that reduce a signal-flow graph to its transfer function.
pub trait TransferSolver {
    /// Computes the transfer function from the graph's unique source node to
    /// its unique sink node.
    ///
    /// Returns `Ok(report)` on success, or `Err(e)` describing why the graph
    /// has no well-defined transfer function.
    fn solve(&self, graph: &SignalGraph) -> Result<TransferReport, Error>;
}
