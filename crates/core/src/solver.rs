use tracing::debug;

use super::delta::{calculate_delta, calculate_delta_for_path};
use super::graph::SignalGraph;
use super::groups::NonTouchingGroups;
use super::limits::{Budget, SolverLimits};
use super::loops::find_all_loops;
use super::paths::find_all_paths;
use super::report::{LoopEntry, PathTerm, TransferReport};
use super::traits::TransferSolver;
use common::error::{Error, Resource};
use common::numeric_kernel::{DEFAULT_SINGULAR_EPSILON, compensated_sum, is_negligible};
use common::types::{FeedbackLoop, NodeIndex};

/// Solver applying Mason's Gain Formula: T = Σ_i (P_i · Δ_i) / Δ.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MasonSolver {
    pub limits: SolverLimits,
    /// |Δ| below this marks the graph as singular.
    pub singular_epsilon: f64,
}

impl Default for MasonSolver {
    fn default() -> Self {
        MasonSolver {
            limits: SolverLimits::default(),
            singular_epsilon: DEFAULT_SINGULAR_EPSILON,
        }
    }
}

impl MasonSolver {
    pub fn new(limits: SolverLimits, singular_epsilon: f64) -> Self {
        MasonSolver {
            limits,
            singular_epsilon,
        }
    }

    /// Computes the transfer function between two explicitly named nodes.
    ///
    /// Unlike [`TransferSolver::solve`], the terminals need not have zero
    /// in-degree / out-degree.
    ///
    /// # Errors
    /// `Error::UnknownNode` if either name is not in the graph, otherwise as
    /// for `solve`.
    pub fn solve_between(
        &self,
        graph: &SignalGraph,
        start: &str,
        end: &str,
    ) -> Result<TransferReport, Error> {
        let start = graph
            .node_index(start)
            .ok_or_else(|| Error::UnknownNode(start.to_string()))?;
        let end = graph
            .node_index(end)
            .ok_or_else(|| Error::UnknownNode(end.to_string()))?;

        self.assemble(graph, start, end)
    }

    fn assemble(
        &self,
        graph: &SignalGraph,
        start: NodeIndex,
        end: NodeIndex,
    ) -> Result<TransferReport, Error> {
        let mut budget = Budget::new(self.limits);
        budget.admit(Resource::Nodes, graph.node_count())?;

        let start_name = graph.node_name(start);
        let end_name = graph.node_name(end);
        debug!(
            start = start_name,
            end = end_name,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Solving signal-flow graph"
        );

        let paths = find_all_paths(graph, start, end, &mut budget)?;
        if paths.is_empty() {
            return Err(Error::NoPath {
                start: start_name.to_string(),
                end: end_name.to_string(),
            });
        }
        debug!(count = paths.len(), "Forward paths enumerated");

        let loops = find_all_loops(graph, &mut budget)?;
        let all_loops: Vec<&FeedbackLoop> = loops.iter().collect();
        let groups = NonTouchingGroups::generate(&all_loops, &mut budget)?;
        debug!(
            loops = loops.len(),
            groups = groups.len(),
            max_order = groups.max_order(),
            "Loops and non-touching groups enumerated"
        );

        let delta = calculate_delta(&groups);
        if !delta.is_finite() {
            return Err(Error::NumericOverflow {
                context: "graph determinant",
            });
        }
        if is_negligible(delta, self.singular_epsilon) {
            return Err(Error::SingularGraph {
                delta,
                epsilon: self.singular_epsilon,
            });
        }

        let mut forward_paths = Vec::with_capacity(paths.len());
        for path in &paths {
            let cofactor = calculate_delta_for_path(path, &loops, &mut budget)?;
            forward_paths.push(PathTerm {
                nodes: graph.resolve_names(&path.nodes),
                gain: path.gain,
                cofactor: cofactor.value,
                cofactor_groups: cofactor.groups,
            });
        }

        let numerator = compensated_sum(forward_paths.iter().map(|p| p.gain * p.cofactor));
        let transfer_function = numerator / delta;
        if !transfer_function.is_finite() {
            return Err(Error::NumericOverflow {
                context: "transfer function",
            });
        }
        debug!(
            delta,
            transfer_function,
            steps = budget.steps(),
            "Signal-flow graph solved"
        );

        Ok(TransferReport {
            start: start_name.to_string(),
            end: end_name.to_string(),
            transfer_function,
            delta,
            forward_paths,
            loops: loops
                .iter()
                .map(|l| LoopEntry {
                    id: l.id,
                    nodes: graph.resolve_names(&l.nodes),
                    gain: l.gain,
                })
                .collect(),
            groups,
        })
    }
}

impl TransferSolver for MasonSolver {
    /// Resolves the unique source and sink, then applies Mason's Gain Formula.
    ///
    /// # Errors
    /// - `Error::GraphTopology` → no unique source or sink.
    /// - `Error::NoPath` → the sink is unreachable from the source.
    /// - `Error::SingularGraph` → |Δ| is below `singular_epsilon`.
    /// - `Error::ResourceExceeded` → an enumeration budget ran out.
    fn solve(&self, graph: &SignalGraph) -> Result<TransferReport, Error> {
        let start = graph.start_node()?;
        let end = graph.end_node()?;
        self.assemble(graph, start, end)
    }
}
