use common::error::{Error, Resource};
use common::numeric_kernel::finite_product;
use common::types::{ForwardPath, NodeIndex};

use crate::graph::SignalGraph;
use crate::limits::Budget;

/// Enumerates every simple path from `start` to `end`, in depth-first order.
///
/// One on-path marker set is shared across the whole search: a node is marked
/// when the walk enters it and cleared when the walk backs out, so no node
/// repeats within a path.
///
/// # Errors
/// `Error::ResourceExceeded` when the path or search-step budget runs out,
/// `Error::NumericOverflow` when a path gain is not finite.
pub fn find_all_paths(
    graph: &SignalGraph,
    start: NodeIndex,
    end: NodeIndex,
    budget: &mut Budget,
) -> Result<Vec<ForwardPath>, Error> {
    let mut search = PathSearch {
        graph,
        end,
        on_path: vec![false; graph.node_count()],
        stack: Vec::new(),
        edge_gains: Vec::new(),
        paths: Vec::new(),
        budget,
    };
    search.visit(start)?;
    Ok(search.paths)
}

struct PathSearch<'a> {
    graph: &'a SignalGraph,
    end: NodeIndex,
    on_path: Vec<bool>,
    stack: Vec<NodeIndex>,
    /// Gains of the edges between consecutive `stack` entries.
    edge_gains: Vec<f64>,
    paths: Vec<ForwardPath>,
    budget: &'a mut Budget,
}

impl PathSearch<'_> {
    fn visit(&mut self, node: NodeIndex) -> Result<(), Error> {
        self.on_path[node] = true;
        self.stack.push(node);

        if node == self.end {
            self.record()?;
        } else {
            let graph = self.graph;
            for (next, edge_gain) in graph.neighbors(node) {
                if !self.on_path[next] {
                    self.budget.step()?;
                    self.edge_gains.push(edge_gain);
                    self.visit(next)?;
                    self.edge_gains.pop();
                }
            }
        }

        self.stack.pop();
        self.on_path[node] = false;
        Ok(())
    }

    fn record(&mut self) -> Result<(), Error> {
        let gain = finite_product(self.edge_gains.iter().copied()).ok_or(
            Error::NumericOverflow {
                context: "forward path gain",
            },
        )?;
        self.budget.admit(Resource::Paths, self.paths.len() + 1)?;
        self.paths.push(ForwardPath {
            nodes: self.stack.clone(),
            gain,
        });
        Ok(())
    }
}
