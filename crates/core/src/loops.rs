use std::collections::HashSet;

use common::error::{Error, Resource};
use common::numeric_kernel::finite_product;
use common::types::{FeedbackLoop, LoopId, NodeIndex};

use crate::graph::SignalGraph;
use crate::limits::Budget;

/// Enumerates every feedback loop (simple cycle) of the graph.
///
/// Each node in index order acts as a root. A depth-first walk from the root
/// never revisits a node already on the walk, and every edge leading back to
/// the root closes a loop, self-loops included. The walk from a root only
/// enters nodes with a higher index, so a cycle is reached from its
/// lowest-index member, which is also the root that discovers it first.
///
/// Loops are stored rotated to their canonical form (see [`canonical_rotation`])
/// and a canonical form seen before is dropped. `LoopId`s are assigned in
/// discovery order.
///
/// # Errors
/// `Error::ResourceExceeded` when the loop or search-step budget runs out,
/// `Error::NumericOverflow` when a loop gain is not finite.
pub fn find_all_loops(graph: &SignalGraph, budget: &mut Budget) -> Result<Vec<FeedbackLoop>, Error> {
    let mut search = LoopSearch {
        graph,
        root: 0,
        on_path: vec![false; graph.node_count()],
        stack: Vec::new(),
        edge_gains: Vec::new(),
        seen: HashSet::new(),
        loops: Vec::new(),
        budget,
    };

    // A self-loop closes on its root after one edge and counts as a loop.
    for root in 0..graph.node_count() {
        search.root = root;
        search.visit(root)?;
    }

    Ok(search.loops)
}

/// Rotates `nodes` so the node with the lexicographically smallest name
/// comes first. Rotations of the same cycle map to the same sequence.
pub fn canonical_rotation(graph: &SignalGraph, nodes: &[NodeIndex]) -> Vec<NodeIndex> {
    let pivot = nodes
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| graph.node_name(**a).cmp(graph.node_name(**b)))
        .map_or(0, |(i, _)| i);

    let mut rotated = nodes.to_vec();
    rotated.rotate_left(pivot);
    rotated
}

struct LoopSearch<'a> {
    graph: &'a SignalGraph,
    root: NodeIndex,
    on_path: Vec<bool>,
    stack: Vec<NodeIndex>,
    edge_gains: Vec<f64>,
    seen: HashSet<Vec<NodeIndex>>,
    loops: Vec<FeedbackLoop>,
    budget: &'a mut Budget,
}

impl LoopSearch<'_> {
    fn visit(&mut self, node: NodeIndex) -> Result<(), Error> {
        self.on_path[node] = true;
        self.stack.push(node);

        let graph = self.graph;
        for (next, edge_gain) in graph.neighbors(node) {
            self.budget.step()?;
            if next == self.root {
                self.edge_gains.push(edge_gain);
                let recorded = self.record();
                self.edge_gains.pop();
                recorded?;
            } else if next > self.root && !self.on_path[next] {
                self.edge_gains.push(edge_gain);
                self.visit(next)?;
                self.edge_gains.pop();
            }
        }

        self.stack.pop();
        self.on_path[node] = false;
        Ok(())
    }

    fn record(&mut self) -> Result<(), Error> {
        let gain = finite_product(self.edge_gains.iter().copied())
            .ok_or(Error::NumericOverflow { context: "loop gain" })?;

        let canonical = canonical_rotation(self.graph, &self.stack);
        if self.seen.contains(&canonical) {
            return Ok(());
        }

        self.budget.admit(Resource::Loops, self.loops.len() + 1)?;
        self.seen.insert(canonical.clone());
        let id = LoopId(self.loops.len());
        self.loops.push(FeedbackLoop::new(id, canonical, gain));
        Ok(())
    }
}
