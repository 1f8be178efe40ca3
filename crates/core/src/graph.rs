use std::collections::HashMap;
use std::collections::hash_map::Entry;

use common::error::{Error, Terminal};
use common::types::{DuplicateEdges, EdgeRecord, NodeIndex};

/// Signal-flow graph in Compressed Sparse Row (CSR) format.
///
/// Node names are interned to dense indices in order of first appearance
/// in the edge list (source before destination within one record). The
/// outgoing edges of each node are stored contiguously:
/// - `node_pointers[u]..node_pointers[u+1]` → edges from node `u`
/// - `edge_targets[i]` -> target node of edge `i`
/// - `edge_gains[i]` -> gain of edge `i`
///
/// Within one node's block, edges keep their insertion order, so every
/// traversal over the graph is deterministic. The graph is immutable once
/// built.
#[derive(Debug, Clone)]
pub struct SignalGraph {
    node_names: Vec<String>,
    node_lookup: HashMap<String, NodeIndex>,
    node_pointers: Vec<usize>,
    edge_targets: Vec<NodeIndex>,
    edge_gains: Vec<f64>,
    in_degrees: Vec<usize>,
}

impl SignalGraph {
    /// Builds the graph from `(from, to, gain)` records; a repeated ordered
    /// pair keeps the last gain.
    pub fn from_edges(edges: &[EdgeRecord]) -> Result<Self, Error> {
        Self::from_edges_with_policy(edges, DuplicateEdges::Replace)
    }

    /// Builds the graph, merging repeated `(from, to)` pairs per `policy`.
    ///
    /// A merged edge stays at the neighbour position of its first appearance.
    ///
    /// # Errors
    /// Returns `Error::NonFiniteGain` for a NaN or infinite input gain, and
    /// `Error::NumericOverflow` if summing parallel gains overflows.
    pub fn from_edges_with_policy(
        edges: &[EdgeRecord],
        policy: DuplicateEdges,
    ) -> Result<Self, Error> {
        let mut node_names: Vec<String> = Vec::new();
        let mut node_lookup: HashMap<String, NodeIndex> = HashMap::new();
        let mut merged: Vec<(NodeIndex, NodeIndex, f64)> = Vec::with_capacity(edges.len());
        let mut slot_of_pair: HashMap<(NodeIndex, NodeIndex), usize> = HashMap::new();

        for edge in edges {
            if !edge.gain.is_finite() {
                return Err(Error::NonFiniteGain {
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                });
            }

            let u = intern(&edge.from, &mut node_names, &mut node_lookup);
            let v = intern(&edge.to, &mut node_names, &mut node_lookup);

            match slot_of_pair.entry((u, v)) {
                Entry::Occupied(slot) => {
                    let gain = &mut merged[*slot.get()].2;
                    match policy {
                        DuplicateEdges::Replace => *gain = edge.gain,
                        DuplicateEdges::Sum => *gain += edge.gain,
                    }
                    if !gain.is_finite() {
                        return Err(Error::NumericOverflow {
                            context: "parallel edge gain",
                        });
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(merged.len());
                    merged.push((u, v, edge.gain));
                }
            }
        }

        let num_nodes = node_names.len();
        let (node_pointers, edge_targets, edge_gains, in_degrees) =
            Self::build_csr_from_edges(num_nodes, &merged);

        Ok(Self {
            node_names,
            node_lookup,
            node_pointers,
            edge_targets,
            edge_gains,
            in_degrees,
        })
    }

    /// Two-pass counting build of the CSR arrays.
    ///
    /// The second pass places edges with a per-node cursor, which keeps the
    /// relative order of edges sharing a source node.
    fn build_csr_from_edges(
        num_nodes: usize,
        edges: &[(NodeIndex, NodeIndex, f64)],
    ) -> (Vec<usize>, Vec<NodeIndex>, Vec<f64>, Vec<usize>) {
        let m = edges.len();
        let mut node_pointers = vec![0; num_nodes + 1];
        let mut in_degrees = vec![0; num_nodes];

        for &(u, v, _) in edges {
            node_pointers[u + 1] += 1;
            in_degrees[v] += 1;
        }

        for i in 1..=num_nodes {
            node_pointers[i] += node_pointers[i - 1];
        }

        let mut edge_targets = vec![0; m];
        let mut edge_gains = vec![0.0; m];
        let mut cursor = node_pointers.clone();

        for &(u, v, gain) in edges {
            let pos = cursor[u];
            edge_targets[pos] = v;
            edge_gains[pos] = gain;
            cursor[u] += 1;
        }

        (node_pointers, edge_targets, edge_gains, in_degrees)
    }

    pub fn node_count(&self) -> usize {
        self.node_names.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_targets.len()
    }

    /// Node names in index order.
    pub fn node_names(&self) -> &[String] {
        &self.node_names
    }

    /// Panics if `node` is not an index of this graph.
    pub fn node_name(&self, node: NodeIndex) -> &str {
        &self.node_names[node]
    }

    pub fn node_index(&self, name: &str) -> Option<NodeIndex> {
        self.node_lookup.get(name).copied()
    }

    pub fn resolve_names(&self, nodes: &[NodeIndex]) -> Vec<String> {
        nodes.iter().map(|&n| self.node_names[n].clone()).collect()
    }

    /// Outgoing `(target, gain)` pairs of `node`, in insertion order.
    pub fn neighbors(&self, node: NodeIndex) -> impl Iterator<Item = (NodeIndex, f64)> + '_ {
        let start = self.node_pointers[node];
        let end = self.node_pointers[node + 1];
        self.edge_targets[start..end]
            .iter()
            .copied()
            .zip(self.edge_gains[start..end].iter().copied())
    }

    pub fn gain(&self, from: NodeIndex, to: NodeIndex) -> Option<f64> {
        self.neighbors(from)
            .find(|&(target, _)| target == to)
            .map(|(_, gain)| gain)
    }

    pub fn in_degree(&self, node: NodeIndex) -> usize {
        self.in_degrees[node]
    }

    pub fn out_degree(&self, node: NodeIndex) -> usize {
        self.node_pointers[node + 1] - self.node_pointers[node]
    }

    /// The unique node with zero in-degree.
    ///
    /// # Errors
    /// `Error::GraphTopology` naming every zero in-degree node when there
    /// is not exactly one.
    pub fn start_node(&self) -> Result<NodeIndex, Error> {
        self.unique_terminal(Terminal::Start, |n| self.in_degree(n) == 0)
    }

    /// The unique node with zero out-degree.
    ///
    /// # Errors
    /// `Error::GraphTopology` naming every zero out-degree node when there
    /// is not exactly one.
    pub fn end_node(&self) -> Result<NodeIndex, Error> {
        self.unique_terminal(Terminal::End, |n| self.out_degree(n) == 0)
    }

    fn unique_terminal<F>(&self, terminal: Terminal, is_candidate: F) -> Result<NodeIndex, Error>
    where
        F: Fn(NodeIndex) -> bool,
    {
        let candidates: Vec<NodeIndex> = (0..self.node_count()).filter(|&n| is_candidate(n)).collect();

        match candidates.as_slice() {
            [node] => Ok(*node),
            _ => Err(Error::GraphTopology {
                terminal,
                nodes: self.resolve_names(&candidates),
            }),
        }
    }
}

fn intern(
    name: &str,
    node_names: &mut Vec<String>,
    node_lookup: &mut HashMap<String, NodeIndex>,
) -> NodeIndex {
    if let Some(&index) = node_lookup.get(name) {
        return index;
    }
    let index = node_names.len();
    node_names.push(name.to_string());
    node_lookup.insert(name.to_string(), index);
    index
}
