use serde::Deserialize;

/// Dense index of a node, assigned in order of first appearance in the edge list.
pub type NodeIndex = usize;

/// One gain-labelled edge of the input edge list: `from -> to` with `gain`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EdgeRecord {
    pub from: String,
    pub to: String,
    pub gain: f64,
}

impl EdgeRecord {
    pub fn new(from: impl Into<String>, to: impl Into<String>, gain: f64) -> Self {
        EdgeRecord {
            from: from.into(),
            to: to.into(),
            gain,
        }
    }
}

/// How repeated `(from, to)` pairs in the edge list are merged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateEdges {
    /// The last gain wins; the edge keeps the position of its first appearance.
    #[default]
    Replace,
    /// Parallel gains are added into one edge.
    Sum,
}

/// Fixed-size bitset over node indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSet {
    words: Vec<u64>,
}

impl NodeSet {
    pub fn from_indices(nodes: &[NodeIndex]) -> Self {
        let len = nodes.iter().max().map_or(0, |&max| max / 64 + 1);
        let mut words = vec![0u64; len];
        for &n in nodes {
            words[n / 64] |= 1u64 << (n % 64);
        }
        NodeSet { words }
    }

    pub fn contains(&self, node: NodeIndex) -> bool {
        self.words
            .get(node / 64)
            .is_some_and(|w| w & (1u64 << (node % 64)) != 0)
    }

    pub fn intersects(&self, other: &NodeSet) -> bool {
        self.words
            .iter()
            .zip(&other.words)
            .any(|(a, b)| a & b != 0)
    }
}

/// Stable handle assigned to a loop when it is first discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoopId(pub usize);

/// A simple path from the source node to the sink node.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardPath {
    pub nodes: Vec<NodeIndex>,
    pub gain: f64,
}

/// A simple cycle, stored rotated to its canonical starting node.
///
/// `nodes` lists each node once; the closing edge runs from the last node
/// back to the first. `gain` includes the closing edge.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackLoop {
    pub id: LoopId,
    pub nodes: Vec<NodeIndex>,
    pub gain: f64,
    pub node_set: NodeSet,
}

impl FeedbackLoop {
    pub fn new(id: LoopId, nodes: Vec<NodeIndex>, gain: f64) -> Self {
        let node_set = NodeSet::from_indices(&nodes);
        FeedbackLoop {
            id,
            nodes,
            gain,
            node_set,
        }
    }

    /// Two loops touch when they share at least one node.
    pub fn touches(&self, other: &FeedbackLoop) -> bool {
        self.node_set.intersects(&other.node_set)
    }

    pub fn touches_path(&self, path: &ForwardPath) -> bool {
        path.nodes.iter().any(|&n| self.node_set.contains(n))
    }
}

/// A set of pairwise non-touching loops and the product of their gains.
#[derive(Debug, Clone, PartialEq)]
pub struct NonTouchingGroup {
    /// Member handles in ascending order.
    pub members: Vec<LoopId>,
    pub gain: f64,
}

impl NonTouchingGroup {
    pub fn order(&self) -> usize {
        self.members.len()
    }
}
