use std::fmt;
use thiserror::Error;

/// Which terminal of the signal-flow graph failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    /// Node with zero in-degree (the input).
    Start,
    /// Node with zero out-degree (the output).
    End,
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Terminal::Start => write!(f, "start"),
            Terminal::End => write!(f, "end"),
        }
    }
}

/// Enumeration budget that ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Nodes,
    Paths,
    Loops,
    Groups,
    SearchSteps,
    /// Wall-clock deadline, limit in milliseconds.
    Deadline,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Resource::Nodes => "node",
            Resource::Paths => "forward path",
            Resource::Loops => "loop",
            Resource::Groups => "non-touching group",
            Resource::SearchSteps => "search step",
            Resource::Deadline => "deadline (ms)",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Zero or several candidate terminals; carries the offending node set.
    #[error("Expected exactly one {terminal} node, but found {}: {nodes:?}", .nodes.len())]
    GraphTopology {
        terminal: Terminal,
        nodes: Vec<String>,
    },

    #[error("No forward paths found from start node {start} to end node {end}")]
    NoPath { start: String, end: String },

    #[error("Graph determinant {delta} is within {epsilon} of zero, transfer function is undefined")]
    SingularGraph { delta: f64, epsilon: f64 },

    #[error("Enumeration exceeded the {resource} budget of {limit}")]
    ResourceExceeded { resource: Resource, limit: u64 },

    #[error("Gain on edge {from} -> {to} is not a finite number")]
    NonFiniteGain { from: String, to: String },

    #[error("Non-finite value produced while computing {context}")]
    NumericOverflow { context: &'static str },

    #[error("Node {0} is not part of the graph")]
    UnknownNode(String),
}

impl Error {
    /// Short machine-readable kind, used by drivers when tagging log events.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::GraphTopology { .. } => "graph_topology",
            Error::NoPath { .. } => "no_path",
            Error::SingularGraph { .. } => "singular_graph",
            Error::ResourceExceeded { .. } => "resource_exceeded",
            Error::NonFiniteGain { .. } => "non_finite_gain",
            Error::NumericOverflow { .. } => "numeric_overflow",
            Error::UnknownNode(_) => "unknown_node",
        }
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn topology_message_names_the_offending_nodes() {
        let err = Error::GraphTopology {
            terminal: Terminal::Start,
            nodes: vec!["A".to_string(), "B".to_string()],
        };

        assert_eq!(
            err.to_string(),
            "Expected exactly one start node, but found 2: [\"A\", \"B\"]"
        );
        assert_eq!(err.kind(), "graph_topology");
    }

    #[test]
    fn resource_message_names_the_budget() {
        let err = Error::ResourceExceeded {
            resource: Resource::Loops,
            limit: 10,
        };

        assert_eq!(err.to_string(), "Enumeration exceeded the loop budget of 10");
    }
}
