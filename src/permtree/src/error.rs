//! Error types for permission parsing and tree manipulation

use crate::tree::NodeId;
use thiserror::Error;

/// Pattern parsing errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// A constraint entry inside an `@` clause has no `=` separator
    #[error("segment {position} ('{segment}'): constraint '{constraint}' is missing '='")]
    MissingSeparator {
        /// Raw segment text, including its `@` clause
        segment: String,
        /// Zero-based segment index within the pattern
        position: usize,
        /// The offending constraint entry
        constraint: String,
    },
}

/// Structural errors raised by explicit tree restructuring
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TreeError {
    /// Node id does not belong to this tree
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    /// The root cannot be re-parented
    #[error("The root node cannot be moved")]
    RootMove,

    /// Re-parenting would make a node its own ancestor
    #[error("Moving node {node} under {parent} would create a cycle")]
    Cycle {
        /// Node being moved
        node: NodeId,
        /// Requested new parent
        parent: NodeId,
    },
}
