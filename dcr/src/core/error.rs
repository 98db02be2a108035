//! Error types for engine operations.
//!
//! Every variant is a precondition violation: the operation that returns it
//! has not mutated the graph.

use crate::core::types::NodeId;

/// Errors raised by the forest, the normalizer and the semantics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// No node with this name exists in the graph.
    #[error("unknown node '{0}'")]
    UnknownNode(String),

    /// The id was issued by a different graph's node table.
    #[error("node id {0} does not belong to this graph")]
    ForeignNode(NodeId),

    /// The requested nesting edit would make a node its own ancestor.
    #[error("nesting '{child}' under '{parent}' would create a cycle")]
    Cycle { parent: String, child: String },

    /// The forest no longer satisfies the single-parent, acyclic shape.
    #[error("structural corruption: {0}")]
    StructuralCorruption(String),

    /// Only atomic events can be executed.
    #[error("'{0}' is a group, not an atomic event")]
    NotAnEvent(String),

    /// The event is not in the enabled set.
    #[error("event '{0}' is not enabled")]
    NotEnabled(String),

    /// `update_nests` has not run since the last structural edit.
    #[error("graph must be normalized before execution")]
    NotNormalized,
}
