//! Core error types for chipfire-core.
//!
//! Uses `thiserror` for structured, matchable error variants. All of them are
//! contract violations by the caller (or, for `InvalidEdge`, by the
//! generator); none is a recoverable in-game state.

use std::fmt;

use thiserror::Error;

use crate::id::NodeId;

/// Which bounded-retry loop of puzzle generation ran out of attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStage {
    /// Rejection sampling of extra edges on top of the backbone.
    EdgeSampling,
    /// Rejection sampling of the initial chip vector.
    ValueAssignment,
}

impl fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationStage::EdgeSampling => write!(f, "edge sampling"),
            GenerationStage::ValueAssignment => write!(f, "value assignment"),
        }
    }
}

/// Core errors produced by the chipfire-core crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// The requested node/edge counts do not describe a connected simple graph.
    #[error("invalid topology: {nodes} nodes, {edges} edges ({reason})")]
    InvalidTopology {
        nodes: usize,
        edges: usize,
        reason: String,
    },

    /// A self-loop, duplicate edge or out-of-range endpoint was attempted.
    #[error("invalid edge {from}-{to}: {reason}")]
    InvalidEdge {
        from: NodeId,
        to: NodeId,
        reason: String,
    },

    /// A generator setting outside its legal range.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// A node id outside `0..node_count` was passed in.
    #[error("invalid node id {id} (graph has {node_count} nodes)")]
    InvalidNodeId { id: NodeId, node_count: usize },

    /// A rejection-sampling loop hit its attempt guard.
    #[error("puzzle generation gave up during {stage} after {attempts} attempts")]
    GenerationExhausted {
        stage: GenerationStage,
        attempts: usize,
    },

    /// No chip vector over this many nodes can start unsolved with the
    /// required total.
    #[error("no solvable starting assignment exists for {nodes} node(s)")]
    UnsatisfiableAssignment { nodes: usize },

    /// The session is already solved; only a reset is accepted.
    #[error("puzzle already solved in {moves} moves")]
    PuzzleSolved { moves: u32 },
}
