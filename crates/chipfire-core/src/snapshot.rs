//! Render-ready views of a puzzle.
//!
//! A [`Snapshot`] is a plain owned copy, so a renderer can hold on to it
//! while the session keeps mutating. Positions come from whatever
//! [`PositionSource`] the caller supplies.

use serde::Serialize;

use crate::graph::ChipGraph;
use crate::id::NodeId;
use crate::layout::{Position, PositionSource};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    pub id: NodeId,
    pub value: i64,
    pub degree: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EdgeView {
    pub from: NodeId,
    pub to: NodeId,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub nodes: Vec<NodeView>,
    /// Each edge once, `from < to`, ascending.
    pub edges: Vec<EdgeView>,
    pub moves: u32,
    pub solved: bool,
}

impl Snapshot {
    pub fn capture<P: PositionSource + ?Sized>(
        graph: &ChipGraph,
        moves: u32,
        solved: bool,
        positions: &P,
    ) -> Self {
        let nodes = graph
            .nodes()
            .iter()
            .map(|node| NodeView {
                id: node.id,
                value: node.value,
                degree: node.degree(),
                position: positions.position_of(node.id),
            })
            .collect();
        let edges = graph
            .edges()
            .into_iter()
            .map(|(from, to)| EdgeView { from, to })
            .collect();
        Snapshot {
            nodes,
            edges,
            moves,
            solved,
        }
    }
}

/// Final tally shown once a puzzle is solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub moves: u32,
}
