//! The puzzle node: a chip count plus a fixed neighbor set.

use indexmap::IndexSet;
use serde::Serialize;

use crate::id::NodeId;

/// A single node of the chip-firing graph.
///
/// `value` is the signed chip count and changes during play. `neighbors` is
/// filled while the graph is built and is never touched afterwards. It keeps
/// insertion order so neighbor iteration is stable across runs with the same
/// seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChipNode {
    /// Stable identity, equal to the node's index in the graph.
    pub id: NodeId,
    /// Current chip count. Negative means the node is "in debt".
    pub value: i64,
    neighbors: IndexSet<NodeId>,
}

impl ChipNode {
    /// Creates an isolated node with the given chip count.
    pub fn new(id: NodeId, value: i64) -> Self {
        ChipNode {
            id,
            value,
            neighbors: IndexSet::new(),
        }
    }

    /// Number of distinct neighbors.
    pub fn degree(&self) -> usize {
        self.neighbors.len()
    }

    /// Returns `true` if `other` is adjacent to this node.
    pub fn is_adjacent(&self, other: NodeId) -> bool {
        self.neighbors.contains(&other)
    }

    /// Returns `true` if this node has a negative chip count.
    pub fn in_debt(&self) -> bool {
        self.value < 0
    }

    pub(crate) fn neighbor_set(&self) -> &IndexSet<NodeId> {
        &self.neighbors
    }

    /// Records `other` as a neighbor. Returns `false` if it already was one.
    pub(crate) fn link(&mut self, other: NodeId) -> bool {
        self.neighbors.insert(other)
    }
}
