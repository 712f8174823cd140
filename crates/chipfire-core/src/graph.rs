//! ChipGraph: node storage and adjacency queries for the puzzle.
//!
//! [`ChipGraph`] is an undirected simple graph over dense ids `0..n`. Edges
//! are added through [`ChipGraph::add_edge`], which rejects self-loops,
//! duplicates and unknown endpoints, so the graph is always symmetric and
//! simple. Once a puzzle is generated the edge set is frozen: the only
//! mutation the rest of the crate performs is on node values.
//!
//! Traversal-style queries (connectivity, BFS order) are answered by
//! projecting onto a petgraph [`UnGraph`] and reusing petgraph's algorithms.

use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::Bfs;
use serde::Serialize;

use crate::error::CoreError;
use crate::id::NodeId;
use crate::node::ChipNode;

/// Lazy iterator over a node's neighbors in insertion order.
///
/// Call [`ChipGraph::neighbors_of`] again to restart from the first neighbor.
pub type Neighbors<'a> = std::iter::Copied<indexmap::set::Iter<'a, NodeId>>;

/// The chip-firing graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChipGraph {
    nodes: Vec<ChipNode>,
    edge_count: usize,
}

impl ChipGraph {
    /// Creates `node_count` isolated nodes with zero chips each.
    pub fn new(node_count: usize) -> Self {
        Self::with_values(vec![0; node_count])
    }

    /// Creates one isolated node per entry of `values`.
    pub fn with_values(values: Vec<i64>) -> Self {
        let nodes = values
            .into_iter()
            .enumerate()
            .map(|(i, value)| ChipNode::new(NodeId(i as u32), value))
            .collect();
        ChipGraph {
            nodes,
            edge_count: 0,
        }
    }

    /// Builds a graph from explicit values and an edge list.
    ///
    /// Fails on the first edge that [`add_edge`](Self::add_edge) rejects.
    pub fn from_edges(values: Vec<i64>, edges: &[(u32, u32)]) -> Result<Self, CoreError> {
        let mut graph = Self::with_values(values);
        for &(a, b) in edges {
            graph.add_edge(NodeId(a), NodeId(b))?;
        }
        Ok(graph)
    }

    // -----------------------------------------------------------------------
    // Structure
    // -----------------------------------------------------------------------

    /// Adds the undirected edge `a`-`b`.
    ///
    /// Both endpoints must exist, differ, and not already be adjacent.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> Result<(), CoreError> {
        let node_count = self.node_count();
        if a.index() >= node_count || b.index() >= node_count {
            return Err(CoreError::InvalidEdge {
                from: a,
                to: b,
                reason: format!("endpoint out of range for {node_count} nodes"),
            });
        }
        if a == b {
            return Err(CoreError::InvalidEdge {
                from: a,
                to: b,
                reason: "self-loop".into(),
            });
        }
        if self.nodes[a.index()].is_adjacent(b) {
            return Err(CoreError::InvalidEdge {
                from: a,
                to: b,
                reason: "edge already exists".into(),
            });
        }

        self.nodes[a.index()].link(b);
        self.nodes[b.index()].link(a);
        self.edge_count += 1;
        Ok(())
    }

    /// Returns `true` if `a` and `b` are adjacent. Unknown ids are never adjacent.
    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.nodes
            .get(a.index())
            .is_some_and(|node| node.is_adjacent(b))
    }

    /// Number of distinct neighbors of `id`.
    pub fn degree(&self, id: NodeId) -> Result<usize, CoreError> {
        Ok(self.node(id)?.degree())
    }

    /// Neighbors of `id` in the order their edges were added.
    pub fn neighbors_of(&self, id: NodeId) -> Result<Neighbors<'_>, CoreError> {
        Ok(self.node(id)?.neighbor_set().iter().copied())
    }

    /// Every edge exactly once as `(low, high)`, ascending.
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        let mut edges: Vec<(NodeId, NodeId)> = self
            .nodes
            .iter()
            .flat_map(|node| {
                node.neighbor_set()
                    .iter()
                    .filter(move |&&other| node.id < other)
                    .map(move |&other| (node.id, other))
            })
            .collect();
        edges.sort_unstable();
        edges
    }

    // -----------------------------------------------------------------------
    // Node access
    // -----------------------------------------------------------------------

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Looks up a node by id.
    pub fn node(&self, id: NodeId) -> Result<&ChipNode, CoreError> {
        self.nodes.get(id.index()).ok_or(CoreError::InvalidNodeId {
            id,
            node_count: self.nodes.len(),
        })
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut ChipNode, CoreError> {
        let node_count = self.nodes.len();
        self.nodes
            .get_mut(id.index())
            .ok_or(CoreError::InvalidNodeId { id, node_count })
    }

    /// All nodes in id order.
    pub fn nodes(&self) -> &[ChipNode] {
        &self.nodes
    }

    /// Chip count of `id`.
    pub fn value(&self, id: NodeId) -> Result<i64, CoreError> {
        Ok(self.node(id)?.value)
    }

    /// All chip counts in id order.
    pub fn values(&self) -> Vec<i64> {
        self.nodes.iter().map(|node| node.value).collect()
    }

    /// Overwrites every node's chip count. `values` must have one entry per node.
    pub(crate) fn assign_values(&mut self, values: &[i64]) {
        debug_assert_eq!(values.len(), self.nodes.len());
        for (node, &value) in self.nodes.iter_mut().zip(values) {
            node.value = value;
        }
    }

    /// Sum of all chip counts.
    pub fn total_value(&self) -> i64 {
        self.nodes.iter().map(|node| node.value).sum()
    }

    /// Number of nodes with a negative chip count.
    pub fn negative_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.in_debt()).count()
    }

    // -----------------------------------------------------------------------
    // Traversal
    // -----------------------------------------------------------------------

    /// Projects the graph onto a petgraph `UnGraph` weighted by chip count.
    ///
    /// Node indices in the result equal the [`NodeId`]s of this graph.
    pub fn to_petgraph(&self) -> UnGraph<i64, (), u32> {
        let mut graph = UnGraph::with_capacity(self.nodes.len(), self.edge_count);
        for node in &self.nodes {
            graph.add_node(node.value);
        }
        for (a, b) in self.edges() {
            graph.add_edge(a.into(), b.into(), ());
        }
        graph
    }

    /// Returns `true` if every node is reachable from every other.
    ///
    /// Graphs with zero or one node count as connected.
    pub fn is_connected(&self) -> bool {
        self.nodes.len() <= 1 || connected_components(&self.to_petgraph()) == 1
    }

    /// Breadth-first visiting order starting at `start`.
    pub fn bfs_from(&self, start: NodeId) -> Result<Vec<NodeId>, CoreError> {
        self.node(start)?;
        let graph = self.to_petgraph();
        let mut bfs = Bfs::new(&graph, NodeIndex::from(start));
        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(idx) = bfs.next(&graph) {
            order.push(NodeId::from(idx));
        }
        Ok(order)
    }
}
