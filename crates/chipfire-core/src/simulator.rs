//! The chip-firing rule and the win predicate.
//!
//! Firing node `k` moves one chip to each neighbor and removes `degree(k)`
//! chips from `k`. The total chip count is unchanged; only its distribution
//! moves. Firing never touches the edge set.

use serde::Serialize;
use tracing::trace;

use crate::error::CoreError;
use crate::graph::ChipGraph;
use crate::id::NodeId;

/// What a single fire did to the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FireReport {
    /// The node that fired.
    pub node: NodeId,
    /// Chips it shed, equal to its degree.
    pub shed: usize,
    /// Its chip count after firing.
    pub value_after: i64,
    /// Nodes still negative after this fire.
    pub negatives_remaining: usize,
}

impl FireReport {
    /// `true` when no node is negative any more.
    pub fn solved(&self) -> bool {
        self.negatives_remaining == 0
    }
}

/// Fires `node`: every neighbor gains one chip, `node` loses its degree.
///
/// A node with no neighbors fires as a no-op. The only failure is an
/// unknown id, which leaves the graph untouched.
pub fn fire(graph: &mut ChipGraph, node: NodeId) -> Result<FireReport, CoreError> {
    let neighbors: Vec<NodeId> = graph.neighbors_of(node)?.collect();
    for &neighbor in &neighbors {
        graph.node_mut(neighbor)?.value += 1;
    }

    let fired = graph.node_mut(node)?;
    fired.value -= neighbors.len() as i64;
    let value_after = fired.value;

    let report = FireReport {
        node,
        shed: neighbors.len(),
        value_after,
        negatives_remaining: graph.negative_count(),
    };
    trace!(?report, "fired");
    Ok(report)
}

/// The win predicate: every node holds a non-negative chip count.
pub fn is_solved(graph: &ChipGraph) -> bool {
    graph.nodes().iter().all(|node| !node.in_debt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fire_center_of_path_solves() {
        let mut graph = ChipGraph::from_edges(vec![-1, 3, -1], &[(0, 1), (1, 2)]).unwrap();
        let report = fire(&mut graph, NodeId(1)).unwrap();

        assert_eq!(graph.values(), vec![0, 1, 0]);
        assert_eq!(report.shed, 2);
        assert_eq!(report.value_after, 1);
        assert!(report.solved());
        assert!(is_solved(&graph));
    }

    #[test]
    fn fire_conserves_total() {
        let mut graph =
            ChipGraph::from_edges(vec![4, -3, 2, 0], &[(0, 1), (1, 2), (2, 3), (0, 2)]).unwrap();
        let before = graph.total_value();
        fire(&mut graph, NodeId(2)).unwrap();
        assert_eq!(graph.total_value(), before);
        assert_eq!(graph.values(), vec![5, -2, -1, 1]);
    }

    #[test]
    fn isolated_node_fire_is_noop() {
        let mut graph = ChipGraph::with_values(vec![-2, 5]);
        let report = fire(&mut graph, NodeId(0)).unwrap();
        assert_eq!(report.shed, 0);
        assert_eq!(graph.values(), vec![-2, 5]);
        assert!(!report.solved());
    }

    #[test]
    fn unknown_node_leaves_graph_untouched() {
        let mut graph = ChipGraph::from_edges(vec![1, 1], &[(0, 1)]).unwrap();
        let err = fire(&mut graph, NodeId(2)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidNodeId { id: NodeId(2), .. }));
        assert_eq!(graph.values(), vec![1, 1]);
    }

    #[test]
    fn firing_can_create_debt() {
        let mut graph = ChipGraph::from_edges(vec![0, 0, 0], &[(0, 1), (0, 2)]).unwrap();
        let report = fire(&mut graph, NodeId(0)).unwrap();
        assert_eq!(report.value_after, -2);
        assert_eq!(report.negatives_remaining, 1);
        assert!(!is_solved(&graph));
    }
}
