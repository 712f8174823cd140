//! Scenario tests for the session state machine and its collaborators.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use chipfire_core::{
    Board, ChipGraph, CoreError, FireOutcome, GameSession, GeneratorConfig, Layout, NodeId,
    Phase, PointerAction, PointerState, PointerTracker, Position, Summary,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn session_from(values: Vec<i64>, edges: &[(u32, u32)]) -> GameSession {
    let n = values.len();
    let graph = ChipGraph::from_edges(values, edges).unwrap();
    GameSession::from_graph(
        GeneratorConfig::new(n, edges.len()),
        graph,
        ChaCha8Rng::seed_from_u64(1),
    )
    .unwrap()
}

fn spaced_layout(node_count: usize) -> Layout {
    let board = Board {
        width: 1000.0,
        height: 200.0,
        node_radius: 10.0,
    };
    let mut layout = Layout::scatter(board, node_count, &mut ChaCha8Rng::seed_from_u64(0));
    for i in 0..node_count {
        layout
            .move_node(NodeId(i as u32), Position::new(50.0 + 100.0 * i as f64, 100.0))
            .unwrap();
    }
    layout
}

// ---------------------------------------------------------------------------
// Win predicate
// ---------------------------------------------------------------------------

#[test]
fn last_negative_removed_flips_solved() {
    // Node 0 is a leaf hanging off node 1; node 1 is rich.
    let mut session = session_from(vec![-2, 10, 0], &[(0, 1), (1, 2)]);

    let first = session.fire(NodeId(1)).unwrap();
    assert!(matches!(first, FireOutcome::Continue { moves: 1, .. }));
    assert_eq!(session.graph().value(NodeId(0)).unwrap(), -1);
    assert_eq!(session.phase(), Phase::Playing);

    let second = session.fire(NodeId(1)).unwrap();
    assert!(matches!(
        second,
        FireOutcome::Solved {
            summary: Summary { moves: 2 },
            ..
        }
    ));
    assert_eq!(session.graph().value(NodeId(0)).unwrap(), 0);
    assert!(session.is_solved());
}

#[test]
fn solved_iff_no_negative_node() {
    let mut session = session_from(vec![-1, 1, 1, 1], &[(0, 1), (1, 2), (2, 3)]);
    let outcome = session.fire(NodeId(3)).unwrap();
    // Node 3 drops to 0, node 2 rises; node 0 is still negative.
    assert!(!outcome.report().solved());
    assert!(!session.is_solved());
    assert_eq!(session.graph().negative_count(), 1);
}

// ---------------------------------------------------------------------------
// Move counting
// ---------------------------------------------------------------------------

#[test]
fn five_distinct_fires_count_five_moves() {
    // A deep hole at node 0 keeps the puzzle unsolved throughout.
    let mut session = session_from(
        vec![-100, 5, 5, 5, 5, 5],
        &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5)],
    );
    for id in 1..=5 {
        session.fire(NodeId(id)).unwrap();
    }
    assert_eq!(session.moves(), 5);
    assert_eq!(session.phase(), Phase::Playing);
}

#[test]
fn dragging_does_not_count_as_move() {
    let mut session = session_from(vec![-1, 3, -1], &[(0, 1), (1, 2)]);
    let mut layout = spaced_layout(3);
    let mut tracker = PointerTracker::new();

    tracker.press(&layout, 150.0, 100.0);
    assert_eq!(tracker.state(), PointerState::Pressed(NodeId(1)));
    tracker.drag(&mut layout, 170.0, 120.0);
    assert_eq!(tracker.state(), PointerState::Dragging(NodeId(1)));
    let action = tracker.release(&mut layout, 180.0, 130.0, session.is_solved());

    assert_eq!(action, PointerAction::Moved(NodeId(1)));
    assert_eq!(tracker.state(), PointerState::Idle);
    assert_eq!(session.moves(), 0);
    assert_eq!(session.graph().values(), vec![-1, 3, -1]);
    let snapshot = session.snapshot(&layout);
    assert_eq!(snapshot.nodes[1].position, Some(Position::new(180.0, 130.0)));
}

#[test]
fn click_through_pointer_fires_and_solves() {
    let mut session = session_from(vec![-1, 3, -1], &[(0, 1), (1, 2)]);
    let mut layout = spaced_layout(3);
    let mut tracker = PointerTracker::new();

    tracker.press(&layout, 152.0, 98.0);
    let action = tracker.release(&mut layout, 152.0, 98.0, session.is_solved());
    let PointerAction::Fire(id) = action else {
        panic!("expected a fire, got {action:?}");
    };
    session.fire(id).unwrap();

    assert_eq!(session.graph().values(), vec![0, 1, 0]);
    assert!(session.is_solved());
    assert_eq!(session.moves(), 1);

    tracker.press(&layout, 5.0, 5.0);
    assert_eq!(
        tracker.release(&mut layout, 5.0, 5.0, session.is_solved()),
        PointerAction::Restart
    );
}

// ---------------------------------------------------------------------------
// Reset
// ---------------------------------------------------------------------------

#[test]
fn reset_from_solved_is_always_fresh() {
    let mut session = session_from(vec![-1, 3, -1], &[(0, 1), (1, 2)]);
    session.fire(NodeId(1)).unwrap();
    assert_eq!(
        session.fire(NodeId(1)).unwrap_err(),
        CoreError::PuzzleSolved { moves: 1 }
    );

    for _ in 0..5 {
        session.reset().unwrap();
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.moves(), 0);
        assert!(session.graph().negative_count() > 0);
    }
}

#[test]
fn sessions_are_independent() {
    let mut a = GameSession::seeded(GeneratorConfig::new(6, 8), 5).unwrap();
    let b = GameSession::seeded(GeneratorConfig::new(6, 8), 5).unwrap();
    a.fire(NodeId(0)).unwrap();
    assert_eq!(a.moves(), 1);
    assert_eq!(b.moves(), 0);
}

#[test]
fn session_rejects_invalid_topology() {
    let err = GameSession::seeded(GeneratorConfig::new(4, 2), 0).err();
    assert!(matches!(err, Some(CoreError::InvalidTopology { .. })));
}
