//! GameSession: the puzzle lifecycle state machine.
//!
//! The session owns exactly one [`PuzzleState`] and moves through
//! `Setup -> Playing -> Solved`:
//!
//! - **Setup** runs inside [`GameSession::reset`]: the generator builds a
//!   brand-new graph and the old puzzle is dropped whole. Setup is never
//!   observable; it ends in `Playing` or returns an error with the previous
//!   puzzle untouched.
//! - **Playing** accepts [`GameSession::fire`]. Each accepted fire counts as
//!   one move, then the win predicate is checked.
//! - **Solved** is terminal for the puzzle. Fires are rejected with
//!   [`CoreError::PuzzleSolved`]; only a reset leaves it.
//!
//! Sessions hold no global state, so any number can coexist.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::info;

use crate::error::CoreError;
use crate::generator::{Generator, GeneratorConfig};
use crate::graph::ChipGraph;
use crate::id::NodeId;
use crate::layout::PositionSource;
use crate::simulator::{self, FireReport};
use crate::snapshot::{Snapshot, Summary};

/// Observable phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Playing,
    Solved,
}

/// One puzzle instance: its graph plus move bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleState {
    graph: ChipGraph,
    moves: u32,
    solved: bool,
}

impl PuzzleState {
    /// Wraps a freshly built graph with zero moves.
    pub fn new(graph: ChipGraph) -> Self {
        let solved = simulator::is_solved(&graph);
        PuzzleState {
            graph,
            moves: 0,
            solved,
        }
    }

    pub fn graph(&self) -> &ChipGraph {
        &self.graph
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn solved(&self) -> bool {
        self.solved
    }
}

/// Result of an accepted fire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FireOutcome {
    /// Still negative nodes left.
    Continue { report: FireReport, moves: u32 },
    /// This fire removed the last negative value.
    Solved { report: FireReport, summary: Summary },
}

impl FireOutcome {
    pub fn report(&self) -> &FireReport {
        match self {
            FireOutcome::Continue { report, .. } | FireOutcome::Solved { report, .. } => report,
        }
    }
}

#[derive(Debug)]
pub struct GameSession<R = ChaCha8Rng> {
    generator: Generator,
    rng: R,
    puzzle: PuzzleState,
}

impl GameSession<ChaCha8Rng> {
    /// Starts a session seeded from OS entropy.
    pub fn new(config: GeneratorConfig) -> Result<Self, CoreError> {
        Self::with_rng(config, ChaCha8Rng::from_entropy())
    }

    /// Starts a reproducible session: the same seed and config give the same
    /// sequence of puzzles.
    pub fn seeded(config: GeneratorConfig, seed: u64) -> Result<Self, CoreError> {
        Self::with_rng(config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> GameSession<R> {
    /// Validates `config` and generates the first puzzle.
    pub fn with_rng(config: GeneratorConfig, mut rng: R) -> Result<Self, CoreError> {
        let generator = Generator::new(config)?;
        let graph = generator.generate(&mut rng)?;
        Ok(GameSession {
            generator,
            rng,
            puzzle: PuzzleState::new(graph),
        })
    }

    /// Starts from a hand-built graph instead of a generated one.
    ///
    /// The graph is taken as-is; `config` only governs later resets.
    pub fn from_graph(config: GeneratorConfig, graph: ChipGraph, rng: R) -> Result<Self, CoreError> {
        let generator = Generator::new(config)?;
        Ok(GameSession {
            generator,
            rng,
            puzzle: PuzzleState::new(graph),
        })
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn phase(&self) -> Phase {
        if self.puzzle.solved {
            Phase::Solved
        } else {
            Phase::Playing
        }
    }

    pub fn puzzle(&self) -> &PuzzleState {
        &self.puzzle
    }

    pub fn graph(&self) -> &ChipGraph {
        &self.puzzle.graph
    }

    pub fn moves(&self) -> u32 {
        self.puzzle.moves
    }

    pub fn is_solved(&self) -> bool {
        self.puzzle.solved
    }

    pub fn config(&self) -> &GeneratorConfig {
        self.generator.config()
    }

    /// The final tally, once solved.
    pub fn summary(&self) -> Option<Summary> {
        self.puzzle.solved.then_some(Summary {
            moves: self.puzzle.moves,
        })
    }

    pub fn snapshot<P: PositionSource + ?Sized>(&self, positions: &P) -> Snapshot {
        Snapshot::capture(
            &self.puzzle.graph,
            self.puzzle.moves,
            self.puzzle.solved,
            positions,
        )
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Fires `node` and counts the move.
    ///
    /// Rejected without counting when the puzzle is already solved or the id
    /// is unknown.
    pub fn fire(&mut self, node: NodeId) -> Result<FireOutcome, CoreError> {
        if self.puzzle.solved {
            return Err(CoreError::PuzzleSolved {
                moves: self.puzzle.moves,
            });
        }

        let report = simulator::fire(&mut self.puzzle.graph, node)?;
        self.puzzle.moves += 1;

        if report.solved() {
            self.puzzle.solved = true;
            let summary = Summary {
                moves: self.puzzle.moves,
            };
            info!(moves = summary.moves, "puzzle solved");
            Ok(FireOutcome::Solved { report, summary })
        } else {
            Ok(FireOutcome::Continue {
                report,
                moves: self.puzzle.moves,
            })
        }
    }

    /// Replaces the puzzle with a freshly generated one (`Setup -> Playing`).
    ///
    /// Accepted from any phase. On failure the current puzzle is kept.
    pub fn reset(&mut self) -> Result<(), CoreError> {
        let graph = self.generator.generate(&mut self.rng)?;
        self.puzzle = PuzzleState::new(graph);
        Ok(())
    }

    /// Switches to new generator settings and resets.
    ///
    /// Invalid settings or a failed generation leave the session as it was.
    pub fn reconfigure(&mut self, config: GeneratorConfig) -> Result<(), CoreError> {
        let generator = Generator::new(config)?;
        let graph = generator.generate(&mut self.rng)?;
        self.generator = generator;
        self.puzzle = PuzzleState::new(graph);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::NoPositions;

    fn scenario() -> GameSession {
        let graph = ChipGraph::from_edges(vec![-1, 3, -1], &[(0, 1), (1, 2)]).unwrap();
        GameSession::from_graph(
            GeneratorConfig::new(3, 2),
            graph,
            ChaCha8Rng::seed_from_u64(0),
        )
        .unwrap()
    }

    #[test]
    fn three_node_path_solves_in_one() {
        let mut session = scenario();
        assert_eq!(session.phase(), Phase::Playing);

        let outcome = session.fire(NodeId(1)).unwrap();
        assert!(matches!(
            outcome,
            FireOutcome::Solved {
                summary: Summary { moves: 1 },
                ..
            }
        ));
        assert_eq!(session.graph().values(), vec![0, 1, 0]);
        assert_eq!(session.moves(), 1);
        assert_eq!(session.phase(), Phase::Solved);
        assert_eq!(session.summary(), Some(Summary { moves: 1 }));
    }

    #[test]
    fn solved_rejects_fire() {
        let mut session = scenario();
        session.fire(NodeId(1)).unwrap();
        let err = session.fire(NodeId(0)).unwrap_err();
        assert_eq!(err, CoreError::PuzzleSolved { moves: 1 });
        assert_eq!(session.moves(), 1);
    }

    #[test]
    fn invalid_node_is_not_a_move() {
        let mut session = scenario();
        assert!(session.fire(NodeId(7)).is_err());
        assert_eq!(session.moves(), 0);
        assert_eq!(session.phase(), Phase::Playing);
    }

    #[test]
    fn reset_from_solved_starts_fresh() {
        let mut session = scenario();
        session.fire(NodeId(1)).unwrap();
        session.reset().unwrap();

        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.moves(), 0);
        assert_eq!(session.summary(), None);
        assert_eq!(session.graph().node_count(), 3);
        assert_eq!(session.graph().edge_count(), 2);
        assert!(session.graph().negative_count() > 0);
    }

    #[test]
    fn reconfigure_rejects_bad_domain_and_keeps_puzzle() {
        let mut session = scenario();
        let before = session.puzzle().clone();
        let err = session.reconfigure(GeneratorConfig::new(4, 9)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTopology { .. }));
        assert_eq!(session.puzzle(), &before);
        assert_eq!(session.config().nodes, 3);
    }

    #[test]
    fn reconfigure_switches_size() {
        let mut session = GameSession::seeded(GeneratorConfig::new(5, 6), 3).unwrap();
        session.reconfigure(GeneratorConfig::new(9, 12)).unwrap();
        assert_eq!(session.graph().node_count(), 9);
        assert_eq!(session.graph().edge_count(), 12);
        assert_eq!(session.config().edges, 12);
    }

    #[test]
    fn snapshot_reflects_session() {
        let mut session = scenario();
        session.fire(NodeId(1)).unwrap();
        let snapshot = session.snapshot(&NoPositions);
        assert_eq!(snapshot.moves, 1);
        assert!(snapshot.solved);
        assert_eq!(snapshot.nodes.len(), 3);
        assert_eq!(snapshot.edges.len(), 2);
    }

    #[test]
    fn seeded_sessions_agree() {
        let a = GameSession::seeded(GeneratorConfig::new(7, 10), 99).unwrap();
        let b = GameSession::seeded(GeneratorConfig::new(7, 10), 99).unwrap();
        assert_eq!(a.puzzle(), b.puzzle());
    }
}
