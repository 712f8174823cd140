//! Chip-firing puzzle engine.
//!
//! Every node of a connected graph holds a signed chip count. Firing a node
//! sends one chip to each neighbor and costs the node its degree; the puzzle
//! is solved once no node is negative.
//!
//! - [`ChipGraph`] stores nodes and symmetric adjacency.
//! - [`Generator`] builds connected graphs with a solvable, unsolved start.
//! - [`simulator`] holds the firing rule and win predicate.
//! - [`GameSession`] drives a puzzle through `Setup -> Playing -> Solved`.
//! - [`layout`], [`interaction`] and [`snapshot`] are the thin adapters a
//!   front end uses for positions, pointer gestures and rendering.

pub mod error;
pub mod generator;
pub mod graph;
pub mod id;
pub mod interaction;
pub mod layout;
pub mod node;
pub mod session;
pub mod simulator;
pub mod snapshot;

// Flat paths for front ends.
pub use error::{CoreError, GenerationStage};
pub use generator::{
    AssignmentStrategy, EdgeBounds, Generator, GeneratorConfig, MAX_BONUS_RATIO,
};
pub use graph::ChipGraph;
pub use id::NodeId;
pub use interaction::{PointerAction, PointerState, PointerTracker};
pub use layout::{Board, Layout, NoPositions, Position, PositionSource};
pub use node::ChipNode;
pub use session::{FireOutcome, GameSession, Phase, PuzzleState};
pub use simulator::FireReport;
pub use snapshot::{Snapshot, Summary};
