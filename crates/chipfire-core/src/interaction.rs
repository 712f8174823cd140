//! Pointer gesture tracking: telling a click apart from a drag.
//!
//! A node fires only when it is pressed and released with no movement in
//! between. Any movement while pressed turns the gesture into a drag, which
//! relocates the node and never counts as a move.
//!
//! ```text
//! Idle --press(hit)--> Pressed(id) --release--> Idle   => Fire(id)
//!                          |
//!                        drag
//!                          v
//!                     Dragging(id) --release--> Idle   => Moved(id)
//! ```

use serde::Serialize;

use crate::id::NodeId;
use crate::layout::{Layout, Position};

/// Where the current gesture stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerState {
    #[default]
    Idle,
    Pressed(NodeId),
    Dragging(NodeId),
}

/// The single unambiguous result of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "node", rename_all = "snake_case")]
pub enum PointerAction {
    /// Nothing for the game to do.
    None,
    /// A clean click on a node: fire it.
    Fire(NodeId),
    /// The node was repositioned.
    Moved(NodeId),
    /// The puzzle was solved and the player clicked to start a new one.
    Restart,
}

#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    state: PointerState,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PointerState {
        self.state
    }

    /// Pointer down at `(x, y)`.
    pub fn press(&mut self, layout: &Layout, x: f64, y: f64) {
        self.state = match layout.pick_node(x, y) {
            Some(id) => PointerState::Pressed(id),
            None => PointerState::Idle,
        };
    }

    /// Presses `id` directly, for front ends that pick nodes without
    /// coordinates.
    pub fn grab(&mut self, id: NodeId) {
        self.state = PointerState::Pressed(id);
    }

    /// Pointer moved to `(x, y)`. Drags the pressed node, if any.
    pub fn drag(&mut self, layout: &mut Layout, x: f64, y: f64) -> PointerAction {
        match self.state {
            PointerState::Pressed(id) | PointerState::Dragging(id) => {
                self.state = PointerState::Dragging(id);
                match layout.move_node(id, Position::new(x, y)) {
                    Ok(_) => PointerAction::Moved(id),
                    // Layout was swapped under a stale gesture.
                    Err(_) => self.cancel(),
                }
            }
            PointerState::Idle => PointerAction::None,
        }
    }

    /// Pointer up at `(x, y)`. `solved` is the session's state at release.
    pub fn release(&mut self, layout: &mut Layout, x: f64, y: f64, solved: bool) -> PointerAction {
        let state = std::mem::take(&mut self.state);
        if solved {
            return PointerAction::Restart;
        }
        match state {
            PointerState::Idle => PointerAction::None,
            PointerState::Pressed(id) => PointerAction::Fire(id),
            PointerState::Dragging(id) => match layout.move_node(id, Position::new(x, y)) {
                Ok(_) => PointerAction::Moved(id),
                Err(_) => PointerAction::None,
            },
        }
    }

    /// Abandons the current gesture.
    pub fn cancel(&mut self) -> PointerAction {
        self.state = PointerState::Idle;
        PointerAction::None
    }
}
