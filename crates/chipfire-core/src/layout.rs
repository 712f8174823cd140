//! Display-only node placement and hit testing.
//!
//! Positions belong to the front end, never to the puzzle: nothing in
//! generation or firing reads them. The core only asks for them through
//! [`PositionSource`] when it builds a render snapshot.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::id::NodeId;

/// A point on the board, in board units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }

    fn distance_sq(self, other: Position) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2)
    }
}

/// Board dimensions and the drawn node radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub width: f64,
    pub height: f64,
    pub node_radius: f64,
}

impl Board {
    /// Radius a node would have on a one-megapixel board at scale 2.
    pub const BASE_NODE_RADIUS: f64 = 30.0;

    /// Derives the node radius from the viewport area.
    pub fn scaled(width: f64, height: f64) -> Self {
        Board {
            width,
            height,
            node_radius: Self::BASE_NODE_RADIUS * 0.5 * width * height / 1e6,
        }
    }

    /// Keeps a node two radii away from every border. Falls back to the
    /// board's center line on an axis too small for that margin.
    pub fn clamp(&self, pos: Position) -> Position {
        let margin = 2.0 * self.node_radius;
        Position {
            x: clamp_axis(pos.x, margin, self.width),
            y: clamp_axis(pos.y, margin, self.height),
        }
    }
}

fn clamp_axis(value: f64, margin: f64, extent: f64) -> f64 {
    let (lo, hi) = (margin, extent - margin);
    if lo > hi {
        extent / 2.0
    } else {
        value.clamp(lo, hi)
    }
}

/// Accessor the core uses to attach positions to snapshot nodes.
pub trait PositionSource {
    fn position_of(&self, id: NodeId) -> Option<Position>;
}

/// Position source for headless use. Every lookup yields `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPositions;

impl PositionSource for NoPositions {
    fn position_of(&self, _id: NodeId) -> Option<Position> {
        None
    }
}

/// Positions for every node of one puzzle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    board: Board,
    positions: Vec<Position>,
}

impl Layout {
    /// Places `node_count` nodes uniformly at random inside the board margin.
    pub fn scatter<R: Rng + ?Sized>(board: Board, node_count: usize, rng: &mut R) -> Self {
        let positions = (0..node_count)
            .map(|_| {
                board.clamp(Position {
                    x: rng.gen::<f64>() * board.width,
                    y: rng.gen::<f64>() * board.height,
                })
            })
            .collect();
        Layout { board, positions }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn node_count(&self) -> usize {
        self.positions.len()
    }

    /// First node (lowest id) whose circle contains `(x, y)`.
    pub fn pick_node(&self, x: f64, y: f64) -> Option<NodeId> {
        let point = Position { x, y };
        let radius_sq = self.board.node_radius.powi(2);
        self.positions
            .iter()
            .position(|&p| p.distance_sq(point) <= radius_sq)
            .map(|idx| NodeId(idx as u32))
    }

    /// Moves `id` to `pos`, clamped into the board. Returns where it landed.
    pub fn move_node(&mut self, id: NodeId, pos: Position) -> Result<Position, CoreError> {
        let node_count = self.positions.len();
        let clamped = self.board.clamp(pos);
        let slot = self
            .positions
            .get_mut(id.index())
            .ok_or(CoreError::InvalidNodeId { id, node_count })?;
        *slot = clamped;
        Ok(clamped)
    }
}

impl PositionSource for Layout {
    fn position_of(&self, id: NodeId) -> Option<Position> {
        self.positions.get(id.index()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn board() -> Board {
        Board {
            width: 200.0,
            height: 100.0,
            node_radius: 5.0,
        }
    }

    #[test]
    fn scaled_radius_follows_area() {
        let board = Board::scaled(1000.0, 1000.0);
        assert_eq!(board.node_radius, 15.0);
    }

    #[test]
    fn clamp_keeps_margin() {
        let clamped = board().clamp(Position::new(-50.0, 500.0));
        assert_eq!(clamped, Position::new(10.0, 90.0));
    }

    #[test]
    fn clamp_centers_on_tiny_board() {
        let tiny = Board {
            width: 10.0,
            height: 10.0,
            node_radius: 5.0,
        };
        assert_eq!(tiny.clamp(Position::new(0.0, 9.0)), Position::new(5.0, 5.0));
    }

    #[test]
    fn scatter_stays_inside_margin() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let layout = Layout::scatter(board(), 50, &mut rng);
        assert_eq!(layout.node_count(), 50);
        for p in layout.positions() {
            assert!((10.0..=190.0).contains(&p.x));
            assert!((10.0..=90.0).contains(&p.y));
        }
    }

    #[test]
    fn pick_node_hits_first_overlapping_circle() {
        let layout = Layout {
            board: board(),
            positions: vec![
                Position::new(20.0, 20.0),
                Position::new(23.0, 20.0),
                Position::new(80.0, 50.0),
            ],
        };
        assert_eq!(layout.pick_node(22.0, 20.0), Some(NodeId(0)));
        assert_eq!(layout.pick_node(27.0, 20.0), Some(NodeId(1)));
        assert_eq!(layout.pick_node(80.0, 55.0), Some(NodeId(2)));
        assert_eq!(layout.pick_node(150.0, 50.0), None);
    }

    #[test]
    fn move_node_clamps_and_validates() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut layout = Layout::scatter(board(), 2, &mut rng);
        let landed = layout.move_node(NodeId(1), Position::new(500.0, 50.0)).unwrap();
        assert_eq!(landed, Position::new(190.0, 50.0));
        assert_eq!(layout.position_of(NodeId(1)), Some(landed));
        assert!(layout.move_node(NodeId(2), Position::new(0.0, 0.0)).is_err());
    }
}
