//! Grid primitives shared by the simulator, the feature encoder and the viewer.

use serde::{Deserialize, Serialize};

/// Direction the snake travels on the next step.
///
/// The discriminants follow the order used by the network's output layer and
/// by the one-hot block of the feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Right = 0,
    Down = 1,
    Left = 2,
    Up = 3,
}

impl Direction {
    /// All directions in network order.
    pub const ALL: [Direction; 4] = [Direction::Right, Direction::Down, Direction::Left, Direction::Up];

    /// Direction for an output index of the network. Panics past 3.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// (dx, dy) with y growing downwards.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Cell coordinate. Signed so a head that leaves the board is representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn manhattan(self, other: Pos) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl From<(i32, i32)> for Pos {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// Playing field dimensions, fixed for the lifetime of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub width: i32,
    pub height: i32,
}

impl Board {
    /// Smallest board that still holds the starting body at row 1.
    pub const MIN_WIDTH: i32 = 5;
    pub const MIN_HEIGHT: i32 = 2;

    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// The single bounds rule used for both termination and obstacle flags.
    pub fn contains(&self, p: Pos) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height
    }

    pub fn cells(&self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }

    pub fn fits_start(&self) -> bool {
        self.width >= Self::MIN_WIDTH && self.height >= Self::MIN_HEIGHT
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(20, 20)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_order_matches_network_outputs() {
        assert_eq!(Direction::from_index(0), Direction::Right);
        assert_eq!(Direction::from_index(1), Direction::Down);
        assert_eq!(Direction::from_index(2), Direction::Left);
        assert_eq!(Direction::from_index(3), Direction::Up);
        for d in Direction::ALL {
            assert_eq!(Direction::from_index(d.index()), d);
        }
    }

    #[test]
    #[should_panic]
    fn direction_index_past_outputs_panics() {
        Direction::from_index(4);
    }

    #[test]
    fn bounds_reject_every_edge() {
        let board = Board::new(20, 20);
        assert!(board.contains(Pos::new(0, 0)));
        assert!(board.contains(Pos::new(19, 19)));
        assert!(!board.contains(Pos::new(20, 5)));
        assert!(!board.contains(Pos::new(5, 20)));
        assert!(!board.contains(Pos::new(-1, 5)));
        assert!(!board.contains(Pos::new(5, -1)));
    }

    #[test]
    fn step_and_distance() {
        let p = Pos::new(3, 3);
        assert_eq!(p.step(Direction::Up), Pos::new(3, 2));
        assert_eq!(p.step(Direction::Down), Pos::new(3, 4));
        assert_eq!(p.step(Direction::Left), Pos::new(2, 3));
        assert_eq!(p.step(Direction::Right), Pos::new(4, 3));
        assert_eq!(p.manhattan(Pos::new(0, 7)), 7);
    }
}
