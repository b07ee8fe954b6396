//! Board-to-network feature encoding.
//!
//! Layout of the 10 inputs:
//! - `0..4` one-hot of the current direction (right, down, left, up)
//! - `4..6` food offset from the head (dx, dy)
//! - `6..10` obstacle flags left, right, up, down of the head

use std::collections::VecDeque;

use crate::grid::{Board, Direction, Pos};

pub const FEATURES: usize = 10;

pub type Features = [f64; FEATURES];

/// Encode the state the model decides from. `body` is tail-first; its last
/// element is the head.
pub fn encode(body: &VecDeque<Pos>, direction: Direction, food: Pos, board: &Board) -> Features {
    let mut f = [0.0; FEATURES];
    let Some(&head) = body.back() else {
        return f;
    };

    f[direction.index()] = 1.0;

    f[4] = f64::from(food.x - head.x);
    f[5] = f64::from(food.y - head.y);

    let blocked = |p: Pos| !board.contains(p) || body.contains(&p);
    let around = [Direction::Left, Direction::Right, Direction::Up, Direction::Down];
    for (slot, dir) in around.into_iter().enumerate() {
        if blocked(head.step(dir)) {
            f[6 + slot] = 1.0;
        }
    }
    f
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(cells: &[(i32, i32)]) -> VecDeque<Pos> {
        cells.iter().map(|&c| Pos::from(c)).collect()
    }

    #[test]
    fn open_field() {
        let b = body(&[(5, 5), (6, 5), (7, 5)]);
        let f = encode(&b, Direction::Down, Pos::new(10, 2), &Board::default());
        assert_eq!(&f[0..4], &[0.0, 1.0, 0.0, 0.0]);
        assert_eq!(f[4], 3.0);
        assert_eq!(f[5], -3.0);
        // Only the neck to the left is blocked.
        assert_eq!(&f[6..10], &[1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn corner_walls() {
        let b = body(&[(2, 0), (1, 0), (0, 0)]);
        let f = encode(&b, Direction::Left, Pos::new(4, 4), &Board::default());
        assert_eq!(&f[0..4], &[0.0, 0.0, 1.0, 0.0]);
        // left wall, right neck, top wall, bottom free
        assert_eq!(&f[6..10], &[1.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn far_edges_use_board_size() {
        let board = Board::new(8, 6);
        let b = body(&[(5, 5), (6, 5), (7, 5)]);
        let f = encode(&b, Direction::Right, Pos::new(0, 0), &board);
        assert_eq!(&f[6..10], &[1.0, 1.0, 0.0, 1.0]);
    }
}
