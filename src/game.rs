use std::collections::VecDeque;
use std::fmt;

use rand::Rng;
use thiserror::Error;

use crate::features::{self, Features};
use crate::grid::{Board, Direction, Pos};
use crate::model::DecisionModel;

/// Cumulative score at or below which an unattended game is abandoned.
pub const SCORE_FLOOR: i64 = -100;

pub const DEATH_PENALTY: i64 = -100;
pub const FOOD_REWARD: i64 = 10;
pub const APPROACH_REWARD: i64 = 2;
pub const RETREAT_PENALTY: i64 = -4;

const START_BODY: [(i32, i32); 3] = [(2, 1), (3, 1), (4, 1)];

/// Anything that can pick the snake's next direction.
pub trait MoveSource {
    fn next_direction(&mut self, features: &Features, current: Direction) -> Direction;
}

impl MoveSource for DecisionModel {
    fn next_direction(&mut self, features: &Features, _current: Direction) -> Direction {
        self.decide(features)
    }
}

impl MoveSource for &DecisionModel {
    fn next_direction(&mut self, features: &Features, _current: Direction) -> Direction {
        self.decide(features)
    }
}

/// Keyboard-driven source: adopts the last requested direction once, then
/// keeps going straight.
#[derive(Debug, Clone, Default)]
pub struct Manual {
    pending: Option<Direction>,
}

impl Manual {
    pub fn steer(&mut self, dir: Direction) {
        self.pending = Some(dir);
    }
}

impl MoveSource for Manual {
    fn next_direction(&mut self, _features: &Features, current: Direction) -> Direction {
        self.pending.take().unwrap_or(current)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Moved,
    Ate,
    Died,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("snake body needs at least 3 cells, got {0}")]
    ShortBody(usize),
    #[error("snake body visits {0:?} twice")]
    DuplicateCell(Pos),
    #[error("{0:?} lies outside the board")]
    OutOfBounds(Pos),
    #[error("food at {0:?} overlaps the snake")]
    FoodOnBody(Pos),
}

/// One game of snake on a fixed board.
///
/// The body is stored tail-first, so the head is the back of the deque. A
/// fatal move never enters the body: the body keeps its pre-move cells and
/// the offending cell is reported by [`GameSimulator::crash_site`].
pub struct GameSimulator<S> {
    board: Board,
    body: VecDeque<Pos>,
    direction: Direction,
    food: Pos,
    score: i64,
    steps: u64,
    terminated: bool,
    just_ate: bool,
    crash: Option<Pos>,
    source: S,
}

impl<S: MoveSource> GameSimulator<S> {
    /// Standard opening: three cells along row 1 heading right, food at random.
    pub fn new<R: Rng + ?Sized>(board: Board, source: S, rng: &mut R) -> Self {
        debug_assert!(board.fits_start(), "board {board:?} cannot hold the starting snake");
        let mut game = Self {
            board,
            body: START_BODY.iter().map(|&c| Pos::from(c)).collect(),
            direction: Direction::Right,
            food: Pos::new(0, 0),
            score: 0,
            steps: 0,
            terminated: false,
            just_ate: false,
            crash: None,
            source,
        };
        game.place_food(rng);
        game
    }

    /// Start from an explicit position. `body` is tail-first.
    pub fn with_state(
        board: Board,
        body: impl IntoIterator<Item = Pos>,
        direction: Direction,
        food: Pos,
        source: S,
    ) -> Result<Self, GameError> {
        let body: VecDeque<Pos> = body.into_iter().collect();
        if body.len() < START_BODY.len() {
            return Err(GameError::ShortBody(body.len()));
        }
        for (i, &cell) in body.iter().enumerate() {
            if !board.contains(cell) {
                return Err(GameError::OutOfBounds(cell));
            }
            if body.iter().skip(i + 1).any(|&other| other == cell) {
                return Err(GameError::DuplicateCell(cell));
            }
        }
        if !board.contains(food) {
            return Err(GameError::OutOfBounds(food));
        }
        if body.contains(&food) {
            return Err(GameError::FoodOnBody(food));
        }
        Ok(Self {
            board,
            body,
            direction,
            food,
            score: 0,
            steps: 0,
            terminated: false,
            just_ate: false,
            crash: None,
            source,
        })
    }

    /// Advance one tick. A terminated game does not move.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> StepOutcome {
        if self.terminated {
            return StepOutcome::Died;
        }

        let dropped_tail = if self.just_ate {
            self.just_ate = false;
            None
        } else {
            self.body.pop_front()
        };

        let features = self.features();
        self.direction = self.source.next_direction(&features, self.direction);

        let prev_head = self.head();
        let new_head = prev_head.step(self.direction);
        self.steps += 1;

        if self.body.contains(&new_head) || !self.board.contains(new_head) {
            self.terminated = true;
            self.crash = Some(new_head);
            if let Some(tail) = dropped_tail {
                self.body.push_front(tail);
            }
            self.score += DEATH_PENALTY;
            return StepOutcome::Died;
        }

        self.body.push_back(new_head);

        if new_head == self.food {
            self.just_ate = true;
            self.place_food(rng);
            self.score += FOOD_REWARD;
            return StepOutcome::Ate;
        }

        if new_head.manhattan(self.food) <= prev_head.manhattan(self.food) {
            self.score += APPROACH_REWARD;
        } else {
            self.score += RETREAT_PENALTY;
        }
        StepOutcome::Moved
    }

    /// Run until the snake dies or the score hits the floor.
    pub fn play<R: Rng + ?Sized>(&mut self, rng: &mut R) -> i64 {
        self.play_observed(rng, |_| {})
    }

    /// Like [`play`](Self::play), calling `observer` after every step.
    pub fn play_observed<R, F>(&mut self, rng: &mut R, mut observer: F) -> i64
    where
        R: Rng + ?Sized,
        F: FnMut(&Self),
    {
        while !self.is_finished() {
            self.advance(rng);
            observer(self);
        }
        self.score
    }

    /// Re-place food uniformly over free cells.
    fn place_food<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        // With a full board this would spin forever.
        debug_assert!(self.body.len() < self.board.cells());
        loop {
            let p = Pos::new(rng.gen_range(0..self.board.width), rng.gen_range(0..self.board.height));
            if !self.body.contains(&p) {
                self.food = p;
                return;
            }
        }
    }
}

impl<S> GameSimulator<S> {
    pub fn features(&self) -> Features {
        features::encode(&self.body, self.direction, self.food, &self.board)
    }

    pub fn is_finished(&self) -> bool {
        self.terminated || self.score <= SCORE_FLOOR
    }

    pub fn head(&self) -> Pos {
        self.body[self.body.len() - 1]
    }

    pub fn body(&self) -> &VecDeque<Pos> {
        &self.body
    }

    pub fn board(&self) -> Board {
        self.board
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn food(&self) -> Pos {
        self.food
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn terminated(&self) -> bool {
        self.terminated
    }

    pub fn just_ate(&self) -> bool {
        self.just_ate
    }

    /// Cell the snake tried to enter on its fatal move.
    pub fn crash_site(&self) -> Option<Pos> {
        self.crash
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }
}

impl<S> fmt::Display for GameSimulator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head = self.head();
        for y in 0..self.board.height {
            for x in 0..self.board.width {
                let p = Pos::new(x, y);
                let ch = if p == head {
                    '@'
                } else if self.body.contains(&p) {
                    '#'
                } else if p == self.food {
                    '*'
                } else {
                    '.'
                };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
