//! Batch scoring of a fixed model over many independent games.

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rayon::prelude::*;
use serde::Serialize;

use crate::game::GameSimulator;
use crate::grid::Board;
use crate::model::DecisionModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameRecord {
    pub seed: u64,
    pub score: i64,
    pub length: usize,
    pub steps: u64,
    pub died: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvalSummary {
    pub games: usize,
    pub mean_score: f64,
    pub min_score: i64,
    pub max_score: i64,
    pub mean_length: f64,
    pub mean_steps: f64,
    /// Games that ended by collision rather than the score floor.
    pub deaths: usize,
    pub fitness_penalty: f64,
}

/// Play game `i` with seed `seed + i`. Games run in parallel but each owns
/// its generator, so the result only depends on `seed`.
pub fn play_games(model: &DecisionModel, board: Board, games: usize, seed: u64) -> Vec<GameRecord> {
    (0..games as u64)
        .into_par_iter()
        .map(|i| {
            let seed = seed.wrapping_add(i);
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut game = GameSimulator::new(board, model, &mut rng);
            let score = game.play(&mut rng);
            GameRecord { seed, score, length: game.body().len(), steps: game.steps(), died: game.terminated() }
        })
        .collect()
}

pub fn summarize(model: &DecisionModel, records: &[GameRecord]) -> EvalSummary {
    let n = records.len();
    let mean = |f: fn(&GameRecord) -> f64| if n == 0 { 0.0 } else { records.iter().map(f).sum::<f64>() / n as f64 };
    EvalSummary {
        games: n,
        mean_score: mean(|r| r.score as f64),
        min_score: records.iter().map(|r| r.score).min().unwrap_or(0),
        max_score: records.iter().map(|r| r.score).max().unwrap_or(0),
        mean_length: mean(|r| r.length as f64),
        mean_steps: mean(|r| r.steps as f64),
        deaths: records.iter().filter(|r| r.died).count(),
        fitness_penalty: model.fitness_penalty(),
    }
}

pub fn evaluate(model: &DecisionModel, board: Board, games: usize, seed: u64) -> EvalSummary {
    summarize(model, &play_games(model, board, games, seed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_records() {
        let mut rng = SmallRng::seed_from_u64(99);
        let model = DecisionModel::random(&mut rng, 1.0);
        let a = play_games(&model, Board::default(), 16, 1234);
        let b = play_games(&model, Board::default(), 16, 1234);
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert!(a.iter().enumerate().all(|(i, r)| r.seed == 1234 + i as u64));
    }

    #[test]
    fn summary_of_known_records() {
        let rec = |score, length, steps, died| GameRecord { seed: 0, score, length, steps, died };
        let records = [rec(-100, 3, 16, true), rec(20, 5, 40, false), rec(-20, 4, 10, true)];
        let s = summarize(&DecisionModel::default(), &records);
        assert_eq!(s.games, 3);
        assert_eq!(s.mean_score, -100.0 / 3.0);
        assert_eq!((s.min_score, s.max_score), (-100, 20));
        assert_eq!(s.mean_length, 4.0);
        assert_eq!(s.mean_steps, 22.0);
        assert_eq!(s.deaths, 2);
        assert_eq!(s.fitness_penalty, 0.0);
    }

    #[test]
    fn empty_batch() {
        let s = summarize(&DecisionModel::default(), &[]);
        assert_eq!(s.games, 0);
        assert_eq!(s.mean_score, 0.0);
    }
}
