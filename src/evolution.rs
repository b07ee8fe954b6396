//! Single-candidate hill climbing over network weights.
//!
//! Each generation clones the incumbent ("alpha"), mutates one of its layers,
//! plays one game with the clone and keeps it only if its fitness is strictly
//! higher. Alpha's fitness is the one measured by the game that installed it;
//! it is never replayed.

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{ConfigError, TrainingConfig};
use crate::game::GameSimulator;
use crate::grid::Board;
use crate::model::DecisionModel;
use crate::weights::WeightsError;

/// What one generation did.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Generation {
    pub index: u64,
    pub epsilon: f64,
    pub score: i64,
    pub fitness: f64,
    pub accepted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingSummary {
    pub generations: u64,
    pub improvements: u64,
    pub initial_fitness: f64,
    pub best_fitness: f64,
    pub best_score: i64,
    pub best_penalty: f64,
}

/// Score of one full game with `model`, minus its weight penalty.
pub fn evaluate_fitness<R: Rng + ?Sized>(model: &DecisionModel, board: Board, rng: &mut R) -> (i64, f64) {
    let score = GameSimulator::new(board, model, rng).play(rng);
    (score, score as f64 - model.fitness_penalty())
}

pub struct EvolutionLoop<R> {
    config: TrainingConfig,
    rng: R,
    alpha: DecisionModel,
    alpha_fitness: f64,
    alpha_score: i64,
    initial_fitness: f64,
    generation: u64,
    improvements: u64,
}

impl<R: Rng> EvolutionLoop<R> {
    /// Play one game with `alpha` to establish the fitness to beat.
    pub fn new(alpha: DecisionModel, config: TrainingConfig, mut rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let (score, fitness) = evaluate_fitness(&alpha, config.board, &mut rng);
        info!(score, fitness, "initial alpha evaluated");
        Ok(Self::assemble(alpha, fitness, score, config, rng))
    }

    /// Install `alpha` with an already known fitness.
    pub fn with_incumbent(
        alpha: DecisionModel,
        fitness: f64,
        config: TrainingConfig,
        rng: R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let score = (fitness + alpha.fitness_penalty()).round() as i64;
        Ok(Self::assemble(alpha, fitness, score, config, rng))
    }

    fn assemble(alpha: DecisionModel, fitness: f64, score: i64, config: TrainingConfig, rng: R) -> Self {
        Self {
            config,
            rng,
            alpha,
            alpha_fitness: fitness,
            alpha_score: score,
            initial_fitness: fitness,
            generation: 0,
            improvements: 0,
        }
    }

    /// Run one generation.
    pub fn step(&mut self) -> Result<Generation, WeightsError> {
        let index = self.generation;
        self.generation += 1;

        let mut candidate = self.alpha.clone();
        let epsilon = self.rng.gen_range(self.config.mutation_min..=self.config.mutation_max);
        candidate.mutate(&mut self.rng, epsilon);
        let (score, fitness) = evaluate_fitness(&candidate, self.config.board, &mut self.rng);

        if index % self.config.report_every == 0 {
            info!(generation = index, fitness = self.alpha_fitness, score = self.alpha_score, "incumbent");
        }

        let accepted = fitness > self.alpha_fitness;
        if accepted {
            let penalty = candidate.fitness_penalty();
            self.alpha = candidate;
            self.alpha_fitness = fitness;
            self.alpha_score = score;
            self.improvements += 1;
            if let Some(path) = &self.config.weights_path {
                self.alpha.save(path)?;
            }
            info!(generation = index, fitness, score, penalty, "evolution");
        } else {
            debug!(generation = index, fitness, score, epsilon, "candidate discarded");
        }

        Ok(Generation { index, epsilon, score, fitness, accepted })
    }

    /// Run the configured number of generations.
    pub fn run(&mut self) -> Result<TrainingSummary, WeightsError> {
        for _ in 0..self.config.generations {
            self.step()?;
        }
        Ok(self.summary())
    }

    pub fn summary(&self) -> TrainingSummary {
        TrainingSummary {
            generations: self.generation,
            improvements: self.improvements,
            initial_fitness: self.initial_fitness,
            best_fitness: self.alpha_fitness,
            best_score: self.alpha_score,
            best_penalty: self.alpha.fitness_penalty(),
        }
    }

    pub fn alpha(&self) -> &DecisionModel {
        &self.alpha
    }

    pub fn alpha_fitness(&self) -> f64 {
        self.alpha_fitness
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn into_alpha(self) -> DecisionModel {
        self.alpha
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn config(generations: u64) -> TrainingConfig {
        TrainingConfig { generations, seed: Some(0), ..Default::default() }
    }

    #[test]
    fn unbeatable_alpha_survives() {
        let mut rng = SmallRng::seed_from_u64(10);
        let alpha = DecisionModel::random(&mut rng, 1.0);
        let cfg = TrainingConfig { mutation_min: 0.0, mutation_max: 0.0, ..config(1) };
        let mut evo = EvolutionLoop::with_incumbent(alpha.clone(), 1e12, cfg, rng).unwrap();

        let summary = evo.run().unwrap();
        assert_eq!(evo.alpha(), &alpha);
        assert_eq!(evo.alpha_fitness(), 1e12);
        assert_eq!(summary.generations, 1);
        assert_eq!(summary.improvements, 0);
    }

    #[test]
    fn hopeless_alpha_is_replaced_and_saved() {
        let path = std::env::temp_dir().join(format!("snake-evo-alpha-{}.csv", std::process::id()));
        let rng = SmallRng::seed_from_u64(11);
        let cfg = TrainingConfig { weights_path: Some(path.clone()), ..config(1) };
        let mut evo = EvolutionLoop::with_incumbent(DecisionModel::default(), -1e12, cfg, rng).unwrap();

        let generation = evo.step().unwrap();
        assert!(generation.accepted);
        assert!((0.5..=1.5).contains(&generation.epsilon));
        assert_eq!(evo.alpha_fitness(), generation.fitness);
        assert_eq!(generation.fitness, generation.score as f64 - evo.alpha().fitness_penalty());
        assert_eq!(evo.summary().best_score, generation.score);
        assert_ne!(evo.alpha(), &DecisionModel::default());

        let saved = DecisionModel::load(&path).unwrap();
        assert_eq!(&saved, evo.alpha());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn fitness_never_decreases() {
        let mut rng = SmallRng::seed_from_u64(12);
        let alpha = DecisionModel::random(&mut rng, 1.0);
        let mut evo = EvolutionLoop::new(alpha, config(0), rng).unwrap();
        let mut last = evo.alpha_fitness();
        for _ in 0..50 {
            let g = evo.step().unwrap();
            assert!(evo.alpha_fitness() >= last);
            assert_eq!(g.accepted, evo.alpha_fitness() > last);
            last = evo.alpha_fitness();
        }
        assert_eq!(evo.generation(), 50);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = TrainingConfig { report_every: 0, ..Default::default() };
        let rng = SmallRng::seed_from_u64(0);
        assert!(EvolutionLoop::with_incumbent(DecisionModel::default(), 0.0, cfg, rng).is_err());
    }
}
