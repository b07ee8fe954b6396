//! The fixed 10-7-7-4 perceptron that steers the snake.

use std::path::Path;

use rand::Rng;

use crate::features::{FEATURES, Features};
use crate::grid::Direction;
use crate::linalg::{Matrix, argmax, sigmoid_all, with_bias};
use crate::weights::{self, WeightsError};

pub const HIDDEN: usize = 7;
pub const OUTPUTS: usize = 4;

/// Weight given to the squared-weight penalty in fitness.
pub const PENALTY_COEFFICIENT: f64 = 0.01;

pub type Layer1 = Matrix<HIDDEN, { FEATURES + 1 }>;
pub type Layer2 = Matrix<HIDDEN, { HIDDEN + 1 }>;
pub type Layer3 = Matrix<OUTPUTS, { HIDDEN + 1 }>;

/// Three sigmoid layers, each fed a bias-extended input.
///
/// `Clone` is a deep copy: the matrices are plain arrays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecisionModel {
    pub theta1: Layer1,
    pub theta2: Layer2,
    pub theta3: Layer3,
}

impl DecisionModel {
    pub fn new(theta1: Layer1, theta2: Layer2, theta3: Layer3) -> Self {
        Self { theta1, theta2, theta3 }
    }

    /// Fresh weights drawn from `U[-epsilon, epsilon)`.
    pub fn random(rng: &mut impl Rng, epsilon: f64) -> Self {
        let mut model = Self::default();
        model.randomize(rng, epsilon);
        model
    }

    pub fn randomize(&mut self, rng: &mut impl Rng, epsilon: f64) {
        self.theta1 = Matrix::uniform(rng, epsilon);
        self.theta2 = Matrix::uniform(rng, epsilon);
        self.theta3 = Matrix::uniform(rng, epsilon);
    }

    /// Output-layer activations for `features`.
    pub fn activations(&self, features: &Features) -> [f64; OUTPUTS] {
        let a1: [f64; FEATURES + 1] = with_bias(features);
        let a2: [f64; HIDDEN + 1] = with_bias(&sigmoid_all(self.theta1.mul_vec(&a1)));
        let a3: [f64; HIDDEN + 1] = with_bias(&sigmoid_all(self.theta2.mul_vec(&a2)));
        sigmoid_all(self.theta3.mul_vec(&a3))
    }

    pub fn decide(&self, features: &Features) -> Direction {
        Direction::from_index(argmax(&self.activations(features)))
    }

    /// Perturb one layer, chosen uniformly, with `U[-epsilon, epsilon)` noise.
    pub fn mutate(&mut self, rng: &mut impl Rng, epsilon: f64) {
        match rng.gen_range(0..3) {
            0 => self.theta1.perturb(rng, epsilon),
            1 => self.theta2.perturb(rng, epsilon),
            _ => self.theta3.perturb(rng, epsilon),
        }
    }

    /// Regularization term subtracted from a game score to get fitness.
    pub fn fitness_penalty(&self) -> f64 {
        let sum = self.theta1.sum_of_squares() + self.theta2.sum_of_squares() + self.theta3.sum_of_squares();
        sum * PENALTY_COEFFICIENT
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, WeightsError> {
        weights::read_file(path.as_ref())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), WeightsError> {
        weights::write_file(self, path.as_ref())
    }
}
