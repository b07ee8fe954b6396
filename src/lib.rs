//! Snake driven by a tiny perceptron whose weights are evolved by hill climbing.

pub mod config;
pub mod draw;
pub mod evaluate;
pub mod evolution;
pub mod features;
pub mod game;
pub mod grid;
pub mod linalg;
pub mod model;
pub mod viewer;
pub mod weights;

pub use config::{ConfigError, TrainingConfig, ViewerConfig};
pub use evolution::{EvolutionLoop, Generation, TrainingSummary};
pub use features::{FEATURES, Features};
pub use game::{GameError, GameSimulator, Manual, MoveSource, StepOutcome};
pub use grid::{Board, Direction, Pos};
pub use model::DecisionModel;
pub use weights::WeightsError;
