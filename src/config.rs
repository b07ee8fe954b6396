//! Training and viewer settings.
//!
//! Everything has a default so a config file only needs the keys it changes.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::Board;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("board {width}x{height} is too small, need at least 5x2")]
    BoardTooSmall { width: i32, height: i32 },
    #[error("mutation range [{min}, {max}] must be non-negative and ordered")]
    MutationRange { min: f64, max: f64 },
    #[error("init_epsilon must be non-negative, got {0}")]
    InitEpsilon(f64),
    #[error("report_every must be at least 1")]
    ReportInterval,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub board: Board,
    pub generations: u64,
    /// Bounds of the per-generation mutation magnitude draw.
    pub mutation_min: f64,
    pub mutation_max: f64,
    /// Spread of the weights of a freshly randomized model.
    pub init_epsilon: f64,
    /// Log the incumbent every this many generations.
    pub report_every: u64,
    /// `None` draws a seed from the OS.
    pub seed: Option<u64>,
    /// Where improved weights are written.
    pub weights_path: Option<PathBuf>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            board: Board::default(),
            generations: 20_000,
            mutation_min: 0.5,
            mutation_max: 1.5,
            init_epsilon: 1.0,
            report_every: 200,
            seed: None,
            weights_path: None,
        }
    }
}

impl TrainingConfig {
    pub const DEFAULT_WEIGHTS_FILE: &'static str = "alpha.csv";

    /// Weight file for the CLI: the flag wins, then the config, then `alpha.csv`.
    pub fn resolve_weights_path(&mut self, flag: Option<PathBuf>) -> &Path {
        let path = flag
            .or_else(|| self.weights_path.take())
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_WEIGHTS_FILE));
        self.weights_path.insert(path)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let config: Self =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.board.fits_start() {
            return Err(ConfigError::BoardTooSmall { width: self.board.width, height: self.board.height });
        }
        let (min, max) = (self.mutation_min, self.mutation_max);
        if !(min >= 0.0 && min <= max && max.is_finite()) {
            return Err(ConfigError::MutationRange { min, max });
        }
        if !(self.init_epsilon >= 0.0) {
            return Err(ConfigError::InitEpsilon(self.init_epsilon));
        }
        if self.report_every == 0 {
            return Err(ConfigError::ReportInterval);
        }
        Ok(())
    }
}

/// Window and pacing for the interactive front ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub board: Board,
    /// Pixels per grid cell.
    pub cell_size: u32,
    pub tick_ms: u64,
}

impl ViewerConfig {
    pub const WATCH_TICK_MS: u64 = 50;
    pub const PLAY_TICK_MS: u64 = 150;
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self { board: Board::default(), cell_size: 24, tick_ms: Self::WATCH_TICK_MS }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = TrainingConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.board, Board::new(20, 20));
        assert_eq!((cfg.mutation_min, cfg.mutation_max), (0.5, 1.5));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: TrainingConfig = serde_json::from_str(r#"{"generations": 10, "seed": 42}"#).unwrap();
        assert_eq!(cfg.generations, 10);
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.report_every, 200);
        assert_eq!(cfg.board, Board::default());
    }

    #[test]
    fn rejects_bad_values() {
        let mut cfg = TrainingConfig { board: Board::new(4, 10), ..Default::default() };
        assert!(matches!(cfg.validate(), Err(ConfigError::BoardTooSmall { .. })));

        cfg.board = Board::default();
        cfg.mutation_min = 2.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::MutationRange { .. })));

        cfg.mutation_min = 0.0;
        cfg.mutation_max = 0.0;
        cfg.validate().unwrap();

        cfg.report_every = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::ReportInterval)));
    }

    #[test]
    fn weights_path_prefers_flag_then_config() {
        let from_config: TrainingConfig = serde_json::from_str(r#"{"weights_path": "runs/best.csv"}"#).unwrap();

        let mut cfg = from_config.clone();
        assert_eq!(cfg.resolve_weights_path(None), Path::new("runs/best.csv"));
        assert_eq!(cfg.weights_path, Some(PathBuf::from("runs/best.csv")));

        let mut cfg = from_config;
        assert_eq!(cfg.resolve_weights_path(Some("cli.csv".into())), Path::new("cli.csv"));
        assert_eq!(cfg.weights_path, Some(PathBuf::from("cli.csv")));

        let mut cfg = TrainingConfig::default();
        assert_eq!(cfg.resolve_weights_path(None), Path::new(TrainingConfig::DEFAULT_WEIGHTS_FILE));
    }

    #[test]
    fn from_file_reports_path() {
        let path = std::env::temp_dir().join(format!("snake-evo-cfg-{}.json", std::process::id()));
        fs::write(&path, "{ not json").unwrap();
        let err = TrainingConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("snake-evo-cfg"));
        fs::remove_file(&path).ok();
    }
}
