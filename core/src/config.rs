//! TOML configuration for the evaluator and the game driver.
//!
//! Every key is optional; missing keys take their defaults.
//!
//! ```
//! use play2048_core::Config;
//!
//! let config = Config::from_toml_str(r#"
//!     [weights]
//!     empty_weight = 3.0
//!
//!     [play]
//!     seed = 7
//! "#).unwrap();
//!
//! assert_eq!(config.weights.empty_weight, 3.0);
//! assert_eq!(config.weights.smoothness_weight, 0.1);
//! assert_eq!(config.play.seed, 7);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::evaluator::EvaluatorWeights;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub weights: EvaluatorWeights,
    pub play: PlayConfig,
}

/// Settings for simulated games.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayConfig {
    /// Seed for tile spawns.
    pub seed: u64,
    /// Stop an episode after this many moves (0 = unlimited).
    pub max_steps: u32,
    /// Keep playing after the first 2048 tile appears.
    pub keep_playing: bool,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_steps: 10_000,
            keep_playing: true,
        }
    }
}

impl Config {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()
    }
}
