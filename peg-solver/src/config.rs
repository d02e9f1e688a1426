//! Solver configuration, loadable from TOML.
//!
//! ```toml
//! [board]
//! side = 7
//! short_edge = 3
//!
//! [search]
//! target_pins = 1
//! prune = true
//! prune_below_pins = 15
//! min_lost_legs = 2
//! pins_per_leg = 3
//! progress_interval = 10000
//! ```

use std::path::{Path, PathBuf};

use peg_core::BoardConfig;
use serde::{Deserialize, Serialize};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum SolverConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("invalid board: {0}")]
    Board(#[from] peg_core::ConfigError),

    #[error("config validation error: {0}")]
    Validation(String),
}

/// Search parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Stop once this many pins remain.
    pub target_pins: usize,
    /// Run the leg-loss check at all.
    pub prune: bool,
    /// Only check for lost legs below this pin count.
    pub prune_below_pins: usize,
    /// A position is only lost with at least this many lost legs.
    pub min_lost_legs: usize,
    /// Free pins needed to clear one leg.
    pub pins_per_leg: usize,
    /// Log progress every this many dead ends (0 disables).
    pub progress_interval: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            target_pins: 1,
            prune: true,
            prune_below_pins: 15,
            min_lost_legs: 2,
            pins_per_leg: 3,
            progress_interval: 10_000,
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub board: BoardConfig,
    pub search: SearchConfig,
}

impl SolverConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, SolverConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| SolverConfigError::FileRead {
                path: path.to_path_buf(),
                source: e,
            })?;
        Self::parse(&content)
    }

    /// Parse and validate configuration text.
    pub fn parse(content: &str) -> Result<Self, SolverConfigError> {
        let config: SolverConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), SolverConfigError> {
        self.board.validate()?;
        if self.search.min_lost_legs == 0 {
            return Err(SolverConfigError::Validation(
                "search.min_lost_legs must be > 0".into(),
            ));
        }
        if self.search.min_lost_legs > 4 {
            return Err(SolverConfigError::Validation(
                "search.min_lost_legs must be <= 4".into(),
            ));
        }
        Ok(())
    }
}
