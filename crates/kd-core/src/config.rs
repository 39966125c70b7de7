//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tunables shared by every command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on distinct attributes per character card.
    pub max_attributes_per_card: usize,
    /// RNG seed for reproducible sessions. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_attributes_per_card: 100,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the per-card attribute cap (at least 1).
    pub fn with_max_attributes(mut self, max: usize) -> Self {
        self.max_attributes_per_card = max.max(1);
        self
    }
}
