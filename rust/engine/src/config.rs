use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::errors::ConfigError;

/// Table stakes and seeding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableConfig {
    pub small_blind: u32,
    pub big_blind: u32,
    pub starting_stack: u32,
    pub seed: Option<u64>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            small_blind: 5,
            big_blind: 10,
            starting_stack: 1000,
            seed: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    small_blind: Option<u32>,
    #[serde(default)]
    big_blind: Option<u32>,
    #[serde(default)]
    starting_stack: Option<u32>,
    #[serde(default)]
    seed: Option<u64>,
}

impl TableConfig {
    /// Parses a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(s)?;
        let mut cfg = Self::default();
        cfg.merge(file);
        cfg.validate()?;
        Ok(cfg)
    }

    /// Defaults, then the optional TOML file, then `HOLDEM_*` environment
    /// variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        if let Some(path) = path {
            let s = fs::read_to_string(path)?;
            cfg.merge(toml::from_str(&s)?);
        }

        if let Some(v) = env_value("HOLDEM_SMALL_BLIND")? {
            cfg.small_blind = v;
        }
        if let Some(v) = env_value("HOLDEM_BIG_BLIND")? {
            cfg.big_blind = v;
        }
        if let Some(v) = env_value("HOLDEM_STARTING_STACK")? {
            cfg.starting_stack = v;
        }
        if let Some(v) = env_value("HOLDEM_SEED")? {
            cfg.seed = Some(v);
        }

        cfg.validate()?;
        tracing::debug!(config = ?cfg, "table configuration resolved");
        Ok(cfg)
    }

    fn merge(&mut self, f: FileConfig) {
        if let Some(v) = f.small_blind {
            self.small_blind = v;
        }
        if let Some(v) = f.big_blind {
            self.big_blind = v;
        }
        if let Some(v) = f.starting_stack {
            self.starting_stack = v;
        }
        if f.seed.is_some() {
            self.seed = f.seed;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.small_blind == 0 {
            return Err(ConfigError::Invalid("small_blind must be >0".into()));
        }
        if self.big_blind < self.small_blind {
            return Err(ConfigError::Invalid(
                "big_blind must be >= small_blind".into(),
            ));
        }
        if self.starting_stack == 0 {
            return Err(ConfigError::Invalid("starting_stack must be >0".into()));
        }
        Ok(())
    }
}

fn env_value<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(v) if !v.is_empty() => v
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(format!("Invalid {}", key))),
        _ => Ok(None),
    }
}
