//! Main application configuration
//!
//! This module defines the top-level configuration of the biliardino engine,
//! including environment variable loading, TOML files and validation.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::config::matchmaking::MatchmakingConfig;
use crate::config::rating::EloConfig;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub rating: EloConfig,
    pub matchmaking: MatchmakingConfig,
}

/// Process-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Name used in logs and metric labels
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// JSON dataset with players and match history
    pub dataset_path: PathBuf,
    /// Number of recent matches summed for the form column
    pub recent_form_window: usize,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "biliardino".to_string(),
            log_level: "info".to_string(),
            dataset_path: PathBuf::from("biliardino.json"),
            recent_form_window: 5,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: AppConfig = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }
        if let Ok(path) = env::var("DATASET_PATH") {
            self.service.dataset_path = PathBuf::from(path);
        }
        if let Ok(window) = env::var("RECENT_FORM_WINDOW") {
            self.service.recent_form_window = window
                .parse()
                .map_err(|_| anyhow!("Invalid RECENT_FORM_WINDOW value: {}", window))?;
        }

        // Rating settings
        if let Ok(k) = env::var("ELO_K_FACTOR") {
            self.rating.k_factor = k
                .parse()
                .map_err(|_| anyhow!("Invalid ELO_K_FACTOR value: {}", k))?;
        }
        if let Ok(penalty) = env::var("ELO_ROLE_PENALTY") {
            self.rating.role_penalty = penalty
                .parse()
                .map_err(|_| anyhow!("Invalid ELO_ROLE_PENALTY value: {}", penalty))?;
        }
        if let Ok(goals) = env::var("ELO_MIN_WINNING_GOALS") {
            self.rating.min_winning_goals = goals
                .parse()
                .map_err(|_| anyhow!("Invalid ELO_MIN_WINNING_GOALS value: {}", goals))?;
        }

        // Matchmaking settings
        let weights = [
            ("MATCH_BALANCE_WEIGHT", &mut self.matchmaking.match_balance_weight),
            ("TEAM_BALANCE_WEIGHT", &mut self.matchmaking.team_balance_weight),
            ("PRIORITY_WEIGHT", &mut self.matchmaking.priority_weight),
            ("DIVERSITY_WEIGHT", &mut self.matchmaking.diversity_weight),
            ("MATCHMAKING_RANDOMNESS", &mut self.matchmaking.randomness),
        ];
        for (var, slot) in weights {
            if let Ok(value) = env::var(var) {
                *slot = value
                    .parse()
                    .map_err(|_| anyhow!("Invalid {} value: {}", var, value))?;
            }
        }

        Ok(())
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }
    if config.service.recent_form_window == 0 {
        return Err(anyhow!("Recent form window must be greater than 0"));
    }

    config.rating.validate()?;
    config.matchmaking.validate()?;

    Ok(())
}
