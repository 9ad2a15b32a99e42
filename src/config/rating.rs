//! Elo rating configuration

use serde::{Deserialize, Serialize};

use crate::error::{RankingError, Result};

/// Parameters of the team Elo update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EloConfig {
    /// Maximum rating movement for a one-goal result
    pub k_factor: f64,
    /// Elo removed from a player for a full match in its unpreferred role
    pub role_penalty: f64,
    /// Ratings only move when the winning side reaches this many goals
    pub min_winning_goals: u32,
    /// Goal margin at which the margin bonus is fully applied
    pub margin_spread: f64,
    /// Extra multiplier reached at `margin_spread + 1` goals of difference
    pub margin_bonus: f64,
    pub rating_scale: f64,
    /// Team ratings are multiplied by this before the logistic
    pub elo_multiplier: f64,
    pub initial_rating: f64,
}

impl Default for EloConfig {
    fn default() -> Self {
        Self {
            k_factor: 50.0,
            role_penalty: 100.0,
            min_winning_goals: 8,
            margin_spread: 7.0,
            margin_bonus: 0.5,
            rating_scale: 400.0,
            elo_multiplier: 2.0,
            initial_rating: 1000.0,
        }
    }
}

impl EloConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.k_factor <= 0.0 {
            return Err(config_error("K factor must be positive"));
        }
        if self.role_penalty < 0.0 {
            return Err(config_error("Role penalty must be non-negative"));
        }
        if self.margin_spread <= 0.0 {
            return Err(config_error("Margin spread must be positive"));
        }
        if self.margin_bonus < 0.0 {
            return Err(config_error("Margin bonus must be non-negative"));
        }
        if self.rating_scale <= 0.0 {
            return Err(config_error("Rating scale must be positive"));
        }
        if self.elo_multiplier <= 0.0 {
            return Err(config_error("Elo multiplier must be positive"));
        }
        Ok(())
    }
}

fn config_error(message: &str) -> anyhow::Error {
    RankingError::ConfigurationError {
        message: message.to_string(),
    }
    .into()
}
