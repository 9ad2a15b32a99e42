//! Matchmaking weights

use serde::{Deserialize, Serialize};

use crate::error::{RankingError, Result};

/// Weights of the proposal score components, each in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchmakingConfig {
    pub match_balance_weight: f64,
    pub team_balance_weight: f64,
    pub priority_weight: f64,
    pub diversity_weight: f64,
    /// Half-width of the multiplicative jitter applied to each candidate
    pub randomness: f64,
}

impl Default for MatchmakingConfig {
    fn default() -> Self {
        Self {
            match_balance_weight: 0.4,
            team_balance_weight: 0.2,
            priority_weight: 0.25,
            diversity_weight: 0.15,
            randomness: 0.1,
        }
    }
}

impl MatchmakingConfig {
    /// Same weights with the jitter disabled
    pub fn deterministic(mut self) -> Self {
        self.randomness = 0.0;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("match_balance_weight", self.match_balance_weight),
            ("team_balance_weight", self.team_balance_weight),
            ("priority_weight", self.priority_weight),
            ("diversity_weight", self.diversity_weight),
            ("randomness", self.randomness),
        ];

        for (name, value) in fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(RankingError::ConfigurationError {
                    message: format!("{} must be within [0, 1], got {}", name, value),
                }
                .into());
            }
        }

        Ok(())
    }
}
