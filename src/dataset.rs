//! JSON dataset of players and match history
//!
//! The dataset is the hand-off format with the persistence layer: seed
//! players plus matches oldest first. Loading always replays the history, so
//! stored counters and ratings are derived, never trusted.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::{RankingError, Result};
use crate::rating::RatingCalculator;
use crate::state::RankingState;
use crate::types::{Match, Player};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub players: Vec<Player>,
    #[serde(default)]
    pub matches: Vec<Match>,
}

impl Dataset {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| RankingError::DatasetError {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        let dataset: Dataset =
            serde_json::from_str(&raw).map_err(|e| RankingError::DatasetError {
                message: format!("cannot parse {}: {}", path.display(), e),
            })?;

        info!(
            "Loaded {} players and {} matches from {}",
            dataset.players.len(),
            dataset.matches.len(),
            path.display()
        );
        Ok(dataset)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw).map_err(|e| RankingError::DatasetError {
            message: format!("cannot write {}: {}", path.display(), e),
        })?;
        Ok(())
    }

    /// Snapshot of a state, players ascending by id
    pub fn from_state(state: &RankingState) -> Self {
        Self {
            players: state.players().cloned().collect(),
            matches: state.matches().to_vec(),
        }
    }

    /// Build a state by replaying the history over the seed players
    pub fn into_state(self, calculator: Box<dyn RatingCalculator>) -> Result<RankingState> {
        RankingState::from_history(calculator, self.players, self.matches)
    }
}
