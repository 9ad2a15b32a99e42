//! Rating calculator trait and the inputs it consumes

use crate::types::{MatchRating, Player};

/// Rating inputs of a single player slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotRating {
    pub elo: f64,
    /// Preferred share of matches in defence
    pub defence: f64,
}

impl From<&Player> for SlotRating {
    fn from(player: &Player) -> Self {
        Self {
            elo: player.elo,
            defence: player.defence,
        }
    }
}

/// The two slots of a team as they line up for a match
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lineup {
    pub defence: SlotRating,
    pub attack: SlotRating,
}

impl Lineup {
    pub fn new(defence: impl Into<SlotRating>, attack: impl Into<SlotRating>) -> Self {
        Self {
            defence: defence.into(),
            attack: attack.into(),
        }
    }

    /// Starting Elo as `[defence, attack]`
    pub fn starting_elo(&self) -> [f64; 2] {
        [self.defence.elo, self.attack.elo]
    }
}

/// Trait for calculating rating changes after a match
pub trait RatingCalculator: Send + Sync {
    /// Compute expected scores and per-team deltas for a finished match
    ///
    /// # Arguments
    /// * `team_a` - Lineup of the first team
    /// * `team_b` - Lineup of the second team
    /// * `score` - Final goals as `[team_a, team_b]`
    fn rate(&self, team_a: &Lineup, team_b: &Lineup, score: [u32; 2]) -> MatchRating;

    /// Whether a result is decisive enough for ratings to move
    fn is_rated_score(&self, score: [u32; 2]) -> bool;

    /// Get the initial rating for new players
    fn initial_rating(&self) -> f64;
}
