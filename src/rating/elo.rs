//! Role-aware team Elo
//!
//! Each player's rating is discounted when it plays out of its preferred
//! role, the two members are averaged into a team rating and the team delta
//! is scaled by the goal margin. Ratings only move once the winning side
//! reaches the configured number of goals.

use tracing::debug;

use crate::config::rating::EloConfig;
use crate::error::Result;
use crate::rating::calculator::{Lineup, RatingCalculator, SlotRating};
use crate::types::MatchRating;

/// Elo rating calculator implementation
#[derive(Debug, Clone)]
pub struct EloCalculator {
    config: EloConfig,
}

impl EloCalculator {
    /// Create a new Elo calculator
    pub fn new(config: EloConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Rating of a slot after the out-of-role discount
    pub fn effective_elo(&self, slot: &SlotRating, is_defender: bool) -> f64 {
        let off_role = if is_defender {
            1.0 - slot.defence
        } else {
            slot.defence
        };
        slot.elo - off_role * self.config.role_penalty
    }

    /// Mean effective rating of a lineup
    pub fn team_elo(&self, lineup: &Lineup) -> f64 {
        (self.effective_elo(&lineup.defence, true) + self.effective_elo(&lineup.attack, false))
            / 2.0
    }

    /// Win probability of the team rated `elo_a` against `elo_b`
    pub fn expected_score(&self, elo_a: f64, elo_b: f64) -> f64 {
        let m = self.config.elo_multiplier;
        1.0 / (1.0 + 10f64.powf((elo_b * m - elo_a * m) / self.config.rating_scale))
    }

    /// Multiplier rewarding wide goal margins
    pub fn margin_multiplier(&self, goal_difference: u32) -> f64 {
        1.0 + (goal_difference as f64 - 1.0) / self.config.margin_spread * self.config.margin_bonus
    }
}

impl Default for EloCalculator {
    fn default() -> Self {
        Self {
            config: EloConfig::default(),
        }
    }
}

/// Actual result as `[team_a, team_b]`, half a point each on a draw
pub fn actual_score(score: [u32; 2]) -> [f64; 2] {
    match score[0].cmp(&score[1]) {
        std::cmp::Ordering::Greater => [1.0, 0.0],
        std::cmp::Ordering::Less => [0.0, 1.0],
        std::cmp::Ordering::Equal => [0.5, 0.5],
    }
}

impl RatingCalculator for EloCalculator {
    fn rate(&self, team_a: &Lineup, team_b: &Lineup, score: [u32; 2]) -> MatchRating {
        let elo_a = self.team_elo(team_a);
        let elo_b = self.team_elo(team_b);

        let expected_a = self.expected_score(elo_a, elo_b);
        let expected_b = 1.0 - expected_a;
        let [actual_a, actual_b] = actual_score(score);

        let margin = self.margin_multiplier(score[0].abs_diff(score[1]));
        let k = self.config.k_factor;

        let delta_elo = if self.is_rated_score(score) {
            [
                k * margin * (actual_a - expected_a),
                k * margin * (actual_b - expected_b),
            ]
        } else {
            debug!(
                "Score {}-{} below {} goals, ratings frozen",
                score[0], score[1], self.config.min_winning_goals
            );
            [0.0, 0.0]
        };

        MatchRating {
            expected_score: [expected_a, expected_b],
            team_elo: [elo_a, elo_b],
            team_a_elo: team_a.starting_elo(),
            team_b_elo: team_b.starting_elo(),
            delta_elo,
            k_factor: k,
        }
    }

    fn is_rated_score(&self, score: [u32; 2]) -> bool {
        score[0].max(score[1]) >= self.config.min_winning_goals
    }

    fn initial_rating(&self) -> f64 {
        self.config.initial_rating
    }
}
