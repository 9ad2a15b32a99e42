//! League-wide normalisation bounds for proposal scores
//!
//! Bounds are taken over every registered player, not only the available
//! pool, and recomputed once per search.

use serde::{Deserialize, Serialize};

use crate::state::RankingState;

/// Maxima used to scale each score component into [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoolBounds {
    /// Widest possible gap between two team averages
    pub max_elo_diff: f64,
    /// Combined match count of the four most active players
    pub max_matches: f64,
    /// Two busiest teammate pairs plus four busiest opponent pairs
    pub max_diversity: f64,
}

impl PoolBounds {
    pub fn compute(state: &RankingState) -> Self {
        let mut elos: Vec<f64> = state.players().map(|player| player.elo).collect();
        elos.sort_by(|a, b| b.total_cmp(a));
        let top: f64 = elos.iter().take(2).sum();
        let bottom: f64 = elos.iter().rev().take(2).sum();

        let mut match_counts: Vec<u32> = state.players().map(|player| player.matches).collect();
        match_counts.sort_unstable_by(|a, b| b.cmp(a));
        let max_matches: u32 = match_counts.iter().take(4).sum();

        let relations = state.relations();
        let max_diversity: u32 = relations.top_teammate_counts(2).iter().sum::<u32>()
            + relations.top_opponent_counts(4).iter().sum::<u32>();

        Self {
            max_elo_diff: ((top - bottom) / 2.0).max(1.0),
            max_matches: (max_matches as f64).max(1.0),
            max_diversity: (max_diversity as f64).max(1.0),
        }
    }
}
