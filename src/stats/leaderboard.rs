//! Ranking table of the current player table

use serde::{Deserialize, Serialize};

use crate::types::{Player, PlayerId};

/// One row of the ranking table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub player_id: PlayerId,
    pub name: String,
    pub elo: f64,
    pub best_elo: f64,
    pub matches: u32,
    pub wins: u32,
    pub win_rate: f64,
    /// Sum of the deltas of the last few matches
    pub recent_form: f64,
}

/// Rank every player with at least one match by Elo, highest first
///
/// Equal ratings are ordered by ascending player id.
pub fn leaderboard<'a>(
    players: impl IntoIterator<Item = &'a Player>,
    form_window: usize,
) -> Vec<LeaderboardRow> {
    let mut ranked: Vec<&Player> = players
        .into_iter()
        .filter(|player| player.matches > 0)
        .collect();
    ranked.sort_by(|a, b| b.elo.total_cmp(&a.elo).then(a.id.cmp(&b.id)));

    ranked
        .into_iter()
        .enumerate()
        .map(|(index, player)| LeaderboardRow {
            rank: index + 1,
            player_id: player.id,
            name: player.name.clone(),
            elo: player.elo,
            best_elo: player.best_elo,
            matches: player.matches,
            wins: player.wins,
            win_rate: player.wins as f64 / player.matches as f64,
            recent_form: player.recent_form(form_window),
        })
        .collect()
}
