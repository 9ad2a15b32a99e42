//! Test fixtures shared by the integration tests

use biliardino::config::EloConfig;
use biliardino::{Match, Player, PlayerId, RankingState, Team};
use chrono::{Duration, Utc};

/// The four players of the reference scenario: 1200, 1100, 1000, 900
pub fn scenario_state() -> RankingState {
    let mut state = RankingState::with_config(EloConfig::default()).unwrap();
    for (id, elo) in [(1, 1200.0), (2, 1100.0), (3, 1000.0), (4, 900.0)] {
        state
            .add_player(Player::new(id, format!("P{}", id), elo, 0.5))
            .unwrap();
    }
    state
}

/// A league of `count` players with spread ratings and role preferences
pub fn league(count: u32) -> Vec<Player> {
    (1..=count)
        .map(|id| {
            let elo = 800.0 + (id * 37 % 500) as f64;
            let defence = (id % 5) as f64 / 4.0;
            Player::new(id, format!("Player {}", id), elo, defence)
        })
        .collect()
}

/// A deterministic round-robin-ish history for `players`, oldest first
pub fn history(players: u32, matches: usize) -> Vec<Match> {
    let start = Utc::now() - Duration::days(30);
    (0..matches)
        .map(|n| {
            let base = n * 5;
            let ids: Vec<PlayerId> = (0..4)
                .map(|offset| ((base + offset) % players as usize) as PlayerId + 1)
                .collect();
            // Rotate who plays with whom so pairs vary between matches
            let (a, b) = if n % 2 == 0 {
                (Team::new(ids[0], ids[1]), Team::new(ids[2], ids[3]))
            } else {
                (Team::new(ids[3], ids[0]), Team::new(ids[1], ids[2]))
            };
            let winner_goals = 8;
            let loser_goals = (n % 8) as u32;
            let score = if n % 3 == 0 {
                [loser_goals, winner_goals]
            } else {
                [winner_goals, loser_goals]
            };

            let mut record = Match::new(a, b, score).unwrap();
            record.created_at = start + Duration::minutes(n as i64 * 15);
            record
        })
        .collect()
}
