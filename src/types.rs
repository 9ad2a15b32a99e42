//! Common types used throughout the ranking engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RankingError, Result};

/// Unique identifier for players
pub type PlayerId = u32;

/// Unique identifier for matches
pub type MatchId = Uuid;

/// Position a player takes at the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Defence,
    Attack,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Defence => write!(f, "defence"),
            Role::Attack => write!(f, "attack"),
        }
    }
}

/// Side of the table a team plays on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    /// Index into the two-element per-team arrays of a match
    pub fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

/// A registered player and its cumulative counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub elo: f64,
    pub start_elo: f64,
    pub best_elo: f64,
    /// Fraction of matches the player prefers to spend in defence, in [0, 1]
    pub defence: f64,
    #[serde(default)]
    pub matches: u32,
    #[serde(default)]
    pub matches_as_attacker: u32,
    #[serde(default)]
    pub matches_as_defender: u32,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub goals_for: u32,
    #[serde(default)]
    pub goals_against: u32,
    /// Elo delta of every applied match, oldest first
    #[serde(default)]
    pub matches_delta: Vec<f64>,
}

impl Player {
    /// Create a player with no match history
    pub fn new(id: PlayerId, name: impl Into<String>, start_elo: f64, defence: f64) -> Self {
        Self {
            id,
            name: name.into(),
            elo: start_elo,
            start_elo,
            best_elo: start_elo,
            defence: defence.clamp(0.0, 1.0),
            matches: 0,
            matches_as_attacker: 0,
            matches_as_defender: 0,
            wins: 0,
            goals_for: 0,
            goals_against: 0,
            matches_delta: Vec::new(),
        }
    }

    pub fn losses(&self) -> u32 {
        self.matches.saturating_sub(self.wins)
    }

    /// Drop all applied matches and return to the seed rating
    pub fn reset(&mut self) {
        *self = Player::new(self.id, std::mem::take(&mut self.name), self.start_elo, self.defence);
    }

    /// Sum of the last `window` deltas
    pub fn recent_form(&self, window: usize) -> f64 {
        let skip = self.matches_delta.len().saturating_sub(window);
        self.matches_delta.iter().skip(skip).sum()
    }
}

/// One side of a 2v2 match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Team {
    pub defence: PlayerId,
    pub attack: PlayerId,
}

impl Team {
    pub fn new(defence: PlayerId, attack: PlayerId) -> Self {
        Self { defence, attack }
    }

    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.defence == player_id || self.attack == player_id
    }

    /// Role of the player in this team, if it is a member
    pub fn role_of(&self, player_id: PlayerId) -> Option<Role> {
        if self.defence == player_id {
            Some(Role::Defence)
        } else if self.attack == player_id {
            Some(Role::Attack)
        } else {
            None
        }
    }

    /// Members as `[defence, attack]`
    pub fn members(&self) -> [PlayerId; 2] {
        [self.defence, self.attack]
    }
}

/// Derived rating data populated once the match has been rated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRating {
    pub expected_score: [f64; 2],
    /// Average effective Elo of each team
    pub team_elo: [f64; 2],
    /// Starting Elo of team A as `[defence, attack]`
    pub team_a_elo: [f64; 2],
    /// Starting Elo of team B as `[defence, attack]`
    pub team_b_elo: [f64; 2],
    pub delta_elo: [f64; 2],
    pub k_factor: f64,
}

/// A played 2v2 match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub team_a: Team,
    pub team_b: Team,
    pub score: [u32; 2],
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<MatchRating>,
}

impl Match {
    /// Create a new unrated match, rejecting repeated players and draws
    pub fn new(team_a: Team, team_b: Team, score: [u32; 2]) -> Result<Self> {
        if score[0] == score[1] {
            return Err(RankingError::InvalidMatch {
                reason: format!("tied score {}-{} is not allowed", score[0], score[1]),
            }
            .into());
        }

        let record = Self {
            id: Uuid::new_v4(),
            team_a,
            team_b,
            score,
            created_at: Utc::now(),
            rating: None,
        };
        record.validate_players()?;
        Ok(record)
    }

    /// Check the four slots hold four distinct players
    pub fn validate_players(&self) -> Result<()> {
        let ids = self.player_ids();
        for (i, id) in ids.iter().enumerate() {
            if ids[i + 1..].contains(id) {
                return Err(RankingError::InvalidMatch {
                    reason: format!("player {} appears more than once in match {}", id, self.id),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Players as `[defA, attA, defB, attB]`
    pub fn player_ids(&self) -> [PlayerId; 4] {
        [
            self.team_a.defence,
            self.team_a.attack,
            self.team_b.defence,
            self.team_b.attack,
        ]
    }

    pub fn team(&self, side: Side) -> &Team {
        match side {
            Side::A => &self.team_a,
            Side::B => &self.team_b,
        }
    }

    /// Side and role of a player, if it took part
    pub fn position_of(&self, player_id: PlayerId) -> Option<(Side, Role)> {
        if let Some(role) = self.team_a.role_of(player_id) {
            return Some((Side::A, role));
        }
        self.team_b.role_of(player_id).map(|role| (Side::B, role))
    }

    pub fn winner(&self) -> Option<Side> {
        match self.score[0].cmp(&self.score[1]) {
            std::cmp::Ordering::Greater => Some(Side::A),
            std::cmp::Ordering::Less => Some(Side::B),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn goal_difference(&self) -> u32 {
        self.score[0].abs_diff(self.score[1])
    }

    /// Delta applied to the given side, zero while the match is unrated
    pub fn delta_for(&self, side: Side) -> f64 {
        self.rating
            .as_ref()
            .map(|rating| rating.delta_elo[side.index()])
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player_is_seeded() {
        let player = Player::new(7, "Mario", 1200.0, 0.8);
        assert_eq!(player.elo, 1200.0);
        assert_eq!(player.best_elo, 1200.0);
        assert_eq!(player.matches, 0);
        assert_eq!(player.losses(), 0);
    }

    #[test]
    fn test_defence_is_clamped() {
        assert_eq!(Player::new(1, "a", 1000.0, 1.4).defence, 1.0);
        assert_eq!(Player::new(1, "a", 1000.0, -0.2).defence, 0.0);
    }

    #[test]
    fn test_recent_form() {
        let mut player = Player::new(1, "a", 1000.0, 0.5);
        player.matches_delta = vec![10.0, -5.0, 3.0, 2.0];
        assert_eq!(player.recent_form(2), 5.0);
        assert_eq!(player.recent_form(10), 10.0);
        assert_eq!(player.recent_form(0), 0.0);
    }

    #[test]
    fn test_match_rejects_repeated_player() {
        let result = Match::new(Team::new(1, 2), Team::new(3, 1), [8, 2]);
        assert!(result.is_err());
    }

    #[test]
    fn test_match_rejects_draw() {
        let result = Match::new(Team::new(1, 2), Team::new(3, 4), [5, 5]);
        assert!(result.is_err());
    }

    #[test]
    fn test_match_positions() {
        let m = Match::new(Team::new(1, 2), Team::new(3, 4), [8, 6]).unwrap();
        assert_eq!(m.position_of(1), Some((Side::A, Role::Defence)));
        assert_eq!(m.position_of(4), Some((Side::B, Role::Attack)));
        assert_eq!(m.position_of(9), None);
        assert_eq!(m.winner(), Some(Side::A));
        assert_eq!(m.goal_difference(), 2);
        assert_eq!(m.delta_for(Side::A), 0.0);
    }

    #[test]
    fn test_created_at_serializes_as_millis() {
        let m = Match::new(Team::new(1, 2), Team::new(3, 4), [8, 6]).unwrap();
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(
            json["created_at"].as_i64().unwrap(),
            m.created_at.timestamp_millis()
        );
        assert!(json.get("rating").is_none());
    }
}
