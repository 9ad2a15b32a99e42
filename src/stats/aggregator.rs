//! Per-player statistics replayed from the match history
//!
//! The replay starts from the player's seed rating and applies every stored
//! delta in order, so the history must be oldest first.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{RankingError, Result};
use crate::types::{Match, MatchId, Player, PlayerId, Role};

/// A single match worth highlighting in a player's record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotableMatch {
    pub match_id: MatchId,
    pub elo_delta: f64,
    pub goals_for: u32,
    pub goals_against: u32,
}

impl NotableMatch {
    pub fn goal_difference(&self) -> u32 {
        self.goals_for.abs_diff(self.goals_against)
    }
}

/// Another player paired with the value that selected it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationEntry {
    pub player_id: PlayerId,
    pub value: f64,
}

/// Shared record with one partner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeammateSummary {
    pub player_id: PlayerId,
    pub matches: u32,
    pub delta: f64,
}

/// Statistics snapshot of one player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub player_id: PlayerId,
    pub name: String,
    pub elo: f64,
    pub start_elo: f64,
    pub best_elo: f64,
    pub worst_elo: f64,
    /// Rating after each match, oldest first
    pub elo_history: Vec<f64>,

    pub matches: u32,
    pub wins: u32,
    pub losses: u32,
    pub matches_as_attacker: u32,
    pub matches_as_defender: u32,
    pub wins_as_attacker: u32,
    pub wins_as_defender: u32,
    pub losses_as_attacker: u32,
    pub losses_as_defender: u32,

    /// Positive while on a winning run, negative while losing
    pub current_streak: i32,
    pub best_win_streak: i32,
    pub worst_loss_streak: i32,

    pub best_victory_by_elo: Option<NotableMatch>,
    pub worst_defeat_by_elo: Option<NotableMatch>,
    pub best_victory_by_score: Option<NotableMatch>,
    pub worst_defeat_by_score: Option<NotableMatch>,

    pub goals_for: u32,
    pub goals_against: u32,

    /// Partners ascending by id
    pub teammates: Vec<TeammateSummary>,
    /// Summed delta against each opponent, ascending by id
    pub opponents: Vec<RelationEntry>,

    pub best_teammate: Option<RelationEntry>,
    pub worst_teammate: Option<RelationEntry>,
    pub most_frequent_teammate: Option<RelationEntry>,
    /// Opponent with the lowest summed delta, i.e. the one that cost this
    /// player the most rating. Field name kept for output compatibility.
    pub best_opponent: Option<RelationEntry>,
    /// Opponent with the highest summed delta
    pub worst_opponent: Option<RelationEntry>,
}

impl PlayerStats {
    fn empty(player: &Player) -> Self {
        Self {
            player_id: player.id,
            name: player.name.clone(),
            elo: player.start_elo,
            start_elo: player.start_elo,
            best_elo: player.start_elo,
            worst_elo: player.start_elo,
            elo_history: Vec::new(),
            matches: 0,
            wins: 0,
            losses: 0,
            matches_as_attacker: 0,
            matches_as_defender: 0,
            wins_as_attacker: 0,
            wins_as_defender: 0,
            losses_as_attacker: 0,
            losses_as_defender: 0,
            current_streak: 0,
            best_win_streak: 0,
            worst_loss_streak: 0,
            best_victory_by_elo: None,
            worst_defeat_by_elo: None,
            best_victory_by_score: None,
            worst_defeat_by_score: None,
            goals_for: 0,
            goals_against: 0,
            teammates: Vec::new(),
            opponents: Vec::new(),
            best_teammate: None,
            worst_teammate: None,
            most_frequent_teammate: None,
            best_opponent: None,
            worst_opponent: None,
        }
    }

    /// Goals scored per goal conceded; goals scored when nothing was conceded
    pub fn goal_ratio(&self) -> f64 {
        if self.goals_against == 0 {
            self.goals_for as f64
        } else {
            self.goals_for as f64 / self.goals_against as f64
        }
    }

    pub fn win_rate(&self) -> f64 {
        if self.matches == 0 {
            0.0
        } else {
            self.wins as f64 / self.matches as f64
        }
    }

    fn record_result(&mut self, won: bool, role: Role) {
        self.matches += 1;
        match (role, won) {
            (Role::Attack, true) => {
                self.matches_as_attacker += 1;
                self.wins_as_attacker += 1;
            }
            (Role::Attack, false) => {
                self.matches_as_attacker += 1;
                self.losses_as_attacker += 1;
            }
            (Role::Defence, true) => {
                self.matches_as_defender += 1;
                self.wins_as_defender += 1;
            }
            (Role::Defence, false) => {
                self.matches_as_defender += 1;
                self.losses_as_defender += 1;
            }
        }

        if won {
            self.wins += 1;
            self.current_streak = if self.current_streak > 0 {
                self.current_streak + 1
            } else {
                1
            };
        } else {
            self.losses += 1;
            self.current_streak = if self.current_streak < 0 {
                self.current_streak - 1
            } else {
                -1
            };
        }
        self.best_win_streak = self.best_win_streak.max(self.current_streak);
        self.worst_loss_streak = self.worst_loss_streak.min(self.current_streak);
    }

    // Comparisons are inclusive so that ties keep the most recent match.
    fn record_notable(&mut self, won: bool, notable: NotableMatch) {
        if won {
            if self
                .best_victory_by_elo
                .as_ref()
                .map_or(true, |best| notable.elo_delta >= best.elo_delta)
            {
                self.best_victory_by_elo = Some(notable.clone());
            }
            if self
                .best_victory_by_score
                .as_ref()
                .map_or(true, |best| notable.goal_difference() >= best.goal_difference())
            {
                self.best_victory_by_score = Some(notable);
            }
        } else {
            if self
                .worst_defeat_by_elo
                .as_ref()
                .map_or(true, |worst| notable.elo_delta <= worst.elo_delta)
            {
                self.worst_defeat_by_elo = Some(notable.clone());
            }
            if self
                .worst_defeat_by_score
                .as_ref()
                .map_or(true, |worst| notable.goal_difference() >= worst.goal_difference())
            {
                self.worst_defeat_by_score = Some(notable);
            }
        }
    }
}

/// Build the statistics snapshot of a player from the full match history
///
/// History must be ordered oldest first. Matches the player did not take
/// part in are skipped; unrated matches count with a delta of zero.
pub fn get_player_stats(
    player_id: PlayerId,
    matches: &[Match],
    players: &BTreeMap<PlayerId, Player>,
) -> Result<PlayerStats> {
    let player = players
        .get(&player_id)
        .ok_or(RankingError::PlayerNotFound { player_id })?;

    let mut stats = PlayerStats::empty(player);
    let mut teammates: BTreeMap<PlayerId, (u32, f64)> = BTreeMap::new();
    let mut opponents: BTreeMap<PlayerId, f64> = BTreeMap::new();

    for record in matches {
        let Some((side, role)) = record.position_of(player_id) else {
            continue;
        };

        let delta = record.delta_for(side);
        let won = record.winner() == Some(side);
        let goals_for = record.score[side.index()];
        let goals_against = record.score[side.opposite().index()];

        stats.elo += delta;
        stats.best_elo = stats.best_elo.max(stats.elo);
        stats.worst_elo = stats.worst_elo.min(stats.elo);
        stats.elo_history.push(stats.elo);

        stats.record_result(won, role);
        stats.goals_for += goals_for;
        stats.goals_against += goals_against;
        stats.record_notable(
            won,
            NotableMatch {
                match_id: record.id,
                elo_delta: delta,
                goals_for,
                goals_against,
            },
        );

        let team = record.team(side);
        let partner = if role == Role::Defence {
            team.attack
        } else {
            team.defence
        };
        let entry = teammates.entry(partner).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += delta;

        for opponent in record.team(side.opposite()).members() {
            *opponents.entry(opponent).or_insert(0.0) += delta;
        }
    }

    stats.teammates = teammates
        .iter()
        .map(|(id, (count, delta))| TeammateSummary {
            player_id: *id,
            matches: *count,
            delta: *delta,
        })
        .collect();
    stats.opponents = opponents
        .iter()
        .map(|(id, delta)| RelationEntry {
            player_id: *id,
            value: *delta,
        })
        .collect();

    reduce_teammates(&mut stats);
    reduce_opponents(&mut stats);

    Ok(stats)
}

fn reduce_teammates(stats: &mut PlayerStats) {
    let mut best = 0.0;
    let mut worst = 0.0;
    let mut most = 0;

    for teammate in &stats.teammates {
        if teammate.delta > best {
            best = teammate.delta;
            stats.best_teammate = Some(RelationEntry {
                player_id: teammate.player_id,
                value: teammate.delta,
            });
        }
        if teammate.delta < worst {
            worst = teammate.delta;
            stats.worst_teammate = Some(RelationEntry {
                player_id: teammate.player_id,
                value: teammate.delta,
            });
        }
        if teammate.matches > most {
            most = teammate.matches;
            stats.most_frequent_teammate = Some(RelationEntry {
                player_id: teammate.player_id,
                value: teammate.matches as f64,
            });
        }
    }
}

fn reduce_opponents(stats: &mut PlayerStats) {
    let mut best: Option<RelationEntry> = None;
    let mut worst: Option<RelationEntry> = None;

    for opponent in &stats.opponents {
        if best.as_ref().map_or(true, |b| opponent.value < b.value) {
            best = Some(opponent.clone());
        }
        if worst.as_ref().map_or(true, |w| opponent.value > w.value) {
            worst = Some(opponent.clone());
        }
    }

    stats.best_opponent = best;
    stats.worst_opponent = worst;
}
