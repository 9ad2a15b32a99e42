//! Owned ranking state
//!
//! Holds the player table, the chronologically ordered match history and the
//! teammate/opponent ledger. Every rating change goes through
//! [`RankingState::compute_match`], exactly once per match.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::rating::EloConfig;
use crate::error::{RankingError, Result};
use crate::metrics::EngineMetrics;
use crate::rating::{EloCalculator, Lineup, RatingCalculator};
use crate::relations::RelationLedger;
use crate::stats::{get_player_stats, PlayerStats};
use crate::types::{Match, MatchRating, Player, PlayerId, Side};

/// Players, match history and relationship counts of one league
pub struct RankingState {
    players: BTreeMap<PlayerId, Player>,
    matches: Vec<Match>,
    relations: RelationLedger,
    calculator: Box<dyn RatingCalculator>,
    metrics: Option<Arc<EngineMetrics>>,
}

impl RankingState {
    /// Create an empty state rated by the given calculator
    pub fn new(calculator: Box<dyn RatingCalculator>) -> Self {
        Self {
            players: BTreeMap::new(),
            matches: Vec::new(),
            relations: RelationLedger::new(),
            calculator,
            metrics: None,
        }
    }

    /// Create an empty state using the Elo calculator
    pub fn with_config(config: EloConfig) -> Result<Self> {
        Ok(Self::new(Box::new(EloCalculator::new(config)?)))
    }

    /// Attach metrics recorded on every computed match
    pub fn with_metrics(mut self, metrics: Arc<EngineMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build a state from seed players and a match history, replaying every
    /// match oldest first
    pub fn from_history(
        calculator: Box<dyn RatingCalculator>,
        players: Vec<Player>,
        matches: Vec<Match>,
    ) -> Result<Self> {
        let mut state = Self::new(calculator);
        for player in players {
            state.add_player(player)?;
        }
        state.matches = matches;
        state.recompute()?;
        Ok(state)
    }

    /// Add a seed player
    ///
    /// The player is reset to its `start_elo` with empty counters; ratings
    /// and counters only ever come from matches computed by this state.
    pub fn add_player(&mut self, mut player: Player) -> Result<()> {
        if self.players.contains_key(&player.id) {
            return Err(RankingError::DuplicatePlayer {
                player_id: player.id,
            }
            .into());
        }
        player.reset();
        self.players.insert(player.id, player);
        Ok(())
    }

    /// Register a new player at the calculator's initial rating
    pub fn register_player(&mut self, name: &str, defence: f64) -> PlayerId {
        let id = self.players.keys().next_back().map(|id| id + 1).unwrap_or(1);
        let player = Player::new(id, name, self.calculator.initial_rating(), defence);
        info!("Registered player {} ({})", player.name, id);
        self.players.insert(id, player);
        id
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Statistics snapshot of one player replayed from the stored history
    pub fn player_stats(&self, id: PlayerId) -> Result<PlayerStats> {
        get_player_stats(id, &self.matches, &self.players)
    }

    /// Match history, oldest first
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn relations(&self) -> &RelationLedger {
        &self.relations
    }

    /// Rate a match and apply it to its four players
    ///
    /// Populates `record.rating`. Fails without touching any player when a
    /// participant is unknown or the match was already rated.
    pub fn compute_match(&mut self, record: &mut Match) -> Result<MatchRating> {
        record.validate_players()?;
        if record.rating.is_some() {
            return Err(RankingError::InvalidMatch {
                reason: format!("match {} has already been rated", record.id),
            }
            .into());
        }

        let team_a = self.lineup(record, Side::A)?;
        let team_b = self.lineup(record, Side::B)?;
        let rating = self.calculator.rate(&team_a, &team_b, record.score);

        debug!(
            "Match {} {}-{}: expected [{:.3}, {:.3}], delta [{:.2}, {:.2}]",
            record.id,
            record.score[0],
            record.score[1],
            rating.expected_score[0],
            rating.expected_score[1],
            rating.delta_elo[0],
            rating.delta_elo[1]
        );

        record.rating = Some(rating.clone());
        self.apply(record, &rating);

        if let Some(metrics) = &self.metrics {
            metrics.record_match(self.calculator.is_rated_score(record.score));
        }

        Ok(rating)
    }

    /// Rate a new match and append it to the history
    pub fn record_match(&mut self, mut record: Match) -> Result<&Match> {
        if let Some(last) = self.matches.last() {
            if record.created_at < last.created_at {
                return Err(RankingError::InvalidMatch {
                    reason: format!("match {} is older than the latest recorded match", record.id),
                }
                .into());
            }
        }

        self.compute_match(&mut record)?;
        self.matches.push(record);
        Ok(&self.matches[self.matches.len() - 1])
    }

    /// Reset every player to its seed and replay the full history
    pub fn recompute(&mut self) -> Result<()> {
        for player in self.players.values_mut() {
            player.reset();
        }
        self.relations.clear();

        let mut matches = std::mem::take(&mut self.matches);
        matches.sort_by_key(|record| record.created_at);

        for record in matches.iter_mut() {
            record.rating = None;
        }
        let replayed = matches
            .iter_mut()
            .try_for_each(|record| self.compute_match(record).map(|_| ()));
        self.matches = matches;
        replayed?;

        info!(
            "Replayed {} matches for {} players",
            self.matches.len(),
            self.players.len()
        );
        Ok(())
    }

    fn lineup(&self, record: &Match, side: Side) -> Result<Lineup> {
        let team = record.team(side);
        Ok(Lineup::new(
            self.require(team.defence)?,
            self.require(team.attack)?,
        ))
    }

    fn require(&self, id: PlayerId) -> Result<&Player> {
        self.players
            .get(&id)
            .ok_or_else(|| RankingError::PlayerNotFound { player_id: id }.into())
    }

    fn apply(&mut self, record: &Match, rating: &MatchRating) {
        let winner = record.winner();

        for side in [Side::A, Side::B] {
            let team = *record.team(side);
            let delta = rating.delta_elo[side.index()];
            let goals_for = record.score[side.index()];
            let goals_against = record.score[side.opposite().index()];

            for (id, is_defender) in [(team.defence, true), (team.attack, false)] {
                if let Some(player) = self.players.get_mut(&id) {
                    player.elo += delta;
                    player.best_elo = player.best_elo.max(player.elo);
                    player.matches += 1;
                    if is_defender {
                        player.matches_as_defender += 1;
                    } else {
                        player.matches_as_attacker += 1;
                    }
                    if winner == Some(side) {
                        player.wins += 1;
                    }
                    player.goals_for += goals_for;
                    player.goals_against += goals_against;
                    player.matches_delta.push(delta);
                }
            }

            self.relations.record_teammates(team.defence, team.attack, delta);
        }

        for a in record.team_a.members() {
            for b in record.team_b.members() {
                self.relations.record_opponents(a, b);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Team;
    use chrono::Duration;

    fn four_players() -> RankingState {
        let mut state = RankingState::with_config(EloConfig::default()).unwrap();
        state.add_player(Player::new(1, "P1", 1200.0, 0.5)).unwrap();
        state.add_player(Player::new(2, "P2", 1100.0, 0.5)).unwrap();
        state.add_player(Player::new(3, "P3", 1000.0, 0.5)).unwrap();
        state.add_player(Player::new(4, "P4", 900.0, 0.5)).unwrap();
        state
    }

    #[test]
    fn test_compute_match_updates_players() {
        let mut state = four_players();
        let mut record = Match::new(Team::new(1, 2), Team::new(3, 4), [8, 2]).unwrap();

        let rating = state.compute_match(&mut record).unwrap();
        assert!(rating.delta_elo[0] > 0.0);
        assert!(rating.delta_elo[1] < 0.0);
        assert_eq!(record.rating.as_ref(), Some(&rating));

        let p1 = state.player(1).unwrap();
        assert_eq!(p1.elo, 1200.0 + rating.delta_elo[0]);
        assert_eq!(p1.best_elo, p1.elo);
        assert_eq!(p1.matches, 1);
        assert_eq!(p1.matches_as_defender, 1);
        assert_eq!(p1.wins, 1);
        assert_eq!(p1.goals_for, 8);
        assert_eq!(p1.goals_against, 2);
        assert_eq!(p1.matches_delta, vec![rating.delta_elo[0]]);

        let p4 = state.player(4).unwrap();
        assert_eq!(p4.matches_as_attacker, 1);
        assert_eq!(p4.wins, 0);
        assert_eq!(p4.losses(), 1);
        assert_eq!(p4.best_elo, 900.0);
    }

    #[test]
    fn test_compute_match_updates_relations() {
        let mut state = four_players();
        let mut record = Match::new(Team::new(1, 2), Team::new(3, 4), [8, 2]).unwrap();
        let rating = state.compute_match(&mut record).unwrap();

        let relations = state.relations();
        assert_eq!(relations.teammate_count(2, 1), 1);
        assert_eq!(relations.teammate_delta(1, 2), rating.delta_elo[0]);
        assert_eq!(relations.teammate_count(1, 3), 0);
        for (a, b) in [(1, 3), (1, 4), (2, 3), (2, 4)] {
            assert_eq!(relations.opponent_count(b, a), 1);
        }
        assert_eq!(relations.opponent_pairs(), 4);
        assert_eq!(relations.teammate_pairs(), 2);
    }

    #[test]
    fn test_unknown_player_is_fatal_and_mutates_nothing() {
        let mut state = four_players();
        let mut record = Match::new(Team::new(1, 2), Team::new(3, 99), [8, 2]).unwrap();

        let err = state.compute_match(&mut record).unwrap_err();
        assert!(err.to_string().contains("99"));
        assert!(record.rating.is_none());
        assert_eq!(state.player(1).unwrap().matches, 0);
        assert_eq!(state.relations().teammate_pairs(), 0);
    }

    #[test]
    fn test_match_cannot_be_rated_twice() {
        let mut state = four_players();
        let mut record = Match::new(Team::new(1, 2), Team::new(3, 4), [8, 2]).unwrap();
        state.compute_match(&mut record).unwrap();
        assert!(state.compute_match(&mut record).is_err());
        assert_eq!(state.player(1).unwrap().matches, 1);
    }

    #[test]
    fn test_add_player_discards_stored_counters() {
        let mut state = RankingState::with_config(EloConfig::default()).unwrap();
        let mut stale = Player::new(1, "P1", 1000.0, 0.5);
        stale.elo = 1500.0;
        stale.best_elo = 1500.0;
        stale.matches = 2;
        stale.wins = 5;
        stale.matches_delta = vec![250.0, 250.0];
        state.add_player(stale).unwrap();

        let p1 = state.player(1).unwrap();
        assert_eq!(p1.elo, 1000.0);
        assert_eq!(p1.best_elo, 1000.0);
        assert_eq!(p1.matches, 0);
        assert_eq!(p1.losses(), 0);
        assert!(p1.matches_delta.is_empty());
    }

    #[test]
    fn test_frozen_metric_follows_goal_threshold() {
        let metrics = Arc::new(EngineMetrics::new().unwrap());
        let mut state = RankingState::with_config(EloConfig::default())
            .unwrap()
            .with_metrics(metrics.clone());
        for id in 1..=4 {
            state
                .add_player(Player::new(id, format!("P{}", id), 1000.0, 0.5))
                .unwrap();
        }

        // Even teams drawing 8-8 rate to a zero delta but pass the threshold
        let mut level = Match::new(Team::new(1, 2), Team::new(3, 4), [8, 6]).unwrap();
        level.score = [8, 8];
        let rating = state.compute_match(&mut level).unwrap();
        assert_eq!(rating.delta_elo, [0.0, 0.0]);
        assert_eq!(metrics.matches_frozen_total.get(), 0);

        let mut short = Match::new(Team::new(1, 3), Team::new(2, 4), [3, 1]).unwrap();
        state.compute_match(&mut short).unwrap();
        assert_eq!(metrics.matches_rated_total.get(), 2);
        assert_eq!(metrics.matches_frozen_total.get(), 1);
    }

    #[test]
    fn test_duplicate_player_rejected() {
        let mut state = four_players();
        assert!(state.add_player(Player::new(2, "again", 1000.0, 0.5)).is_err());
    }

    #[test]
    fn test_register_player_assigns_next_id() {
        let mut state = four_players();
        let id = state.register_player("Newcomer", 0.3);
        assert_eq!(id, 5);
        assert_eq!(state.player(5).unwrap().elo, 1000.0);

        let mut empty = RankingState::with_config(EloConfig::default()).unwrap();
        assert_eq!(empty.register_player("First", 0.5), 1);
    }

    #[test]
    fn test_record_match_rejects_out_of_order() {
        let mut state = four_players();
        let first = Match::new(Team::new(1, 2), Team::new(3, 4), [8, 2]).unwrap();
        let mut older = Match::new(Team::new(1, 3), Team::new(2, 4), [8, 6]).unwrap();
        older.created_at = first.created_at - Duration::minutes(5);

        state.record_match(first).unwrap();
        assert!(state.record_match(older).is_err());
        assert_eq!(state.matches().len(), 1);
    }

    #[test]
    fn test_recompute_matches_incremental() {
        let mut state = four_players();
        let lineups = [
            (Team::new(1, 2), Team::new(3, 4), [8, 2]),
            (Team::new(3, 1), Team::new(4, 2), [5, 8]),
            (Team::new(2, 4), Team::new(1, 3), [8, 7]),
            (Team::new(4, 1), Team::new(2, 3), [3, 1]),
        ];
        for (a, b, score) in lineups {
            state.record_match(Match::new(a, b, score).unwrap()).unwrap();
        }

        let before: Vec<Player> = state.players().cloned().collect();
        let before_relations = state.relations().clone();
        state.recompute().unwrap();
        let after: Vec<Player> = state.players().cloned().collect();

        assert_eq!(before, after);
        assert_eq!(&before_relations, state.relations());
    }
}
