//! Exhaustive search for the best 2v2 lineup
//!
//! Every ordered assignment of four distinct pool players to
//! (defence A, attack A, defence B, attack B) is scored. Candidates are
//! visited in ascending pool order and only a strictly higher score replaces
//! the current best, so the earliest candidate wins ties.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::config::matchmaking::MatchmakingConfig;
use crate::error::Result;
use crate::matchmaking::bounds::PoolBounds;
use crate::relations::RelationLedger;
use crate::state::RankingState;
use crate::types::{Match, Player, PlayerId, Team};

/// Per-component breakdown of a candidate's score, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub match_balance: f64,
    pub team_balance: f64,
    pub priority: f64,
    pub diversity: f64,
}

impl ScoreComponents {
    /// Weighted sum before jitter
    pub fn weighted(&self, config: &MatchmakingConfig) -> f64 {
        self.match_balance * config.match_balance_weight
            + self.team_balance * config.team_balance_weight
            + self.priority * config.priority_weight
            + self.diversity * config.diversity_weight
    }
}

/// Proposed lineup for the next match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchProposal {
    pub team_a: Team,
    pub team_b: Team,
    /// Final score after jitter
    pub score: f64,
    pub components: ScoreComponents,
}

impl MatchProposal {
    pub fn player_ids(&self) -> [PlayerId; 4] {
        [
            self.team_a.defence,
            self.team_a.attack,
            self.team_b.defence,
            self.team_b.attack,
        ]
    }

    /// Turn a confirmed proposal into a match record with the final goals
    pub fn into_match(self, goals: [u32; 2]) -> Result<Match> {
        Match::new(self.team_a, self.team_b, goals)
    }
}

/// Why a matchmaking request cannot produce a proposal
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RequestRejection {
    #[error("need at least 4 available players, got {available}")]
    TooFewPlayers { available: usize },

    #[error("unknown player {player_id}")]
    UnknownPlayer { player_id: PlayerId },

    #[error("priority player {player_id} is not available")]
    PriorityNotAvailable { player_id: PlayerId },

    #[error("{count} priority players cannot fit in one match")]
    TooManyPriority { count: usize },
}

/// Check a request and return the deduplicated pool in input order
pub fn validate_request(
    state: &RankingState,
    available: &[PlayerId],
    priority: &[PlayerId],
) -> std::result::Result<Vec<PlayerId>, RequestRejection> {
    let mut seen = HashSet::new();
    let pool: Vec<PlayerId> = available
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect();

    if let Some(&player_id) = pool
        .iter()
        .chain(priority.iter())
        .find(|id| state.player(**id).is_none())
    {
        return Err(RequestRejection::UnknownPlayer { player_id });
    }

    if pool.len() < 4 {
        return Err(RequestRejection::TooFewPlayers {
            available: pool.len(),
        });
    }

    if let Some(&player_id) = priority.iter().find(|id| !seen.contains(*id)) {
        return Err(RequestRejection::PriorityNotAvailable { player_id });
    }

    let distinct_priority: HashSet<PlayerId> = priority.iter().copied().collect();
    if distinct_priority.len() > 4 {
        return Err(RequestRejection::TooManyPriority {
            count: distinct_priority.len(),
        });
    }

    Ok(pool)
}

/// Trait for matchmaking strategies
pub trait MatchFinder: Send + Sync {
    /// Find the best lineup among `available`, including every `priority`
    /// player, or `None` when no valid lineup exists
    fn find_best_match(
        &self,
        state: &RankingState,
        available: &[PlayerId],
        priority: &[PlayerId],
        rng: &mut dyn RngCore,
    ) -> Option<MatchProposal>;
}

/// Brute-force O(n^4) matchmaking
#[derive(Debug, Clone)]
pub struct BruteForceMatchFinder {
    config: MatchmakingConfig,
}

impl BruteForceMatchFinder {
    pub fn new(config: MatchmakingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }
}

impl Default for BruteForceMatchFinder {
    fn default() -> Self {
        Self {
            config: MatchmakingConfig::default(),
        }
    }
}

/// Score a candidate lineup against the league bounds
pub fn score_components(
    players: [&Player; 4],
    relations: &RelationLedger,
    bounds: &PoolBounds,
) -> ScoreComponents {
    let [def_a, att_a, def_b, att_b] = players;

    let team_a_elo = (def_a.elo + att_a.elo) / 2.0;
    let team_b_elo = (def_b.elo + att_b.elo) / 2.0;
    let match_balance = 1.0 - (team_a_elo - team_b_elo).abs() / bounds.max_elo_diff;

    let inner_gap = (def_a.elo - att_a.elo)
        .abs()
        .max((def_b.elo - att_b.elo).abs());
    let team_balance = 1.0 - (inner_gap / bounds.max_elo_diff).min(1.0);

    let total_matches: u32 = players.iter().map(|player| player.matches).sum();
    let priority = 1.0 - total_matches as f64 / bounds.max_matches;

    let teammate_repeats = relations.teammate_count(def_a.id, att_a.id)
        + relations.teammate_count(def_b.id, att_b.id);
    let mut opponent_repeats = 0;
    for a in [def_a.id, att_a.id] {
        for b in [def_b.id, att_b.id] {
            opponent_repeats += relations.opponent_count(a, b);
        }
    }
    let diversity = 1.0 - (teammate_repeats + opponent_repeats) as f64 / bounds.max_diversity;

    ScoreComponents {
        match_balance,
        team_balance,
        priority,
        diversity,
    }
}

impl MatchFinder for BruteForceMatchFinder {
    fn find_best_match(
        &self,
        state: &RankingState,
        available: &[PlayerId],
        priority: &[PlayerId],
        rng: &mut dyn RngCore,
    ) -> Option<MatchProposal> {
        let pool_ids = match validate_request(state, available, priority) {
            Ok(pool) => pool,
            Err(rejection) => {
                debug!("Matchmaking request rejected: {}", rejection);
                return None;
            }
        };

        let pool: Vec<&Player> = pool_ids.iter().filter_map(|id| state.player(*id)).collect();
        let bounds = PoolBounds::compute(state);
        let relations = state.relations();
        let randomness = self.config.randomness;
        let n = pool.len();

        let mut best: Option<MatchProposal> = None;
        let mut candidates = 0usize;

        for i in 0..n {
            for j in 0..n {
                if j == i {
                    continue;
                }
                for k in 0..n {
                    if k == i || k == j {
                        continue;
                    }
                    for l in 0..n {
                        if l == i || l == j || l == k {
                            continue;
                        }

                        let lineup = [pool[i], pool[j], pool[k], pool[l]];
                        if !priority
                            .iter()
                            .all(|id| lineup.iter().any(|player| player.id == *id))
                        {
                            continue;
                        }
                        candidates += 1;

                        let components = score_components(lineup, relations, &bounds);
                        let jitter = if randomness > 0.0 {
                            rng.gen_range(-randomness..randomness)
                        } else {
                            0.0
                        };
                        let score = components.weighted(&self.config) * (1.0 - jitter);

                        if best.as_ref().map_or(true, |current| score > current.score) {
                            best = Some(MatchProposal {
                                team_a: Team::new(lineup[0].id, lineup[1].id),
                                team_b: Team::new(lineup[2].id, lineup[3].id),
                                score,
                                components,
                            });
                        }
                    }
                }
            }
        }

        debug!(
            "Scored {} candidates from a pool of {} players",
            candidates, n
        );
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::rating::EloConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn state_with(elos: &[f64]) -> RankingState {
        let mut state = RankingState::with_config(EloConfig::default()).unwrap();
        for (index, elo) in elos.iter().enumerate() {
            let id = index as PlayerId + 1;
            state
                .add_player(Player::new(id, format!("P{}", id), *elo, 0.5))
                .unwrap();
        }
        state
    }

    fn deterministic() -> BruteForceMatchFinder {
        BruteForceMatchFinder::new(MatchmakingConfig::default().deterministic()).unwrap()
    }

    #[test]
    fn test_rejects_small_pool() {
        let state = state_with(&[1000.0, 1000.0, 1000.0, 1000.0]);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(deterministic()
            .find_best_match(&state, &[1, 2, 3], &[], &mut rng)
            .is_none());
        // Duplicates do not count twice
        assert!(deterministic()
            .find_best_match(&state, &[1, 2, 3, 3], &[], &mut rng)
            .is_none());
    }

    #[test]
    fn test_rejects_unknown_ids() {
        let state = state_with(&[1000.0, 1000.0, 1000.0, 1000.0]);
        assert_eq!(
            validate_request(&state, &[1, 2, 3, 9], &[]),
            Err(RequestRejection::UnknownPlayer { player_id: 9 })
        );
        assert_eq!(
            validate_request(&state, &[1, 2, 3, 4], &[8]),
            Err(RequestRejection::UnknownPlayer { player_id: 8 })
        );
    }

    #[test]
    fn test_rejects_impossible_priority() {
        let state = state_with(&[1000.0; 6]);
        assert_eq!(
            validate_request(&state, &[1, 2, 3, 4], &[5]),
            Err(RequestRejection::PriorityNotAvailable { player_id: 5 })
        );
        assert_eq!(
            validate_request(&state, &[1, 2, 3, 4, 5, 6], &[1, 2, 3, 4, 5]),
            Err(RequestRejection::TooManyPriority { count: 5 })
        );
        assert_eq!(
            validate_request(&state, &[4, 1, 4, 2, 3], &[1]),
            Ok(vec![4, 1, 2, 3])
        );
    }

    #[test]
    fn test_four_player_pool_always_proposes() {
        let state = state_with(&[1200.0, 1100.0, 1000.0, 900.0]);
        let mut rng = StdRng::seed_from_u64(7);
        let finder = BruteForceMatchFinder::default();

        let proposal = finder
            .find_best_match(&state, &[1, 2, 3, 4], &[], &mut rng)
            .unwrap();
        let mut ids = proposal.player_ids().to_vec();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_balanced_split_preferred() {
        let state = state_with(&[1200.0, 1100.0, 1000.0, 900.0]);
        let mut rng = StdRng::seed_from_u64(7);
        let proposal = deterministic()
            .find_best_match(&state, &[1, 2, 3, 4], &[], &mut rng)
            .unwrap();

        // 1200 + 900 against 1100 + 1000 is the only even split
        assert!(proposal.team_a.contains(1) == proposal.team_a.contains(4));
        assert!((proposal.components.match_balance - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ties_resolved_by_enumeration_order() {
        let state = state_with(&[1000.0; 5]);
        let mut rng = StdRng::seed_from_u64(3);
        let proposal = deterministic()
            .find_best_match(&state, &[1, 2, 3, 4, 5], &[], &mut rng)
            .unwrap();

        assert_eq!(proposal.team_a, Team::new(1, 2));
        assert_eq!(proposal.team_b, Team::new(3, 4));
    }

    #[test]
    fn test_priority_players_included() {
        let state = state_with(&[1000.0; 6]);
        let mut rng = StdRng::seed_from_u64(3);
        let proposal = deterministic()
            .find_best_match(&state, &[1, 2, 3, 4, 5, 6], &[6, 5], &mut rng)
            .unwrap();

        let ids = proposal.player_ids();
        assert!(ids.contains(&5));
        assert!(ids.contains(&6));
    }

    #[test]
    fn test_under_played_players_preferred() {
        let mut veteran_state = RankingState::with_config(EloConfig::default()).unwrap();
        for id in 1..=8 {
            let mut player = Player::new(id, format!("P{}", id), 1000.0, 0.5);
            if id <= 4 {
                player.matches = 20;
            }
            veteran_state.add_player(player).unwrap();
        }

        let mut rng = StdRng::seed_from_u64(3);
        let proposal = deterministic()
            .find_best_match(&veteran_state, &[1, 2, 3, 4, 5, 6, 7, 8], &[], &mut rng)
            .unwrap();
        let mut ids = proposal.player_ids().to_vec();
        ids.sort_unstable();
        assert_eq!(ids, vec![5, 6, 7, 8]);
        assert_eq!(proposal.components.priority, 1.0);
    }

    #[test]
    fn test_repeated_pairings_penalised() {
        let mut state = state_with(&[1000.0; 4]);
        state
            .record_match(Match::new(Team::new(1, 2), Team::new(3, 4), [8, 7]).unwrap())
            .unwrap();
        let relations = state.relations();
        let bounds = PoolBounds::compute(&state);

        let p = |id: PlayerId| state.player(id).unwrap();
        let repeat = score_components([p(1), p(2), p(3), p(4)], relations, &bounds);
        let fresh = score_components([p(1), p(3), p(2), p(4)], relations, &bounds);

        // Same teammates and opponents again: 2 + 4 repeats over a bound of 6
        assert_eq!(repeat.diversity, 0.0);
        // Fresh teammates, but 1v2 and 3v4 are new opponents while 1v4 and 3v2 repeat
        assert!((fresh.diversity - (1.0 - 2.0 / 6.0)).abs() < 1e-12);
    }

    #[test]
    fn test_team_balance_uses_widest_inner_gap() {
        let state = state_with(&[1400.0, 1000.0, 1300.0, 900.0]);
        let relations = state.relations();
        let bounds = PoolBounds::compute(&state);
        assert_eq!(bounds.max_elo_diff, 400.0);

        let p = |id: PlayerId| state.player(id).unwrap();

        // 1400+1000 vs 1300+900: both pairs are 400 apart
        let lopsided = score_components([p(1), p(2), p(3), p(4)], relations, &bounds);
        assert!((lopsided.match_balance - 0.75).abs() < 1e-12);
        assert_eq!(lopsided.team_balance, 0.0);

        // 1400+1300 vs 1000+900: both pairs are 100 apart
        let paired = score_components([p(1), p(3), p(2), p(4)], relations, &bounds);
        assert!((paired.team_balance - 0.75).abs() < 1e-12);
        assert_eq!(paired.match_balance, 0.0);

        // 1300+1000 vs 1400+900: the 500 gap clamps the component at zero
        let mixed = score_components([p(3), p(2), p(1), p(4)], relations, &bounds);
        assert_eq!(mixed.team_balance, 0.0);
    }

    #[test]
    fn test_team_balance_clamped_when_gap_exceeds_bound() {
        let state = state_with(&[2000.0, 1000.0, 1000.0, 1000.0]);
        let relations = state.relations();
        let bounds = PoolBounds::compute(&state);
        assert_eq!(bounds.max_elo_diff, 500.0);

        let p = |id: PlayerId| state.player(id).unwrap();
        let components = score_components([p(1), p(2), p(3), p(4)], relations, &bounds);

        // Inner gap of 1000 is twice the bound
        assert_eq!(components.team_balance, 0.0);
        assert_eq!(components.match_balance, 0.0);

        let swapped = score_components([p(2), p(3), p(1), p(4)], relations, &bounds);
        assert_eq!(swapped.team_balance, 0.0);
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let state = state_with(&[1300.0, 1250.0, 1100.0, 1050.0, 990.0, 870.0]);
        let finder = BruteForceMatchFinder::default();
        let pool = [1, 2, 3, 4, 5, 6];

        let first = finder.find_best_match(&state, &pool, &[], &mut StdRng::seed_from_u64(11));
        let second = finder.find_best_match(&state, &pool, &[], &mut StdRng::seed_from_u64(11));
        assert_eq!(first, second);
    }

    #[test]
    fn test_into_match() {
        let proposal = MatchProposal {
            team_a: Team::new(1, 2),
            team_b: Team::new(3, 4),
            score: 0.9,
            components: ScoreComponents {
                match_balance: 1.0,
                team_balance: 1.0,
                priority: 1.0,
                diversity: 1.0,
            },
        };
        let record = proposal.into_match([8, 5]).unwrap();
        assert_eq!(record.team_b, Team::new(3, 4));
        assert!(record.rating.is_none());
    }
}
