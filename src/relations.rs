//! Symmetric teammate/opponent bookkeeping
//!
//! Every unordered pair of players is stored once under a canonical
//! [`PairKey`], on both the write and the read path.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::PlayerId;

/// Unordered pair of distinct players, stored as `(min, max)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairKey(PlayerId, PlayerId);

impl PairKey {
    pub fn new(a: PlayerId, b: PlayerId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    pub fn low(&self) -> PlayerId {
        self.0
    }

    pub fn high(&self) -> PlayerId {
        self.1
    }

    /// The other member of the pair
    pub fn partner_of(&self, id: PlayerId) -> Option<PlayerId> {
        if self.0 == id {
            Some(self.1)
        } else if self.1 == id {
            Some(self.0)
        } else {
            None
        }
    }
}

/// Accumulated history of one teammate pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TeammateRecord {
    pub matches: u32,
    pub delta: f64,
}

/// Co-occurrence counts for every pair that has played together or against
/// each other
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationLedger {
    teammates: BTreeMap<PairKey, TeammateRecord>,
    opponents: BTreeMap<PairKey, u32>,
}

impl RelationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.teammates.clear();
        self.opponents.clear();
    }

    /// Record one match played together with the team's shared delta
    pub fn record_teammates(&mut self, a: PlayerId, b: PlayerId, delta: f64) {
        let entry = self.teammates.entry(PairKey::new(a, b)).or_default();
        entry.matches += 1;
        entry.delta += delta;
    }

    pub fn record_opponents(&mut self, a: PlayerId, b: PlayerId) {
        *self.opponents.entry(PairKey::new(a, b)).or_insert(0) += 1;
    }

    pub fn teammate_count(&self, a: PlayerId, b: PlayerId) -> u32 {
        self.teammates
            .get(&PairKey::new(a, b))
            .map(|record| record.matches)
            .unwrap_or(0)
    }

    pub fn teammate_delta(&self, a: PlayerId, b: PlayerId) -> f64 {
        self.teammates
            .get(&PairKey::new(a, b))
            .map(|record| record.delta)
            .unwrap_or(0.0)
    }

    pub fn opponent_count(&self, a: PlayerId, b: PlayerId) -> u32 {
        self.opponents.get(&PairKey::new(a, b)).copied().unwrap_or(0)
    }

    /// Every partner of a player with the shared record, ascending by partner id
    pub fn teammates_of(&self, id: PlayerId) -> Vec<(PlayerId, TeammateRecord)> {
        self.teammates
            .iter()
            .filter_map(|(key, record)| key.partner_of(id).map(|partner| (partner, *record)))
            .collect()
    }

    /// Highest teammate-pair counts, descending
    pub fn top_teammate_counts(&self, n: usize) -> Vec<u32> {
        top_n(self.teammates.values().map(|record| record.matches), n)
    }

    /// Highest opponent-pair counts, descending
    pub fn top_opponent_counts(&self, n: usize) -> Vec<u32> {
        top_n(self.opponents.values().copied(), n)
    }

    pub fn teammate_pairs(&self) -> usize {
        self.teammates.len()
    }

    pub fn opponent_pairs(&self) -> usize {
        self.opponents.len()
    }
}

fn top_n(values: impl Iterator<Item = u32>, n: usize) -> Vec<u32> {
    let mut values: Vec<u32> = values.collect();
    values.sort_unstable_by(|a, b| b.cmp(a));
    values.truncate(n);
    values
}
