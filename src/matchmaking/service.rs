//! Matchmaking entry point used by callers
//!
//! Wraps a [`MatchFinder`] with request validation, logging and metrics.
//! A `None` result is not an error: the caller tells the user that no match
//! could be generated and lets them pick a different pool.

use rand::RngCore;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::matchmaking::MatchmakingConfig;
use crate::error::Result;
use crate::matchmaking::finder::{validate_request, BruteForceMatchFinder, MatchFinder, MatchProposal};
use crate::metrics::{EngineMetrics, ProposalOutcome};
use crate::state::RankingState;
use crate::types::PlayerId;

pub struct Matchmaker {
    finder: Box<dyn MatchFinder>,
    metrics: Option<Arc<EngineMetrics>>,
}

impl Matchmaker {
    pub fn new(finder: Box<dyn MatchFinder>) -> Self {
        Self {
            finder,
            metrics: None,
        }
    }

    /// Matchmaker backed by the exhaustive search
    pub fn brute_force(config: MatchmakingConfig) -> Result<Self> {
        Ok(Self::new(Box::new(BruteForceMatchFinder::new(config)?)))
    }

    pub fn with_metrics(mut self, metrics: Arc<EngineMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Propose the next match from the available players
    pub fn propose(
        &self,
        state: &RankingState,
        available: &[PlayerId],
        priority: &[PlayerId],
        rng: &mut dyn RngCore,
    ) -> Option<MatchProposal> {
        let timer = self.metrics.as_ref().map(|metrics| metrics.start_timer());

        let (proposal, outcome) = match validate_request(state, available, priority) {
            Err(rejection) => {
                warn!("Could not generate a match: {}", rejection);
                (None, ProposalOutcome::InvalidInput)
            }
            Ok(pool) => {
                debug!("Searching lineups over {} available players", pool.len());
                match self.finder.find_best_match(state, &pool, priority, rng) {
                    Some(proposal) => {
                        info!(
                            "Proposed {}+{} vs {}+{} (score {:.3})",
                            proposal.team_a.defence,
                            proposal.team_a.attack,
                            proposal.team_b.defence,
                            proposal.team_b.attack,
                            proposal.score
                        );
                        (Some(proposal), ProposalOutcome::Proposed)
                    }
                    None => {
                        warn!("Could not generate a match: no lineup satisfies the request");
                        (None, ProposalOutcome::NoCandidate)
                    }
                }
            }
        };

        if let (Some(metrics), Some(timer)) = (&self.metrics, timer) {
            metrics.record_proposal(outcome, timer.stop());
        }

        proposal
    }
}
