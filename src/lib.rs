//! Biliardino - ranking and matchmaking engine for foosball leagues
//!
//! This crate provides a role-aware team Elo, per-player statistics replayed
//! from the match history, and a 2v2 matchmaking search over the players
//! available for the next match.

pub mod config;
pub mod dataset;
pub mod error;
pub mod matchmaking;
pub mod metrics;
pub mod rating;
pub mod relations;
pub mod state;
pub mod stats;
pub mod types;

// Re-export commonly used types and traits
pub use error::{RankingError, Result};
pub use types::*;

// Re-export key components
pub use matchmaking::{BruteForceMatchFinder, MatchFinder, MatchProposal, Matchmaker};
pub use rating::{EloCalculator, RatingCalculator};
pub use state::RankingState;
pub use stats::{get_player_stats, PlayerStats};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
