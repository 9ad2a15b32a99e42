//! 2v2 matchmaking
//!
//! Proposes the four players and role split for the next match from a pool
//! of available players. The search sits behind [`MatchFinder`] so the
//! exhaustive implementation can be swapped without touching callers.

pub mod bounds;
pub mod finder;
pub mod service;

pub use bounds::PoolBounds;
pub use finder::{
    validate_request, BruteForceMatchFinder, MatchFinder, MatchProposal, RequestRejection,
    ScoreComponents,
};
pub use service::Matchmaker;
