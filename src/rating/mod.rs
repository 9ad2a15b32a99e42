//! Rating system for 2v2 matches
//!
//! This module provides the rating calculator interface and the
//! role-aware team Elo implementation used by the ranking state.

pub mod calculator;
pub mod elo;

// Re-export commonly used types
pub use calculator::{Lineup, RatingCalculator, SlotRating};
pub use elo::EloCalculator;
