//! Read-only statistics derived from the match history
//!
//! The aggregator replays a player's matches into a snapshot; the leaderboard
//! ranks the current player table.

pub mod aggregator;
pub mod leaderboard;

pub use aggregator::{get_player_stats, NotableMatch, PlayerStats, RelationEntry, TeammateSummary};
pub use leaderboard::{leaderboard, LeaderboardRow};
