//! Error types for the ranking engine
//!
//! Domain failures are modelled with thiserror and carried through the
//! crate as anyhow errors.

use crate::types::PlayerId;

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific ranking scenarios
#[derive(Debug, thiserror::Error)]
pub enum RankingError {
    #[error("Player not found: {player_id}")]
    PlayerNotFound { player_id: PlayerId },

    #[error("Duplicate player: {player_id}")]
    DuplicatePlayer { player_id: PlayerId },

    #[error("Invalid match: {reason}")]
    InvalidMatch { reason: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Dataset error: {message}")]
    DatasetError { message: String },
}
