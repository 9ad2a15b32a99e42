//! Configuration management for the ranking engine
//!
//! This module handles configuration loading from environment variables and
//! TOML files, validation, and default values for rating and matchmaking.

pub mod app;
pub mod matchmaking;
pub mod rating;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, ServiceSettings};
pub use matchmaking::MatchmakingConfig;
pub use rating::EloConfig;
