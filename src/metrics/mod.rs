//! Metrics for the ranking engine
//!
//! Prometheus counters and histograms recorded by match rating and
//! matchmaking, exportable in the text exposition format.

pub mod collector;

pub use collector::{EngineMetrics, MetricsTimer, ProposalOutcome};
