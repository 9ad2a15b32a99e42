//! Metrics collection using Prometheus

use anyhow::Result;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Result of a matchmaking request, used as a metric label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalOutcome {
    Proposed,
    InvalidInput,
    NoCandidate,
}

impl ProposalOutcome {
    fn label(self) -> &'static str {
        match self {
            ProposalOutcome::Proposed => "proposed",
            ProposalOutcome::InvalidInput => "invalid_input",
            ProposalOutcome::NoCandidate => "no_candidate",
        }
    }
}

/// Metrics collector for rating and matchmaking
#[derive(Clone)]
pub struct EngineMetrics {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Matches rated, frozen ones included
    pub matches_rated_total: IntCounter,

    /// Matches whose score was below the goal threshold
    pub matches_frozen_total: IntCounter,

    /// Matchmaking requests by outcome
    pub proposals_total: IntCounterVec,

    /// Duration of one matchmaking search
    pub matchmaking_duration: Histogram,
}

impl EngineMetrics {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        Self::with_registry(Arc::new(Registry::new()))
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let matches_rated_total =
            IntCounter::new("biliardino_matches_rated_total", "Total matches rated")?;
        registry.register(Box::new(matches_rated_total.clone()))?;

        let matches_frozen_total = IntCounter::new(
            "biliardino_matches_frozen_total",
            "Matches rated without rating movement",
        )?;
        registry.register(Box::new(matches_frozen_total.clone()))?;

        let proposals_total = IntCounterVec::new(
            Opts::new(
                "biliardino_proposals_total",
                "Matchmaking requests by outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(proposals_total.clone()))?;

        let matchmaking_duration = Histogram::with_opts(
            HistogramOpts::new(
                "biliardino_matchmaking_duration_seconds",
                "Time spent searching for the best match",
            )
            .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        )?;
        registry.register(Box::new(matchmaking_duration.clone()))?;

        Ok(Self {
            registry,
            matches_rated_total,
            matches_frozen_total,
            proposals_total,
            matchmaking_duration,
        })
    }

    /// Count a rated match; `moved` is false when the score stayed below
    /// the goal threshold
    pub fn record_match(&self, moved: bool) {
        self.matches_rated_total.inc();
        if !moved {
            self.matches_frozen_total.inc();
        }
    }

    pub fn record_proposal(&self, outcome: ProposalOutcome, duration: Duration) {
        self.proposals_total
            .with_label_values(&[outcome.label()])
            .inc();
        self.matchmaking_duration.observe(duration.as_secs_f64());
    }

    pub fn proposals(&self, outcome: ProposalOutcome) -> u64 {
        self.proposals_total
            .with_label_values(&[outcome.label()])
            .get()
    }

    /// Render every registered metric in the text exposition format
    pub fn gather_text(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}
