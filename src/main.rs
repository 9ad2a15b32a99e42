//! Command line entry point for the biliardino ranking engine
//!
//! Loads a JSON dataset of players and matches, replays the history and runs
//! one operation on it: rating a new match, printing statistics or the
//! ranking table, or proposing the next match.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use biliardino::config::AppConfig;
use biliardino::dataset::Dataset;
use biliardino::metrics::EngineMetrics;
use biliardino::stats::leaderboard;
use biliardino::{EloCalculator, Match, Matchmaker, PlayerId, RankingState, Team};

/// Biliardino - foosball Elo ranking and 2v2 matchmaking
#[derive(Parser)]
#[command(
    name = "biliardino",
    version,
    about = "Elo ranking, player statistics and matchmaking for foosball leagues"
)]
struct Args {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", help = "Path to configuration file (TOML format)")]
    config: Option<PathBuf>,

    /// Dataset override
    #[arg(short, long, value_name = "FILE", help = "Override the JSON dataset path")]
    data: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Print collected metrics after the command
    #[arg(long, help = "Print Prometheus metrics to stderr when done")]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay the full history from the seed ratings
    Recompute {
        /// Write the recomputed dataset back
        #[arg(long)]
        write: bool,
    },
    /// Register a new player at the initial rating
    AddPlayer {
        #[arg(long)]
        name: String,
        /// Preferred share of matches in defence
        #[arg(long, default_value = "0.5")]
        defence: f64,
    },
    /// Rate a finished match and append it to the history
    AddMatch {
        /// Team A as DEFENCE,ATTACK
        #[arg(long, value_delimiter = ',')]
        team_a: Vec<PlayerId>,
        /// Team B as DEFENCE,ATTACK
        #[arg(long, value_delimiter = ',')]
        team_b: Vec<PlayerId>,
        /// Final goals as A,B
        #[arg(long, value_delimiter = ',')]
        score: Vec<u32>,
    },
    /// Print the statistics of one player
    Stats {
        #[arg(long)]
        player: PlayerId,
    },
    /// Print the ranking table
    Ranking,
    /// Propose the next match from the available players
    Propose {
        #[arg(long, value_delimiter = ',')]
        available: Vec<PlayerId>,
        /// Players that must be part of the match
        #[arg(long, value_delimiter = ',')]
        priority: Vec<PlayerId>,
        /// Seed for the score jitter
        #[arg(long)]
        seed: Option<u64>,
    },
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load configuration from file or environment and apply CLI overrides
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }
    if let Some(data) = &args.data {
        config.service.dataset_path = data.clone();
    }

    biliardino::config::validate_config(&config)?;
    Ok(config)
}

fn pair<T: Copy>(values: &[T], what: &str) -> Result<[T; 2]> {
    match values {
        [first, second] => Ok([*first, *second]),
        _ => Err(anyhow!("{} needs exactly two comma-separated values", what)),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(args: Args, config: AppConfig, metrics: Arc<EngineMetrics>) -> Result<()> {
    let dataset_path = config.service.dataset_path.clone();
    let calculator = EloCalculator::new(config.rating.clone())?;

    let dataset = Dataset::load(&dataset_path)?;
    let mut state: RankingState = dataset
        .into_state(Box::new(calculator))?
        .with_metrics(metrics.clone());

    match args.command {
        Command::Recompute { write } => {
            print_json(&leaderboard(state.players(), config.service.recent_form_window))?;
            if write {
                Dataset::from_state(&state).save(&dataset_path)?;
                info!("Wrote recomputed dataset to {}", dataset_path.display());
            }
        }
        Command::AddPlayer { name, defence } => {
            let id = state.register_player(&name, defence);
            Dataset::from_state(&state).save(&dataset_path)?;
            print_json(&state.player(id))?;
        }
        Command::AddMatch {
            team_a,
            team_b,
            score,
        } => {
            let [def_a, att_a] = pair(&team_a, "--team-a")?;
            let [def_b, att_b] = pair(&team_b, "--team-b")?;
            let score = pair(&score, "--score")?;

            let record = Match::new(Team::new(def_a, att_a), Team::new(def_b, att_b), score)?;
            let recorded = state.record_match(record)?.clone();
            Dataset::from_state(&state).save(&dataset_path)?;
            print_json(&recorded)?;
        }
        Command::Stats { player } => {
            print_json(&state.player_stats(player)?)?;
        }
        Command::Ranking => {
            print_json(&leaderboard(state.players(), config.service.recent_form_window))?;
        }
        Command::Propose {
            available,
            priority,
            seed,
        } => {
            let matchmaker =
                Matchmaker::brute_force(config.matchmaking.clone())?.with_metrics(metrics);
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };

            let proposal = matchmaker.propose(&state, &available, &priority, &mut rng);
            if proposal.is_none() {
                eprintln!("No match could be generated from the selected players");
            }
            print_json(&proposal)?;
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    let metrics = Arc::new(EngineMetrics::new()?);
    let print_metrics = args.metrics;

    if let Err(e) = run(args, config, metrics.clone()) {
        error!("{:#}", e);
        std::process::exit(1);
    }

    if print_metrics {
        eprint!("{}", metrics.gather_text()?);
    }

    Ok(())
}
