//! Synergy CLI - offline replay of a synergy action feed
//!
//! This CLI lets operators and feed authors:
//! - Replay a JSON-lines action feed against a fresh ledger
//! - Print the resulting state summary and the committed journal
//! - Compute the proposal hashes that votes must reference

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;
mod output;

pub use commands::hash::{hash_feed, HashedLine};
pub use commands::replay::{genesis, parse_feed, replay, FeedLine, Outcome, Rejection, Summary};
pub use config::{GenesisMember, ReplayConfig, DEFAULT_CONFIG_FILE};
pub use error::{CliError, CliResult};
pub use output::OutputFormat;

/// Synergy CLI application
#[derive(Parser)]
#[command(name = "synergy")]
#[command(about = "Synergy - replay and inspect a governance action feed", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "SYNERGY_CONFIG")]
    config: Option<String>,

    /// Output format (text, json)
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON-lines feed and summarize the resulting state
    Replay {
        /// Feed file, one action per line
        feed: PathBuf,

        /// Also print every committed state event
        #[arg(short, long)]
        journal: bool,
    },

    /// Print the proposal hash of every action in a feed
    Hash {
        /// Feed file, one action per line
        feed: PathBuf,
    },

    /// Show configuration
    Config,
}

/// Run using the current process arguments.
pub fn run() -> CliResult<()> {
    run_with_args(std::env::args_os())
}

/// Run using the provided argument iterator.
pub fn run_with_args<I, T>(args: I) -> CliResult<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    let filter = if cli.verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).without_time())
        .try_init();

    let config = ReplayConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Replay { feed, journal } => {
            commands::replay::execute(&config, &feed, journal, cli.output)
        }
        Commands::Hash { feed } => commands::hash::execute(&feed, cli.output),
        Commands::Config => {
            match cli.output {
                OutputFormat::Text => {
                    println!("Proposal deadline: {}", config.engine.proposal_deadline);
                    println!("Reactions:         {}", config.engine.reactions_count);
                    for member in &config.members {
                        println!("Member:            {} {}", member.handle, member.token.to_hex());
                    }
                }
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
            }
            Ok(())
        }
    }
}
