//! Lull CLI - lull command

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;

/// Lull - debounced page behaviors, replayed headless
#[derive(Parser)]
#[command(name = "lull")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (TOML); built-in defaults when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded page-event trace
    Replay {
        /// Trace file (.toml or .json)
        trace: PathBuf,
        /// Run on the wall clock instead of a virtual one
        #[arg(long)]
        realtime: bool,
        /// Print one JSON object per effect
        #[arg(long)]
        json: bool,
    },
    /// Debounce a burst of calls and show when the action fires
    Simulate {
        /// Quiet window (default: debounce.resize_delay_ms)
        #[arg(long)]
        delay_ms: Option<u64>,
        /// Call offsets in milliseconds, e.g. 0,100,200
        #[arg(long, value_delimiter = ',', required = true)]
        at: Vec<u64>,
    },
    /// Inspect configuration (lists all values by default)
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// List all values with valid ranges
    List,
    /// Print a single value
    Get {
        /// Dotted key, e.g. menu.breakpoint_px
        key: String,
    },
    /// Print a complete example config
    Example,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Replay { trace, realtime, json } => {
            cmd::replay::run(&trace, config, realtime, json).await
        }
        Commands::Simulate { delay_ms, at } => cmd::simulate::run(delay_ms, &at, config).await,
        Commands::Config { command } => match command.unwrap_or(ConfigCommands::List) {
            ConfigCommands::List => cmd::config::run_list(config).await,
            ConfigCommands::Get { key } => cmd::config::run_get(&key, config).await,
            ConfigCommands::Example => cmd::config::run_example().await,
        },
    }
}
