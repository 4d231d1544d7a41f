use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ladder_tracker::config::AppConfig;
use ladder_tracker::fetch::{LadderClient, RiotClient};
use ladder_tracker::report;
use ladder_tracker::tracker::{parse_versus, Tracker};

#[derive(Parser)]
#[command(name = "ladder-tracker")]
#[command(about = "Ranked ladder and composition tracker for a roster of TFT players")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides config)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Track a player by Riot ID
    Add {
        /// Riot ID, e.g. "Toto#EUW"
        riot_id: String,
    },

    /// Stop tracking a player
    Remove { name: String },

    /// Stop tracking everyone
    Clear {
        /// Confirm clearing the roster
        #[arg(long)]
        yes: bool,
    },

    /// List tracked players
    List,

    /// Show the roster sorted by rank
    Leaderboard,

    /// Show one player's rank and record
    Stats { name: String },

    /// Compare two players ("A vs B" or two names)
    Compare {
        #[arg(required = true, num_args = 1..=2)]
        players: Vec<String>,
    },

    /// Show a player's recent matches
    History {
        name: String,

        /// Number of matches (default from config)
        #[arg(long)]
        count: Option<u32>,
    },

    /// Show a player's composition breakdown
    Comps {
        name: String,

        /// Ignore the cached aggregate
        #[arg(long)]
        refresh: bool,
    },

    /// Drop every cached aggregate
    ClearCache,
}

fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();
}

fn compare_pair(players: Vec<String>) -> Result<(String, String)> {
    match players.as_slice() {
        [both] => {
            parse_versus(both).with_context(|| format!("Expected \"A vs B\", got {:?}", both))
        }
        [first, second] => Ok((first.clone(), second.clone())),
        _ => bail!("compare takes one \"A vs B\" argument or two names"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    let log_level = cli.log_level.unwrap_or_else(|| config.log_level.clone());
    init_tracing(&log_level, cli.json_logs);

    tracing::info!("Starting ladder-tracker v{}", env!("CARGO_PKG_VERSION"));

    let client_config = config
        .riot
        .client_config()
        .context("Riot API client is not configured")?;
    let client: Arc<dyn LadderClient> = Arc::new(RiotClient::new(client_config)?);
    let tracker = Tracker::from_config(client, &config);

    match cli.command {
        Commands::Add { riot_id } => {
            let entry = tracker.add_player(&riot_id).await?;
            println!("Now tracking {}.", entry.display_name);
        }

        Commands::Remove { name } => {
            let entry = tracker.remove_player(&name)?;
            println!("Stopped tracking {}.", entry.display_name);
        }

        Commands::Clear { yes } => {
            if !yes {
                println!("This removes every tracked player. Re-run with --yes to confirm.");
                return Ok(());
            }
            tracker.clear_roster()?;
            println!("Roster cleared.");
        }

        Commands::List => {
            println!("{}", report::roster(&tracker.players()?));
        }

        Commands::Leaderboard => {
            println!("{}", report::leaderboard(&tracker.leaderboard().await?));
        }

        Commands::Stats { name } => {
            println!("{}", report::player_stats(&tracker.player_stats(&name).await?));
        }

        Commands::Compare { players } => {
            let (first, second) = compare_pair(players)?;
            println!("{}", report::comparison(&tracker.compare(&first, &second).await?));
        }

        Commands::History { name, count } => {
            println!("{}", report::history(&tracker.history(&name, count).await?));
        }

        Commands::Comps { name, refresh } => {
            println!("{}", report::compositions(&tracker.compositions(&name, refresh).await?));
        }

        Commands::ClearCache => {
            let removed = tracker.clear_cache()?;
            println!("Cleared {} cached aggregates.", removed);
        }
    }

    Ok(())
}
