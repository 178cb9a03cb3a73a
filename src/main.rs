//! Linkwatch main entry point
//!
//! This is the command-line interface for the Linkwatch uptime monitor.

use anyhow::Context;
use clap::Parser;
use linkwatch::config::{load_config_with_hash, Config};
use linkwatch::monitor::{Monitor, Scheduler};
use linkwatch::notify::build_notifier;
use linkwatch::output::{
    format_link_line, load_history, load_statistics, print_history, print_statistics,
};
use linkwatch::storage::{self, SharedStorage, SqliteStorage, Storage};
use linkwatch::LinkwatchError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Linkwatch: scheduled uptime monitoring for user-owned links
///
/// By default Linkwatch runs a batch pass on a fixed period, checking every
/// active link whose plan interval has elapsed, until interrupted with Ctrl-C.
#[derive(Parser, Debug)]
#[command(name = "linkwatch")]
#[command(version = "1.0.0")]
#[command(about = "Scheduled uptime monitoring for links", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Run a single batch pass and exit
    #[arg(long, conflicts_with_all = ["check", "history", "links", "stats"])]
    once: bool,

    /// Check one link immediately, ignoring its schedule
    #[arg(long, value_name = "LINK_ID", conflicts_with_all = ["history", "links", "stats"])]
    check: Option<i64>,

    /// Print the recent check history of a link and exit
    #[arg(long, value_name = "LINK_ID", conflicts_with_all = ["links", "stats"])]
    history: Option<i64>,

    /// Number of history records to print (defaults to the configured history limit)
    #[arg(long, requires = "history")]
    limit: Option<u32>,

    /// List a user's active links and exit
    #[arg(long, value_name = "USER_ID", conflicts_with = "stats")]
    links: Option<i64>,

    /// Show statistics from the database and exit
    #[arg(long)]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.stats {
        handle_stats(&config)
    } else if let Some(link_id) = cli.history {
        handle_history(&config, link_id, cli.limit)
    } else if let Some(user_id) = cli.links {
        handle_links(&config, user_id)
    } else if let Some(link_id) = cli.check {
        handle_check(&config, link_id).await
    } else if cli.once {
        handle_once(&config).await
    } else {
        handle_daemon(&config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linkwatch=info,warn"),
            1 => EnvFilter::new("linkwatch=debug,info"),
            2 => EnvFilter::new("linkwatch=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn open_storage(config: &Config) -> anyhow::Result<SharedStorage> {
    let path = Path::new(&config.storage.database_path);
    storage::open_shared(path).with_context(|| format!("failed to open {}", path.display()))
}

fn build_monitor(config: &Config) -> anyhow::Result<Monitor> {
    let storage = open_storage(config)?;
    let notifier = build_notifier(&config.notifier).context("failed to set up notifier")?;
    Ok(Monitor::from_config(config, storage, notifier)?)
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.storage.database_path);

    let storage = SqliteStorage::new(Path::new(&config.storage.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --history mode: prints a link's most recent checks
fn handle_history(config: &Config, link_id: i64, limit: Option<u32>) -> anyhow::Result<()> {
    let storage = SqliteStorage::new(Path::new(&config.storage.database_path))?;

    let limit = limit.unwrap_or(config.monitor.history_limit);
    let (link, checks) = load_history(&storage, link_id, limit)?;

    print_history(&link, &checks);
    Ok(())
}

/// Handles the --links mode: lists a user's active links
fn handle_links(config: &Config, user_id: i64) -> anyhow::Result<()> {
    let storage = SqliteStorage::new(Path::new(&config.storage.database_path))?;

    let user = storage
        .get_user(user_id)?
        .ok_or(LinkwatchError::UserNotFound(user_id))?;
    let links = storage.list_user_links(user_id)?;

    println!("Links for {} ({} plan): {}\n", user.email, user.plan, links.len());
    for link in &links {
        println!("{}", format_link_line(link));
    }

    Ok(())
}

/// Handles the --check mode: probes one link now
async fn handle_check(config: &Config, link_id: i64) -> anyhow::Result<()> {
    let monitor = build_monitor(config)?;

    match monitor.check_one(link_id).await? {
        Some(result) => {
            let state = if result.is_up { "UP" } else { "DOWN" };
            match result.error_message() {
                Some(error) => println!(
                    "Link {}: {} ({}) in {:.3}s",
                    link_id, state, error, result.latency_secs
                ),
                None => println!("Link {}: {} in {:.3}s", link_id, state, result.latency_secs),
            }
        }
        None => println!("Link {} is missing or inactive, nothing checked", link_id),
    }

    Ok(())
}

/// Handles the --once mode: a single batch pass
async fn handle_once(config: &Config) -> anyhow::Result<()> {
    let monitor = build_monitor(config)?;
    let summary = monitor.check_all_due().await?;
    println!("Batch pass: {}", summary);
    Ok(())
}

/// Handles the default mode: periodic batch passes until Ctrl-C
async fn handle_daemon(config: &Config) -> anyhow::Result<()> {
    let monitor = Arc::new(build_monitor(config)?);
    let period = Duration::from_secs(config.monitor.check_period_secs);

    tracing::info!("Starting scheduler (batch pass every {:?})", period);
    let handle = Scheduler::new(monitor, period).start();

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;

    tracing::info!("Shutdown requested, waiting for the current check to finish");
    handle.stop().await;
    tracing::info!("Scheduler stopped");

    Ok(())
}
