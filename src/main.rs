//! userscript-crawler main entry point
//!
//! Runs one bounded crawl and exits. Meant to be started by a scheduler, so
//! the exit status is always success and failures end up in the log.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use userscript_crawler::config::load_config_with_hash;
use userscript_crawler::crawler::crawl;

/// userscript-crawler: finds userscripts shared in forum posts
///
/// Each run visits a bounded slice of the forum, records every userscript
/// link with the posts referencing it, and saves its progress so the next
/// run continues where this one stopped.
#[derive(Parser, Debug)]
#[command(name = "userscript-crawler")]
#[command(version)]
#[command(about = "Incrementally discovers userscripts shared on a forum", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG", default_value = "userscript-crawler.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(cli).await {
        tracing::error!("Run failed: {:#}", e);
    }

    ExitCode::SUCCESS
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("userscript_crawler=info,warn"),
            1 => EnvFilter::new("userscript_crawler=debug,info"),
            2 => EnvFilter::new("userscript_crawler=trace,debug"),
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

async fn run(cli: Cli) -> anyhow::Result<()> {
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    tracing::info!(
        "Policy: {:?}, visited key: {:?}, {} seeds, at most {} pages",
        config.traversal.policy,
        config.traversal.visited_key,
        config.forum.seeds.len(),
        config.budget.max_pages
    );

    let stats = crawl(config).await?;
    tracing::info!(
        "Run finished: {} new scripts, {} pages fetched",
        stats.scripts_gained(),
        stats.counters.pages_fetched
    );

    Ok(())
}
