//! Crawler module for running bounded, resumable crawls
//!
//! This module contains the run controller, including:
//! - HTTP fetching behind the `Fetcher` trait
//! - The per-run budget and stop reasons
//! - Overall run coordination

mod budget;
mod coordinator;
mod fetcher;

pub use budget::{RunBudget, RunCounters, StopReason};
pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{build_http_client, user_agent_string, FetchedPage, Fetcher, HttpFetcher};

use crate::config::Config;
use crate::output::RunStatistics;
use crate::CrawlError;

/// Runs one crawl with the production fetcher
///
/// This is the main entry point for a scheduled run. It will:
/// 1. Load the checkpoint files
/// 2. Build the HTTP client
/// 3. Visit targets until the traversal or the budget is exhausted
/// 4. Persist the visited set, the script registry and the frontier
pub async fn crawl(config: Config) -> Result<RunStatistics, CrawlError> {
    run_crawl(config).await
}
