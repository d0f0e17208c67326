//! Robots.txt handling module
//!
//! The forum's robots.txt is fetched once at the start of a run. Pages it
//! disallows are skipped, and its Crawl-delay raises the politeness delay.

mod parser;

pub use parser::RobotsRules;

use crate::crawler::Fetcher;
use tracing::{debug, info, warn};

/// Fetches and parses robots.txt
///
/// A missing or unreadable robots.txt allows everything. Connectivity
/// failures are returned so the run can abort before its first page.
pub async fn fetch_robots<F>(fetcher: &F, robots_url: &str, agent: &str) -> crate::Result<RobotsRules>
where
    F: Fetcher + ?Sized,
{
    debug!("Fetching {}", robots_url);

    match fetcher.fetch(robots_url).await {
        Ok(page) if page.is_success() => {
            info!("Loaded robots.txt from {}", robots_url);
            Ok(RobotsRules::from_content(&page.body, agent))
        }
        Ok(page) => {
            debug!("No robots.txt at {} (HTTP {})", robots_url, page.status);
            Ok(RobotsRules::allow_all())
        }
        Err(e) if e.is_connectivity() => Err(e),
        Err(e) => {
            warn!("Failed to fetch robots.txt, allowing all pages: {}", e);
            Ok(RobotsRules::allow_all())
        }
    }
}
