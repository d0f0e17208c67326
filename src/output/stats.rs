//! Statistics of a single run
//!
//! A run starts and ends with one log line each, so the job's history can be
//! followed from its log alone.

use crate::crawler::{RunCounters, StopReason};
use std::time::Duration;
use tracing::info;

/// Size of the persisted state at one point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateSize {
    pub visited: usize,
    pub scripts: usize,
    /// Total (script, post) pairs
    pub references: usize,
}

/// Run statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct RunStatistics {
    pub stop_reason: StopReason,
    pub before: StateSize,
    pub after: StateSize,
    pub counters: RunCounters,
    /// Frontier URLs left for the next run
    pub frontier_remaining: usize,
    /// Post ID a sequential scan got past
    pub scan_position: Option<u64>,
    pub elapsed: Duration,
}

impl RunStatistics {
    /// Scripts discovered by this run
    pub fn scripts_gained(&self) -> usize {
        self.after.scripts.saturating_sub(self.before.scripts)
    }

    /// Pages or posts that entered the visited set during this run
    pub fn visited_gained(&self) -> usize {
        self.after.visited.saturating_sub(self.before.visited)
    }

    /// Logs the end-of-run summary
    pub fn log_summary(&self) {
        info!(
            "Ending with {} visited and {} scripts, {} more than before this run ({})",
            self.after.visited,
            self.after.scripts,
            self.scripts_gained(),
            self.stop_reason
        );
        info!(
            "Fetched {} pages in {:.1}s: {} new scripts, {} additional posts, {} HTTP errors, {} disallowed, {} pending",
            self.counters.pages_fetched,
            self.elapsed.as_secs_f64(),
            self.counters.new_scripts,
            self.counters.posts_added,
            self.counters.http_errors,
            self.counters.robots_denied,
            self.frontier_remaining
        );
        if let Some(position) = self.scan_position {
            info!("Scan position is post #{}", position);
        }
    }
}

/// Logs the start-of-run line
pub fn log_start(size: &StateSize) {
    info!(
        "Starting with {} visited and {} scripts ({} post references)",
        size.visited, size.scripts, size.references
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gains() {
        let stats = RunStatistics {
            stop_reason: StopReason::PageLimit,
            before: StateSize {
                visited: 10,
                scripts: 4,
                references: 5,
            },
            after: StateSize {
                visited: 13,
                scripts: 6,
                references: 9,
            },
            counters: RunCounters::default(),
            frontier_remaining: 0,
            scan_position: Some(12),
            elapsed: Duration::from_secs(1),
        };

        assert_eq!(stats.scripts_gained(), 2);
        assert_eq!(stats.visited_gained(), 3);
        stats.log_summary();
    }
}
