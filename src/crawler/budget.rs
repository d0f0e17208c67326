//! Per-run budget: when a run stops before the traversal is exhausted

use crate::config::BudgetConfig;
use std::fmt;

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// No targets left
    Exhausted,
    PageLimit,
    /// Attempted targets, fetched or not, reached their limit
    AttemptLimit,
    ScriptLimit,
    /// Local clock reached the cutoff minute
    Cutoff,
    Interrupted,
    /// An error ended the run
    Aborted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Exhausted => "nothing left to visit",
            Self::PageLimit => "page limit reached",
            Self::AttemptLimit => "attempt limit reached",
            Self::ScriptLimit => "script limit reached",
            Self::Cutoff => "cutoff minute reached",
            Self::Interrupted => "interrupted",
            Self::Aborted => "aborted by error",
        };
        f.write_str(text)
    }
}

/// Counters of the current run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounters {
    /// Targets handed out by the traversal, fetched or not
    pub attempts: u32,
    /// Requests made for targets, successful or not
    pub pages_fetched: u32,
    pub new_scripts: u32,
    pub posts_added: u32,
    pub http_errors: u32,
    pub robots_denied: u32,
}

/// Limits checked after every page
#[derive(Debug, Clone)]
pub struct RunBudget {
    max_pages: u32,
    max_attempts: u32,
    max_scripts: Option<u32>,
    cutoff_minute: Option<u32>,
}

impl RunBudget {
    pub fn from_config(config: &BudgetConfig) -> Self {
        Self {
            max_pages: config.max_pages,
            max_attempts: config
                .max_attempts
                .unwrap_or_else(|| config.max_pages.saturating_mul(5)),
            max_scripts: config.max_scripts,
            cutoff_minute: config.cutoff_minute,
        }
    }

    /// Returns the reason to stop, if any limit is reached
    ///
    /// `minute` is the current minute of the local hour.
    pub fn check(&self, counters: &RunCounters, minute: u32) -> Option<StopReason> {
        if counters.pages_fetched >= self.max_pages {
            return Some(StopReason::PageLimit);
        }

        if counters.attempts >= self.max_attempts {
            return Some(StopReason::AttemptLimit);
        }

        if self
            .max_scripts
            .is_some_and(|limit| counters.new_scripts >= limit)
        {
            return Some(StopReason::ScriptLimit);
        }

        if self.cutoff_minute.is_some_and(|cutoff| minute >= cutoff) {
            return Some(StopReason::Cutoff);
        }

        None
    }
}
