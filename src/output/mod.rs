//! Output module for run reporting
//!
//! This module handles the summary logged around each run: the size of the
//! persisted state before and after, the run's counters and its stop reason.

pub mod stats;

pub use stats::{log_start, RunStatistics, StateSize};
