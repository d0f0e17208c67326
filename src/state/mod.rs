//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `VisitedSet`: pages and posts processed by this or any earlier run
//! - `VisitedSnapshot`: the persisted form of the visited set
//! - `PageOutcome`: what happened to a single target page

mod page_state;
mod visited;

// Re-export main types
pub use page_state::PageOutcome;
pub use visited::{VisitedSet, VisitedSnapshot};
