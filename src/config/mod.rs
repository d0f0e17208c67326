//! Configuration module for the crawler
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use userscript_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("userscript-crawler.toml")).unwrap();
//! println!("Crawler will visit at most {} pages", config.budget.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BudgetConfig, CheckpointConfig, CheckpointFormat, Config, ForumConfig, MarkupConfig,
    TraversalConfig, TraversalPolicy, UserAgentConfig, VisitedKey,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
