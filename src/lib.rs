//! Userscript crawler: incremental discovery of userscripts shared on a forum
//!
//! This crate walks a forum in bounded, resumable runs. Each run extracts the
//! links found inside forum posts, records every userscript link together with
//! the posts that reference it, and checkpoints its progress so the next run
//! continues where this one stopped.

pub mod checkpoint;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod registry;
pub mod robots;
pub mod state;
pub mod traversal;
pub mod url;

use thiserror::Error;

/// Main error type for crawler operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] checkpoint::CheckpointError),

    #[error("Could not reach {url}: {source}")]
    Connectivity { url: String, source: reqwest::Error },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
}

impl CrawlError {
    /// Returns true if the error means the forum could not be reached at all
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity { .. })
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for crawler operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::Coordinator;
pub use extract::{extract_links, ExtractedLink};
pub use registry::{ScriptEntry, ScriptRegistry, Upsert};
pub use state::VisitedSet;
pub use traversal::{Target, Traversal};
