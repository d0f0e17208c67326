//! Checkpoint store trait and error types

use crate::registry::{ScriptEntry, ScriptRegistry};
use crate::state::{VisitedSet, VisitedSnapshot};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or saving checkpoints
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("Failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed checkpoint {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Malformed line {line} in {}: {content:?}", .path.display())]
    MalformedLine {
        path: PathBuf,
        line: usize,
        content: String,
    },

    #[error("Visited set in {} is not keyed by {expected}", .path.display())]
    KeyMismatch { path: PathBuf, expected: &'static str },
}

impl CheckpointError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for checkpoint operations
pub type CheckpointResult<T> = Result<T, CheckpointError>;

/// State loaded at the start of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    pub visited: VisitedSnapshot,
    pub scripts: Vec<ScriptEntry>,
    /// Pending frontier of the previous run
    pub frontier: Vec<String>,
    /// Post ID the previous sequential scan got past
    pub position: Option<u64>,
}

/// State written at the end of a run
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub visited: &'a VisitedSet,
    pub registry: &'a ScriptRegistry,
    pub frontier: &'a [String],
    pub position: Option<u64>,
    /// Target that was being processed when the run stopped
    pub in_progress: Option<&'a str>,
}

/// Trait for checkpoint file formats
///
/// Loading a missing file yields empty state; a file that exists but cannot
/// be read back is an error. Saving replaces each file as a whole.
pub trait CheckpointStore {
    /// Loads the state persisted by earlier runs
    fn load(&self) -> CheckpointResult<Checkpoint>;

    /// Persists the current state
    fn save(&self, snapshot: &Snapshot<'_>) -> CheckpointResult<()>;
}
