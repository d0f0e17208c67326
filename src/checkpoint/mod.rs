//! Checkpoint module for persisting state between runs
//!
//! This module handles the files a run resumes from:
//! - The visited set (page URLs or post IDs)
//! - The script registry
//! - The pending frontier of a breadth-first walk
//! - The position of a sequential scan
//!
//! Every file is replaced atomically: written to a temporary sibling, then
//! renamed over the original.

mod json;
mod text;
mod traits;

pub use json::JsonCheckpoint;
pub use text::TextCheckpoint;
pub use traits::{Checkpoint, CheckpointError, CheckpointResult, CheckpointStore, Snapshot};

use crate::config::{CheckpointConfig, CheckpointFormat, VisitedKey};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Opens the configured checkpoint format
pub fn open_store(config: &CheckpointConfig, key: VisitedKey) -> Box<dyn CheckpointStore + Send> {
    match config.format {
        CheckpointFormat::Json => Box::new(
            JsonCheckpoint::new(
                key,
                config.visited_path.clone(),
                config.scripts_path.clone(),
                config.frontier_path.clone(),
            )
            .with_position(config.position_path.clone()),
        ),
        CheckpointFormat::Text => Box::new(
            TextCheckpoint::new(
                key,
                config.visited_path.clone(),
                config.scripts_path.clone(),
                config.frontier_path.clone(),
                config.visited_cap,
            )
            .with_position(config.position_path.clone()),
        ),
    }
}

/// Reads a file, treating a missing file as absent state
fn read_optional(path: &Path) -> CheckpointResult<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(CheckpointError::io(path, err)),
    }
}

/// Writes the whole file to a temporary sibling and renames it into place
fn write_atomic(path: &Path, bytes: &[u8]) -> CheckpointResult<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| CheckpointError::io(parent, err))?;
    }

    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, bytes).map_err(|err| CheckpointError::io(&tmp_path, err))?;
    fs::rename(&tmp_path, path).map_err(|err| CheckpointError::io(path, err))?;

    Ok(())
}
