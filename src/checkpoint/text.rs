//! Line-oriented checkpoint files
//!
//! Visited file: one URL or post ID per line, only the most recent entries.
//! Scripts file: one `post_link,script_link` line per reference.
//! Frontier file: one URL per line.
//! Position file: a single post ID.
//!
//! Script lines split at the first comma, so a post link containing a comma
//! cannot be stored; such references are skipped with a warning on save.

use super::{
    read_optional, write_atomic, Checkpoint, CheckpointError, CheckpointResult, CheckpointStore,
    Snapshot,
};
use crate::config::VisitedKey;
use crate::registry::ScriptEntry;
use crate::state::VisitedSnapshot;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct TextCheckpoint {
    key: VisitedKey,
    visited_path: PathBuf,
    scripts_path: PathBuf,
    frontier_path: Option<PathBuf>,
    position_path: Option<PathBuf>,
    visited_cap: usize,
}

impl TextCheckpoint {
    pub fn new(
        key: VisitedKey,
        visited_path: PathBuf,
        scripts_path: PathBuf,
        frontier_path: Option<PathBuf>,
        visited_cap: usize,
    ) -> Self {
        Self {
            key,
            visited_path,
            scripts_path,
            frontier_path,
            position_path: None,
            visited_cap,
        }
    }

    /// Also keeps the sequential scan position
    pub fn with_position(mut self, path: Option<PathBuf>) -> Self {
        self.position_path = path;
        self
    }
}

/// Non-empty lines of a file with their 1-based line numbers
fn read_lines(path: &Path) -> CheckpointResult<Vec<(usize, String)>> {
    let Some(bytes) = read_optional(path)? else {
        return Ok(Vec::new());
    };

    let content = String::from_utf8_lossy(&bytes);
    Ok(content
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim().to_string()))
        .filter(|(_, line)| !line.is_empty())
        .collect())
}

fn write_lines<I, S>(path: &Path, lines: I) -> CheckpointResult<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut content = String::new();
    for line in lines {
        content.push_str(line.as_ref());
        content.push('\n');
    }
    write_atomic(path, content.as_bytes())
}

fn malformed(path: &Path, line: usize, content: String) -> CheckpointError {
    CheckpointError::MalformedLine {
        path: path.to_path_buf(),
        line,
        content,
    }
}

impl TextCheckpoint {
    fn load_visited(&self) -> CheckpointResult<VisitedSnapshot> {
        let lines = read_lines(&self.visited_path)?;

        match self.key {
            VisitedKey::Url => Ok(VisitedSnapshot::Urls(
                lines.into_iter().map(|(_, line)| line).collect(),
            )),
            VisitedKey::PostId => lines
                .into_iter()
                .map(|(number, line)| {
                    line.parse::<u64>()
                        .map_err(|_| malformed(&self.visited_path, number, line))
                })
                .collect::<CheckpointResult<Vec<_>>>()
                .map(VisitedSnapshot::PostIds),
        }
    }

    fn load_scripts(&self) -> CheckpointResult<Vec<ScriptEntry>> {
        read_lines(&self.scripts_path)?
            .into_iter()
            .map(|(number, line)| {
                let entry = line
                    .split_once(',')
                    .filter(|(_, script)| !script.is_empty())
                    .map(|(post, script)| ScriptEntry {
                        url: script.to_string(),
                        posts: vec![post.to_string()],
                    });
                entry.ok_or_else(|| malformed(&self.scripts_path, number, line))
            })
            .collect()
    }

    fn load_position(&self) -> CheckpointResult<Option<u64>> {
        let Some(path) = &self.position_path else {
            return Ok(None);
        };

        match read_lines(path)?.into_iter().next() {
            Some((number, line)) => line
                .parse::<u64>()
                .map(Some)
                .map_err(|_| malformed(path, number, line)),
            None => Ok(None),
        }
    }
}

impl CheckpointStore for TextCheckpoint {
    fn load(&self) -> CheckpointResult<Checkpoint> {
        let frontier = match &self.frontier_path {
            Some(path) => read_lines(path)?.into_iter().map(|(_, line)| line).collect(),
            None => Vec::new(),
        };

        Ok(Checkpoint {
            visited: self.load_visited()?,
            scripts: self.load_scripts()?,
            frontier,
            position: self.load_position()?,
        })
    }

    fn save(&self, snapshot: &Snapshot<'_>) -> CheckpointResult<()> {
        let mut visited = snapshot.visited.recent(self.visited_cap);
        if let Some(current) = snapshot.in_progress {
            if !visited.iter().any(|line| line == current) {
                visited.push(current.to_string());
            }
        }
        write_lines(&self.visited_path, &visited)?;

        let mut references = Vec::new();
        for entry in snapshot.registry.serialize() {
            for post in entry.posts {
                if post.contains(',') {
                    warn!(
                        "Not saving post {} of {}: the text format cannot hold commas",
                        post, entry.url
                    );
                    continue;
                }
                references.push(format!("{},{}", post, entry.url));
            }
        }
        write_lines(&self.scripts_path, &references)?;

        if let Some(path) = &self.frontier_path {
            write_lines(path, snapshot.frontier)?;
        }

        if let (Some(path), Some(position)) = (&self.position_path, snapshot.position) {
            write_lines(path, [position.to_string()])?;
        }

        Ok(())
    }
}
