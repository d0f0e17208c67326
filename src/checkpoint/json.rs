//! JSON checkpoint files

use super::{
    read_optional, write_atomic, Checkpoint, CheckpointError, CheckpointResult, CheckpointStore,
    Snapshot,
};
use crate::config::VisitedKey;
use crate::registry::ScriptEntry;
use crate::state::VisitedSnapshot;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Pretty-printed JSON arrays, one file per kind of state
#[derive(Debug, Clone)]
pub struct JsonCheckpoint {
    key: VisitedKey,
    visited_path: PathBuf,
    scripts_path: PathBuf,
    frontier_path: Option<PathBuf>,
    position_path: Option<PathBuf>,
}

impl JsonCheckpoint {
    pub fn new(
        key: VisitedKey,
        visited_path: PathBuf,
        scripts_path: PathBuf,
        frontier_path: Option<PathBuf>,
    ) -> Self {
        Self {
            key,
            visited_path,
            scripts_path,
            frontier_path,
            position_path: None,
        }
    }

    /// Also keeps the sequential scan position, as a bare JSON number
    pub fn with_position(mut self, path: Option<PathBuf>) -> Self {
        self.position_path = path;
        self
    }
}

fn load_json<T: DeserializeOwned>(path: &Path) -> CheckpointResult<Option<T>> {
    let Some(bytes) = read_optional(path)? else {
        return Ok(None);
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| CheckpointError::Malformed {
            path: path.to_path_buf(),
            source,
        })
}

fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> CheckpointResult<()> {
    let json = serde_json::to_vec_pretty(value).map_err(|source| CheckpointError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomic(path, &json)
}

fn key_name(key: VisitedKey) -> &'static str {
    match key {
        VisitedKey::Url => "url",
        VisitedKey::PostId => "post-id",
    }
}

impl CheckpointStore for JsonCheckpoint {
    fn load(&self) -> CheckpointResult<Checkpoint> {
        let visited = load_json::<VisitedSnapshot>(&self.visited_path)?
            .unwrap_or_else(|| VisitedSnapshot::empty(self.key));

        if !visited.fits(self.key) {
            return Err(CheckpointError::KeyMismatch {
                path: self.visited_path.clone(),
                expected: key_name(self.key),
            });
        }

        let scripts = load_json::<Vec<ScriptEntry>>(&self.scripts_path)?.unwrap_or_default();

        let frontier = match &self.frontier_path {
            Some(path) => load_json::<Vec<String>>(path)?.unwrap_or_default(),
            None => Vec::new(),
        };

        let position = match &self.position_path {
            Some(path) => load_json::<u64>(path)?,
            None => None,
        };

        Ok(Checkpoint {
            visited,
            scripts,
            frontier,
            position,
        })
    }

    fn save(&self, snapshot: &Snapshot<'_>) -> CheckpointResult<()> {
        save_json(&self.visited_path, &snapshot.visited.snapshot())?;
        save_json(&self.scripts_path, &snapshot.registry.serialize())?;

        if let Some(path) = &self.frontier_path {
            save_json(path, snapshot.frontier)?;
        }

        if let (Some(path), Some(position)) = (&self.position_path, snapshot.position) {
            save_json(path, &position)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ScriptRegistry;
    use crate::state::VisitedSet;
    use std::fs;
    use tempfile::TempDir;

    fn store(dir: &TempDir, key: VisitedKey) -> JsonCheckpoint {
        JsonCheckpoint::new(
            key,
            dir.path().join("visited.json"),
            dir.path().join("scripts.json"),
            Some(dir.path().join("frontier.json")),
        )
        .with_position(Some(dir.path().join("position.json")))
    }

    #[test]
    fn test_missing_files_load_empty() {
        let dir = TempDir::new().unwrap();
        let checkpoint = store(&dir, VisitedKey::Url).load().unwrap();

        assert!(checkpoint.visited.is_empty());
        assert!(checkpoint.scripts.is_empty());
        assert!(checkpoint.frontier.is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, VisitedKey::Url);

        let mut visited = VisitedSet::new(VisitedKey::Url);
        visited.mark_url("https://f.example/index.php?board/2");
        visited.mark_url("https://f.example/index.php?board/1");
        let mut registry = ScriptRegistry::new();
        registry.upsert("b.user.js", "/p/2");
        registry.upsert("a.user.js", "/p/1");
        let frontier = vec!["https://f.example/index.php?thread/3".to_string()];

        store
            .save(&Snapshot {
                visited: &visited,
                registry: &registry,
                frontier: &frontier,
                position: None,
                in_progress: None,
            })
            .unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(
            loaded.visited,
            VisitedSnapshot::Urls(vec![
                "https://f.example/index.php?board/1".to_string(),
                "https://f.example/index.php?board/2".to_string(),
            ])
        );
        assert_eq!(loaded.scripts, registry.serialize());
        assert_eq!(loaded.frontier, frontier);
        assert_eq!(loaded.position, None);
        assert!(!dir.path().join("scripts.tmp").exists());
    }

    #[test]
    fn test_scripts_file_is_pretty_printed() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, VisitedKey::PostId);

        let mut registry = ScriptRegistry::new();
        registry.upsert("s.user.js", "/p/42");
        store
            .save(&Snapshot {
                visited: &VisitedSet::new(VisitedKey::PostId),
                registry: &registry,
                frontier: &[],
                position: Some(43),
                in_progress: Some("43"),
            })
            .unwrap();

        let written = fs::read_to_string(dir.path().join("scripts.json")).unwrap();
        assert!(written.contains("\n  {\n    \"url\": \"s.user.js\""));
        assert_eq!(fs::read_to_string(dir.path().join("visited.json")).unwrap(), "[]");
        assert_eq!(fs::read_to_string(dir.path().join("position.json")).unwrap(), "43");
        assert_eq!(store.load().unwrap().position, Some(43));
    }

    #[test]
    fn test_corrupt_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("scripts.json"), "[{\"url\": \"x.user.js\"}]").unwrap();

        let err = store(&dir, VisitedKey::Url).load().unwrap_err();
        assert!(matches!(err, CheckpointError::Malformed { .. }));

        fs::write(dir.path().join("scripts.json"), "[]").unwrap();
        fs::write(dir.path().join("visited.json"), "not json").unwrap();
        let err = store(&dir, VisitedKey::Url).load().unwrap_err();
        assert!(matches!(err, CheckpointError::Malformed { .. }));

        fs::write(dir.path().join("visited.json"), "[]").unwrap();
        fs::write(dir.path().join("position.json"), "-3").unwrap();
        let err = store(&dir, VisitedKey::PostId).load().unwrap_err();
        assert!(matches!(err, CheckpointError::Malformed { .. }));
    }

    #[test]
    fn test_visited_key_mismatch() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("visited.json"), "[1, 2, 3]").unwrap();

        let err = store(&dir, VisitedKey::Url).load().unwrap_err();
        assert!(matches!(err, CheckpointError::KeyMismatch { expected: "url", .. }));

        let loaded = store(&dir, VisitedKey::PostId).load().unwrap();
        assert_eq!(loaded.visited, VisitedSnapshot::PostIds(vec![1, 2, 3]));
    }
}
