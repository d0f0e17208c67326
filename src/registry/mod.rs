//! Script registry: which posts reference which userscript
//!
//! Entries are only ever added to. Both the script list and each script's post
//! list are kept in sorted sets so serialization is stable across runs.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Persisted form of one registry entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptEntry {
    /// Script URL exactly as linked
    pub url: String,

    /// Post references, sorted
    pub posts: Vec<String>,
}

/// Outcome of recording a script link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// First time this script is seen
    Discovered,
    /// Known script, new referencing post
    PostAdded,
    /// Script and post were both already known
    Unchanged,
}

/// In-memory mapping from script URL to referencing posts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptRegistry {
    scripts: BTreeMap<String, BTreeSet<String>>,
}

impl ScriptRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from persisted entries
    pub fn from_entries(entries: Vec<ScriptEntry>) -> Self {
        let mut registry = Self::new();
        registry.merge(entries);
        registry
    }

    /// Records that `post` links to `script_url`
    pub fn upsert(&mut self, script_url: &str, post: &str) -> Upsert {
        match self.scripts.get_mut(script_url) {
            Some(posts) => {
                if posts.insert(post.to_string()) {
                    Upsert::PostAdded
                } else {
                    Upsert::Unchanged
                }
            }
            None => {
                self.scripts
                    .insert(script_url.to_string(), BTreeSet::from([post.to_string()]));
                Upsert::Discovered
            }
        }
    }

    /// Unions persisted entries into the registry
    ///
    /// Entries already in memory are kept; loaded posts are added to them.
    pub fn merge(&mut self, entries: Vec<ScriptEntry>) {
        for entry in entries {
            self.scripts
                .entry(entry.url)
                .or_default()
                .extend(entry.posts);
        }
    }

    /// Entries sorted by URL, each with sorted posts
    pub fn serialize(&self) -> Vec<ScriptEntry> {
        self.scripts
            .iter()
            .map(|(url, posts)| ScriptEntry {
                url: url.clone(),
                posts: posts.iter().cloned().collect(),
            })
            .collect()
    }

    /// Posts referencing a script
    pub fn posts(&self, script_url: &str) -> Option<&BTreeSet<String>> {
        self.scripts.get(script_url)
    }

    /// Number of distinct scripts
    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// Total number of (script, post) pairs
    pub fn reference_count(&self) -> usize {
        self.scripts.values().map(BTreeSet::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_signals() {
        let mut registry = ScriptRegistry::new();

        assert_eq!(registry.upsert("a.user.js", "/p/1"), Upsert::Discovered);
        assert_eq!(registry.upsert("a.user.js", "/p/2"), Upsert::PostAdded);
        assert_eq!(registry.upsert("a.user.js", "/p/1"), Upsert::Unchanged);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.reference_count(), 2);
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let mut registry = ScriptRegistry::new();
        for _ in 0..5 {
            registry.upsert("a.user.js", "/p/1");
        }
        assert_eq!(registry.posts("a.user.js").unwrap().len(), 1);
    }

    #[test]
    fn test_empty_post_reference_is_recorded() {
        let mut registry = ScriptRegistry::new();
        registry.upsert("footer.user.js", "");
        assert!(registry.posts("footer.user.js").unwrap().contains(""));
    }

    #[test]
    fn test_serialize_is_sorted() {
        let mut registry = ScriptRegistry::new();
        registry.upsert("https://z.example/z.user.js", "/p/9");
        registry.upsert("https://a.example/a.user.js", "/p/3");
        registry.upsert("https://a.example/a.user.js", "/p/10");
        registry.upsert("https://a.example/a.user.js", "/p/1");

        let entries = registry.serialize();
        assert_eq!(entries[0].url, "https://a.example/a.user.js");
        assert_eq!(entries[0].posts, vec!["/p/1", "/p/10", "/p/3"]);
        assert_eq!(entries[1].url, "https://z.example/z.user.js");
    }

    #[test]
    fn test_serialize_merge_round_trip() {
        let mut registry = ScriptRegistry::new();
        registry.upsert("b.user.js", "/p/2");
        registry.upsert("a.user.js", "");
        registry.upsert("a.user.js", "/p/1");

        let restored = ScriptRegistry::from_entries(registry.serialize());
        assert_eq!(restored, registry);
    }

    #[test]
    fn test_merge_unions_posts() {
        let mut registry = ScriptRegistry::new();
        registry.upsert("a.user.js", "/p/1");

        registry.merge(vec![
            ScriptEntry {
                url: "a.user.js".to_string(),
                posts: vec!["/p/0".to_string(), "/p/1".to_string()],
            },
            ScriptEntry {
                url: "b.user.js".to_string(),
                posts: vec!["/p/5".to_string(), "/p/5".to_string()],
            },
        ]);

        assert_eq!(registry.posts("a.user.js").unwrap().len(), 2);
        assert_eq!(registry.posts("b.user.js").unwrap().len(), 1);
        assert_eq!(registry.upsert("b.user.js", "/p/5"), Upsert::Unchanged);
    }

    #[test]
    fn test_entry_json_shape() {
        let entry = ScriptEntry {
            url: "a.user.js".to_string(),
            posts: vec!["/p/1".to_string()],
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"url":"a.user.js","posts":["/p/1"]}"#);

        let missing: Result<ScriptEntry, _> = serde_json::from_str(r#"{"url":"a.user.js"}"#);
        assert!(missing.is_err());
    }
}
