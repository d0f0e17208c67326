use crate::config::VisitedKey;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Persisted visited set: page URLs or numeric post IDs, depending on policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VisitedSnapshot {
    Urls(Vec<String>),
    PostIds(Vec<u64>),
}

impl VisitedSnapshot {
    /// An empty snapshot of the given kind
    pub fn empty(key: VisitedKey) -> Self {
        match key {
            VisitedKey::Url => Self::Urls(Vec::new()),
            VisitedKey::PostId => Self::PostIds(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Urls(urls) => urls.len(),
            Self::PostIds(ids) => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the snapshot can be restored under `key`
    ///
    /// An empty JSON array carries no type, so it fits either key.
    pub fn fits(&self, key: VisitedKey) -> bool {
        self.is_empty()
            || matches!(
                (self, key),
                (Self::Urls(_), VisitedKey::Url) | (Self::PostIds(_), VisitedKey::PostId)
            )
    }
}

/// Pages and posts already processed, across all runs
///
/// Both URLs and post IDs are tracked; the `key` decides which of the two is
/// persisted. The set never shrinks.
#[derive(Debug, Clone)]
pub struct VisitedSet {
    key: VisitedKey,
    urls: HashSet<String>,
    /// URLs in the order they were first marked
    order: Vec<String>,
    post_ids: BTreeSet<u64>,
}

impl VisitedSet {
    pub fn new(key: VisitedKey) -> Self {
        Self {
            key,
            urls: HashSet::new(),
            order: Vec::new(),
            post_ids: BTreeSet::new(),
        }
    }

    /// Rebuilds the set from a snapshot
    pub fn restore(key: VisitedKey, snapshot: VisitedSnapshot) -> Self {
        let mut visited = Self::new(key);
        match snapshot {
            VisitedSnapshot::Urls(urls) => {
                for url in urls {
                    visited.mark_url(&url);
                }
            }
            VisitedSnapshot::PostIds(ids) => {
                visited.post_ids.extend(ids);
            }
        }
        visited
    }

    pub fn key(&self) -> VisitedKey {
        self.key
    }

    /// Marks a page URL visited; returns true if it was new
    pub fn mark_url(&mut self, url: &str) -> bool {
        if self.urls.insert(url.to_string()) {
            self.order.push(url.to_string());
            true
        } else {
            false
        }
    }

    /// Marks a post ID visited; returns true if it was new
    pub fn mark_post(&mut self, post_id: u64) -> bool {
        self.post_ids.insert(post_id)
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn contains_post(&self, post_id: u64) -> bool {
        self.post_ids.contains(&post_id)
    }

    /// Visited URLs in the order they were marked
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Number of entries under the persisted key
    pub fn len(&self) -> usize {
        match self.key {
            VisitedKey::Url => self.urls.len(),
            VisitedKey::PostId => self.post_ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Full snapshot under the persisted key, sorted
    pub fn snapshot(&self) -> VisitedSnapshot {
        match self.key {
            VisitedKey::Url => {
                let mut urls: Vec<String> = self.order.clone();
                urls.sort();
                VisitedSnapshot::Urls(urls)
            }
            VisitedKey::PostId => VisitedSnapshot::PostIds(self.post_ids.iter().copied().collect()),
        }
    }

    /// The `cap` most recent entries, oldest first, as text lines
    ///
    /// URLs are ordered by when they were marked; post IDs by value.
    pub fn recent(&self, cap: usize) -> Vec<String> {
        match self.key {
            VisitedKey::Url => {
                let skip = self.order.len().saturating_sub(cap);
                self.order[skip..].to_vec()
            }
            VisitedKey::PostId => {
                let skip = self.post_ids.len().saturating_sub(cap);
                self.post_ids
                    .iter()
                    .skip(skip)
                    .map(|id| id.to_string())
                    .collect()
            }
        }
    }
}
