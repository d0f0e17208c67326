//! Traversal strategy: which page the run visits next
//!
//! One `Traversal` type drives both policies:
//! - `Frontier`: breadth-first walk over board and thread listing pages
//! - `Sequential`: post-detail pages by increasing post ID, optionally bounded
//!   by the forum's latest post
//!
//! The traversal owns the visited set so that "already processed" checks and
//! retroactive post marking happen in one place.

mod frontier;
mod sequential;

pub use frontier::{Frontier, Offer};
pub use sequential::SequentialScan;

use crate::config::{TraversalConfig, TraversalPolicy, VisitedKey};
use crate::extract::ExtractedLink;
use crate::state::VisitedSet;
use crate::url::{frontier_key, ForumUrls, LinkRejection};
use std::collections::BTreeSet;
use tracing::{debug, trace, warn};
use url::Url;

/// A page the run should fetch next
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub url: String,

    /// Set for post-detail pages of a sequential scan
    pub post_id: Option<u64>,
}

impl Target {
    fn page(url: String) -> Self {
        Self { url, post_id: None }
    }
}

/// The active traversal policy and its state
#[derive(Debug, Clone)]
enum Policy {
    Frontier(Frontier),
    Sequential(SequentialScan),
}

/// What observing one fetched page changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Observation {
    /// Links newly queued in the frontier
    pub queued: usize,

    /// Post IDs newly marked visited from post permalinks
    pub posts_marked: usize,
}

/// Selects targets and records what has been visited
#[derive(Debug, Clone)]
pub struct Traversal {
    policy: Policy,
    visited: VisitedSet,
    forum: ForumUrls,
}

impl Traversal {
    /// Breadth-first traversal bounded to `max_size` pending URLs
    pub fn frontier(forum: ForumUrls, visited: VisitedSet, max_size: usize) -> Self {
        Self {
            policy: Policy::Frontier(Frontier::new(max_size)),
            visited,
            forum,
        }
    }

    /// Sequential scan whose first candidate is `start_after + 1`
    ///
    /// Post IDs of visited post-detail URLs are recovered so that a set keyed
    /// by URL still skips posts already seen.
    pub fn sequential(forum: ForumUrls, mut visited: VisitedSet, start_after: u64) -> Self {
        let recovered: Vec<u64> = visited
            .urls()
            .filter_map(|page| Url::parse(page).ok())
            .filter_map(|page| forum.post_id(&page))
            .collect();
        for post_id in recovered {
            visited.mark_post(post_id);
        }

        Self {
            policy: Policy::Sequential(SequentialScan::new(start_after)),
            visited,
            forum,
        }
    }

    /// Builds the configured policy
    ///
    /// Seeds become frontier roots for this run; `pending` is the frontier
    /// persisted by the previous run. A sequential scan resumes after the
    /// persisted `position` unless `start-post-id` lies beyond it.
    pub fn from_config(
        config: &TraversalConfig,
        seeds: &[String],
        forum: ForumUrls,
        visited: VisitedSet,
        pending: Vec<String>,
        position: Option<u64>,
    ) -> Self {
        match config.policy {
            TraversalPolicy::Frontier => {
                let mut traversal = Self::frontier(forum, visited, config.max_frontier);
                for seed in seeds {
                    traversal.add_root(seed);
                }
                for url in pending {
                    traversal.restore_pending(url);
                }
                traversal
            }
            TraversalPolicy::Sequential => {
                let start_after = position.unwrap_or(0).max(config.start_post_id);
                if start_after > 0 {
                    debug!("Scan starts after post #{}", start_after);
                }
                Self::sequential(forum, visited, start_after)
            }
        }
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    pub fn forum(&self) -> &ForumUrls {
        &self.forum
    }

    /// Queues a root page served before anything discovered
    pub fn add_root(&mut self, url: &str) {
        if let Policy::Frontier(frontier) = &mut self.policy {
            let key = Url::parse(url)
                .map(|parsed| frontier_key(&parsed))
                .unwrap_or_else(|_| url.to_string());
            frontier.push_root(key);
        }
    }

    fn restore_pending(&mut self, url: String) {
        if let Policy::Frontier(frontier) = &mut self.policy {
            if !self.visited.contains_url(&url) {
                frontier.restore(url);
            }
        }
    }

    /// Bounds a sequential scan by the forum's latest post ID
    pub fn set_upper_bound(&mut self, bound: u64) {
        if let Policy::Sequential(scan) = &mut self.policy {
            scan.set_upper_bound(bound);
        }
    }

    /// Next page to fetch; None once the traversal is exhausted
    pub fn next_target(&mut self) -> Option<Target> {
        match &mut self.policy {
            Policy::Frontier(frontier) => {
                if let Some(root) = frontier.pop_root() {
                    return Some(Target::page(root));
                }

                while let Some(url) = frontier.pop_pending() {
                    if self.visited.contains_url(&url) {
                        trace!("Skipping visited page {}", url);
                        continue;
                    }
                    return Some(Target::page(url));
                }
                None
            }
            Policy::Sequential(scan) => {
                let post_id = scan.next(&self.visited)?;
                let url = self.forum.post_url(post_id)?;
                Some(Target {
                    url,
                    post_id: Some(post_id),
                })
            }
        }
    }

    /// Applies the links of a fetched page
    ///
    /// `page_url` is the URL the page was served from, after redirects; hrefs
    /// are resolved against it.
    pub fn observe(&mut self, target: &Target, page_url: &Url, links: &[ExtractedLink]) -> Observation {
        let mut observation = Observation {
            posts_marked: self.mark_posts(page_url, links),
            ..Observation::default()
        };

        let Policy::Frontier(frontier) = &mut self.policy else {
            return observation;
        };

        let current = frontier_key(page_url);
        for href in links.iter().filter_map(|link| link.href.as_deref()) {
            let Some(resolved) = self.forum.resolve(page_url, href) else {
                continue;
            };

            if let Err(rejection) = self.forum.check_frontier_link(&resolved) {
                trace!("Rejected {}: {}", resolved, describe(rejection));
                continue;
            }

            let key = frontier_key(&resolved);
            if key == current || key == target.url || self.visited.contains_url(&key) {
                continue;
            }

            match frontier.offer(key) {
                Offer::Accepted => observation.queued += 1,
                Offer::AlreadyPending => {}
                Offer::Full => {
                    if frontier.dropped() == 1 {
                        warn!(
                            "Frontier is full ({} pending); new links are dropped for the rest of this run",
                            frontier.len()
                        );
                    }
                }
            }
        }

        observation
    }

    /// Marks the post IDs of the posts found on a page as visited
    fn mark_posts(&mut self, page_url: &Url, links: &[ExtractedLink]) -> usize {
        let permalinks: BTreeSet<&str> = links
            .iter()
            .map(|link| link.post.as_str())
            .filter(|post| !post.is_empty())
            .collect();

        let mut marked = 0;
        for permalink in permalinks {
            let Some(post_id) = self.forum.post_id_of_href(page_url, permalink) else {
                continue;
            };

            if self.visited.mark_post(post_id) {
                marked += 1;
            }

            if self.visited.key() == VisitedKey::Url {
                if let Some(post_url) = self.forum.post_url(post_id) {
                    self.visited.mark_url(&post_url);
                }
            }
        }

        if marked > 0 {
            debug!("Marked {} posts visited from {}", marked, page_url);
        }
        marked
    }

    /// Records a successfully processed target
    pub fn mark_visited(&mut self, target: &Target) {
        self.visited.mark_url(&target.url);
        if let Some(post_id) = target.post_id {
            self.visited.mark_post(post_id);
        }
    }

    /// Records that a target is done with, whatever its outcome
    ///
    /// Moves the scan position of a sequential scan; frontier targets need
    /// nothing beyond `mark_visited`.
    pub fn settle(&mut self, target: &Target) {
        if let (Policy::Sequential(scan), Some(post_id)) = (&mut self.policy, target.post_id) {
            scan.settle(post_id);
        }
    }

    /// Position a sequential scan resumes after; None for frontier walks
    pub fn position(&self) -> Option<u64> {
        match &self.policy {
            Policy::Frontier(_) => None,
            Policy::Sequential(scan) => Some(scan.position()),
        }
    }

    /// Returns an unfinished target so the next run picks it up again
    pub fn requeue(&mut self, target: &Target) {
        if let Policy::Frontier(frontier) = &mut self.policy {
            frontier.restore(target.url.clone());
        }
    }

    /// Pending frontier URLs, sorted; empty for sequential scans
    pub fn pending(&self) -> Vec<String> {
        match &self.policy {
            Policy::Frontier(frontier) => frontier.snapshot(),
            Policy::Sequential(_) => Vec::new(),
        }
    }

    /// Number of pending frontier URLs
    pub fn frontier_len(&self) -> usize {
        match &self.policy {
            Policy::Frontier(frontier) => frontier.len(),
            Policy::Sequential(_) => 0,
        }
    }
}

fn describe(rejection: LinkRejection) -> &'static str {
    match rejection {
        LinkRejection::Foreign => "foreign origin",
        LinkRejection::NotListing => "not a board or thread page",
        LinkRejection::CodeLine => "code line anchor",
        LinkRejection::PostPermalink => "post permalink",
    }
}
