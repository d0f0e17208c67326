//! Bounded frontier of listing pages awaiting a visit

use std::collections::{BTreeSet, HashSet, VecDeque};

/// Result of offering a URL to the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    Accepted,
    AlreadyPending,
    /// Bound reached; the URL was dropped
    Full,
}

/// Unordered set of pending URLs plus the run's root pages
///
/// Roots are served first and are not subject to the bound; they are the
/// configured seed listings, re-entered at the start of every run.
#[derive(Debug, Clone)]
pub struct Frontier {
    roots: VecDeque<String>,
    pending: HashSet<String>,
    max_size: usize,
    dropped: usize,
}

impl Frontier {
    pub fn new(max_size: usize) -> Self {
        Self {
            roots: VecDeque::new(),
            pending: HashSet::new(),
            max_size,
            dropped: 0,
        }
    }

    /// Queues a root page, served before any pending URL
    pub fn push_root(&mut self, url: String) {
        if !self.roots.contains(&url) {
            self.roots.push_back(url);
        }
    }

    /// Restores a persisted pending URL, bypassing the bound
    pub fn restore(&mut self, url: String) {
        self.pending.insert(url);
    }

    /// Offers a newly discovered URL
    ///
    /// Once the bound is reached new URLs are dropped and the pending ones
    /// kept.
    pub fn offer(&mut self, url: String) -> Offer {
        if self.pending.contains(&url) || self.roots.contains(&url) {
            return Offer::AlreadyPending;
        }

        if self.is_full() {
            self.dropped += 1;
            return Offer::Full;
        }

        self.pending.insert(url);
        Offer::Accepted
    }

    /// Takes the next root, or an arbitrary pending URL
    pub fn pop_root(&mut self) -> Option<String> {
        self.roots.pop_front()
    }

    pub fn pop_pending(&mut self) -> Option<String> {
        let url = self.pending.iter().next().cloned()?;
        self.pending.remove(&url);
        Some(url)
    }

    /// Pending URLs and unserved roots
    pub fn len(&self) -> usize {
        self.pending.len() + self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.roots.is_empty()
    }

    fn is_full(&self) -> bool {
        self.pending.len() >= self.max_size
    }

    /// URLs dropped because the bound was reached
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Everything still waiting, sorted, for persistence
    pub fn snapshot(&self) -> Vec<String> {
        self.pending
            .iter()
            .chain(self.roots.iter())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offer_deduplicates() {
        let mut frontier = Frontier::new(10);
        assert_eq!(frontier.offer("a".to_string()), Offer::Accepted);
        assert_eq!(frontier.offer("a".to_string()), Offer::AlreadyPending);
        assert_eq!(frontier.len(), 1);
    }

    #[test]
    fn test_bound_drops_new_and_keeps_existing() {
        let mut frontier = Frontier::new(2);
        frontier.offer("a".to_string());
        frontier.offer("b".to_string());

        assert_eq!(frontier.offer("c".to_string()), Offer::Full);
        assert!(frontier.is_full());
        assert_eq!(frontier.dropped(), 1);
        assert_eq!(frontier.snapshot(), vec!["a", "b"]);
    }

    #[test]
    fn test_roots_first() {
        let mut frontier = Frontier::new(5);
        frontier.offer("pending".to_string());
        frontier.push_root("root".to_string());
        frontier.push_root("root".to_string());

        assert_eq!(frontier.pop_root().as_deref(), Some("root"));
        assert_eq!(frontier.pop_root(), None);
        assert_eq!(frontier.pop_pending().as_deref(), Some("pending"));
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_restore_bypasses_bound() {
        let mut frontier = Frontier::new(1);
        frontier.restore("a".to_string());
        frontier.restore("b".to_string());
        assert_eq!(frontier.len(), 2);
        assert_eq!(frontier.offer("c".to_string()), Offer::Full);
    }
}
