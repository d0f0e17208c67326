//! Sequential scan over numeric post IDs
//!
//! Besides the next candidate the scan tracks its position: the highest ID
//! such that every ID up to it has been dealt with, by a visit in this run or
//! an earlier one, or by an attempt that failed with an HTTP error. The
//! position is what the next run resumes after.

use crate::state::VisitedSet;

/// Walks post IDs upwards, skipping visited ones
#[derive(Debug, Clone)]
pub struct SequentialScan {
    current_id: u64,
    upper_bound: Option<u64>,
    position: u64,
}

impl SequentialScan {
    /// Starts a scan whose first candidate is `start_after + 1`
    pub fn new(start_after: u64) -> Self {
        Self {
            current_id: start_after,
            upper_bound: None,
            position: start_after,
        }
    }

    /// Stops the scan after this post ID
    pub fn set_upper_bound(&mut self, bound: u64) {
        self.upper_bound = Some(bound);
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    /// Records that a handed-out ID has been dealt with
    ///
    /// The position only moves when `post_id` directly follows it.
    pub fn settle(&mut self, post_id: u64) {
        if self.position.checked_add(1) == Some(post_id) {
            self.position = post_id;
        }
    }

    fn is_past_bound(&self) -> bool {
        self.upper_bound.is_some_and(|bound| self.current_id > bound)
    }

    /// Next unvisited post ID, or None once past the upper bound
    pub fn next(&mut self, visited: &VisitedSet) -> Option<u64> {
        if self.is_past_bound() {
            return None;
        }

        loop {
            self.current_id = self.current_id.checked_add(1)?;

            if self.is_past_bound() {
                return None;
            }

            if !visited.contains_post(self.current_id) {
                return Some(self.current_id);
            }

            // Visited IDs right after the position extend it
            if self.position.checked_add(1) == Some(self.current_id) {
                self.position = self.current_id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VisitedKey;

    #[test]
    fn test_unbounded_scan() {
        let visited = VisitedSet::new(VisitedKey::PostId);
        let mut scan = SequentialScan::new(10);
        assert_eq!(scan.next(&visited), Some(11));
        assert_eq!(scan.next(&visited), Some(12));
    }

    #[test]
    fn test_skips_visited_ids() {
        let mut visited = VisitedSet::new(VisitedKey::PostId);
        visited.mark_post(2);
        visited.mark_post(3);

        let mut scan = SequentialScan::new(0);
        assert_eq!(scan.next(&visited), Some(1));
        assert_eq!(scan.next(&visited), Some(4));
    }

    #[test]
    fn test_exhausted_exactly_past_bound() {
        let visited = VisitedSet::new(VisitedKey::PostId);
        let mut scan = SequentialScan::new(0);
        scan.set_upper_bound(3);

        assert_eq!(scan.next(&visited), Some(1));
        assert_eq!(scan.next(&visited), Some(2));
        assert_eq!(scan.next(&visited), Some(3));
        assert_eq!(scan.next(&visited), None);
        assert_eq!(scan.next(&visited), None);
    }

    #[test]
    fn test_bound_reached_while_skipping() {
        let mut visited = VisitedSet::new(VisitedKey::PostId);
        visited.mark_post(4);
        visited.mark_post(5);

        let mut scan = SequentialScan::new(3);
        scan.set_upper_bound(5);
        assert_eq!(scan.next(&visited), None);
        assert_eq!(scan.next(&visited), None);
        assert_eq!(scan.position(), 5);
    }

    #[test]
    fn test_position_follows_settled_ids() {
        let mut visited = VisitedSet::new(VisitedKey::PostId);
        visited.mark_post(12);
        visited.mark_post(20);

        let mut scan = SequentialScan::new(10);
        assert_eq!(scan.next(&visited), Some(11));
        assert_eq!(scan.position(), 10);

        scan.settle(11);
        assert_eq!(scan.next(&visited), Some(13));
        assert_eq!(scan.position(), 12);

        // 13 is never settled, so nothing after it moves the position
        assert_eq!(scan.next(&visited), Some(14));
        scan.settle(14);
        assert_eq!(scan.position(), 12);
    }

    #[test]
    fn test_visited_bound_itself_is_skipped_not_exhausted_early() {
        let mut visited = VisitedSet::new(VisitedKey::PostId);
        visited.mark_post(2);

        let mut scan = SequentialScan::new(0);
        scan.set_upper_bound(3);
        assert_eq!(scan.next(&visited), Some(1));
        assert_eq!(scan.next(&visited), Some(3));
        assert_eq!(scan.next(&visited), None);
    }
}
