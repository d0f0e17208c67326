//! Outcome of processing one target page
use std::fmt;

/// What happened to a target page during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Page was fetched and its links were extracted
    Processed {
        /// Links found on the page
        links: usize,
        /// Userscript links among them
        scripts: usize,
    },

    /// Server answered with a non-success status; not marked visited
    HttpError {
        /// The HTTP status code
        status: u16,
    },

    /// Page is disallowed by robots.txt and was not fetched
    RobotsDenied,
}

impl PageOutcome {
    /// Returns true if the page enters the visited set
    pub fn marks_visited(&self) -> bool {
        matches!(self, Self::Processed { .. })
    }

    /// Returns true if a request was made, which counts against the budget
    pub fn was_fetched(&self) -> bool {
        !matches!(self, Self::RobotsDenied)
    }
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Processed { links, scripts } => {
                write!(f, "processed ({} links, {} scripts)", links, scripts)
            }
            Self::HttpError { status } => write!(f, "HTTP {}", status),
            Self::RobotsDenied => write!(f, "disallowed by robots.txt"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_processed_pages_are_visited() {
        assert!(PageOutcome::Processed { links: 0, scripts: 0 }.marks_visited());
        assert!(!PageOutcome::HttpError { status: 404 }.marks_visited());
        assert!(!PageOutcome::RobotsDenied.marks_visited());
    }

    #[test]
    fn test_was_fetched() {
        assert!(PageOutcome::HttpError { status: 500 }.was_fetched());
        assert!(!PageOutcome::RobotsDenied.was_fetched());
    }

    #[test]
    fn test_display() {
        assert_eq!(PageOutcome::HttpError { status: 404 }.to_string(), "HTTP 404");
        assert_eq!(
            PageOutcome::Processed { links: 3, scripts: 1 }.to_string(),
            "processed (3 links, 1 scripts)"
        );
    }
}
