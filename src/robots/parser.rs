//! Robots.txt rules for the crawled forum
//!
//! Allow/Disallow matching is delegated to the robotstxt crate; the
//! Crawl-delay directive, which that crate ignores, is read here.

use robotstxt::DefaultMatcher;
use std::time::Duration;

/// The forum's robots.txt, evaluated for one user agent
#[derive(Debug, Clone)]
pub struct RobotsRules {
    /// Raw robots.txt content; None allows everything
    content: Option<String>,
    /// Product token matched against User-agent lines
    agent: String,
}

impl RobotsRules {
    /// Rules parsed from robots.txt content
    pub fn from_content(content: &str, agent: &str) -> Self {
        Self {
            content: Some(content.to_string()),
            agent: agent.to_string(),
        }
    }

    /// Rules that allow every page; used when robots.txt is ignored or absent
    pub fn allow_all() -> Self {
        Self {
            content: None,
            agent: String::new(),
        }
    }

    /// Returns true if the URL may be fetched
    pub fn is_allowed(&self, url: &str) -> bool {
        match self.content.as_deref() {
            None | Some("") => true,
            Some(content) => {
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(content, &self.agent, url)
            }
        }
    }

    /// Crawl-delay of the group matching our agent, falling back to `*`
    ///
    /// Consecutive User-agent lines form one group; any other directive
    /// closes the list of agents for that group.
    pub fn crawl_delay(&self) -> Option<Duration> {
        let content = self.content.as_deref()?;
        let agent = self.agent.to_lowercase();

        let mut group: Vec<String> = Vec::new();
        let mut group_open = false;
        let mut for_agent = None;
        let mut for_wildcard = None;

        for line in content.lines() {
            let line = line.split('#').next().unwrap_or("").trim();
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            if key == "user-agent" {
                if !group_open {
                    group.clear();
                    group_open = true;
                }
                group.push(value.to_lowercase());
                continue;
            }
            group_open = false;

            if key != "crawl-delay" {
                continue;
            }
            let Ok(seconds) = value.parse::<f64>() else {
                continue;
            };
            if !seconds.is_finite() || seconds < 0.0 {
                continue;
            }

            if !agent.is_empty() && group.iter().any(|token| *token == agent) {
                for_agent = Some(seconds);
            } else if group.iter().any(|token| token == "*") {
                for_wildcard = Some(seconds);
            }
        }

        for_agent.or(for_wildcard).map(Duration::from_secs_f64)
    }
}
