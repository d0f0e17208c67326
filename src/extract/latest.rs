//! Latest-post locator
//!
//! Finds the "jump to latest post" link: the first link after the element
//! carrying the configured data attribute value. Once captured the link is
//! never overwritten.

use crate::config::MarkupConfig;
use crate::extract::events::{attr, TagEvent};

pub struct LatestPostLocator<'m> {
    markup: &'m MarkupConfig,
    armed: bool,
    href: Option<String>,
}

impl<'m> LatestPostLocator<'m> {
    pub fn new(markup: &'m MarkupConfig) -> Self {
        Self {
            markup,
            armed: false,
            href: None,
        }
    }

    pub fn handle(&mut self, event: &TagEvent) {
        let TagEvent::Start { name, attrs } = event else {
            return;
        };

        if self.href.is_some() {
            return;
        }

        if self.armed && name == "a" {
            if let Some(href) = attr(attrs, "href") {
                self.href = Some(href.to_string());
                return;
            }
        }

        if attr(attrs, &self.markup.latest_attribute) == Some(self.markup.latest_value.as_str()) {
            self.armed = true;
        }
    }

    pub fn finish(self) -> Option<String> {
        self.href
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captures_first_link_after_section() {
        let markup = MarkupConfig::default();
        let mut locator = LatestPostLocator::new(&markup);

        for event in [
            TagEvent::start("a", &[("href", "/before")]),
            TagEvent::start("section", &[("data-type", "lastPost")]),
            TagEvent::start("a", &[("title", "no href")]),
            TagEvent::start("a", &[("href", "/index.php?thread/5&action=lastPost")]),
            TagEvent::start("section", &[("data-type", "lastPost")]),
            TagEvent::start("a", &[("href", "/later")]),
        ] {
            locator.handle(&event);
        }

        assert_eq!(
            locator.finish().as_deref(),
            Some("/index.php?thread/5&action=lastPost")
        );
    }

    #[test]
    fn test_nothing_without_section() {
        let markup = MarkupConfig::default();
        let mut locator = LatestPostLocator::new(&markup);
        locator.handle(&TagEvent::start("a", &[("href", "/x")]));
        locator.handle(&TagEvent::start("section", &[("data-type", "otherPosts")]));
        locator.handle(&TagEvent::start("a", &[("href", "/y")]));
        assert_eq!(locator.finish(), None);
    }
}
