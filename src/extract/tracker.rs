//! Tag-scope tracker: pairs every link on a page with its enclosing post
//!
//! A post container is an element named `post_tag` whose class list contains
//! `post_class`. Inside it, the post's permalink is the first link found
//! within the quick-options list. Links are reported with the permalink that
//! is known at the moment they open, so links that precede the quick-options
//! list report an empty post.

use crate::config::MarkupConfig;
use crate::extract::events::{attr, has_class, TagEvent};
use crate::extract::ExtractedLink;

/// Explicit state record of the tracker
pub struct ScopeTracker<'m> {
    markup: &'m MarkupConfig,

    /// Post scoping only applies on thread pages
    thread_page: bool,

    in_post: bool,

    /// Same-named containers opened inside the current post
    nested_containers: usize,

    awaiting_permalink: bool,

    /// Same-named elements opened inside the quick-options list
    nested_markers: usize,

    permalink: Option<String>,

    links: Vec<ExtractedLink>,
}

impl<'m> ScopeTracker<'m> {
    /// Creates a tracker for one page
    pub fn new(markup: &'m MarkupConfig, thread_page: bool) -> Self {
        Self {
            markup,
            thread_page,
            in_post: false,
            nested_containers: 0,
            awaiting_permalink: false,
            nested_markers: 0,
            permalink: None,
            links: Vec::new(),
        }
    }

    /// Feeds one tag event
    pub fn handle(&mut self, event: &TagEvent) {
        match event {
            TagEvent::Start { name, attrs } => self.start_tag(name, attrs),
            TagEvent::End { name } => self.end_tag(name),
        }
    }

    /// Feeds a whole event stream
    pub fn feed<'e>(&mut self, events: impl IntoIterator<Item = &'e TagEvent>) {
        for event in events {
            self.handle(event);
        }
    }

    /// Ends the page; scopes still open are dropped silently
    pub fn finish(self) -> Vec<ExtractedLink> {
        self.links
    }

    fn start_tag(&mut self, name: &str, attrs: &[(String, String)]) {
        if name == "a" {
            let href = attr(attrs, "href");

            self.links.push(ExtractedLink {
                href: href.map(str::to_string),
                post: self.permalink.clone().unwrap_or_default(),
            });

            if self.awaiting_permalink && self.permalink.is_none() {
                if let Some(href) = href {
                    self.permalink = Some(href.to_string());
                }
            }
        }

        if !self.thread_page {
            return;
        }

        if name == self.markup.post_tag {
            if self.in_post {
                self.nested_containers += 1;
            } else if has_class(attrs, &self.markup.post_class) {
                self.in_post = true;
            }
        }

        if self.in_post && name == self.markup.quick_options_tag {
            if self.awaiting_permalink {
                self.nested_markers += 1;
            } else if has_class(attrs, &self.markup.quick_options_class) {
                self.awaiting_permalink = true;
                self.nested_markers = 0;
            }
        }
    }

    fn end_tag(&mut self, name: &str) {
        if self.awaiting_permalink && name == self.markup.quick_options_tag {
            if self.nested_markers > 0 {
                self.nested_markers -= 1;
            } else {
                self.awaiting_permalink = false;
            }
        }

        if self.in_post && name == self.markup.post_tag {
            if self.nested_containers > 0 {
                self.nested_containers -= 1;
            } else {
                self.close_post();
            }
        }
    }

    fn close_post(&mut self) {
        self.in_post = false;
        self.nested_containers = 0;
        self.awaiting_permalink = false;
        self.nested_markers = 0;
        self.permalink = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_open() -> TagEvent {
        TagEvent::start("article", &[("class", "message wbbPost")])
    }

    fn marker_open() -> TagEvent {
        TagEvent::start("ul", &[("class", "messageQuickOptions buttonGroup")])
    }

    fn link(href: &str) -> TagEvent {
        TagEvent::start("a", &[("href", href)])
    }

    fn run(thread_page: bool, events: &[TagEvent]) -> Vec<(Option<String>, String)> {
        let markup = MarkupConfig::default();
        let mut tracker = ScopeTracker::new(&markup, thread_page);
        tracker.feed(events);
        tracker
            .finish()
            .into_iter()
            .map(|link| (link.href, link.post))
            .collect()
    }

    fn pair(href: &str, post: &str) -> (Option<String>, String) {
        (Some(href.to_string()), post.to_string())
    }

    #[test]
    fn test_two_posts_are_scoped_separately() {
        let events = vec![
            post_open(),
            marker_open(),
            link("/p/1"),
            TagEvent::end("a"),
            TagEvent::end("ul"),
            link("a.user.js"),
            TagEvent::end("a"),
            link("b.user.js"),
            TagEvent::end("a"),
            TagEvent::end("article"),
            post_open(),
            marker_open(),
            link("/p/2"),
            TagEvent::end("a"),
            TagEvent::end("ul"),
            link("c.user.js"),
            TagEvent::end("a"),
            TagEvent::end("article"),
        ];

        let scripts: Vec<_> = run(true, &events)
            .into_iter()
            .filter(|(href, _)| href.as_deref().is_some_and(|h| h.ends_with(".user.js")))
            .collect();

        assert_eq!(
            scripts,
            vec![
                pair("a.user.js", "/p/1"),
                pair("b.user.js", "/p/1"),
                pair("c.user.js", "/p/2"),
            ]
        );
    }

    #[test]
    fn test_links_before_marker_have_no_post() {
        let events = vec![
            post_open(),
            link("early.user.js"),
            marker_open(),
            link("/p/7"),
            TagEvent::end("ul"),
            link("late.user.js"),
            TagEvent::end("article"),
        ];

        assert_eq!(
            run(true, &events),
            vec![pair("early.user.js", ""), pair("/p/7", ""), pair("late.user.js", "/p/7")]
        );
    }

    #[test]
    fn test_nested_container_does_not_close_post() {
        let events = vec![
            post_open(),
            marker_open(),
            link("/p/3"),
            TagEvent::end("ul"),
            TagEvent::start("article", &[("class", "quote")]),
            link("quoted.user.js"),
            TagEvent::end("article"),
            link("after-quote.user.js"),
            TagEvent::end("article"),
            link("outside.user.js"),
        ];

        assert_eq!(
            run(true, &events),
            vec![
                pair("/p/3", ""),
                pair("quoted.user.js", "/p/3"),
                pair("after-quote.user.js", "/p/3"),
                pair("outside.user.js", ""),
            ]
        );
    }

    #[test]
    fn test_nested_wbb_post_counts_as_nested() {
        // A post-classed container inside a post is still only a nested element
        let events = vec![
            post_open(),
            marker_open(),
            link("/p/4"),
            TagEvent::end("ul"),
            post_open(),
            TagEvent::end("article"),
            link("x.user.js"),
            TagEvent::end("article"),
        ];

        assert_eq!(run(true, &events)[1], pair("x.user.js", "/p/4"));
    }

    #[test]
    fn test_permalink_is_captured_once() {
        let events = vec![
            post_open(),
            marker_open(),
            link("/p/5"),
            link("/p/5/edit"),
            TagEvent::end("ul"),
            marker_open(),
            link("/p/other"),
            TagEvent::end("ul"),
            link("s.user.js"),
        ];

        let records = run(true, &events);
        assert_eq!(records.last(), Some(&pair("s.user.js", "/p/5")));
    }

    #[test]
    fn test_nested_list_inside_marker() {
        let events = vec![
            post_open(),
            marker_open(),
            TagEvent::start("ul", &[]),
            TagEvent::end("ul"),
            link("/p/6"),
            TagEvent::end("ul"),
            link("s.user.js"),
        ];

        assert_eq!(run(true, &events)[1], pair("s.user.js", "/p/6"));
    }

    #[test]
    fn test_marker_outside_post_is_ignored() {
        let events = vec![marker_open(), link("/p/8"), TagEvent::end("ul"), link("s.user.js")];
        assert_eq!(run(true, &events), vec![pair("/p/8", ""), pair("s.user.js", "")]);
    }

    #[test]
    fn test_non_thread_page_skips_scoping() {
        let events = vec![
            post_open(),
            marker_open(),
            link("/p/9"),
            TagEvent::end("ul"),
            link("s.user.js"),
            TagEvent::end("article"),
        ];

        assert_eq!(run(false, &events), vec![pair("/p/9", ""), pair("s.user.js", "")]);
    }

    #[test]
    fn test_class_match_is_token_equality() {
        let events = vec![
            TagEvent::start("article", &[("class", "wbbPostPreview")]),
            marker_open(),
            link("/p/10"),
            TagEvent::end("ul"),
            link("s.user.js"),
        ];

        assert_eq!(run(true, &events)[1], pair("s.user.js", ""));
    }

    #[test]
    fn test_missing_attributes_are_tolerated() {
        let events = vec![
            TagEvent::start("article", &[]),
            post_open(),
            TagEvent::start("ul", &[]),
            marker_open(),
            TagEvent::start("a", &[("name", "anchor")]),
            link("/p/11"),
            TagEvent::end("ul"),
            link("s.user.js"),
        ];

        let records = run(true, &events);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], (None, String::new()));
        assert_eq!(records[2], pair("s.user.js", "/p/11"));
    }

    #[test]
    fn test_unterminated_scopes_end_silently() {
        let markup = MarkupConfig::default();
        let mut tracker = ScopeTracker::new(&markup, true);
        tracker.feed(&[post_open(), marker_open(), link("/p/12"), link("s.user.js")]);

        let records = tracker.finish();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].post, "/p/12");
    }

    #[test]
    fn test_stray_end_tags_are_harmless() {
        let events = vec![
            TagEvent::end("article"),
            TagEvent::end("ul"),
            link("s.user.js"),
            TagEvent::end("a"),
        ];
        assert_eq!(run(true, &events), vec![pair("s.user.js", "")]);
    }
}
