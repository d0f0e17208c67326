//! Link extraction from fetched forum pages
//!
//! This module turns a page's markup into extraction records:
//! - Tokenizing the markup into start/end tag events
//! - Tracking post scopes to pair every link with its enclosing post
//! - Locating the "latest post" link on overview pages

mod events;
mod latest;
mod tracker;

pub use events::{attr, has_class, tokenize, TagEvent};
pub use latest::LatestPostLocator;
pub use tracker::ScopeTracker;

use crate::config::MarkupConfig;
use crate::url::is_thread_page;
use url::Url;

/// A link found on a page, paired with the post it appeared in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLink {
    /// The href exactly as written; None if the anchor had no href
    pub href: Option<String>,

    /// Permalink of the enclosing post, empty outside of posts
    pub post: String,
}

impl ExtractedLink {
    /// Returns true if the link points at a userscript
    pub fn is_script(&self, suffix: &str) -> bool {
        self.href.as_deref().is_some_and(|href| href.ends_with(suffix))
    }
}

/// Extracts every link of a page in document order
///
/// Post scoping is applied only when `page_url` is a thread page.
///
/// # Example
///
/// ```
/// use userscript_crawler::config::MarkupConfig;
/// use userscript_crawler::extract::extract_links;
/// use url::Url;
///
/// let html = r#"<article class="wbbPost">
///     <ul class="messageQuickOptions"><a href="/p/42">x</a></ul>
///     <a href="script.user.js">s</a>
/// </article>"#;
/// let page = Url::parse("https://forum.example.com/index.php?thread/1").unwrap();
/// let links = extract_links(html, &page, &MarkupConfig::default());
///
/// assert_eq!(links[1].href.as_deref(), Some("script.user.js"));
/// assert_eq!(links[1].post, "/p/42");
/// ```
pub fn extract_links(html: &str, page_url: &Url, markup: &MarkupConfig) -> Vec<ExtractedLink> {
    let events = tokenize(html);
    let mut tracker = ScopeTracker::new(markup, is_thread_page(page_url, markup));
    tracker.feed(&events);
    tracker.finish()
}

/// Finds the href of the latest-post link, if the page has one
pub fn locate_latest_post(html: &str, markup: &MarkupConfig) -> Option<String> {
    let mut locator = LatestPostLocator::new(markup);
    for event in tokenize(html) {
        locator.handle(&event);
    }
    locator.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thread_url() -> Url {
        Url::parse("https://forum.example.com/index.php?thread/19176&postID=42").unwrap()
    }

    #[test]
    fn test_forum_post_scenario() {
        let html = r#"<html><body>
            <article class="wbbPost">
                <p>Intro</p>
                <ul class="messageQuickOptions"><a href="/p/42">x</a></ul>
                <div class="messageText"><a href="script.user.js">s</a></div>
            </article>
        </body></html>"#;

        let links = extract_links(html, &thread_url(), &MarkupConfig::default());
        let scripts: Vec<_> = links.iter().filter(|l| l.is_script(".user.js")).collect();

        assert_eq!(scripts.len(), 1);
        assert_eq!(scripts[0].href.as_deref(), Some("script.user.js"));
        assert_eq!(scripts[0].post, "/p/42");
    }

    #[test]
    fn test_every_link_once_in_document_order() {
        let html = r#"<a href="/1">1</a><div><a href="/2">2</a><a>3</a></div><a href="/4">4</a>"#;
        let links = extract_links(html, &thread_url(), &MarkupConfig::default());
        let hrefs: Vec<_> = links.iter().map(|l| l.href.as_deref()).collect();
        assert_eq!(hrefs, vec![Some("/1"), Some("/2"), None, Some("/4")]);
    }

    #[test]
    fn test_quoted_article_keeps_post_scope() {
        let html = r#"
            <article class="wbbPost">
                <ul class="messageQuickOptions"><li><a href="/p/1">#1</a></li></ul>
                <blockquote><article class="quote"><a href="q.user.js">q</a></article></blockquote>
                <a href="after.user.js">a</a>
            </article>
            <a href="footer.user.js">f</a>"#;

        let links = extract_links(html, &thread_url(), &MarkupConfig::default());
        let scripts: Vec<_> = links
            .iter()
            .filter(|l| l.is_script(".user.js"))
            .map(|l| (l.href.clone().unwrap(), l.post.clone()))
            .collect();

        assert_eq!(
            scripts,
            vec![
                ("q.user.js".to_string(), "/p/1".to_string()),
                ("after.user.js".to_string(), "/p/1".to_string()),
                ("footer.user.js".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_board_page_has_no_posts() {
        let html = r#"<article class="wbbPost"><ul class="messageQuickOptions"><a href="/p/1">1</a></ul><a href="s.user.js">s</a></article>"#;
        let board = Url::parse("https://forum.example.com/index.php?board/2").unwrap();
        let links = extract_links(html, &board, &MarkupConfig::default());
        assert!(links.iter().all(|l| l.post.is_empty()));
    }

    #[test]
    fn test_unclosed_anchor_is_reported_once() {
        let html = r#"<p><a href="s.user.js">s</p><p>text</p>"#;
        let links = extract_links(html, &thread_url(), &MarkupConfig::default());
        assert_eq!(
            links,
            vec![ExtractedLink {
                href: Some("s.user.js".to_string()),
                post: String::new(),
            }]
        );
    }

    #[test]
    fn test_misnested_anchors_inside_post() {
        let html = r#"<article class="wbbPost">
            <ul class="messageQuickOptions"><b><a href="/p/1"><i>#1</b></i></a></ul>
            <table><a href="a.user.js">a</a><tr><td><a href="b.user.js">b</td></tr></table>
            <a href="c.user.js"><div><a href="d.user.js">d</div>
        </article>"#;

        let links = extract_links(html, &thread_url(), &MarkupConfig::default());
        let pairs: Vec<_> = links
            .iter()
            .map(|l| (l.href.as_deref().unwrap_or_default(), l.post.as_str()))
            .collect();

        assert_eq!(
            pairs,
            vec![
                ("/p/1", ""),
                ("a.user.js", "/p/1"),
                ("b.user.js", "/p/1"),
                ("c.user.js", "/p/1"),
                ("d.user.js", "/p/1"),
            ]
        );
    }

    #[test]
    fn test_truncated_page_keeps_links_before_the_cut() {
        let html = r#"<article class="wbbPost"><ul class="messageQuickOptions"><a href="/p/1"><a href="x.user.js"></ul></div></span><article"#;
        let links = extract_links(html, &thread_url(), &MarkupConfig::default());
        let pairs: Vec<_> = links
            .iter()
            .map(|l| (l.href.as_deref().unwrap_or_default(), l.post.as_str()))
            .collect();
        assert_eq!(pairs, vec![("/p/1", ""), ("x.user.js", "/p/1")]);
    }

    #[test]
    fn test_locate_latest_post() {
        let html = r#"<section data-type="lastPost"><h2>Latest</h2><a href="index.php?thread/7&action=lastPost">go</a></section>"#;
        assert_eq!(
            locate_latest_post(html, &MarkupConfig::default()).as_deref(),
            Some("index.php?thread/7&action=lastPost")
        );
    }
}
