//! Forum URL profile: resolving links, recognizing page kinds and
//! filtering frontier candidates

use crate::config::{ForumConfig, MarkupConfig};
use url::{ParseError, Url};

/// Why a link was kept out of the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRejection {
    /// Points outside the forum's origin
    Foreign,
    /// Query does not start with a board or thread token
    NotListing,
    /// Fragment targets an inline code line
    CodeLine,
    /// Carries a post ID; permalinks are leaves, not listing pages
    PostPermalink,
}

/// URL conventions of the crawled forum
#[derive(Debug, Clone)]
pub struct ForumUrls {
    base: Url,
    post_url_template: Option<String>,
    markup: MarkupConfig,
}

impl ForumUrls {
    /// Builds the forum's URL rules from configuration
    pub fn new(forum: &ForumConfig, markup: &MarkupConfig) -> Result<Self, ParseError> {
        Ok(Self {
            base: Url::parse(&forum.base_url)?,
            post_url_template: forum.post_url_template.clone(),
            markup: markup.clone(),
        })
    }

    /// The forum's root URL
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Location of the forum's robots.txt
    pub fn robots_url(&self) -> Result<Url, ParseError> {
        self.base.join("/robots.txt")
    }

    /// Resolves an href found on `page` to an absolute HTTP(S) URL
    ///
    /// Returns None for empty hrefs, `javascript:`/`mailto:`/`tel:`/`data:`
    /// links, unparseable hrefs and non-HTTP schemes.
    pub fn resolve(&self, page: &Url, href: &str) -> Option<Url> {
        let href = href.trim();

        if href.is_empty()
            || href.starts_with("javascript:")
            || href.starts_with("mailto:")
            || href.starts_with("tel:")
            || href.starts_with("data:")
        {
            return None;
        }

        let absolute = page.join(href).ok()?;
        match absolute.scheme() {
            "http" | "https" => Some(absolute),
            _ => None,
        }
    }

    /// Returns true if `url` shares scheme, host and port with the forum
    pub fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.base.origin()
    }

    /// Extracts the numeric post ID from the post-identifying query parameter
    pub fn post_id(&self, url: &Url) -> Option<u64> {
        url.query_pairs()
            .find(|(key, _)| key == self.markup.post_id_param.as_str())
            .and_then(|(_, value)| value.trim().parse().ok())
    }

    /// Post ID of an href as written in markup, resolved against `page`
    pub fn post_id_of_href(&self, page: &Url, href: &str) -> Option<u64> {
        self.resolve(page, href).and_then(|url| self.post_id(&url))
    }

    /// Post-detail URL for a post ID
    pub fn post_url(&self, post_id: u64) -> Option<String> {
        self.post_url_template
            .as_ref()
            .map(|template| template.replace("{id}", &post_id.to_string()))
    }

    /// Returns true if the page is a thread page whose posts should be scoped
    pub fn is_thread_page(&self, url: &Url) -> bool {
        is_thread_page(url, &self.markup)
    }

    /// Checks whether a resolved link may enter the frontier
    ///
    /// Size bounds and visited checks are the frontier's business; this only
    /// looks at the shape of the URL.
    pub fn check_frontier_link(&self, url: &Url) -> Result<(), LinkRejection> {
        if !self.is_same_origin(url) {
            return Err(LinkRejection::Foreign);
        }

        let query = url.query().unwrap_or("");
        if !query.starts_with(self.markup.board_query_prefix.as_str())
            && !query.starts_with(self.markup.thread_query_prefix.as_str())
        {
            return Err(LinkRejection::NotListing);
        }

        if url
            .fragment()
            .is_some_and(|fragment| fragment.contains(self.markup.code_line_fragment.as_str()))
        {
            return Err(LinkRejection::CodeLine);
        }

        if url
            .query_pairs()
            .any(|(key, _)| key == self.markup.post_id_param.as_str())
        {
            return Err(LinkRejection::PostPermalink);
        }

        Ok(())
    }
}

/// Returns true if the URL's query begins with the thread token
pub fn is_thread_page(url: &Url, markup: &MarkupConfig) -> bool {
    url.query()
        .is_some_and(|query| query.starts_with(markup.thread_query_prefix.as_str()))
}

/// Frontier identity of a listing URL: the URL without its fragment
pub fn frontier_key(url: &Url) -> String {
    let mut key = url.clone();
    key.set_fragment(None);
    key.to_string()
}
