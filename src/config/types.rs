use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for the crawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub forum: ForumConfig,
    #[serde(default)]
    pub markup: MarkupConfig,
    pub traversal: TraversalConfig,
    #[serde(default)]
    pub budget: BudgetConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub checkpoint: CheckpointConfig,
}

/// The forum being crawled
#[derive(Debug, Clone, Deserialize)]
pub struct ForumConfig {
    /// Root URL of the forum; defines the origin links must stay within
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Board or thread listing pages the frontier starts from
    #[serde(default)]
    pub seeds: Vec<String>,

    /// Post-detail URL with an `{id}` placeholder for the numeric post ID
    #[serde(rename = "post-url-template", default)]
    pub post_url_template: Option<String>,

    /// Page holding the "latest post" section, used to bound sequential scans
    #[serde(rename = "latest-post-page", default)]
    pub latest_post_page: Option<String>,

    /// Fetch robots.txt once per run and skip disallowed pages
    #[serde(rename = "respect-robots", default = "default_true")]
    pub respect_robots: bool,
}

/// Forum markup and URL conventions
///
/// Defaults describe a WoltLab Burning Board installation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarkupConfig {
    /// Query prefix of thread pages (`index.php?thread/...`)
    #[serde(rename = "thread-query-prefix")]
    pub thread_query_prefix: String,

    /// Query prefix of board listing pages (`index.php?board/...`)
    #[serde(rename = "board-query-prefix")]
    pub board_query_prefix: String,

    /// Query parameter carrying a post ID
    #[serde(rename = "post-id-param")]
    pub post_id_param: String,

    /// Fragment token of inline code-line anchors
    #[serde(rename = "code-line-fragment")]
    pub code_line_fragment: String,

    /// Tag and class token of a post container
    #[serde(rename = "post-tag")]
    pub post_tag: String,
    #[serde(rename = "post-class")]
    pub post_class: String,

    /// Tag and class token of the list holding a post's permalink
    #[serde(rename = "quick-options-tag")]
    pub quick_options_tag: String,
    #[serde(rename = "quick-options-class")]
    pub quick_options_class: String,

    /// Attribute name and value marking the latest-post section
    #[serde(rename = "latest-attribute")]
    pub latest_attribute: String,
    #[serde(rename = "latest-value")]
    pub latest_value: String,

    /// Suffix identifying a userscript link
    #[serde(rename = "script-suffix")]
    pub script_suffix: String,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            thread_query_prefix: "thread".to_string(),
            board_query_prefix: "board".to_string(),
            post_id_param: "postID".to_string(),
            code_line_fragment: "codeLine".to_string(),
            post_tag: "article".to_string(),
            post_class: "wbbPost".to_string(),
            quick_options_tag: "ul".to_string(),
            quick_options_class: "messageQuickOptions".to_string(),
            latest_attribute: "data-type".to_string(),
            latest_value: "lastPost".to_string(),
            script_suffix: ".user.js".to_string(),
        }
    }
}

/// Which traversal policy drives the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraversalPolicy {
    /// Breadth-first walk over board and thread listing pages
    Frontier,
    /// Visit post-detail pages by increasing post ID
    Sequential,
}

/// How the visited set is keyed and persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisitedKey {
    Url,
    PostId,
}

/// Traversal configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TraversalConfig {
    pub policy: TraversalPolicy,

    #[serde(rename = "visited-key")]
    pub visited_key: VisitedKey,

    /// Maximum number of pending frontier URLs
    #[serde(rename = "max-frontier", default = "default_max_frontier")]
    pub max_frontier: usize,

    /// Sequential scans start after this post ID
    #[serde(rename = "start-post-id", default)]
    pub start_post_id: u64,

    /// Look up the latest post before a sequential scan and stop there
    #[serde(rename = "discover-latest", default)]
    pub discover_latest: bool,
}

/// Per-run limits
#[derive(Debug, Clone, Deserialize)]
pub struct BudgetConfig {
    /// Pages fetched per run
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Targets attempted per run, including ones robots.txt disallows;
    /// five times `max-pages` when unset
    #[serde(rename = "max-attempts", default)]
    pub max_attempts: Option<u32>,

    /// Newly discovered scripts per run
    #[serde(rename = "max-scripts", default)]
    pub max_scripts: Option<u32>,

    /// Stop once the local clock reaches this minute of the hour
    #[serde(rename = "cutoff-minute", default)]
    pub cutoff_minute: Option<u32>,

    /// Delay after every processed page (milliseconds)
    #[serde(rename = "request-delay", default = "default_request_delay")]
    pub request_delay: u64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            max_attempts: None,
            max_scripts: None,
            cutoff_minute: None,
            request_delay: default_request_delay(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// On-disk checkpoint format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckpointFormat {
    #[default]
    Json,
    Text,
}

/// Checkpoint file configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CheckpointConfig {
    #[serde(default)]
    pub format: CheckpointFormat,

    #[serde(rename = "visited-path")]
    pub visited_path: PathBuf,

    #[serde(rename = "scripts-path")]
    pub scripts_path: PathBuf,

    #[serde(rename = "frontier-path", default)]
    pub frontier_path: Option<PathBuf>,

    /// Last post ID a sequential scan got past; required by that policy
    #[serde(rename = "position-path", default)]
    pub position_path: Option<PathBuf>,

    /// Most recent visited entries kept by the text format
    #[serde(rename = "visited-cap", default = "default_visited_cap")]
    pub visited_cap: usize,
}

fn default_true() -> bool {
    true
}

fn default_max_frontier() -> usize {
    5_000
}

fn default_max_pages() -> u32 {
    2_000
}

fn default_request_delay() -> u64 {
    100
}

fn default_visited_cap() -> usize {
    1_000
}
