//! Crawler coordinator - main run orchestration logic
//!
//! This module contains the run loop that coordinates one bounded run:
//! - Loading the checkpoint and seeding the traversal
//! - Fetching targets, extracting links and recording scripts
//! - Enforcing the run budget and the politeness delay
//! - Persisting state on every exit path, including interrupts and panics

use crate::checkpoint::{open_store, CheckpointError, CheckpointStore, Snapshot};
use crate::config::{Config, TraversalPolicy, VisitedKey};
use crate::crawler::budget::{RunBudget, RunCounters, StopReason};
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::extract::{extract_links, locate_latest_post};
use crate::output::{log_start, RunStatistics, StateSize};
use crate::registry::{ScriptRegistry, Upsert};
use crate::robots::{fetch_robots, RobotsRules};
use crate::state::{PageOutcome, VisitedSet};
use crate::traversal::{Target, Traversal};
use crate::url::ForumUrls;
use crate::CrawlError;
use chrono::Timelike;
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use url::Url;

/// Drives one run of the crawler
///
/// State is persisted when the run ends, whatever the reason. A coordinator
/// dropped before its run finished persists from its `Drop` impl.
pub struct Coordinator<F: Fetcher> {
    config: Config,
    fetcher: F,
    store: Box<dyn CheckpointStore + Send>,
    registry: ScriptRegistry,
    traversal: Traversal,
    budget: RunBudget,
    counters: RunCounters,
    robots: RobotsRules,
    delay: Duration,
    /// Target being processed; recorded if the run stops mid-step
    in_progress: Option<Target>,
    before: StateSize,
    finalized: bool,
}

impl Coordinator<HttpFetcher> {
    /// Creates a coordinator fetching over HTTP with the configured checkpoint files
    pub fn from_config(config: Config) -> crate::Result<Self> {
        let fetcher = HttpFetcher::new(&config.user_agent)?;
        let store = open_store(&config.checkpoint, config.traversal.visited_key);
        Self::new(config, fetcher, store)
    }
}

impl<F: Fetcher> Coordinator<F> {
    /// Creates a new coordinator and loads the persisted state
    ///
    /// A checkpoint that exists but cannot be read is an error; the run does
    /// not start from scratch over it.
    pub fn new(
        config: Config,
        fetcher: F,
        store: Box<dyn CheckpointStore + Send>,
    ) -> crate::Result<Self> {
        let forum = ForumUrls::new(&config.forum, &config.markup)?;
        let checkpoint = store.load()?;

        let visited = VisitedSet::restore(config.traversal.visited_key, checkpoint.visited);
        let registry = ScriptRegistry::from_entries(checkpoint.scripts);

        if !checkpoint.frontier.is_empty() {
            info!("Resuming {} pending pages", checkpoint.frontier.len());
        }
        if let Some(position) = checkpoint.position {
            info!("Resuming scan after post #{}", position);
        }
        let traversal = Traversal::from_config(
            &config.traversal,
            &config.forum.seeds,
            forum,
            visited,
            checkpoint.frontier,
            checkpoint.position,
        );

        let before = StateSize {
            visited: traversal.visited().len(),
            scripts: registry.len(),
            references: registry.reference_count(),
        };

        Ok(Self {
            budget: RunBudget::from_config(&config.budget),
            delay: Duration::from_millis(config.budget.request_delay),
            config,
            fetcher,
            store,
            registry,
            traversal,
            counters: RunCounters::default(),
            robots: RobotsRules::allow_all(),
            in_progress: None,
            before,
            finalized: false,
        })
    }

    pub fn registry(&self) -> &ScriptRegistry {
        &self.registry
    }

    pub fn traversal(&self) -> &Traversal {
        &self.traversal
    }

    /// Runs until the budget or the traversal is exhausted, or Ctrl-C
    pub async fn run(&mut self) -> crate::Result<RunStatistics> {
        self.run_until(async {
            if tokio::signal::ctrl_c().await.is_err() {
                warn!("Could not listen for Ctrl-C; the run can only end on its own");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Runs until `shutdown` resolves or the run ends on its own
    ///
    /// State is persisted before returning, also when the run fails.
    pub async fn run_until<S>(&mut self, shutdown: S) -> crate::Result<RunStatistics>
    where
        S: Future<Output = ()>,
    {
        let started = Instant::now();
        log_start(&self.before);

        tokio::pin!(shutdown);
        let outcome = self.drive(shutdown.as_mut()).await;

        let saved = self.persist();
        self.finalized = true;

        let stop_reason = match &outcome {
            Ok(reason) => *reason,
            Err(_) => StopReason::Aborted,
        };
        let stats = self.statistics(stop_reason, started.elapsed());
        stats.log_summary();

        match (outcome, saved) {
            (Ok(_), Ok(())) => Ok(stats),
            (Ok(_), Err(save_error)) => Err(save_error.into()),
            (Err(run_error), saved) => {
                if let Err(save_error) = saved {
                    error!("Failed to persist state: {}", save_error);
                }
                Err(run_error)
            }
        }
    }

    /// The run loop; returns why it stopped
    async fn drive<S>(&mut self, mut shutdown: Pin<&mut S>) -> crate::Result<StopReason>
    where
        S: Future<Output = ()>,
    {
        let prepared = tokio::select! {
            biased;
            _ = shutdown.as_mut() => None,
            result = self.prepare() => Some(result),
        };
        match prepared {
            Some(result) => result?,
            None => return Ok(StopReason::Interrupted),
        }

        loop {
            let Some(target) = self.traversal.next_target() else {
                info!("Nothing left to visit");
                return Ok(StopReason::Exhausted);
            };
            self.in_progress = Some(target.clone());
            self.counters.attempts += 1;

            let step = tokio::select! {
                biased;
                _ = shutdown.as_mut() => None,
                outcome = self.visit(&target) => Some(outcome),
            };

            let outcome = match step {
                Some(Ok(outcome)) => outcome,
                Some(Err(e)) => {
                    self.traversal.requeue(&target);
                    return Err(e);
                }
                None => {
                    info!("Interrupted while visiting {}", target.url);
                    self.traversal.requeue(&target);
                    return Ok(StopReason::Interrupted);
                }
            };
            self.in_progress = None;
            debug!("Visited {}: {}", target.url, outcome);

            if outcome.marks_visited() {
                self.traversal.mark_visited(&target);
            }
            self.traversal.settle(&target);

            if outcome.was_fetched() && !self.delay.is_zero() {
                let interrupted = tokio::select! {
                    biased;
                    _ = shutdown.as_mut() => true,
                    _ = tokio::time::sleep(self.delay) => false,
                };
                if interrupted {
                    return Ok(StopReason::Interrupted);
                }
            }

            let minute = chrono::Local::now().minute();
            if let Some(reason) = self.budget.check(&self.counters, minute) {
                info!("Stopping: {}", reason);
                return Ok(reason);
            }
        }
    }

    /// One-time setup before the first target: robots.txt and the scan bound
    async fn prepare(&mut self) -> crate::Result<()> {
        if self.config.forum.respect_robots {
            let robots_url = self.traversal.forum().robots_url()?;
            self.robots = fetch_robots(
                &self.fetcher,
                robots_url.as_str(),
                &self.config.user_agent.crawler_name,
            )
            .await?;

            if let Some(crawl_delay) = self.robots.crawl_delay() {
                if crawl_delay > self.delay {
                    info!("Using robots.txt Crawl-delay of {:?}", crawl_delay);
                    self.delay = crawl_delay;
                }
            }
        }

        if self.config.traversal.policy == TraversalPolicy::Sequential
            && self.config.traversal.discover_latest
        {
            match self.discover_latest_post().await {
                Ok(Some(post_id)) => {
                    info!("Latest post is #{}; scanning up to it", post_id);
                    self.traversal.set_upper_bound(post_id);
                }
                Ok(None) => warn!("Could not determine the latest post; scan is unbounded"),
                Err(e) if e.is_connectivity() => return Err(e),
                Err(e) => warn!("Latest post lookup failed, scan is unbounded: {}", e),
            }
        }

        Ok(())
    }

    /// Follows the latest-post link and reads the post ID from where it lands
    async fn discover_latest_post(&self) -> crate::Result<Option<u64>> {
        let Some(page_url) = self.config.forum.latest_post_page.as_deref() else {
            return Ok(None);
        };

        let overview = self.fetcher.fetch(page_url).await?;
        if !overview.is_success() {
            warn!("Latest post page answered HTTP {}", overview.status);
            return Ok(None);
        }

        let Some(href) = locate_latest_post(&overview.body, &self.config.markup) else {
            return Ok(None);
        };

        let forum = self.traversal.forum();
        let base = Url::parse(&overview.final_url)?;
        let Some(link) = forum.resolve(&base, &href) else {
            return Ok(None);
        };

        let landing = self.fetcher.fetch(link.as_str()).await?;
        let post_id = Url::parse(&landing.final_url)
            .ok()
            .and_then(|url| forum.post_id(&url))
            .or_else(|| forum.post_id(&link));

        Ok(post_id)
    }

    /// Processes one target
    async fn visit(&mut self, target: &Target) -> crate::Result<PageOutcome> {
        if !self.robots.is_allowed(&target.url) {
            debug!("Skipping {}: disallowed by robots.txt", target.url);
            self.counters.robots_denied += 1;
            return Ok(PageOutcome::RobotsDenied);
        }

        info!("Visiting {}", target.url);
        let page = self.fetcher.fetch(&target.url).await?;
        self.counters.pages_fetched += 1;

        if !page.is_success() {
            warn!("HTTP {} for {}", page.status, target.url);
            self.counters.http_errors += 1;
            return Ok(PageOutcome::HttpError {
                status: page.status,
            });
        }

        let page_url = match Url::parse(&page.final_url) {
            Ok(url) => url,
            Err(_) => Url::parse(&target.url)?,
        };

        let links = extract_links(&page.body, &page_url, &self.config.markup);
        let suffix = self.config.markup.script_suffix.as_str();

        let mut scripts = 0;
        for link in &links {
            let Some(href) = link.href.as_deref().filter(|href| href.ends_with(suffix)) else {
                continue;
            };
            scripts += 1;

            match self.registry.upsert(href, &link.post) {
                Upsert::Discovered => {
                    info!("Found new script {} at {}", href, link.post);
                    self.counters.new_scripts += 1;
                }
                Upsert::PostAdded => {
                    info!("Additional post for script {}: {}", href, link.post);
                    self.counters.posts_added += 1;
                }
                Upsert::Unchanged => {}
            }
        }

        let observation = self.traversal.observe(target, &page_url, &links);
        if observation.queued > 0 {
            debug!(
                "Queued {} pages from {} ({} pending)",
                observation.queued,
                target.url,
                self.traversal.frontier_len()
            );
        }

        Ok(PageOutcome::Processed {
            links: links.len(),
            scripts,
        })
    }

    /// Writes the visited set, the registry, the frontier and the scan position
    pub fn persist(&self) -> Result<(), CheckpointError> {
        let frontier = self.traversal.pending();
        let in_progress = self.in_progress.as_ref().map(|target| {
            match (self.traversal.visited().key(), target.post_id) {
                (VisitedKey::PostId, Some(post_id)) => post_id.to_string(),
                _ => target.url.clone(),
            }
        });

        self.store.save(&Snapshot {
            visited: self.traversal.visited(),
            registry: &self.registry,
            frontier: &frontier,
            position: self.traversal.position(),
            in_progress: in_progress.as_deref(),
        })?;

        debug!(
            "Saved {} visited, {} scripts, {} pending",
            self.traversal.visited().len(),
            self.registry.len(),
            frontier.len()
        );
        Ok(())
    }

    fn statistics(&self, stop_reason: StopReason, elapsed: Duration) -> RunStatistics {
        RunStatistics {
            stop_reason,
            before: self.before,
            after: StateSize {
                visited: self.traversal.visited().len(),
                scripts: self.registry.len(),
                references: self.registry.reference_count(),
            },
            counters: self.counters,
            frontier_remaining: self.traversal.frontier_len(),
            scan_position: self.traversal.position(),
            elapsed,
        }
    }
}

impl<F: Fetcher> Drop for Coordinator<F> {
    fn drop(&mut self) {
        if self.finalized {
            return;
        }

        if let Err(e) = self.persist() {
            error!("Failed to persist state of an unfinished run: {}", e);
        }
    }
}

/// Runs the main crawl operation with the production fetcher
///
/// # Example
///
/// ```no_run
/// use userscript_crawler::config::load_config;
/// use userscript_crawler::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("userscript-crawler.toml"))?;
/// let stats = run_crawl(config).await?;
/// println!("{} new scripts", stats.scripts_gained());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<RunStatistics, CrawlError> {
    let mut coordinator = Coordinator::from_config(config)?;
    coordinator.run().await
}
