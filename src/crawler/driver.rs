//! Crawl driver - main crawl loop
//!
//! This module contains the loop that ties the frontier to its collaborators:
//! - Pulling batches from the frontier
//! - Fetching each URL and parsing the page
//! - Reporting completions and discovered links back to the frontier
//! - Handing crawled pages to the output sinks

use crate::config::{Config, CrawlerConfig, HttpConfig};
use crate::crawler::parser::{parse_html, select_links};
use crate::crawler::{build_http_client, fetch_url, FetchResult};
use crate::frontier::Frontier;
use crate::link::IgnoreRules;
use crate::output::{PageSaver, PageSink, ProcessedPage, SearchIndex};
use crate::store::{PartitionStore, SqliteStore, StoreLayout};
use crate::url::{canonicalize, site_root};
use chrono::Local;
use reqwest::Client;
use std::collections::HashMap;
use url::Url;

/// Counters of one `run`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub batches: u64,
    pub fetched: u64,
    pub retried: u64,
    pub abandoned: u64,
}

/// Crawl driver structure
pub struct Driver<S: PartitionStore = SqliteStore> {
    frontier: Frontier<S>,
    client: Client,
    http: HttpConfig,
    batch_size: usize,
    max_attempts: u32,
    failures: HashMap<String, u32>,
    sinks: Vec<Box<dyn PageSink>>,
}

impl<S: PartitionStore> Driver<S> {
    /// Creates a driver around an initialized frontier
    pub fn new(frontier: Frontier<S>, http: &HttpConfig, crawler: &CrawlerConfig) -> crate::Result<Self> {
        let client = build_http_client(http)?;

        Ok(Self {
            frontier,
            client,
            http: http.clone(),
            batch_size: crawler.batch_size,
            max_attempts: crawler.max_attempts.max(1),
            failures: HashMap::new(),
            sinks: Vec::new(),
        })
    }

    /// Adds a destination for crawled pages
    pub fn add_sink(&mut self, sink: Box<dyn PageSink>) {
        tracing::debug!("Recording pages to the {}", sink.name());
        self.sinks.push(sink);
    }

    pub fn frontier(&self) -> &Frontier<S> {
        &self.frontier
    }

    pub fn into_frontier(self) -> Frontier<S> {
        self.frontier
    }

    /// Runs the crawl loop until the frontier is finished
    ///
    /// Fetch failures are retried up to the attempt limit and never abort the
    /// run; store errors do.
    pub async fn run(&mut self) -> crate::Result<RunSummary> {
        tracing::info!(
            "Starting crawl of {} with {} pending URLs",
            self.frontier.site(),
            self.frontier.pending_len()
        );

        let mut summary = RunSummary::default();
        let start_time = std::time::Instant::now();

        while !self.frontier.is_finished() {
            let batch: Vec<String> = self
                .frontier
                .next_batch(self.batch_size)
                .map(String::from)
                .collect();
            summary.batches += 1;

            for url in &batch {
                if let Err(e) = self.process_url(url, &mut summary).await {
                    tracing::error!("Error processing {}: {}", url, e);
                    return Err(e);
                }
            }

            let elapsed = start_time.elapsed().as_secs_f64();
            let rate = if elapsed > 0.0 {
                summary.fetched as f64 / elapsed
            } else {
                0.0
            };
            tracing::info!(
                "Progress: {} pages crawled, {} pending, {} ignored, {:.2} pages/sec",
                self.frontier.done_len(),
                self.frontier.pending_len(),
                self.frontier.ignored_len(),
                rate
            );
        }

        tracing::info!(
            "Crawl of {} completed: {} pages fetched, {} abandoned in {:?}",
            self.frontier.site(),
            summary.fetched,
            summary.abandoned,
            start_time.elapsed()
        );

        Ok(summary)
    }

    /// Processes a single URL
    async fn process_url(&mut self, url: &str, summary: &mut RunSummary) -> crate::Result<()> {
        tracing::debug!("Fetching {}", url);

        match fetch_url(&self.client, url).await {
            FetchResult::Success {
                final_url,
                status_code,
                body,
            } => {
                tracing::debug!("Fetched {} (HTTP {}, {} bytes)", url, status_code, body.len());

                let base = match Url::parse(&final_url) {
                    Ok(base) => base,
                    Err(_) => canonicalize(url)?,
                };
                let root = site_root(&canonicalize(url)?);

                let parsed = parse_html(&body, &base);
                let title = parsed.title.unwrap_or_default();
                let selection = select_links(&parsed.links, &root, self.frontier.ignore_rules());

                self.frontier.complete(url, &title, Local::now().naive_local())?;
                let extracted = self
                    .frontier
                    .extract_links(selection.follow.iter().chain(selection.ignored.iter()))?;
                tracing::debug!(
                    "{}: {} new links, {} ignored, {} known",
                    url,
                    extracted.added,
                    extracted.ignored,
                    extracted.skipped
                );

                self.failures.remove(url);
                summary.fetched += 1;

                let page = ProcessedPage {
                    url,
                    title: &title,
                    body: &body,
                };
                for sink in &mut self.sinks {
                    if let Err(e) = sink.record_page(&page) {
                        tracing::warn!("Failed to record {} in the {}: {}", url, sink.name(), e);
                    }
                }
            }

            FetchResult::Failed { error } => {
                let attempts = {
                    let count = self.failures.entry(url.to_string()).or_insert(0);
                    *count += 1;
                    *count
                };
                tracing::warn!(
                    "Failed to fetch {} (attempt {}/{}): {}",
                    url,
                    attempts,
                    self.max_attempts,
                    error
                );

                // Start a fresh session before the next request
                self.client = build_http_client(&self.http)?;

                if attempts >= self.max_attempts {
                    self.frontier.abandon(url)?;
                    self.failures.remove(url);
                    summary.abandoned += 1;
                } else {
                    self.frontier.requeue(url)?;
                    summary.retried += 1;
                }
            }
        }

        Ok(())
    }
}

impl Driver<SqliteStore> {
    /// Builds the store, frontier and sinks described by a configuration
    pub fn from_config(config: &Config, config_hash: Option<&str>) -> crate::Result<Self> {
        let mut store = SqliteStore::new(
            config.storage.base_path.clone(),
            StoreLayout::from(&config.storage),
        );
        if let Some(hash) = config_hash {
            store = store.with_config_hash(hash);
        }

        let suffixes = config.ignore.prefixes.as_deref();
        let frontier = Frontier::initialize_with(config.crawler.seeds.as_slice(), store, |root| match suffixes {
            Some(suffixes) => IgnoreRules::from_suffixes(root, suffixes),
            None => IgnoreRules::defaults_for(root),
        })?;

        let mut driver = Self::new(frontier, &config.http, &config.crawler)?;

        if config.storage.save_pages {
            let saver = PageSaver::new(&config.storage.base_path, driver.frontier.site());
            driver.add_sink(Box::new(saver));
        }
        if let Some(index) = &config.index {
            driver.add_sink(Box::new(SearchIndex::open(&index.database_path)?));
        }

        Ok(driver)
    }
}
