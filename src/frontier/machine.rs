use crate::frontier::queue::{LinkLog, PendingQueue};
use crate::frontier::snapshot::FrontierSnapshot;
use crate::frontier::{FrontierError, FrontierResult};
use crate::link::{IgnoreRules, WeightedLink};
use crate::store::{Partition, PartitionStore, SqliteStore, StoredPartitions};
use crate::url::{canonicalize, site_id, site_root};
use chrono::NaiveDateTime;
use url::Url;

/// Outcome of one `extract_links` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    /// URLs newly queued
    pub added: usize,

    /// URLs newly recorded as ignored
    pub ignored: usize,

    /// URLs already known, malformed, or on another site
    pub skipped: usize,
}

/// Crawl frontier of one site
///
/// Owns the pending queue, the crawled and ignored logs, and the ignore
/// rules. Every mutation is mirrored into the store and flushed before the
/// call returns.
pub struct Frontier<S: PartitionStore = SqliteStore> {
    site: String,
    store: S,
    pending: PendingQueue,
    done: LinkLog,
    ignored: LinkLog,
    ignore_rules: IgnoreRules,
}

/// Canonicalizes the seeds and checks they all belong to one site
fn resolve_seeds<T: AsRef<str>>(seeds: &[T]) -> FrontierResult<(String, Vec<Url>)> {
    if seeds.is_empty() {
        return Err(FrontierError::NoSeeds);
    }

    let mut site: Option<String> = None;
    let mut urls = Vec::with_capacity(seeds.len());
    for seed in seeds {
        let seed = seed.as_ref();
        let url = canonicalize(seed)
            .map_err(|e| FrontierError::InvalidSeed(format!("{}: {}", seed, e)))?;
        let host = site_id(&url).map_err(|e| FrontierError::InvalidSeed(format!("{}: {}", seed, e)))?;

        match &site {
            None => site = Some(host),
            Some(first) if *first != host => {
                return Err(FrontierError::SeedOutsideSite {
                    seed: seed.to_string(),
                    site: first.clone(),
                });
            }
            Some(_) => {}
        }
        urls.push(url);
    }

    let site = site.ok_or(FrontierError::NoSeeds)?;
    Ok((site, urls))
}

impl<S: PartitionStore> Frontier<S> {
    /// Opens the frontier of the seeds' site with the built-in ignore rules
    pub fn initialize<T: AsRef<str>>(seeds: &[T], store: S) -> FrontierResult<Self> {
        Self::initialize_with(seeds, store, IgnoreRules::defaults_for)
    }

    /// Opens the frontier of the seeds' site
    ///
    /// When the store already holds the site, its four partitions are
    /// restored and the seeds only select the site. Otherwise the store is
    /// created, `default_rules` (called with the site root) supplies the
    /// ignore rules and the seeds are queued. A seed matching one of those
    /// rules is recorded as ignored instead.
    pub fn initialize_with<T, F>(seeds: &[T], mut store: S, default_rules: F) -> FrontierResult<Self>
    where
        T: AsRef<str>,
        F: FnOnce(&Url) -> IgnoreRules,
    {
        let (site, seed_urls) = resolve_seeds(seeds)?;

        match store.open(&site)? {
            Some(stored) => Self::restore(site, store, stored),
            None => {
                let rules = seed_urls
                    .first()
                    .map(|url| default_rules(&site_root(url)))
                    .unwrap_or_default();
                Self::create(site, store, &seed_urls, rules)
            }
        }
    }

    fn restore(site: String, store: S, stored: StoredPartitions) -> FrontierResult<Self> {
        let mut frontier = Self {
            site,
            store,
            pending: PendingQueue::new(),
            done: LinkLog::new(),
            ignored: LinkLog::new(),
            ignore_rules: IgnoreRules::from_links(&stored.ignore_rules),
        };

        for link in stored.crawled {
            frontier.done.push(link);
        }
        for link in stored.ignored {
            frontier.ignored.push(link);
        }
        let mut newly_ignored = Vec::new();
        for link in stored.to_crawl {
            if frontier.done.contains(&link.url) || frontier.ignored.contains(&link.url) {
                tracing::warn!("Dropping {} from pending: already crawled or ignored", link.url);
                continue;
            }
            if let Some(rule) = frontier.ignore_rules.matches(&link.url) {
                tracing::warn!("Moving {} from pending to ignored (rule {})", link.url, rule);
                frontier.ignored.push(link.clone());
                newly_ignored.push(link);
                continue;
            }
            frontier.pending.push(link);
        }

        if !newly_ignored.is_empty() {
            frontier.store.write_append(Partition::Ignored, &newly_ignored)?;
            frontier
                .store
                .write_replace(Partition::ToCrawl, &frontier.pending.to_vec())?;
            frontier.store.flush()?;
        }

        tracing::info!(
            "Resumed frontier for {}: {} pending, {} crawled, {} ignored, {} ignore rules",
            frontier.site,
            frontier.pending.len(),
            frontier.done.len(),
            frontier.ignored.len(),
            frontier.ignore_rules.len()
        );
        Ok(frontier)
    }

    fn create(site: String, mut store: S, seeds: &[Url], rules: IgnoreRules) -> FrontierResult<Self> {
        store.create(&site)?;

        let mut pending = PendingQueue::new();
        let mut ignored = LinkLog::new();
        for seed in seeds {
            let link = WeightedLink::new(seed.as_str());
            match rules.matches(seed.as_str()) {
                Some(rule) => {
                    tracing::warn!("Seed {} matches ignore rule {}, not crawling it", seed, rule);
                    ignored.push(link);
                }
                None => {
                    pending.push(link);
                }
            }
        }

        store.write_replace(Partition::IgnoreRules, &rules.to_links())?;
        store.write_replace(Partition::ToCrawl, &pending.to_vec())?;
        if !ignored.is_empty() {
            let links: Vec<WeightedLink> = ignored.iter().cloned().collect();
            store.write_append(Partition::Ignored, &links)?;
        }
        store.flush()?;

        tracing::info!(
            "Started new frontier for {} with {} seeds and {} ignore rules",
            site,
            pending.len(),
            rules.len()
        );

        Ok(Self {
            site,
            store,
            pending,
            done: LinkLog::new(),
            ignored,
            ignore_rules: rules,
        })
    }

    /// Returns up to `max` pending URLs in queue order without removing them
    pub fn next_batch(&self, max: usize) -> impl Iterator<Item = &str> + '_ {
        self.pending.iter().take(max).map(|link| link.url.as_str())
    }

    /// Records a fetched URL as crawled
    ///
    /// Returns `Ok(false)` without touching any state when the URL is not
    /// pending (already crawled, or never queued).
    pub fn complete(&mut self, url: &str, title: &str, at: NaiveDateTime) -> FrontierResult<bool> {
        let link = match self.pending.get(url) {
            Some(queued) => WeightedLink {
                weight: queued.weight,
                notes: queued.notes.clone(),
                ..WeightedLink::crawled(queued.url.clone(), title, at)
            },
            None => {
                if self.done.contains(url) {
                    tracing::debug!("{} is already complete", url);
                } else {
                    tracing::warn!("Completed {} which is not pending", url);
                }
                return Ok(false);
            }
        };

        // Memory changes only once the store holds the move
        self.store
            .write_append(Partition::Crawled, std::slice::from_ref(&link))?;
        self.store
            .write_replace(Partition::ToCrawl, &self.pending.without(url))?;
        self.store.flush()?;

        tracing::debug!("Completed {} ({})", link.url, link.title);
        self.pending.remove(url);
        self.done.push(link);
        Ok(true)
    }

    /// Feeds discovered URLs into the frontier
    ///
    /// Unknown URLs matching an ignore rule are logged as ignored, other
    /// unknown URLs are queued. Known, malformed and off-site URLs are
    /// skipped. The pending snapshot is written at most once per call.
    pub fn extract_links<I, T>(&mut self, urls: I) -> FrontierResult<ExtractSummary>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut summary = ExtractSummary::default();
        let mut newly_ignored = Vec::new();

        for raw in urls {
            let raw = raw.as_ref();
            let url = match canonicalize(raw) {
                Ok(url) => url,
                Err(e) => {
                    tracing::debug!("Skipping {}: {}", raw, e);
                    summary.skipped += 1;
                    continue;
                }
            };

            if site_id(&url).ok().as_deref() != Some(self.site.as_str()) {
                tracing::debug!("Skipping {}: not on {}", url, self.site);
                summary.skipped += 1;
                continue;
            }

            let url = url.as_str();
            if self.is_known(url) {
                summary.skipped += 1;
                continue;
            }

            let link = WeightedLink::new(url);
            if let Some(rule) = self.ignore_rules.matches(url) {
                tracing::debug!("Ignoring {} (rule {})", url, rule);
                self.ignored.push(link.clone());
                newly_ignored.push(link);
                summary.ignored += 1;
            } else {
                tracing::debug!("Queued {}", url);
                self.pending.push(link);
                summary.added += 1;
            }
        }

        if !newly_ignored.is_empty() {
            self.store.write_append(Partition::Ignored, &newly_ignored)?;
        }
        if summary.added > 0 {
            self.store
                .write_replace(Partition::ToCrawl, &self.pending.to_vec())?;
        }
        if summary.added > 0 || summary.ignored > 0 {
            self.store.flush()?;
        }

        Ok(summary)
    }

    /// Moves a pending URL to the back of the queue
    pub fn requeue(&mut self, url: &str) -> FrontierResult<bool> {
        if !self.pending.move_to_back(url) {
            return Ok(false);
        }
        tracing::debug!("Requeued {}", url);
        self.persist_pending()?;
        Ok(true)
    }

    /// Drops a pending URL without recording it as crawled
    pub fn abandon(&mut self, url: &str) -> FrontierResult<bool> {
        if self.pending.remove(url).is_none() {
            return Ok(false);
        }
        tracing::warn!("Abandoned {}", url);
        self.persist_pending()?;
        Ok(true)
    }

    fn persist_pending(&mut self) -> FrontierResult<()> {
        self.store
            .write_replace(Partition::ToCrawl, &self.pending.to_vec())?;
        self.store.flush()?;
        Ok(())
    }

    fn is_known(&self, url: &str) -> bool {
        self.pending.contains(url) || self.done.contains(url) || self.ignored.contains(url)
    }

    /// True when nothing is left to crawl
    pub fn is_finished(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn done_len(&self) -> usize {
        self.done.len()
    }

    pub fn ignored_len(&self) -> usize {
        self.ignored.len()
    }

    pub fn contains_pending(&self, url: &str) -> bool {
        self.pending.contains(url)
    }

    pub fn contains_done(&self, url: &str) -> bool {
        self.done.contains(url)
    }

    pub fn contains_ignored(&self, url: &str) -> bool {
        self.ignored.contains(url)
    }

    pub fn ignore_rules(&self) -> &IgnoreRules {
        &self.ignore_rules
    }

    /// Returns the backing store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Copies the current state for inspection
    pub fn snapshot(&self) -> FrontierSnapshot {
        FrontierSnapshot {
            site: self.site.clone(),
            pending: self.pending.iter().map(|l| l.url.clone()).collect(),
            done: self.done.iter().map(|l| l.url.clone()).collect(),
            ignored: self.ignored.iter().map(|l| l.url.clone()).collect(),
            ignore_rules: self.ignore_rules.iter().map(String::from).collect(),
        }
    }
}
