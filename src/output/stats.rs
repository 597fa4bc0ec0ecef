//! Statistics generation from a frontier store
//!
//! This module provides functionality for extracting and displaying
//! partition counts of a site's store.

use crate::store::{Partition, PartitionStore, StoreResult};

/// Frontier statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierStatistics {
    /// Site identifier
    pub site: String,

    /// Pages waiting to be fetched
    pub to_crawl: u64,

    /// Pages successfully fetched
    pub crawled: u64,

    /// Ignore prefixes
    pub ignore_rules: u64,

    /// Pages excluded by an ignore rule
    pub ignored: u64,
}

impl FrontierStatistics {
    /// Pages the frontier has seen in any state
    pub fn known_pages(&self) -> u64 {
        self.to_crawl + self.crawled + self.ignored
    }
}

/// Loads statistics from the store of `site`
///
/// # Returns
///
/// * `Ok(Some(FrontierStatistics))` - The store exists
/// * `Ok(None)` - Nothing has been crawled for this site yet
/// * `Err(StoreError)` - The store could not be read
pub fn load_statistics<S: PartitionStore>(
    store: &mut S,
    site: &str,
) -> StoreResult<Option<FrontierStatistics>> {
    if store.open(site)?.is_none() {
        return Ok(None);
    }

    Ok(Some(FrontierStatistics {
        site: site.to_string(),
        to_crawl: store.partition_len(Partition::ToCrawl)?,
        crawled: store.partition_len(Partition::Crawled)?,
        ignore_rules: store.partition_len(Partition::IgnoreRules)?,
        ignored: store.partition_len(Partition::Ignored)?,
    }))
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &FrontierStatistics) {
    println!("=== Frontier Statistics: {} ===\n", stats.site);

    println!("Partitions:");
    println!("  Pages to crawl: {}", stats.to_crawl);
    println!("  Crawled pages: {}", stats.crawled);
    println!("  Ignored pages: {}", stats.ignored);
    println!("  Ignore rules: {}", stats.ignore_rules);
    println!();

    let known = stats.known_pages();
    let progress = if known > 0 {
        (stats.crawled as f64 / known as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Progress: {:.1}% ({} / {} known pages crawled)",
        progress, stats.crawled, known
    );
}
