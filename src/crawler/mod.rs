//! Crawler module for web page fetching and processing
//!
//! This module contains the collaborators around the frontier, including:
//! - HTTP fetching through an optional proxy
//! - HTML parsing, link extraction and same-site link selection
//! - The driver loop that feeds results back to the frontier

mod driver;
mod fetcher;
mod parser;

pub use driver::{Driver, RunSummary};
pub use fetcher::{build_http_client, fetch_url, FetchResult};
pub use parser::{parse_html, select_links, LinkSelection, ParsedPage};

use crate::config::Config;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open or create the site's store
/// 2. Restore or seed the frontier
/// 3. Build the HTTP client and output sinks
/// 4. Fetch pages batch by batch until the frontier is finished
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `config_hash` - Hash of the configuration file, recorded in the store
///
/// # Example
///
/// ```no_run
/// use crawl_frontier::config::load_config_with_hash;
/// use crawl_frontier::crawler::crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_config_with_hash(Path::new("crawl.toml"))?;
/// let summary = crawl(&config, Some(&hash)).await?;
/// println!("{} pages fetched", summary.fetched);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: &Config, config_hash: Option<&str>) -> crate::Result<RunSummary> {
    let mut driver = Driver::from_config(config, config_hash)?;
    driver.run().await
}
