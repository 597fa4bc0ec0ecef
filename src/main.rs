//! Crawl-Frontier main entry point
//!
//! This is the command-line interface for the resumable single-site crawler.

use clap::Parser;
use crawl_frontier::config::{load_config_with_hash, Config};
use crawl_frontier::crawler::crawl;
use crawl_frontier::link::IgnoreRules;
use crawl_frontier::output::{load_statistics, print_statistics, SearchIndex};
use crawl_frontier::store::{SqliteStore, StoreLayout};
use crawl_frontier::url::{canonicalize, site_id, site_root};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Crawl-Frontier: a resumable single-site crawler
///
/// Crawls one site from its seed URLs, skipping paths that match ignore
/// rules, and keeps its progress in a per-site store so an interrupted crawl
/// continues where it stopped.
#[derive(Parser, Debug)]
#[command(name = "crawl-frontier")]
#[command(version)]
#[command(about = "A resumable single-site web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with_all = ["stats", "search"])]
    dry_run: bool,

    /// Show statistics from the site's store and exit
    #[arg(long, conflicts_with_all = ["dry_run", "search"])]
    stats: bool,

    /// Search the index for a term and exit
    #[arg(long, value_name = "TERM", conflicts_with_all = ["dry_run", "stats"])]
    search: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if let Some(term) = &cli.search {
        handle_search(&config, term)?;
    } else {
        handle_crawl(&config, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("crawl_frontier=info,warn"),
            1 => EnvFilter::new("crawl_frontier=debug,info"),
            2 => EnvFilter::new("crawl_frontier=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// First seed of the configuration (seeds are validated on load)
fn first_seed(config: &Config) -> Result<url::Url, Box<dyn std::error::Error>> {
    let first = config
        .crawler
        .seeds
        .first()
        .ok_or("configuration has no seeds")?;
    Ok(canonicalize(first)?)
}

fn configured_site(config: &Config) -> Result<String, Box<dyn std::error::Error>> {
    Ok(site_id(&first_seed(config)?)?)
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Crawl-Frontier Dry Run ===\n");

    let site = configured_site(config)?;
    let store_path = SqliteStore::store_path(&config.storage.base_path, &site);

    println!("Crawler Configuration:");
    println!("  Site: {}", site);
    println!("  Batch size: {}", config.crawler.batch_size);
    println!("  Max attempts: {}", config.crawler.max_attempts);

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Timeout: {}s", config.http.timeout_secs);
    println!(
        "  Proxy: {}",
        config.http.proxy.as_deref().unwrap_or("(none)")
    );

    println!("\nStorage:");
    println!("  Store: {}", store_path.display());
    println!("  Header rows: {}", config.storage.header_rows);
    if config.storage.save_pages {
        println!(
            "  Pages: {}",
            config.storage.base_path.join(&site).display()
        );
    }
    if let Some(index) = &config.index {
        println!("  Search index: {}", index.database_path.display());
    }

    println!("\nSeeds ({}):", config.crawler.seeds.len());
    for seed in &config.crawler.seeds {
        println!("  - {}", seed);
    }

    if store_path.exists() {
        println!("\n✓ Existing store found, the crawl would resume from it");
    } else {
        let root = site_root(&first_seed(config)?);
        let rules = match &config.ignore.prefixes {
            Some(suffixes) => IgnoreRules::from_suffixes(&root, suffixes),
            None => IgnoreRules::defaults_for(&root),
        };
        println!("\nIgnore rules for a new store ({}):", rules.len());
        for rule in rules.iter() {
            println!("  - {}", rule);
        }
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows partition counts of the site's store
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let site = configured_site(config)?;
    let mut store = SqliteStore::new(
        config.storage.base_path.clone(),
        StoreLayout::from(&config.storage),
    );

    println!(
        "Store: {}\n",
        SqliteStore::store_path(&config.storage.base_path, &site).display()
    );

    match load_statistics(&mut store, &site)? {
        Some(stats) => print_statistics(&stats),
        None => println!("No crawl has been started for {}", site),
    }

    Ok(())
}

/// Handles the --search mode: queries the search index
fn handle_search(config: &Config, term: &str) -> Result<(), Box<dyn std::error::Error>> {
    let index_config = config
        .index
        .as_ref()
        .ok_or("no [index] section in the configuration")?;
    let index = SearchIndex::open(&index_config.database_path)?;

    let hits = index.search(term, 20)?;
    println!("{} results for '{}':\n", hits.len(), term);
    for hit in hits {
        println!("  {} {}", hit.title, hit.url);
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, config_hash: &str) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Seeds: {}, batch size: {}",
        config.crawler.seeds.len(),
        config.crawler.batch_size
    );

    match crawl(config, Some(config_hash)).await {
        Ok(summary) => {
            tracing::info!(
                "Crawl completed successfully: {} pages fetched in {} batches",
                summary.fetched,
                summary.batches
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
