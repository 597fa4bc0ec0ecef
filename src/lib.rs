//! Crawl-Frontier: a resumable single-site web crawl frontier
//!
//! This crate decides which URL to fetch next, deduplicates discovered links,
//! excludes paths matching ignore rules, and mirrors its state into a durable
//! per-site store so an interrupted crawl picks up where it stopped.

pub mod config;
pub mod crawler;
pub mod frontier;
pub mod link;
pub mod output;
pub mod store;
pub mod url;

use thiserror::Error;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Store(#[from] store::StoreError),

    #[error("Frontier error: {0}")]
    Frontier(#[from] frontier::FrontierError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;


// Re-export commonly used types
pub use config::Config;
pub use frontier::{Frontier, FrontierSnapshot};
pub use link::{IgnoreRules, WeightedLink, DEFAULT_WEIGHT};
pub use store::{Partition, PartitionStore, SqliteStore};
pub use url::{canonicalize, site_id, url_hash};
