use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for a crawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub storage: StorageConfig,
    pub http: HttpConfig,
    #[serde(default)]
    pub ignore: IgnoreConfig,
    #[serde(default)]
    pub index: Option<IndexConfig>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Seed URLs, all on the same host
    pub seeds: Vec<String>,

    /// Maximum number of URLs handed out per batch
    #[serde(rename = "batch-size", default = "default_batch_size")]
    pub batch_size: usize,

    /// Fetch attempts before a URL is abandoned
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,
}

/// Durable store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the per-site stores and saved pages
    #[serde(rename = "base-path")]
    pub base_path: PathBuf,

    /// Reserved leading rows of every partition
    #[serde(rename = "header-rows", default = "default_header_rows")]
    pub header_rows: u32,

    /// Whether fetched pages are written under the base path
    #[serde(rename = "save-pages", default = "default_true")]
    pub save_pages: bool,

    #[serde(default)]
    pub partitions: PartitionNames,
}

/// Names of the four store partitions
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PartitionNames {
    pub crawled: String,

    #[serde(rename = "to-crawl")]
    pub to_crawl: String,

    #[serde(rename = "ignore-rules")]
    pub ignore_rules: String,

    pub ignored: String,
}

impl Default for PartitionNames {
    fn default() -> Self {
        Self {
            crawled: "Crawled pages".to_string(),
            to_crawl: "Pages to crawl".to_string(),
            ignore_rules: "Ignore seeds".to_string(),
            ignored: "Ignored pages".to_string(),
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Optional proxy URL (e.g. socks5h://localhost:9150)
    #[serde(default)]
    pub proxy: Option<String>,
}

/// Ignore rules applied when a site is first initialized
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IgnoreConfig {
    /// Path suffixes joined onto the site root; the built-in list when absent
    #[serde(default)]
    pub prefixes: Option<Vec<String>>,
}

/// Search index sink configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IndexConfig {
    /// Path to the SQLite index database
    #[serde(rename = "database-path")]
    pub database_path: PathBuf,
}

fn default_batch_size() -> usize {
    10
}

fn default_max_attempts() -> u32 {
    3
}

fn default_header_rows() -> u32 {
    crate::store::DEFAULT_HEADER_ROWS
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}
