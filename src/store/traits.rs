//! Storage traits and error types
//!
//! This module defines the partition-oriented interface the frontier persists
//! through, and the associated error types.

use crate::link::WeightedLink;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store has not been opened or created")]
    NotCreated,

    #[error("Store belongs to site {found}, expected {expected}")]
    SiteMismatch { expected: String, found: String },

    #[error("Unknown partition: {0}")]
    UnknownPartition(String),
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// The four named partitions of a site store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    /// Pages successfully fetched (append-only log)
    Crawled,

    /// Pages waiting to be fetched (full snapshot)
    ToCrawl,

    /// URL prefixes excluded from the crawl (full snapshot)
    IgnoreRules,

    /// Pages excluded by an ignore rule (append-only log)
    Ignored,
}

impl Partition {
    /// All partitions, in the order they are created
    pub const ALL: [Partition; 4] = [
        Partition::Crawled,
        Partition::ToCrawl,
        Partition::IgnoreRules,
        Partition::Ignored,
    ];

    /// Returns true for partitions that are only ever appended to
    pub fn is_append_only(&self) -> bool {
        matches!(self, Self::Crawled | Self::Ignored)
    }
}

/// Rows loaded from every partition of an existing store, in stored order
#[derive(Debug, Clone, Default)]
pub struct StoredPartitions {
    pub to_crawl: Vec<WeightedLink>,
    pub crawled: Vec<WeightedLink>,
    pub ignore_rules: Vec<WeightedLink>,
    pub ignored: Vec<WeightedLink>,
}

/// Trait for durable frontier storage backends
///
/// A store holds one site. Writes may be buffered until `flush`; callers must
/// not assume durable state matches memory before `flush` returns `Ok`.
/// Implementations assume a single exclusive owner.
pub trait PartitionStore {
    /// Loads all partitions of the store for `site`
    ///
    /// # Returns
    ///
    /// * `Ok(Some(partitions))` - The store exists and was loaded
    /// * `Ok(None)` - No store exists yet for this site
    /// * `Err(StoreError)` - The store exists but could not be read
    fn open(&mut self, site: &str) -> StoreResult<Option<StoredPartitions>>;

    /// Initializes an empty store with the four partitions and persists it
    fn create(&mut self, site: &str) -> StoreResult<()>;

    /// Appends rows to a partition without touching existing rows
    fn write_append(&mut self, partition: Partition, links: &[WeightedLink]) -> StoreResult<()>;

    /// Replaces all data rows of a partition, keeping its header rows
    fn write_replace(&mut self, partition: Partition, links: &[WeightedLink]) -> StoreResult<()>;

    /// Durably commits all pending writes
    fn flush(&mut self) -> StoreResult<()>;

    /// Counts the data rows of a partition
    fn partition_len(&self, partition: Partition) -> StoreResult<u64>;
}
