//! Store module for persisting frontier state
//!
//! A store holds one site as four named partitions of rows:
//! - crawled pages (append-only log)
//! - pages to crawl (full snapshot, rewritten on change)
//! - ignore rules (full snapshot)
//! - ignored pages (append-only log)
//!
//! Each partition starts with a fixed number of header rows that data writes
//! never touch.

mod schema;
mod sqlite;
mod traits;

pub use sqlite::{SqliteStore, STORE_FILE_EXT};
pub use traits::{Partition, PartitionStore, StoreError, StoreResult, StoredPartitions};

use crate::config::{PartitionNames, StorageConfig};

/// Default number of reserved header rows per partition
pub const DEFAULT_HEADER_ROWS: u32 = 3;

/// Partition names and header size of a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    pub header_rows: u32,
    pub names: PartitionNames,
}

impl StoreLayout {
    /// Returns the configured name of a partition
    pub fn name(&self, partition: Partition) -> &str {
        match partition {
            Partition::Crawled => &self.names.crawled,
            Partition::ToCrawl => &self.names.to_crawl,
            Partition::IgnoreRules => &self.names.ignore_rules,
            Partition::Ignored => &self.names.ignored,
        }
    }
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self {
            header_rows: DEFAULT_HEADER_ROWS,
            names: PartitionNames::default(),
        }
    }
}

impl From<&StorageConfig> for StoreLayout {
    fn from(config: &StorageConfig) -> Self {
        Self {
            header_rows: config.header_rows,
            names: config.partitions.clone(),
        }
    }
}
