//! Frontier module: the crawl state machine
//!
//! A URL moves `Unseen -> Pending -> Done` or `Unseen -> Ignored`; both end
//! states are terminal, so rediscovering a crawled or ignored URL never
//! queues it again. The frontier owns its collections and treats the store
//! as a durable mirror only.
//!
//! # Example
//!
//! ```no_run
//! use crawl_frontier::store::{SqliteStore, StoreLayout};
//! use crawl_frontier::Frontier;
//!
//! let store = SqliteStore::new("/tmp/frontier", StoreLayout::default());
//! let mut frontier = Frontier::initialize(&["https://example.test/"], store).unwrap();
//! let batch: Vec<String> = frontier.next_batch(10).map(String::from).collect();
//! for url in &batch {
//!     frontier
//!         .complete(url, "Title", chrono::Local::now().naive_local())
//!         .unwrap();
//! }
//! ```

mod machine;
mod queue;
mod snapshot;

pub use machine::{ExtractSummary, Frontier};
pub use snapshot::FrontierSnapshot;

use crate::store::StoreError;
use thiserror::Error;

/// Errors raised by frontier operations
#[derive(Debug, Error)]
pub enum FrontierError {
    #[error("No seed URLs given")]
    NoSeeds,

    #[error("Invalid seed URL: {0}")]
    InvalidSeed(String),

    #[error("Seed {seed} is not on site {site}")]
    SeedOutsideSite { seed: String, site: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for frontier operations
pub type FrontierResult<T> = Result<T, FrontierError>;
