//! Output module for crawled pages and reports
//!
//! This module handles:
//! - Saving raw page bodies under the storage base path
//! - Upserting pages into a SQLite search index
//! - Reporting frontier statistics

mod index;
mod pages;
pub mod stats;
mod traits;

pub use index::{SearchHit, SearchIndex};
pub use pages::PageSaver;
pub use stats::{load_statistics, print_statistics, FrontierStatistics};
pub use traits::{OutputError, OutputResult, PageSink, ProcessedPage};
