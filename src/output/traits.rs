//! Output sink trait and types
//!
//! This module defines the trait interface for destinations that receive
//! every successfully crawled page, and the associated error types.

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// A crawled page handed to the sinks
#[derive(Debug, Clone, Copy)]
pub struct ProcessedPage<'a> {
    /// Canonical URL the page was queued under
    pub url: &'a str,

    /// Page title, empty when the page has none
    pub title: &'a str,

    /// Raw page body
    pub body: &'a str,
}

/// Trait for page destinations
///
/// Recording the same URL twice must leave one entry (idempotent upsert).
pub trait PageSink {
    /// Short name used in log messages
    fn name(&self) -> &'static str;

    /// Records one crawled page
    fn record_page(&mut self, page: &ProcessedPage<'_>) -> OutputResult<()>;
}
