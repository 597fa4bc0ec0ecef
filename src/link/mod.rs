//! Link module: frontier records and ignore rules
//!
//! # Components
//!
//! - `WeightedLink`: one frontier record (URL, title, crawl date, weight, notes)
//! - `RawRow`: the untyped persisted fields a `WeightedLink` is decoded from
//! - `IgnoreRules`: URL prefixes that keep pages out of the crawl

mod ignore;
mod weighted_link;

// Re-export main types
pub use ignore::{IgnoreRules, DEFAULT_IGNORE_SUFFIXES};
pub use weighted_link::{RawRow, WeightedLink, DATE_FORMAT, DEFAULT_WEIGHT};
