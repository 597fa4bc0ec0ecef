//! URL handling module
//!
//! This module provides URL canonicalization, site identifier derivation and
//! the stable URL hash used for page file names and index ids.

mod domain;
mod hash;
mod normalize;

// Re-export main functions
pub use domain::{same_site, site_id, site_root};
pub use hash::url_hash;
pub use normalize::canonicalize;
