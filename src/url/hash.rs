use crc32fast::Hasher as Crc32;
use sha2::{Digest, Sha256};

/// Computes the stable page id of a canonical URL
///
/// The id is the CRC-32 of the SHA-256 digest of the URL bytes. It names saved
/// page files (`<hash>.html`) and keys the search index, so it must never
/// change for a given URL string.
///
/// # Examples
///
/// ```
/// use crawl_frontier::url::url_hash;
///
/// assert_eq!(url_hash("https://example.test/"), url_hash("https://example.test/"));
/// assert_ne!(url_hash("https://example.test/"), url_hash("https://example.test/a"));
/// ```
pub fn url_hash(url: &str) -> u32 {
    let digest = Sha256::digest(url.as_bytes());
    let mut crc = Crc32::new();
    crc.update(&digest);
    crc.finalize()
}
