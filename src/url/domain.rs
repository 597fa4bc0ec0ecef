use crate::UrlError;
use url::Url;

/// Derives the site identifier from a URL
///
/// The identifier is the lower-cased host and keys the durable store of a
/// crawled site, so every seed of one crawl must produce the same value.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use crawl_frontier::url::site_id;
///
/// let url = Url::parse("https://WWW.Example.test/path").unwrap();
/// assert_eq!(site_id(&url).unwrap(), "www.example.test");
/// ```
pub fn site_id(url: &Url) -> Result<String, UrlError> {
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_lowercase())
        .ok_or_else(|| UrlError::MissingHost(url.to_string()))
}

/// Returns the root of the site a URL belongs to (`scheme://host[:port]/`)
///
/// Ignore-rule suffixes are joined onto this root.
pub fn site_root(url: &Url) -> Url {
    let mut root = url.clone();
    root.set_path("/");
    root.set_query(None);
    root.set_fragment(None);
    root
}

/// Checks whether two URLs point at the same site (same scheme, host and port)
pub fn same_site(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme()
        && a.host_str() == b.host_str()
        && a.port_or_known_default() == b.port_or_known_default()
}
