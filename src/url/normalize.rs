use crate::UrlError;
use url::Url;

/// Brings a URL into the canonical absolute form used as frontier identity
///
/// # Canonicalization Steps
///
/// 1. Trim surrounding whitespace and parse; reject if malformed or relative
/// 2. Accept only `http` and `https` schemes
/// 3. Require a host (the host is lower-cased by the parser)
/// 4. Remove the fragment (everything after #)
///
/// Paths, query strings and trailing slashes are kept as written so that
/// ignore-rule prefixes match exactly what the site links to.
///
/// # Examples
///
/// ```
/// use crawl_frontier::url::canonicalize;
///
/// let url = canonicalize("https://EXAMPLE.test/a?b=1#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.test/a?b=1");
/// ```
pub fn canonicalize(raw: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(raw.trim()).map_err(|e| UrlError::Parse(format!("{raw}: {e}")))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost(raw.to_string()));
    }

    url.set_fragment(None);

    Ok(url)
}
