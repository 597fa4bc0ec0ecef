use crate::link::WeightedLink;
use url::Url;

/// Path suffixes excluded from every new site, joined onto the site root
///
/// Translated editions, newsletter and subscription funnels, and legal pages
/// multiply the page count without adding content.
pub const DEFAULT_IGNORE_SUFFIXES: &[&str] = &[
    "/es/",
    "/fr/",
    "/ca/",
    "/newsletters",
    "/subscription",
    "/subscriptions",
    "/privacy",
    "/video",
    "/live",
    "/interactive",
];

/// Ordered set of URL prefixes excluded from crawling
///
/// A URL is ignored when it starts with any of the prefixes. Prefixes are
/// plain strings, so `https://example.test/es/` ignores `https://example.test/es/a`
/// but not `https://example.test/esprit`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreRules {
    prefixes: Vec<String>,
}

impl IgnoreRules {
    /// Creates an empty rule set
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a rule set from absolute prefixes, dropping blanks and duplicates
    pub fn from_prefixes<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut rules = Self::new();
        for prefix in prefixes {
            rules.push(prefix);
        }
        rules
    }

    /// Builds a rule set by joining path suffixes onto a site root
    ///
    /// # Example
    ///
    /// ```
    /// use url::Url;
    /// use crawl_frontier::IgnoreRules;
    ///
    /// let root = Url::parse("https://example.test/").unwrap();
    /// let rules = IgnoreRules::from_suffixes(&root, &["/private"]);
    /// assert!(rules.is_ignored("https://example.test/private/x"));
    /// assert!(!rules.is_ignored("https://example.test/public"));
    /// ```
    pub fn from_suffixes<S: AsRef<str>>(root: &Url, suffixes: &[S]) -> Self {
        let mut rules = Self::new();
        for suffix in suffixes {
            match root.join(suffix.as_ref()) {
                Ok(prefix) => {
                    rules.push(prefix.to_string());
                }
                Err(e) => {
                    tracing::warn!("Skipping ignore suffix {}: {}", suffix.as_ref(), e);
                }
            }
        }
        rules
    }

    /// The built-in rule set for a site
    pub fn defaults_for(root: &Url) -> Self {
        Self::from_suffixes(root, DEFAULT_IGNORE_SUFFIXES)
    }

    /// Restores a rule set from persisted links (the URL column holds the prefix)
    pub fn from_links(links: &[WeightedLink]) -> Self {
        Self::from_prefixes(links.iter().map(|l| l.url.clone()))
    }

    /// Adds a prefix; returns false if it was blank or already present
    pub fn push(&mut self, prefix: impl Into<String>) -> bool {
        let prefix = prefix.into();
        if prefix.trim().is_empty() || self.prefixes.contains(&prefix) {
            return false;
        }
        self.prefixes.push(prefix);
        true
    }

    /// Returns the first prefix the URL starts with
    pub fn matches(&self, url: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .map(String::as_str)
            .find(|prefix| url.starts_with(prefix))
    }

    /// Returns true if any prefix matches the URL
    pub fn is_ignored(&self, url: &str) -> bool {
        self.matches(url).is_some()
    }

    /// Iterates over the prefixes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.prefixes.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    /// Converts the prefixes to rows for the ignore-rules partition
    pub fn to_links(&self) -> Vec<WeightedLink> {
        self.prefixes.iter().map(WeightedLink::new).collect()
    }
}
