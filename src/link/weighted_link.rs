/// Frontier record definitions
///
/// A `WeightedLink` is one row of any frontier partition: the page URL plus the
/// metadata recorded when it was crawled.
use chrono::NaiveDateTime;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Weight given to every newly discovered link
pub const DEFAULT_WEIGHT: f64 = 0.1;

/// Format of the persisted Date column
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single frontier record
///
/// Identity is the URL alone: two links with the same URL are equal and hash
/// the same regardless of title, date, weight or notes.
#[derive(Debug, Clone)]
pub struct WeightedLink {
    /// Canonical absolute URL, never empty
    pub url: String,

    /// Page title, empty until the page is crawled
    pub title: String,

    /// When the page was crawled
    pub crawled_at: Option<NaiveDateTime>,

    /// Priority weight
    pub weight: f64,

    /// Free-text notes
    pub notes: String,
}

/// Raw persisted fields of a link, any of which may be missing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pub url: Option<String>,
    pub title: Option<String>,
    pub date: Option<String>,
    pub weight: Option<f64>,
    pub notes: Option<String>,
}

impl WeightedLink {
    /// Creates a link with default weight and empty metadata
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            crawled_at: None,
            weight: DEFAULT_WEIGHT,
            notes: String::new(),
        }
    }

    /// Creates the record of a crawled page
    pub fn crawled(url: impl Into<String>, title: impl Into<String>, at: NaiveDateTime) -> Self {
        Self {
            title: title.into(),
            crawled_at: Some(at),
            ..Self::new(url)
        }
    }

    /// Builds a link from persisted fields
    ///
    /// Missing, empty or unparseable optional fields fall back to their
    /// defaults. Returns `None` only when the URL itself is missing or blank.
    pub fn from_row(row: RawRow) -> Option<Self> {
        let url = row.url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())?;

        let crawled_at = row
            .date
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .and_then(|d| NaiveDateTime::parse_from_str(d, DATE_FORMAT).ok());

        let weight = row
            .weight
            .filter(|w| w.is_finite())
            .unwrap_or(DEFAULT_WEIGHT);

        Some(Self {
            url,
            title: row.title.unwrap_or_default(),
            crawled_at,
            weight,
            notes: row.notes.unwrap_or_default(),
        })
    }

    /// Returns the persisted fields of this link
    pub fn to_row(&self) -> RawRow {
        RawRow {
            url: Some(self.url.clone()),
            title: Some(self.title.clone()),
            date: Some(self.date_string()),
            weight: Some(self.weight),
            notes: Some(self.notes.clone()),
        }
    }

    /// Formats the crawl date for the Date column (empty when unknown)
    pub fn date_string(&self) -> String {
        self.crawled_at
            .map(|at| at.format(DATE_FORMAT).to_string())
            .unwrap_or_default()
    }
}

impl PartialEq for WeightedLink {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for WeightedLink {}

impl Hash for WeightedLink {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}

impl fmt::Display for WeightedLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashSet;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 1, 8)
            .unwrap()
            .and_hms_opt(9, 26, 59)
            .unwrap()
    }

    #[test]
    fn test_new_uses_defaults() {
        let link = WeightedLink::new("https://example.test/");
        assert_eq!(link.title, "");
        assert_eq!(link.crawled_at, None);
        assert_eq!(link.weight, DEFAULT_WEIGHT);
        assert_eq!(link.notes, "");
    }

    #[test]
    fn test_equality_by_url_only() {
        let a = WeightedLink::new("https://example.test/a");
        let mut b = WeightedLink::crawled("https://example.test/a", "Title", at());
        b.weight = 42.0;
        b.notes = "different".to_string();
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(!set.insert(b));
    }

    #[test]
    fn test_different_urls_not_equal() {
        assert_ne!(
            WeightedLink::new("https://example.test/a"),
            WeightedLink::new("https://example.test/b")
        );
    }

    #[test]
    fn test_from_row_all_fields() {
        let link = WeightedLink::from_row(RawRow {
            url: Some("https://example.test/".to_string()),
            title: Some("Home".to_string()),
            date: Some("2021-01-08 09:26:59".to_string()),
            weight: Some(12.0),
            notes: Some("seed".to_string()),
        })
        .unwrap();

        assert_eq!(link.title, "Home");
        assert_eq!(link.crawled_at, Some(at()));
        assert_eq!(link.weight, 12.0);
        assert_eq!(link.notes, "seed");
    }

    #[test]
    fn test_from_row_tolerates_missing_optionals() {
        let link = WeightedLink::from_row(RawRow {
            url: Some("https://example.test/".to_string()),
            ..RawRow::default()
        })
        .unwrap();

        assert_eq!(link, WeightedLink::new("https://example.test/"));
        assert_eq!(link.weight, DEFAULT_WEIGHT);
        assert_eq!(link.crawled_at, None);
    }

    #[test]
    fn test_from_row_tolerates_garbage_date_and_weight() {
        let link = WeightedLink::from_row(RawRow {
            url: Some("https://example.test/".to_string()),
            date: Some("yesterday".to_string()),
            weight: Some(f64::NAN),
            ..RawRow::default()
        })
        .unwrap();

        assert_eq!(link.crawled_at, None);
        assert_eq!(link.weight, DEFAULT_WEIGHT);
    }

    #[test]
    fn test_from_row_requires_url() {
        assert!(WeightedLink::from_row(RawRow::default()).is_none());
        assert!(WeightedLink::from_row(RawRow {
            url: Some("   ".to_string()),
            ..RawRow::default()
        })
        .is_none());
    }

    #[test]
    fn test_to_row_formats_date() {
        let link = WeightedLink::crawled("https://example.test/", "Home", at());
        let row = link.to_row();
        assert_eq!(row.date.as_deref(), Some("2021-01-08 09:26:59"));
        assert_eq!(WeightedLink::from_row(row).unwrap().crawled_at, Some(at()));
    }

    #[test]
    fn test_date_string_empty_when_unknown() {
        assert_eq!(WeightedLink::new("https://example.test/").date_string(), "");
    }
}
