//! Publish date parsing
//!
//! News sites publish dates in many shapes: RFC 3339 in meta tags, RFC 2822
//! in feeds, bare dates in URLs, and prose like "March 4, 2024" in bylines.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use std::fmt;

/// A recovered publish date
///
/// Dates from structured metadata usually carry a UTC offset; dates taken
/// from a URL or a bare `YYYY-MM-DD` do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishDate {
    Zoned(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

impl PublishDate {
    /// A date with no time of day, at midnight
    pub fn from_date(date: NaiveDate) -> Option<Self> {
        date.and_hms_opt(0, 0, 0).map(Self::Naive)
    }
}

impl fmt::Display for PublishDate {
    /// `YYYY-MM-DD HH:MM:SS`, followed by `+HH:MM` when the offset is known
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zoned(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%:z")),
            Self::Naive(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

const ZONED_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M:%S%:z",
];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y%m%d%H%M%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%Y%m%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%b. %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%A, %B %d, %Y",
];

/// Parses a publish date string in any of the common web formats
///
/// Returns None when no format matches.
///
/// # Examples
///
/// ```
/// use keystone_crawler::extract::parse_date;
///
/// let zoned = parse_date("2024-03-04T09:15:00-05:00").unwrap();
/// assert_eq!(zoned.to_string(), "2024-03-04 09:15:00-05:00");
///
/// let naive = parse_date("March 4, 2024").unwrap();
/// assert_eq!(naive.to_string(), "2024-03-04 00:00:00");
///
/// assert!(parse_date("yesterday").is_none());
/// ```
pub fn parse_date(raw: &str) -> Option<PublishDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(PublishDate::Zoned(dt));
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(PublishDate::Zoned(dt));
    }

    for format in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(PublishDate::Zoned(dt));
        }
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(PublishDate::Naive(dt));
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return PublishDate::from_date(date);
        }
    }

    None
}
