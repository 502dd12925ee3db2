//! Headline and publish date recovery from page metadata

use crate::extract::date::{parse_date, PublishDate};
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use std::sync::OnceLock;
use url::Url;

/// Meta tag names and properties that carry a publish date, lowercase
const PUBLISH_DATE_META: &[&str] = &[
    "article:published_time",
    "article:published",
    "og:published_time",
    "rnews:datepublished",
    "datepublished",
    "originalpublicationdate",
    "article_date_original",
    "publication_date",
    "publish-date",
    "publish_date",
    "publishdate",
    "pubdate",
    "sailthru.date",
    "parsely-pub-date",
    "dc.date.issued",
    "dc.date",
    "date",
];

/// Separators between a headline and the site name in `<title>`
const TITLE_SEPARATORS: &[&str] = &[" | ", " - ", " \u{2013} ", " \u{2014} ", " :: ", " \u{00bb} "];

/// Extracts the article headline
///
/// Preference order: `og:title`, the `<title>` element with the site name
/// segment removed, then the first `<h1>`.
pub fn extract_title(document: &Html) -> Option<String> {
    meta_content(document, &["og:title", "twitter:title"])
        .or_else(|| document_title(document))
        .or_else(|| first_text(document, "h1"))
}

/// Extracts the publish date
///
/// Structured sources are tried first: JSON-LD `datePublished`, publish-date
/// meta tags, `itemprop="datePublished"`, and `<time datetime>`. A
/// `/YYYY/MM/DD/` pattern in the URL is the last resort.
pub fn extract_publish_date(document: &Html, url: &Url) -> Option<PublishDate> {
    json_ld_date(document)
        .or_else(|| meta_date(document))
        .or_else(|| itemprop_date(document))
        .or_else(|| time_element_date(document))
        .or_else(|| url_date(url))
}

/// `/YYYY/MM/DD/` and similar separators in an article path
const URL_DATE_PATTERN: &str =
    r"/((?:19|20)\d{2})[/\-_](0?[1-9]|1[0-2])[/\-_](0?[1-9]|[12]\d|3[01])(?:[/\-_.]|$)";

/// Looks for a publish date in the URL path
///
/// # Examples
///
/// ```
/// use keystone_crawler::extract::url_date;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/news/2024/03/04/council-vote/").unwrap();
/// assert_eq!(url_date(&url).unwrap().to_string(), "2024-03-04 00:00:00");
/// ```
pub fn url_date(url: &Url) -> Option<PublishDate> {
    static URL_DATE: OnceLock<Option<Regex>> = OnceLock::new();
    let pattern = URL_DATE
        .get_or_init(|| Regex::new(URL_DATE_PATTERN).ok())
        .as_ref()?;

    let captures = pattern.captures(url.path())?;
    let year = captures[1].parse().ok()?;
    let month = captures[2].parse().ok()?;
    let day = captures[3].parse().ok()?;
    let date = chrono::NaiveDate::from_ymd_opt(year, month, day)?;
    PublishDate::from_date(date)
}

fn document_title(document: &Html) -> Option<String> {
    let raw = first_text(document, "title")?;

    let headline = TITLE_SEPARATORS
        .iter()
        .find(|sep| raw.contains(*sep))
        .map(|sep| {
            // Longest segment wins; the earliest one on a tie
            raw.split(*sep)
                .map(str::trim)
                .fold("", |best, segment| {
                    if segment.chars().count() > best.chars().count() {
                        segment
                    } else {
                        best
                    }
                })
                .to_string()
        })
        .unwrap_or(raw);

    Some(headline).filter(|s| !s.is_empty())
}

fn first_text(document: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;

    document
        .select(&selector)
        .next()
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .filter(|s| !s.is_empty())
}

/// Returns the content of the first meta tag whose name, property, or
/// itemprop matches one of `keys` (compared lowercase), in `keys` order
fn meta_content(document: &Html, keys: &[&str]) -> Option<String> {
    let selector = Selector::parse("meta[content]").ok()?;
    let metas: Vec<_> = document.select(&selector).collect();

    keys.iter().find_map(|key| {
        metas.iter().find_map(|meta| {
            let element = meta.value();
            let matches = ["property", "name", "itemprop"]
                .iter()
                .filter_map(|attr| element.attr(attr))
                .any(|value| value.trim().eq_ignore_ascii_case(key));

            if !matches {
                return None;
            }

            element
                .attr("content")
                .map(collapse_whitespace)
                .filter(|s| !s.is_empty())
        })
    })
}

fn meta_date(document: &Html) -> Option<PublishDate> {
    let selector = Selector::parse("meta[content]").ok()?;
    let metas: Vec<_> = document.select(&selector).collect();

    PUBLISH_DATE_META.iter().find_map(|key| {
        metas.iter().find_map(|meta| {
            let element = meta.value();
            let matches = ["property", "name", "itemprop", "http-equiv"]
                .iter()
                .filter_map(|attr| element.attr(attr))
                .any(|value| value.trim().eq_ignore_ascii_case(key));

            if matches {
                element.attr("content").and_then(parse_date)
            } else {
                None
            }
        })
    })
}

fn json_ld_date(document: &Html) -> Option<PublishDate> {
    let selector = Selector::parse(r#"script[type="application/ld+json"]"#).ok()?;

    document.select(&selector).find_map(|script| {
        let raw = script.text().collect::<String>();
        let value: Value = serde_json::from_str(raw.trim()).ok()?;
        find_date_published(&value).and_then(parse_date)
    })
}

/// Walks a JSON-LD value (objects, arrays, `@graph`) for `datePublished`
fn find_date_published(value: &Value) -> Option<&str> {
    match value {
        Value::Object(map) => map
            .get("datePublished")
            .and_then(Value::as_str)
            .or_else(|| map.values().find_map(find_date_published)),
        Value::Array(items) => items.iter().find_map(find_date_published),
        _ => None,
    }
}

fn itemprop_date(document: &Html) -> Option<PublishDate> {
    let selector = Selector::parse(r#"[itemprop="datePublished"]"#).ok()?;

    document.select(&selector).find_map(|element| {
        let value = element.value();
        value
            .attr("datetime")
            .or_else(|| value.attr("content"))
            .and_then(parse_date)
            .or_else(|| parse_date(&element.text().collect::<String>()))
    })
}

fn time_element_date(document: &Html) -> Option<PublishDate> {
    let selector = Selector::parse("time[datetime]").ok()?;

    document
        .select(&selector)
        .find_map(|element| element.value().attr("datetime").and_then(parse_date))
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
