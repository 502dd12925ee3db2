//! Link discovery on listing pages
//!
//! Every anchor on a fetched page is a candidate article. The anchor matching
//! the configured "next page" selector, if any, continues the listing.

use scraper::{Html, Selector};
use url::Url;

/// Links found on a discovery page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredLinks {
    /// Absolute URLs of every `<a href>`, in document order
    pub articles: Vec<Url>,

    /// The pagination target, when the page has one
    pub next_page: Option<Url>,
}

/// Extracts article candidates and the next-page link from a page
///
/// Relative and protocol-relative hrefs are resolved against `page_url`,
/// which should be the final URL after redirects. Only the first anchor
/// matching `next_page` is used.
///
/// # Example
///
/// ```
/// use keystone_crawler::config::parse_selector;
/// use keystone_crawler::crawler::discover_links;
/// use url::Url;
///
/// let html = r#"<a href="/a1">One</a> <a class="next" href="?page=2">Next</a>"#;
/// let page = Url::parse("https://example.com/news/").unwrap();
/// let next = parse_selector("a.next").unwrap();
///
/// let links = discover_links(html, &page, &next);
/// assert_eq!(links.articles.len(), 2);
/// assert_eq!(links.next_page.unwrap().as_str(), "https://example.com/news/?page=2");
/// ```
pub fn discover_links(html: &str, page_url: &Url, next_page: &Selector) -> DiscoveredLinks {
    let document = Html::parse_document(html);

    let articles = match Selector::parse("a[href]") {
        Ok(anchor) => document
            .select(&anchor)
            .filter_map(|element| element.value().attr("href"))
            .filter_map(|href| resolve_link(href, page_url))
            .collect(),
        Err(_) => Vec::new(),
    };

    let next_page = document
        .select(next_page)
        .filter_map(|element| element.value().attr("href"))
        .find_map(|href| resolve_link(href, page_url));

    DiscoveredLinks {
        articles,
        next_page,
    }
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
///
/// Fragments are stripped from the result.
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let mut absolute = base_url.join(href).ok()?;
    if absolute.scheme() != "http" && absolute.scheme() != "https" {
        return None;
    }

    absolute.set_fragment(None);
    Some(absolute)
}
