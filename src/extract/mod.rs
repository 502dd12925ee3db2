//! Article extraction
//!
//! Turns an article page into a title, body text, and publish date. The
//! crawler talks to extraction only through the [`ArticleExtractor`] trait;
//! [`HtmlArticleExtractor`] is the heuristic implementation used by default.

mod content;
mod date;
mod metadata;

use crate::crawler::{fetch_url, FetchResult};
use reqwest::Client;
use scraper::Html;
use std::future::Future;
use thiserror::Error;
use url::Url;

pub use content::extract_body;
pub use date::{parse_date, PublishDate};
pub use metadata::{extract_publish_date, extract_title, url_date};

/// Errors raised while extracting an article
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to download {url}: {reason}")]
    Download { url: String, reason: String },
}

pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

/// Fields recovered from an article page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedArticle {
    /// Headline, when one could be found
    pub title: Option<String>,
    /// Body paragraphs separated by blank lines; may be empty
    pub text: String,
    pub publish_date: PublishDate,
}

/// Capability interface for article extraction
///
/// `crawled_body` is the HTML the crawler fetched for `url`. Implementations
/// may parse it directly or download the page themselves.
///
/// Returns `Ok(None)` when the page has no publish date and therefore is not
/// treated as an article.
pub trait ArticleExtractor: Send + Sync + 'static {
    fn extract(
        &self,
        url: &Url,
        crawled_body: &str,
    ) -> impl Future<Output = ExtractResult<Option<ExtractedArticle>>> + Send;
}

/// Heuristic extractor over HTML metadata and paragraph text
#[derive(Debug, Clone)]
pub struct HtmlArticleExtractor {
    client: Client,
    reuse_crawl_response: bool,
}

impl HtmlArticleExtractor {
    /// Creates an extractor that downloads each article itself with `client`
    /// unless `reuse_crawl_response` is set
    pub fn new(client: Client, reuse_crawl_response: bool) -> Self {
        Self {
            client,
            reuse_crawl_response,
        }
    }
}

impl ArticleExtractor for HtmlArticleExtractor {
    async fn extract(
        &self,
        url: &Url,
        crawled_body: &str,
    ) -> ExtractResult<Option<ExtractedArticle>> {
        if self.reuse_crawl_response {
            return Ok(parse_article(crawled_body, url));
        }

        match fetch_url(&self.client, url).await {
            FetchResult::Success { body, .. } => Ok(parse_article(&body, url)),
            other => Err(ExtractError::Download {
                url: url.to_string(),
                reason: other.describe(),
            }),
        }
    }
}

/// Parses an article page
///
/// Returns None when no publish date can be found.
///
/// # Examples
///
/// ```
/// use keystone_crawler::extract::parse_article;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/2024/05/01/fair-opens").unwrap();
/// let html = "<html><head><title>County fair opens | Gazette</title></head>\
///             <body><article><p>The county fair opened Wednesday with record crowds.</p></article></body></html>";
///
/// let article = parse_article(html, &url).unwrap();
/// assert_eq!(article.title.as_deref(), Some("County fair opens"));
/// assert_eq!(article.publish_date.to_string(), "2024-05-01 00:00:00");
/// ```
pub fn parse_article(html: &str, url: &Url) -> Option<ExtractedArticle> {
    let document = Html::parse_document(html);

    let publish_date = extract_publish_date(&document, url)?;

    Some(ExtractedArticle {
        title: extract_title(&document),
        text: extract_body(&document),
        publish_date,
    })
}
