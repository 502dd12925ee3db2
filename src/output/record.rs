use crate::extract::{ExtractedArticle, PublishDate};
use url::Url;

/// Title written when a page has no usable headline
pub const UNTITLED: &str = "untitled";

/// One row of the output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    pub title: String,
    pub content: String,
    pub publish_date: PublishDate,
    pub url: String,
}

impl ArticleRecord {
    /// Builds the record for an extracted article
    ///
    /// A missing or blank title becomes `"untitled"`.
    pub fn from_extracted(article: ExtractedArticle, url: &Url) -> Self {
        let title = article
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNTITLED.to_string());

        Self {
            title,
            content: article.text,
            publish_date: article.publish_date,
            url: url.to_string(),
        }
    }

    /// The row fields in header order
    pub fn to_row(&self) -> [String; 4] {
        [
            self.title.clone(),
            self.content.clone(),
            self.publish_date.to_string(),
            self.url.clone(),
        ]
    }
}
