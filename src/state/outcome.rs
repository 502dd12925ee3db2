//! Outcome definitions for tracking crawl progress
//!
//! Every request the crawl considers ends in exactly one of these outcomes,
//! whether it was filtered before fetching or completed by a worker.
use std::fmt;

/// Represents how a request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RequestOutcome {
    // ===== Success Outcomes =====
    /// A discovery page was fetched and its links emitted
    Crawled,

    /// An article was extracted and written to the output file
    ArticleWritten,

    // ===== Expected Drops =====
    /// The page had no detectable publish date
    NotArticle,

    // ===== Filtered Before Fetching =====
    /// The URL's domain is not in the allowed-domain set
    Offsite,

    /// The request is deeper than the configured depth limit
    DepthExceeded,

    /// The same URL was already requested with the same handler
    Duplicate,

    // ===== Error Outcomes =====
    /// The response was not HTML
    ContentMismatch,

    /// The server answered with an error status
    HttpError,

    /// A redirect pointed outside the allowed domains
    RedirectBlocked,

    /// Timeout, connection failure, or unreadable body
    NetworkError,

    /// The article extractor failed (its own download or parsing)
    ExtractionFailed,

    /// The article could not be appended to the output file
    OutputFailed,

    /// The worker task panicked or was cancelled
    WorkerFailed,
}

impl RequestOutcome {
    /// Returns true if this outcome was decided without a network request
    pub fn is_filtered(&self) -> bool {
        matches!(self, Self::Offsite | Self::DepthExceeded | Self::Duplicate)
    }

    /// Returns true if this represents an error
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::ContentMismatch
                | Self::HttpError
                | Self::RedirectBlocked
                | Self::NetworkError
                | Self::ExtractionFailed
                | Self::OutputFailed
                | Self::WorkerFailed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Crawled => "crawled",
            Self::ArticleWritten => "article_written",
            Self::NotArticle => "not_article",
            Self::Offsite => "offsite",
            Self::DepthExceeded => "depth_exceeded",
            Self::Duplicate => "duplicate",
            Self::ContentMismatch => "content_mismatch",
            Self::HttpError => "http_error",
            Self::RedirectBlocked => "redirect_blocked",
            Self::NetworkError => "network_error",
            Self::ExtractionFailed => "extraction_failed",
            Self::OutputFailed => "output_failed",
            Self::WorkerFailed => "worker_failed",
        }
    }
}

impl fmt::Display for RequestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
