use std::fmt;
use url::Url;

/// What a worker does with a fetched page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// Extract links and pagination, producing follow-up requests
    Discover,
    /// Treat the page as an article candidate
    Extract,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discover => write!(f, "discover"),
            Self::Extract => write!(f, "extract"),
        }
    }
}

/// A URL to fetch, the handler for its response, and its distance from a seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: Url,
    pub kind: RequestKind,
    pub depth: u32,
}

impl FetchRequest {
    /// A seed request: link discovery at depth 0
    pub fn seed(url: Url) -> Self {
        Self {
            url,
            kind: RequestKind::Discover,
            depth: 0,
        }
    }

    /// A request found on the page this request fetched, one level deeper
    pub fn follow_up(&self, url: Url, kind: RequestKind) -> Self {
        Self {
            url,
            kind,
            depth: self.depth + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_request() {
        let request = FetchRequest::seed(Url::parse("https://example.com/").unwrap());
        assert_eq!(request.kind, RequestKind::Discover);
        assert_eq!(request.depth, 0);
    }

    #[test]
    fn test_follow_up_increments_depth() {
        let seed = FetchRequest::seed(Url::parse("https://example.com/").unwrap());
        let article = seed.follow_up(
            Url::parse("https://example.com/story").unwrap(),
            RequestKind::Extract,
        );
        let next = article.follow_up(
            Url::parse("https://example.com/page/2").unwrap(),
            RequestKind::Discover,
        );

        assert_eq!(article.depth, 1);
        assert_eq!(article.kind, RequestKind::Extract);
        assert_eq!(next.depth, 2);
    }
}
