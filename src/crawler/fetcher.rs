//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent and timeout
//! - A redirect policy that refuses to leave the allowed domains
//! - Content-Type checks so only HTML reaches the parsers
//! - Bounded retry for transient failures
//! - Error classification

use crate::config::Config;
use crate::crawler::scheduler::Scheduler;
use crate::state::RequestOutcome;
use crate::url::AllowedDomains;
use reqwest::{header, redirect::Policy, Client, StatusCode};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Statuses worth another attempt
const RETRY_STATUS_CODES: &[u16] = &[408, 429, 500, 502, 503, 504, 522, 524];

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched an HTML page
    Success {
        /// Final URL after redirects
        final_url: Url,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
        /// Time from sending the request to reading the body
        latency: Duration,
    },

    /// Page is not HTML (Content-Type mismatch)
    ContentMismatch {
        /// The actual Content-Type received
        content_type: String,
        latency: Duration,
    },

    /// The server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
        /// Whether another attempt may succeed
        retryable: bool,
        latency: Duration,
    },

    /// A redirect pointed outside the allowed domains and was not followed
    RedirectBlocked {
        /// The refused `Location` target, when present
        location: Option<String>,
    },

    /// Network error (connection refused, timeout, too many redirects, etc.)
    NetworkError {
        /// Error description
        error: String,
        /// Whether another attempt may succeed
        retryable: bool,
    },
}

impl FetchResult {
    /// Returns true if another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::HttpError { retryable, .. } | Self::NetworkError { retryable, .. } => *retryable,
            _ => false,
        }
    }

    /// The response latency, when a response arrived at all
    pub fn latency(&self) -> Option<Duration> {
        match self {
            Self::Success { latency, .. }
            | Self::ContentMismatch { latency, .. }
            | Self::HttpError { latency, .. } => Some(*latency),
            Self::RedirectBlocked { .. } | Self::NetworkError { .. } => None,
        }
    }

    /// The outcome this result stands for when it ends a request
    pub fn outcome(&self) -> RequestOutcome {
        match self {
            Self::Success { .. } => RequestOutcome::Crawled,
            Self::ContentMismatch { .. } => RequestOutcome::ContentMismatch,
            Self::HttpError { .. } => RequestOutcome::HttpError,
            Self::RedirectBlocked { .. } => RequestOutcome::RedirectBlocked,
            Self::NetworkError { .. } => RequestOutcome::NetworkError,
        }
    }

    /// Short human-readable description for logs and error messages
    pub fn describe(&self) -> String {
        match self {
            Self::Success { status_code, .. } => format!("HTTP {}", status_code),
            Self::ContentMismatch { content_type, .. } => {
                format!("not HTML (Content-Type: {})", content_type)
            }
            Self::HttpError { status_code, .. } => format!("HTTP {}", status_code),
            Self::RedirectBlocked { location } => match location {
                Some(target) => format!("offsite redirect to {}", target),
                None => "offsite redirect".to_string(),
            },
            Self::NetworkError { error, .. } => error.clone(),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed up to `max-redirects` hops. A hop whose target is
/// outside `allowed` is not followed; the 3xx response is returned as is and
/// surfaces as [`FetchResult::RedirectBlocked`].
///
/// # Example
///
/// ```no_run
/// use keystone_crawler::config::Config;
/// use keystone_crawler::crawler::build_http_client;
/// use keystone_crawler::url::AllowedDomains;
/// use std::sync::Arc;
///
/// let config = Config::default();
/// let allowed = Arc::new(AllowedDomains::from_seeds(&config.seeds));
/// let client = build_http_client(&config, allowed).unwrap();
/// ```
pub fn build_http_client(
    config: &Config,
    allowed: Arc<AllowedDomains>,
) -> Result<Client, reqwest::Error> {
    let max_redirects = config.crawler.max_redirects;

    let policy = Policy::custom(move |attempt| {
        if attempt.previous().len() > max_redirects {
            attempt.error("too many redirects")
        } else if !allowed.is_allowed(attempt.url()) {
            attempt.stop()
        } else {
            attempt.follow()
        }
    });

    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(config.crawler.request_timeout())
        .connect_timeout(config.crawler.request_timeout().min(Duration::from_secs(30)))
        .redirect(policy)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL once and classifies the response
pub async fn fetch_url(client: &Client, url: &Url) -> FetchResult {
    let started = Instant::now();

    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => return classify_error(&e),
    };

    let status = response.status();

    if status.is_redirection() {
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        return FetchResult::RedirectBlocked { location };
    }

    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
            retryable: is_retryable_status(status),
            latency: started.elapsed(),
        };
    }

    // Check Content-Type
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !is_html_content_type(&content_type) {
        return FetchResult::ContentMismatch {
            content_type,
            latency: started.elapsed(),
        };
    }

    let final_url = response.url().clone();

    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            body,
            latency: started.elapsed(),
        },
        Err(e) => classify_error(&e),
    }
}

/// Fetches a URL, retrying transient failures up to `retry_times` extra times
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 408, 429, 5xx gateway errors | Retry after the domain delay |
/// | Timeout, connection failure | Retry after the domain delay |
/// | Other HTTP errors (404, 403, ...) | Give up |
/// | Non-HTML content | Give up |
/// | Offsite redirect, redirect loop | Give up |
///
/// Every attempt's latency is fed to the scheduler's auto-throttle, and each
/// retry waits for the next request slot of `domain`, so retries obey the
/// same spacing as first attempts.
pub async fn fetch_with_retry(
    client: &Client,
    url: &Url,
    retry_times: u32,
    scheduler: &Scheduler,
    domain: &str,
) -> FetchResult {
    let mut attempt = 0;

    loop {
        let result = fetch_url(client, url).await;

        if let Some(latency) = result.latency() {
            let success = matches!(result, FetchResult::Success { .. });
            scheduler.record_response(domain, latency, success);
        }

        if !result.is_retryable() || attempt >= retry_times {
            if attempt > 0 && result.is_retryable() {
                tracing::debug!(
                    "Gave up retrying {} after {} attempts: {}",
                    url,
                    attempt + 1,
                    result.describe()
                );
            }
            return result;
        }

        attempt += 1;
        tracing::debug!(
            "Retrying {} (attempt {}/{}): {}",
            url,
            attempt,
            retry_times,
            result.describe()
        );

        scheduler.wait_for_slot(domain).await;
    }
}

/// Accepts HTML and XHTML, and responses without a Content-Type
pub fn is_html_content_type(content_type: &str) -> bool {
    let content_type = content_type.trim().to_ascii_lowercase();

    content_type.is_empty()
        || content_type.starts_with("text/html")
        || content_type.starts_with("application/xhtml+xml")
}

fn is_retryable_status(status: StatusCode) -> bool {
    RETRY_STATUS_CODES.contains(&status.as_u16())
}

fn classify_error(e: &reqwest::Error) -> FetchResult {
    if e.is_timeout() {
        FetchResult::NetworkError {
            error: "Request timeout".to_string(),
            retryable: true,
        }
    } else if e.is_connect() {
        FetchResult::NetworkError {
            error: "Connection failed".to_string(),
            retryable: true,
        }
    } else if e.is_redirect() {
        FetchResult::NetworkError {
            error: "Too many redirects".to_string(),
            retryable: false,
        }
    } else {
        FetchResult::NetworkError {
            error: e.to_string(),
            retryable: false,
        }
    }
}
