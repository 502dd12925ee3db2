use crate::config::defaults;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for the crawler
///
/// Every table is optional: a missing file or an empty table falls back to
/// the built-in defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    pub discovery: DiscoveryConfig,
    pub extraction: ExtractionConfig,

    /// Start URLs; the allowed-domain set is derived from these
    pub seeds: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            user_agent: UserAgentConfig::default(),
            output: OutputConfig::default(),
            discovery: DiscoveryConfig::default(),
            extraction: ExtractionConfig::default(),
            seeds: defaults::seed_urls(),
        }
    }
}

/// Politeness configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of concurrent fetches overall
    #[serde(rename = "max-concurrent-requests")]
    pub max_concurrent_requests: u32,

    /// Maximum number of concurrent fetches per allowed domain
    #[serde(rename = "max-concurrent-requests-per-domain")]
    pub max_concurrent_requests_per_domain: u32,

    /// Base delay between fetches to the same domain (seconds)
    #[serde(rename = "download-delay")]
    pub download_delay: f64,

    /// Whether the per-domain delay adapts to observed latency
    #[serde(rename = "autothrottle-enabled")]
    pub autothrottle_enabled: bool,

    /// Average number of requests the throttle aims to have in flight per domain
    #[serde(rename = "autothrottle-target-concurrency")]
    pub autothrottle_target_concurrency: f64,

    /// Initial per-domain delay when the throttle is enabled (seconds)
    #[serde(rename = "autothrottle-start-delay")]
    pub autothrottle_start_delay: f64,

    /// Ceiling for the adaptive delay (seconds)
    #[serde(rename = "autothrottle-max-delay")]
    pub autothrottle_max_delay: f64,

    /// Maximum link-following depth from a seed URL (0 disables the limit)
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Whether subdomains of an allowed domain are crawled too
    #[serde(rename = "allow-subdomains")]
    pub allow_subdomains: bool,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout")]
    pub request_timeout: f64,

    /// Extra attempts for timeouts, connection failures and 408/429/5xx
    #[serde(rename = "retry-times")]
    pub retry_times: u32,

    /// Maximum redirect hops followed for a single request
    #[serde(rename = "max-redirects")]
    pub max_redirects: usize,
}

impl CrawlerConfig {
    pub fn download_delay(&self) -> Duration {
        Duration::from_secs_f64(self.download_delay)
    }

    pub fn autothrottle_start_delay(&self) -> Duration {
        Duration::from_secs_f64(self.autothrottle_start_delay)
    }

    pub fn autothrottle_max_delay(&self) -> Duration {
        Duration::from_secs_f64(self.autothrottle_max_delay)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.request_timeout)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 100,
            max_concurrent_requests_per_domain: 50,
            download_delay: 0.1,
            autothrottle_enabled: true,
            autothrottle_target_concurrency: 1.0,
            autothrottle_start_delay: 5.0,
            autothrottle_max_delay: 60.0,
            max_depth: 10,
            allow_subdomains: false,
            request_timeout: 180.0,
            retry_times: 2,
            max_redirects: 20,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: env!("CARGO_PKG_NAME").to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory that receives the per-run CSV file; it must already exist
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "output".to_string(),
        }
    }
}

/// Link discovery configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// CSS selector matching the "next page" pagination anchor
    #[serde(rename = "next-page-selector")]
    pub next_page_selector: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            next_page_selector: "a.next".to_string(),
        }
    }
}

/// Article extraction configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Parse the body the crawler already downloaded instead of fetching
    /// each article a second time
    #[serde(rename = "reuse-crawl-response")]
    pub reuse_crawl_response: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_politeness_values() {
        let config = CrawlerConfig::default();
        assert_eq!(config.max_concurrent_requests, 100);
        assert_eq!(config.max_concurrent_requests_per_domain, 50);
        assert_eq!(config.download_delay(), Duration::from_millis(100));
        assert!(config.autothrottle_enabled);
        assert_eq!(config.autothrottle_max_delay(), Duration::from_secs(60));
        assert_eq!(config.max_depth, 10);
    }

    #[test]
    fn test_user_agent_header_with_contact() {
        let ua = UserAgentConfig {
            crawler_name: "NewsBot".to_string(),
            crawler_version: "2.1".to_string(),
            contact_url: Some("https://example.com/bot".to_string()),
        };
        assert_eq!(ua.header_value(), "NewsBot/2.1 (+https://example.com/bot)");
    }

    #[test]
    fn test_user_agent_header_without_contact() {
        let ua = UserAgentConfig {
            crawler_name: "NewsBot".to_string(),
            crawler_version: "2.1".to_string(),
            contact_url: None,
        };
        assert_eq!(ua.header_value(), "NewsBot/2.1");
    }

    #[test]
    fn test_default_config_uses_builtin_seeds() {
        let config = Config::default();
        assert!(!config.seeds.is_empty());
        assert_eq!(config.output.directory, "output");
        assert_eq!(config.discovery.next_page_selector, "a.next");
        assert!(!config.extraction.reuse_crawl_response);
    }
}
