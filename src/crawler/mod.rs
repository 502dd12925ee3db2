//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - Link and pagination discovery
//! - Request admission (offsite, depth, and duplicate filters)
//! - Concurrency limits and per-domain politeness
//! - Overall crawl coordination

mod coordinator;
mod discovery;
mod fetcher;
mod frontier;
mod scheduler;

pub use coordinator::Coordinator;
pub use discovery::{discover_links, resolve_link, DiscoveredLinks};
pub use fetcher::{
    build_http_client, fetch_url, fetch_with_retry, is_html_content_type, FetchResult,
};
pub use frontier::{Admission, Frontier};
pub use scheduler::{FetchPermit, Scheduler};

use crate::config::Config;
use crate::output::CrawlStatistics;
use crate::Result;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Derive the allowed domains from the seeds
/// 2. Create the output file
/// 3. Build the HTTP client and scheduler
/// 4. Crawl until no request is left
///
/// # Example
///
/// ```no_run
/// use keystone_crawler::config::Config;
/// use keystone_crawler::crawler::crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let stats = crawl(Config::default()).await?;
/// println!("{} articles written", stats.articles_written());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: Config) -> Result<CrawlStatistics> {
    Coordinator::new(config)?.run().await
}
