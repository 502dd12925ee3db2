//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Deriving the allowed domains and seeding the frontier
//! - Spawning one worker task per admitted request
//! - Coordinating fetching, link discovery, and article extraction
//! - Collecting follow-up requests and per-request outcomes

use crate::config::{parse_selector, Config};
use crate::crawler::discovery::discover_links;
use crate::crawler::frontier::Frontier;
use crate::crawler::scheduler::Scheduler;
use crate::crawler::{build_http_client, fetch_with_retry, FetchResult};
use crate::extract::{ArticleExtractor, HtmlArticleExtractor};
use crate::output::{ArticleRecord, CrawlStatistics, CsvSink};
use crate::state::{FetchRequest, RequestKind, RequestOutcome};
use crate::url::{domain_of, AllowedDomains};
use crate::Result;
use chrono::Local;
use reqwest::Client;
use scraper::Selector;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use url::Url;

/// Completed requests between progress log lines
const PROGRESS_INTERVAL: u64 = 50;

/// Main crawler coordinator structure
pub struct Coordinator<E = HtmlArticleExtractor> {
    config: Arc<Config>,
    allowed: Arc<AllowedDomains>,
    scheduler: Arc<Scheduler>,
    client: Client,
    extractor: Arc<E>,
    sink: CsvSink,
    next_page: Selector,
}

/// Everything a worker task needs, shared by all workers
struct WorkerContext<E> {
    config: Arc<Config>,
    scheduler: Arc<Scheduler>,
    client: Client,
    extractor: Arc<E>,
    sink: CsvSink,
    next_page: Selector,
}

/// What a finished worker hands back to the coordinator
#[derive(Debug)]
struct WorkerReport {
    outcome: RequestOutcome,
    follow_ups: Vec<FetchRequest>,
}

impl WorkerReport {
    fn done(outcome: RequestOutcome) -> Self {
        Self {
            outcome,
            follow_ups: Vec::new(),
        }
    }
}

impl Coordinator<HtmlArticleExtractor> {
    /// Creates a coordinator using the built-in article extractor
    ///
    /// Fails if the output directory does not exist, the next-page selector
    /// is invalid, or the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        let allowed = Arc::new(
            AllowedDomains::from_seeds(&config.seeds)
                .with_subdomains(config.crawler.allow_subdomains),
        );
        let client = build_http_client(&config, allowed.clone())?;
        let extractor =
            HtmlArticleExtractor::new(client.clone(), config.extraction.reuse_crawl_response);

        Self::build(config, allowed, client, extractor)
    }
}

impl<E: ArticleExtractor> Coordinator<E> {
    /// Creates a coordinator with a custom article extractor
    pub fn with_extractor(config: Config, extractor: E) -> Result<Self> {
        let allowed = Arc::new(
            AllowedDomains::from_seeds(&config.seeds)
                .with_subdomains(config.crawler.allow_subdomains),
        );
        let client = build_http_client(&config, allowed.clone())?;

        Self::build(config, allowed, client, extractor)
    }

    fn build(
        config: Config,
        allowed: Arc<AllowedDomains>,
        client: Client,
        extractor: E,
    ) -> Result<Self> {
        let next_page = parse_selector(&config.discovery.next_page_selector)?;
        let sink = CsvSink::create(Path::new(&config.output.directory), Local::now())?;
        let scheduler = Arc::new(Scheduler::new(config.crawler.clone()));

        tracing::info!(
            "Crawling {} seed URLs across {} allowed domains",
            config.seeds.len(),
            allowed.len()
        );

        Ok(Self {
            config: Arc::new(config),
            allowed,
            scheduler,
            client,
            extractor: Arc::new(extractor),
            sink,
            next_page,
        })
    }

    /// The CSV file this crawl writes to
    pub fn output_path(&self) -> PathBuf {
        self.sink.path()
    }

    /// Runs the crawl to completion
    ///
    /// This is the core crawling logic that:
    /// 1. Seeds the frontier with one discovery request per seed URL
    /// 2. Spawns a worker for every admitted request
    /// 3. Admits the follow-up requests of each finished worker
    /// 4. Stops when the frontier is empty and no worker is running
    ///
    /// Request-level failures never end the crawl; they are logged and
    /// counted in the returned statistics.
    pub async fn run(self) -> Result<CrawlStatistics> {
        let started = Instant::now();
        tracing::info!("Starting crawl");

        let mut stats = CrawlStatistics {
            allowed_domains: self.allowed.len(),
            output_file: Some(self.sink.path()),
            ..CrawlStatistics::default()
        };

        let mut frontier = Frontier::new(self.allowed.clone(), self.config.crawler.max_depth);

        for seed in &self.config.seeds {
            match Url::parse(seed.trim()) {
                Ok(url) => admit(&mut frontier, &mut stats, FetchRequest::seed(url)),
                Err(e) => tracing::warn!("Skipping invalid seed URL {}: {}", seed, e),
            }
        }

        let context = Arc::new(WorkerContext {
            config: self.config.clone(),
            scheduler: self.scheduler.clone(),
            client: self.client.clone(),
            extractor: self.extractor.clone(),
            sink: self.sink.clone(),
            next_page: self.next_page.clone(),
        });

        let mut workers = JoinSet::new();
        let mut completed: u64 = 0;

        loop {
            while let Some(request) = frontier.pop() {
                let context = context.clone();
                workers.spawn(async move { process_request(context, request).await });
            }

            let Some(joined) = workers.join_next().await else {
                tracing::info!("Frontier is empty, crawl complete");
                break;
            };

            completed += 1;

            match joined {
                Ok(report) => {
                    stats.record(report.outcome);
                    for request in report.follow_ups {
                        admit(&mut frontier, &mut stats, request);
                    }
                }
                Err(e) => {
                    tracing::error!("Worker task failed: {}", e);
                    stats.record(RequestOutcome::WorkerFailed);
                }
            }

            if completed % PROGRESS_INTERVAL == 0 {
                let elapsed = started.elapsed();
                let rate = completed as f64 / elapsed.as_secs_f64();
                tracing::info!(
                    "Progress: {} requests completed, {} in flight, {} articles written, {:.2} requests/sec",
                    completed,
                    workers.len() + frontier.len(),
                    stats.articles_written(),
                    rate
                );
            }
        }

        stats.elapsed = started.elapsed();

        tracing::info!(
            "Crawl completed: {} requests ({} distinct admitted), {} articles written in {:?}",
            completed,
            frontier.admitted(),
            stats.articles_written(),
            stats.elapsed
        );

        Ok(stats)
    }
}

fn admit(frontier: &mut Frontier, stats: &mut CrawlStatistics, request: FetchRequest) {
    if let Some(outcome) = frontier.admit(request).outcome() {
        stats.record(outcome);
    }
}

/// Processes a single request
///
/// This function:
/// 1. Waits for the domain's politeness slot
/// 2. Fetches the page, retrying transient failures after the domain delay
/// 3. Discovers links or extracts the article, depending on the request kind
async fn process_request<E: ArticleExtractor>(
    context: Arc<WorkerContext<E>>,
    request: FetchRequest,
) -> WorkerReport {
    let domain = match domain_of(&request.url) {
        Ok(domain) => domain,
        Err(e) => {
            tracing::warn!("Cannot schedule {}: {}", request.url, e);
            return WorkerReport::done(RequestOutcome::NetworkError);
        }
    };

    // Held until the page is fully handled, extraction included
    let Some(_permit) = context.scheduler.acquire(&domain).await else {
        return WorkerReport::done(RequestOutcome::WorkerFailed);
    };

    tracing::debug!(
        "Fetching {} ({}, depth {})",
        request.url,
        request.kind,
        request.depth
    );

    let result = fetch_with_retry(
        &context.client,
        &request.url,
        context.config.crawler.retry_times,
        &context.scheduler,
        &domain,
    )
    .await;

    let (final_url, body) = match result {
        FetchResult::Success {
            final_url, body, ..
        } => (final_url, body),
        other => {
            tracing::debug!("Dropping {}: {}", request.url, other.describe());
            return WorkerReport::done(other.outcome());
        }
    };

    match request.kind {
        RequestKind::Discover => {
            let links = discover_links(&body, &final_url, &context.next_page);

            let mut follow_ups: Vec<FetchRequest> = links
                .articles
                .into_iter()
                .map(|url| request.follow_up(url, RequestKind::Extract))
                .collect();

            if let Some(next) = links.next_page {
                tracing::debug!("Following next page {}", next);
                follow_ups.push(request.follow_up(next, RequestKind::Discover));
            }

            WorkerReport {
                outcome: RequestOutcome::Crawled,
                follow_ups,
            }
        }
        RequestKind::Extract => {
            WorkerReport::done(extract_article(&context, &final_url, &body).await)
        }
    }
}

async fn extract_article<E: ArticleExtractor>(
    context: &WorkerContext<E>,
    url: &Url,
    body: &str,
) -> RequestOutcome {
    match context.extractor.extract(url, body).await {
        Ok(Some(article)) => {
            let record = ArticleRecord::from_extracted(article, url);
            match context.sink.append(&record) {
                Ok(()) => {
                    tracing::debug!("Wrote article {} ({})", record.title, url);
                    RequestOutcome::ArticleWritten
                }
                Err(e) => {
                    tracing::error!("Failed to write article {}: {}", url, e);
                    RequestOutcome::OutputFailed
                }
            }
        }
        Ok(None) => {
            tracing::debug!("No publish date found, skipping {}", url);
            RequestOutcome::NotArticle
        }
        Err(e) => {
            tracing::warn!("Error extracting article {}: {}", url, e);
            RequestOutcome::ExtractionFailed
        }
    }
}
