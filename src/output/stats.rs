//! Crawl statistics
//!
//! Counts how every request of a run ended and prints a summary when the
//! run is over.

use crate::state::RequestOutcome;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    /// Count of requests by outcome
    pub outcomes: HashMap<RequestOutcome, u64>,

    /// Number of domains the crawl was allowed to visit
    pub allowed_domains: usize,

    /// Wall-clock duration of the run
    pub elapsed: Duration,

    /// The CSV file written by the run
    pub output_file: Option<PathBuf>,
}

impl CrawlStatistics {
    pub fn record(&mut self, outcome: RequestOutcome) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
    }

    pub fn count(&self, outcome: RequestOutcome) -> u64 {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Total number of requests considered, filtered ones included
    pub fn total(&self) -> u64 {
        self.outcomes.values().sum()
    }

    /// Number of requests that reached the network
    pub fn fetched(&self) -> u64 {
        self.outcomes
            .iter()
            .filter(|(outcome, _)| !outcome.is_filtered())
            .map(|(_, count)| count)
            .sum()
    }

    pub fn articles_written(&self) -> u64 {
        self.count(RequestOutcome::ArticleWritten)
    }

    pub fn errors(&self) -> u64 {
        self.outcomes
            .iter()
            .filter(|(outcome, _)| outcome.is_error())
            .map(|(_, count)| count)
            .sum()
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Allowed domains: {}", stats.allowed_domains);
    println!("  Requests fetched: {}", stats.fetched());
    println!("  Requests filtered: {}", stats.total() - stats.fetched());
    println!("  Articles written: {}", stats.articles_written());
    println!("  Duration: {:.1}s", stats.elapsed.as_secs_f64());
    if let Some(path) = &stats.output_file {
        println!("  Output file: {}", path.display());
    }
    println!();

    println!("Requests by Outcome:");
    // Sort outcomes by count (descending)
    let mut outcome_counts: Vec<_> = stats.outcomes.iter().collect();
    outcome_counts.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));

    for (outcome, count) in outcome_counts {
        let percentage = if stats.total() > 0 {
            (*count as f64 / stats.total() as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", outcome, count, percentage);
    }
    println!();

    let errors = stats.errors();
    if errors > 0 {
        println!("Errors: {} requests failed", errors);
    }
}
