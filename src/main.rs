//! Keystone Crawler main entry point
//!
//! This is the command-line interface for the Keystone news article crawler.

use clap::Parser;
use keystone_crawler::config::{load_config_with_hash, validate, Config};
use keystone_crawler::output::print_statistics;
use keystone_crawler::{AllowedDomains, Coordinator};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Keystone Crawler: a polite news article harvester
///
/// Crawls a list of news sites, follows article links and pagination within
/// the seed domains, and writes every dated article it finds to a
/// timestamped CSV file.
#[derive(Parser, Debug)]
#[command(name = "keystone-crawler")]
#[command(version)]
#[command(about = "A polite news article harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in settings when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match load(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Loads the configuration file, or the built-in settings without one
fn load(path: Option<&PathBuf>) -> Result<Config, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        None => {
            tracing::info!("No configuration file given, using built-in settings");
            let config = Config::default();
            validate(&config)?;
            Ok(config)
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("keystone_crawler=info,warn"),
            1 => EnvFilter::new("keystone_crawler=debug,info"),
            2 => EnvFilter::new("keystone_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective settings and allowed domains
fn handle_dry_run(config: &Config) {
    println!("=== Keystone Crawler Dry Run ===\n");

    let crawler = &config.crawler;
    println!("Politeness:");
    println!("  Max concurrent requests: {}", crawler.max_concurrent_requests);
    println!(
        "  Max concurrent requests per domain: {}",
        crawler.max_concurrent_requests_per_domain
    );
    println!("  Download delay: {}s", crawler.download_delay);
    if crawler.autothrottle_enabled {
        println!(
            "  Auto-throttle: on (target concurrency {}, start delay {}s, max delay {}s)",
            crawler.autothrottle_target_concurrency,
            crawler.autothrottle_start_delay,
            crawler.autothrottle_max_delay
        );
    } else {
        println!("  Auto-throttle: off");
    }
    println!("  Max depth: {}", crawler.max_depth);
    println!("  Request timeout: {}s", crawler.request_timeout);
    println!("  Retries: {}", crawler.retry_times);
    println!("  Max redirects: {}", crawler.max_redirects);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nDiscovery:");
    println!("  Next page selector: {}", config.discovery.next_page_selector);
    println!(
        "  Reuse crawl response for extraction: {}",
        config.extraction.reuse_crawl_response
    );

    println!("\nOutput directory: {}", config.output.directory);

    let allowed =
        AllowedDomains::from_seeds(&config.seeds).with_subdomains(crawler.allow_subdomains);
    println!("\nAllowed Domains ({}):", allowed.len());
    for domain in allowed.iter() {
        println!("  - {}", domain);
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would start crawling with {} seed URLs",
        config.seeds.len()
    );
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let coordinator = match Coordinator::new(config) {
        Ok(coordinator) => coordinator,
        Err(e) => {
            tracing::error!("Failed to start crawl: {}", e);
            return Err(e.into());
        }
    };

    match coordinator.run().await {
        Ok(stats) => {
            tracing::info!("Crawl completed successfully");
            print_statistics(&stats);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
