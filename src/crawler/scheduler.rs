//! Scheduler for concurrency limits and per-domain politeness
//!
//! This module handles:
//! - Global concurrency limiting via a semaphore
//! - Per-domain concurrency limiting via one semaphore per domain
//! - Spacing requests to the same domain by the domain's current delay
//! - Feeding response latencies into the auto-throttle

use crate::config::CrawlerConfig;
use crate::state::DomainState;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Permission to issue requests to one domain
///
/// Holding it occupies one global slot and one slot of the domain. Both are
/// released on drop.
#[derive(Debug)]
pub struct FetchPermit {
    /// The domain this permit was granted for
    pub domain: String,

    _domain_permit: OwnedSemaphorePermit,
    _global_permit: OwnedSemaphorePermit,
}

struct DomainSlot {
    semaphore: Arc<Semaphore>,
    state: DomainState,
}

/// Scheduler shared by all crawl workers
///
/// The scheduler coordinates:
/// - Global concurrency limits (max concurrent requests overall)
/// - Per-domain concurrency limits
/// - Per-domain delays between consecutive requests
pub struct Scheduler {
    /// Global semaphore for limiting concurrent fetches
    global_semaphore: Arc<Semaphore>,

    /// Per-domain semaphore and politeness state
    domains: Mutex<HashMap<String, DomainSlot>>,

    /// Crawler configuration
    config: CrawlerConfig,
}

impl Scheduler {
    pub fn new(config: CrawlerConfig) -> Self {
        let global_semaphore = Arc::new(Semaphore::new(config.max_concurrent_requests as usize));

        Self {
            global_semaphore,
            domains: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Waits until a request to `domain` may be issued
    ///
    /// This method:
    /// 1. Acquires a slot of the domain's semaphore
    /// 2. Acquires a global semaphore permit
    /// 3. Reserves the domain's next request slot and sleeps until it arrives
    ///
    /// Returns None only if a semaphore was closed.
    pub async fn acquire(&self, domain: &str) -> Option<FetchPermit> {
        let domain_semaphore = {
            let mut domains = self.lock_domains();
            self.slot(&mut domains, domain).semaphore.clone()
        };

        let domain_permit = domain_semaphore.acquire_owned().await.ok()?;
        let global_permit = self.global_semaphore.clone().acquire_owned().await.ok()?;

        self.wait_for_slot(domain).await;

        Some(FetchPermit {
            domain: domain.to_string(),
            _domain_permit: domain_permit,
            _global_permit: global_permit,
        })
    }

    /// Reserves the domain's next request slot and sleeps until it arrives
    ///
    /// Called once per permit by `acquire`, and again before every retry
    /// made under the same permit.
    pub async fn wait_for_slot(&self, domain: &str) {
        let wait = {
            let mut domains = self.lock_domains();
            self.slot(&mut domains, domain)
                .state
                .reserve_slot(Instant::now())
        };

        if !wait.is_zero() {
            tracing::trace!("Waiting {:?} before next request to {}", wait, domain);
            tokio::time::sleep(wait).await;
        }
    }

    /// Records a response latency for the auto-throttle
    ///
    /// # Arguments
    ///
    /// * `domain` - The domain that answered
    /// * `latency` - Time until the response was read
    /// * `success` - Whether the response was a usable page
    pub fn record_response(&self, domain: &str, latency: Duration, success: bool) {
        let mut domains = self.lock_domains();
        let slot = self.slot(&mut domains, domain);
        let before = slot.state.delay;

        slot.state.record_latency(latency, success, &self.config);

        if slot.state.delay != before {
            tracing::debug!(
                "Delay for {} adjusted from {:?} to {:?} (latency {:?})",
                domain,
                before,
                slot.state.delay,
                latency
            );
        }
    }

    /// The current delay between requests to a domain
    pub fn current_delay(&self, domain: &str) -> Option<Duration> {
        self.lock_domains()
            .get(domain)
            .map(|slot| slot.state.delay)
    }

    /// Number of requests issued to a domain so far
    pub fn request_count(&self, domain: &str) -> u32 {
        self.lock_domains()
            .get(domain)
            .map(|slot| slot.state.request_count)
            .unwrap_or(0)
    }

    fn lock_domains(&self) -> std::sync::MutexGuard<'_, HashMap<String, DomainSlot>> {
        // The map stays consistent even if a holder panicked
        self.domains.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot<'a>(
        &self,
        domains: &'a mut HashMap<String, DomainSlot>,
        domain: &str,
    ) -> &'a mut DomainSlot {
        domains
            .entry(domain.to_string())
            .or_insert_with(|| DomainSlot {
                semaphore: Arc::new(Semaphore::new(
                    self.config.max_concurrent_requests_per_domain as usize,
                )),
                state: DomainState::new(&self.config),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> CrawlerConfig {
        CrawlerConfig {
            max_concurrent_requests: 4,
            max_concurrent_requests_per_domain: 2,
            download_delay: 0.0,
            autothrottle_enabled: false,
            ..CrawlerConfig::default()
        }
    }

    #[tokio::test]
    async fn test_acquire_counts_requests() {
        let scheduler = Scheduler::new(create_test_config());

        let permit = scheduler.acquire("example.com").await.unwrap();
        assert_eq!(permit.domain, "example.com");
        drop(permit);

        let _permit = scheduler.acquire("example.com").await.unwrap();
        assert_eq!(scheduler.request_count("example.com"), 2);
        assert_eq!(scheduler.request_count("other.com"), 0);
    }

    #[tokio::test]
    async fn test_per_domain_limit() {
        let scheduler = Arc::new(Scheduler::new(create_test_config()));

        let _a = scheduler.acquire("example.com").await.unwrap();
        let _b = scheduler.acquire("example.com").await.unwrap();

        let blocked = tokio::time::timeout(
            Duration::from_millis(100),
            scheduler.acquire("example.com"),
        )
        .await;
        assert!(blocked.is_err(), "third permit for one domain should wait");

        // Another domain still has room
        let other = tokio::time::timeout(Duration::from_millis(100), scheduler.acquire("other.com"))
            .await;
        assert!(other.is_ok());
    }

    #[tokio::test]
    async fn test_global_limit() {
        let mut config = create_test_config();
        config.max_concurrent_requests = 1;
        let scheduler = Scheduler::new(config);

        let _a = scheduler.acquire("a.com").await.unwrap();
        let blocked =
            tokio::time::timeout(Duration::from_millis(100), scheduler.acquire("b.com")).await;
        assert!(blocked.is_err());
    }

    #[tokio::test]
    async fn test_delay_spaces_requests() {
        let mut config = create_test_config();
        config.download_delay = 0.2;
        let scheduler = Scheduler::new(config);

        let started = Instant::now();
        drop(scheduler.acquire("example.com").await.unwrap());
        drop(scheduler.acquire("example.com").await.unwrap());

        assert!(started.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_wait_for_slot_follows_permit_delay() {
        let mut config = create_test_config();
        config.download_delay = 0.2;
        let scheduler = Scheduler::new(config);

        let _permit = scheduler.acquire("example.com").await.unwrap();
        let started = Instant::now();
        scheduler.wait_for_slot("example.com").await;

        assert!(started.elapsed() >= Duration::from_millis(200));
        assert_eq!(scheduler.request_count("example.com"), 2);
    }

    #[test]
    fn test_record_response_adapts_delay() {
        let config = CrawlerConfig {
            download_delay: 0.1,
            autothrottle_enabled: true,
            autothrottle_target_concurrency: 1.0,
            autothrottle_start_delay: 1.0,
            autothrottle_max_delay: 60.0,
            ..CrawlerConfig::default()
        };
        let scheduler = Scheduler::new(config);

        scheduler.record_response("example.com", Duration::from_secs(3), true);
        assert_eq!(
            scheduler.current_delay("example.com"),
            Some(Duration::from_secs(3))
        );
    }

    #[test]
    fn test_current_delay_unknown_domain() {
        let scheduler = Scheduler::new(create_test_config());
        assert!(scheduler.current_delay("example.com").is_none());
    }
}
