use crate::config::CrawlerConfig;
use std::time::{Duration, Instant};

/// Tracks the politeness state of a domain during crawling
///
/// This structure holds the current per-domain delay (fixed, or adapted by
/// the auto-throttle) and the earliest instant at which the next request to
/// the domain may be issued.
#[derive(Debug, Clone)]
pub struct DomainState {
    /// Number of requests issued to this domain in the current crawl
    pub request_count: u32,

    /// Earliest instant the next request may start
    pub next_request_at: Option<Instant>,

    /// Current delay between consecutive requests
    pub delay: Duration,

    /// Latency of the most recent response
    pub last_latency: Option<Duration>,
}

impl DomainState {
    /// Creates a DomainState with the configured initial delay
    ///
    /// With the auto-throttle enabled the delay starts at the throttle's
    /// start delay, never below the base delay and never above the ceiling.
    pub fn new(config: &CrawlerConfig) -> Self {
        let base = config.download_delay();
        let delay = if config.autothrottle_enabled {
            config
                .autothrottle_start_delay()
                .max(base)
                .min(config.autothrottle_max_delay())
        } else {
            base
        };

        Self {
            request_count: 0,
            next_request_at: None,
            delay,
            last_latency: None,
        }
    }

    /// Reserves the next request slot for this domain
    ///
    /// Returns how long the caller must wait before issuing its request.
    /// The slot after this one is pushed back by the current delay, so
    /// concurrent callers are spaced out rather than released together.
    pub fn reserve_slot(&mut self, now: Instant) -> Duration {
        let start = match self.next_request_at {
            Some(ready) if ready > now => ready,
            _ => now,
        };

        self.request_count += 1;
        self.next_request_at = Some(start + self.delay);
        start - now
    }

    /// Feeds an observed response latency into the auto-throttle
    ///
    /// The target delay is `latency / target_concurrency`; the new delay is
    /// the larger of the target and the mean of the old delay and the target,
    /// clamped between the base delay and the ceiling. Responses that were not
    /// successful may raise the delay but never lower it.
    pub fn record_latency(&mut self, latency: Duration, success: bool, config: &CrawlerConfig) {
        self.last_latency = Some(latency);

        if !config.autothrottle_enabled {
            return;
        }

        let target = latency.as_secs_f64() / config.autothrottle_target_concurrency;
        let old = self.delay.as_secs_f64();
        let proposed = target
            .max((old + target) / 2.0)
            .max(config.download_delay)
            .min(config.autothrottle_max_delay);

        if !success && proposed < old {
            return;
        }

        self.delay = Duration::from_secs_f64(proposed);
    }
}
