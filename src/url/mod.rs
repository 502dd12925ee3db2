//! URL handling module
//!
//! This module derives registrable domains from URLs and builds the
//! allowed-domain set that bounds the crawl.

mod domain;
mod matcher;

use std::collections::BTreeSet;
use url::Url;

// Re-export main functions
pub use domain::{domain_of, extract_domain, registrable_domain};
pub use matcher::matches_domain;

/// The set of registrable domains a crawl may fetch from
///
/// Built once from the seed URLs. `www.` variants of the same host collapse
/// into a single entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedDomains {
    domains: BTreeSet<String>,
    include_subdomains: bool,
}

impl AllowedDomains {
    /// Derives the allowed-domain set from seed URLs
    ///
    /// Seeds that cannot be parsed are logged and left out; they never abort
    /// the build.
    ///
    /// # Examples
    ///
    /// ```
    /// use keystone_crawler::url::AllowedDomains;
    ///
    /// let seeds = vec![
    ///     "https://www.example.org/".to_string(),
    ///     "https://example.org/politics".to_string(),
    /// ];
    /// let allowed = AllowedDomains::from_seeds(&seeds);
    /// assert_eq!(allowed.len(), 1);
    /// assert!(allowed.contains("example.org"));
    /// ```
    pub fn from_seeds(seeds: &[String]) -> Self {
        let mut domains = BTreeSet::new();

        for seed in seeds {
            match registrable_domain(seed) {
                Ok(domain) => {
                    domains.insert(domain);
                }
                Err(e) => {
                    tracing::warn!("Error processing seed URL {}: {}", seed, e);
                }
            }
        }

        Self {
            domains,
            include_subdomains: false,
        }
    }

    /// Also admits subdomains of every allowed domain
    pub fn with_subdomains(mut self, include_subdomains: bool) -> Self {
        self.include_subdomains = include_subdomains;
        self
    }

    /// Checks whether a registrable domain is allowed
    pub fn contains(&self, domain: &str) -> bool {
        if self.domains.contains(domain) {
            return true;
        }

        self.include_subdomains
            && self
                .domains
                .iter()
                .any(|allowed| matches_domain(allowed, domain, true))
    }

    /// Checks whether a URL may be fetched
    pub fn is_allowed(&self, url: &Url) -> bool {
        match domain_of(url) {
            Ok(domain) => self.contains(&domain),
            Err(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Iterates the allowed domains in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().map(String::as_str)
    }
}
