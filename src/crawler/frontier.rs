//! Request admission
//!
//! Every request the crawl considers passes through [`Frontier::admit`]
//! before any network I/O happens.

use crate::state::{FetchRequest, RequestKind, RequestOutcome};
use crate::url::AllowedDomains;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use url::Url;

/// Why a request was or was not queued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Queued,
    Offsite,
    DepthExceeded,
    Duplicate,
}

impl Admission {
    /// The outcome recorded for a request that was turned away
    pub fn outcome(&self) -> Option<RequestOutcome> {
        match self {
            Self::Queued => None,
            Self::Offsite => Some(RequestOutcome::Offsite),
            Self::DepthExceeded => Some(RequestOutcome::DepthExceeded),
            Self::Duplicate => Some(RequestOutcome::Duplicate),
        }
    }
}

/// Pending requests plus the filters that guard them
///
/// Filters run in order: offsite, depth limit, duplicate. A request turned
/// away by an earlier filter is not remembered by the duplicate filter.
#[derive(Debug)]
pub struct Frontier {
    allowed: Arc<AllowedDomains>,
    max_depth: u32,
    seen: HashSet<(RequestKind, Url)>,
    pending: VecDeque<FetchRequest>,
}

impl Frontier {
    /// Creates an empty frontier; `max_depth` 0 disables the depth limit
    pub fn new(allowed: Arc<AllowedDomains>, max_depth: u32) -> Self {
        Self {
            allowed,
            max_depth,
            seen: HashSet::new(),
            pending: VecDeque::new(),
        }
    }

    /// Applies the admission filters and queues the request if it passes
    pub fn admit(&mut self, request: FetchRequest) -> Admission {
        if !self.allowed.is_allowed(&request.url) {
            tracing::debug!("Filtered offsite request to {}", request.url);
            return Admission::Offsite;
        }

        if self.max_depth > 0 && request.depth > self.max_depth {
            tracing::debug!(
                "Ignoring link (depth {} > {}): {}",
                request.depth,
                self.max_depth,
                request.url
            );
            return Admission::DepthExceeded;
        }

        if !self.seen.insert((request.kind, request.url.clone())) {
            tracing::trace!("Filtered duplicate {} request to {}", request.kind, request.url);
            return Admission::Duplicate;
        }

        self.pending.push_back(request);
        Admission::Queued
    }

    /// Takes the oldest pending request
    pub fn pop(&mut self) -> Option<FetchRequest> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of distinct requests admitted so far
    pub fn admitted(&self) -> usize {
        self.seen.len()
    }
}
