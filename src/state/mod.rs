//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `FetchRequest`: a URL plus the handler for its response
//! - `RequestOutcome`: how each request ended (written, dropped, filtered, failed)
//! - `DomainState`: per-domain delay and slot reservation for politeness

mod domain_state;
mod outcome;
mod request;

// Re-export main types
pub use domain_state::DomainState;
pub use outcome::RequestOutcome;
pub use request::{FetchRequest, RequestKind};
