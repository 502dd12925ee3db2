//! Output module for persisting articles and reporting on a run
//!
//! This module handles:
//! - Creating the per-run CSV file and appending article rows
//! - Recording crawl statistics

mod csv_sink;
mod record;
pub mod stats;

pub use csv_sink::{file_name_for, CsvSink, HEADER};
pub use record::{ArticleRecord, UNTITLED};
pub use stats::{print_statistics, CrawlStatistics};

use std::path::PathBuf;
use thiserror::Error;

/// Output-specific errors
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Output directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("Failed to create output file {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to encode row: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for output operations
pub type OutputResult<T> = std::result::Result<T, OutputError>;
