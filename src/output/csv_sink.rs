//! Append-only CSV output
//!
//! One file per run, named after the run's start time. The header row is
//! written when the file is created; every article becomes one more row.

use crate::output::{ArticleRecord, OutputError, OutputResult};
use chrono::{DateTime, Local};
use csv::{Terminator, WriterBuilder};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Column names of the output file
pub const HEADER: [&str; 4] = ["Title", "Content", "Publish Date", "URL"];

/// File name for a run started at `started`: `YYYY-MM-DD_HH.MM.SS.csv`
pub fn file_name_for(started: &DateTime<Local>) -> String {
    format!("{}.csv", started.format("%Y-%m-%d_%H.%M.%S"))
}

/// Shared handle to the run's output file
///
/// Clones refer to the same file. Appends are serialized by a mutex, so each
/// row lands in the file whole.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: Arc<Mutex<PathBuf>>,
}

impl CsvSink {
    /// Creates the run's output file inside `directory` and writes the header
    ///
    /// The directory must already exist.
    pub fn create(directory: &Path, started: DateTime<Local>) -> OutputResult<Self> {
        if !directory.is_dir() {
            return Err(OutputError::MissingDirectory(directory.to_path_buf()));
        }

        let path = directory.join(file_name_for(&started));
        let file = File::create(&path).map_err(|source| OutputError::Create {
            path: path.clone(),
            source,
        })?;

        let mut writer = WriterBuilder::new()
            .terminator(Terminator::CRLF)
            .from_writer(file);
        writer.write_record(HEADER)?;
        writer.flush()?;

        tracing::info!("Writing articles to {}", path.display());

        Ok(Self {
            path: Arc::new(Mutex::new(path)),
        })
    }

    /// Appends one article as a CSV row
    ///
    /// The row is encoded before the lock is taken; the file is opened,
    /// written, and closed while holding it.
    pub fn append(&self, record: &ArticleRecord) -> OutputResult<()> {
        let row = encode_row(record)?;

        let path = self.path.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = OpenOptions::new().append(true).open(&*path)?;
        file.write_all(&row)?;
        file.flush()?;

        Ok(())
    }

    /// Path of the output file
    pub fn path(&self) -> PathBuf {
        self.path
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn encode_row(record: &ArticleRecord) -> OutputResult<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record(record.to_row())?;
    writer
        .into_inner()
        .map_err(|e| OutputError::Encode(e.to_string()))
}
