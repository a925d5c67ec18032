//! Output sink trait and types
//!
//! Every song record the crawl produces is handed to a [`RecordSink`].

use crate::chart::SongRecord;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for song records
///
/// Records arrive in completion order, which depends on fetch timing rather
/// than on rank.
pub trait RecordSink {
    /// Writes one record
    fn write(&mut self, record: &SongRecord) -> OutputResult<()>;

    /// Flushes anything buffered once the crawl is over
    fn finish(&mut self) -> OutputResult<()> {
        Ok(())
    }
}

/// Keeps every record in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub records: Vec<SongRecord>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records sorted by (year, rank)
    pub fn sorted(&self) -> Vec<SongRecord> {
        let mut records = self.records.clone();
        records.sort_by_key(|r| (r.year, r.rank));
        records
    }
}

impl RecordSink for CollectingSink {
    fn write(&mut self, record: &SongRecord) -> OutputResult<()> {
        self.records.push(record.clone());
        Ok(())
    }
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn write(&mut self, record: &SongRecord) -> OutputResult<()> {
        (**self).write(record)
    }

    fn finish(&mut self) -> OutputResult<()> {
        (**self).finish()
    }
}

impl<S: RecordSink + ?Sized> RecordSink for Box<S> {
    fn write(&mut self, record: &SongRecord) -> OutputResult<()> {
        (**self).write(record)
    }

    fn finish(&mut self) -> OutputResult<()> {
        (**self).finish()
    }
}
