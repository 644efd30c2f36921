use thiserror::Error;

use crate::directory::{PollReport, ResourceKind};
use crate::record::DestinationTable;
use crate::writer::WriteSummary;

/// Why a single inbound event could not be mapped. The event is skipped; the
/// rest of its batch carries on.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("event is not a JSON object")]
    NotAnObject,

    #[error("field {path} is not an object")]
    NotAnObjectAt { path: String },

    #[error("field {path} holds {found} where a scalar was expected")]
    NotAScalar { path: String, found: &'static str },

    #[error("field {path} is not a list")]
    NotAList { path: String },

    #[error("entry {index} of {path} is not an object")]
    BadListEntry { path: String, index: usize },

    #[error("stream payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("stream payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message has no payload")]
    EmptyPayload,
}

/// Failure of a single write call against the time-series store.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("delta table error: {0}")]
    Delta(#[from] deltalake::DeltaTableError),

    #[error("record serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("destination unavailable: {0}")]
    Unavailable(String),
}

/// The chunked writer stopped at the first failing slice of a table.
#[derive(Debug, Error)]
#[error(
    "writing slice {slice_index} ({item_count} records) to {table} failed after {written} records were written"
)]
pub struct WriteError {
    pub table: DestinationTable,
    pub slice_index: usize,
    pub item_count: usize,
    pub written: usize,
    #[source]
    pub source: SinkError,
}

/// A batch write stopped at a failing table. `committed` holds the tables
/// fully written before it.
#[derive(Debug, Error)]
#[error("{source}; {} records were committed earlier in the batch", .committed.total())]
pub struct BatchWriteError {
    pub committed: WriteSummary,
    #[source]
    pub source: WriteError,
}

impl BatchWriteError {
    /// Records that reached the store, the failing table's written slices
    /// included.
    pub fn records_committed(&self) -> usize {
        self.committed.total() + self.source.written
    }
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("listing {kind} page {page} in {scope} failed: {source}")]
    Listing {
        kind: ResourceKind,
        scope: String,
        page: usize,
        #[source]
        source: anyhow::Error,
    },

    #[error(
        "poll aborted at instance {} after {} records were written: {source}",
        .report.instances,
        .report.records_written
    )]
    Write {
        report: PollReport,
        #[source]
        source: BatchWriteError,
    },
}

#[derive(Debug, Error)]
#[error("max chunk size must be at least 1")]
pub struct InvalidChunkSize;
