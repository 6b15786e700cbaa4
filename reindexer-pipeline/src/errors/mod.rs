//! Error types for the reindexer pipeline.

use reindexer_repository::SearchError;
use thiserror::Error;

/// Errors that can occur in the reindexer pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Failure while preparing the run (range resolution, stream setup).
    #[error("Setup error: {0}")]
    SetupError(String),

    /// The producer task failed or panicked.
    #[error("Producer error: {0}")]
    ProducerError(String),

    /// A worker task failed or panicked.
    #[error("Worker error: {0}")]
    WorkerError(String),

    /// The hand-off queue was closed while the pipeline was still running.
    #[error("Hand-off queue closed")]
    QueueClosed,

    /// Error from the search engine.
    #[error("Search error: {0}")]
    SearchError(#[from] SearchError),
}

impl PipelineError {
    /// Create a setup error.
    pub fn setup(msg: impl Into<String>) -> Self {
        Self::SetupError(msg.into())
    }

    /// Create a producer error.
    pub fn producer(msg: impl Into<String>) -> Self {
        Self::ProducerError(msg.into())
    }

    /// Create a worker error.
    pub fn worker(msg: impl Into<String>) -> Self {
        Self::WorkerError(msg.into())
    }
}

/// Per-document mapping failures.
///
/// Always caught by the chunk mapper: the offending document is logged and
/// skipped, its siblings are unaffected.
#[derive(Error, Debug)]
pub enum MapError {
    /// No value at the configured field path.
    #[error("no value at field path {0:?}")]
    TimestampMissing(String),

    /// The field value is not a number.
    #[error("timestamp value {0} is not numeric")]
    TimestampNotNumeric(String),

    /// The numeric value cannot be represented as a date.
    #[error("timestamp {0} is outside the representable range")]
    TimestampOutOfRange(i64),
}
