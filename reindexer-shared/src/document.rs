//! Document types that flow through the pipeline.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single document read from the source index.
///
/// The payload is carried opaquely; only the configured timestamp field is
/// ever inspected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    /// The document's identifier in the source index.
    pub id: String,
    /// The full field map of the document.
    pub source: Value,
}

impl SourceDocument {
    /// Create a new source document.
    pub fn new(id: impl Into<String>, source: Value) -> Self {
        Self {
            id: id.into(),
            source,
        }
    }
}

/// A single bulk `index` action derived from a [`SourceDocument`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteAction {
    /// The destination index to write into.
    pub index: String,
    /// The document identifier, carried over from the source.
    pub id: String,
    /// The document payload, carried over unchanged.
    pub source: Value,
}

impl WriteAction {
    /// Create a new write action.
    pub fn new(index: impl Into<String>, id: impl Into<String>, source: Value) -> Self {
        Self {
            index: index.into(),
            id: id.into(),
            source,
        }
    }
}
