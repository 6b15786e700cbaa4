//! Document mapper.
//!
//! Transforms each source document into a write action targeting a
//! time-partitioned destination index. A failure on one document never
//! aborts its chunk: the document is logged and skipped.

use chrono::{TimeZone, Utc};
use serde_json::Value;
use tracing::{debug, error};

use crate::errors::MapError;
use reindexer_shared::{DateFormat, SourceDocument, TimeUnit, WriteAction};

/// Inclusive numeric bounds for the defensive range re-check.
///
/// Bounds live in the same numeric domain as the document timestamps
/// (epoch seconds, or milliseconds under `epoch_millis`). Only supplied
/// bounds are checked.
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeCheck {
    /// Inclusive lower bound, if configured.
    pub gte: Option<i64>,
    /// Inclusive upper bound, if configured.
    pub lte: Option<i64>,
}

impl RangeCheck {
    fn contains(&self, timestamp: i64) -> bool {
        self.gte.map_or(true, |gte| timestamp >= gte)
            && self.lte.map_or(true, |lte| timestamp <= lte)
    }
}

/// Maps source documents to destination write actions.
pub struct DocumentMapper {
    timestamp_field: String,
    dest_index_base: String,
    date_format: DateFormat,
    time_unit: TimeUnit,
    range: Option<RangeCheck>,
}

impl DocumentMapper {
    /// Create a mapper.
    ///
    /// `range` carries the original query bounds when range-filtered
    /// retrieval is active; documents outside it are silently dropped as a
    /// double-check against boundary inconsistencies in the upstream scan.
    pub fn new(
        timestamp_field: String,
        dest_index_base: String,
        date_format: DateFormat,
        time_unit: TimeUnit,
        range: Option<RangeCheck>,
    ) -> Self {
        Self {
            timestamp_field,
            dest_index_base,
            date_format,
            time_unit,
            range,
        }
    }

    /// Map a whole chunk, skipping documents that fail to map or fall
    /// outside the configured window.
    pub fn map_chunk(&self, chunk: &[SourceDocument]) -> Vec<WriteAction> {
        let mut actions = Vec::with_capacity(chunk.len());

        for doc in chunk {
            match self.map_document(doc) {
                Ok(Some(action)) => actions.push(action),
                Ok(None) => {
                    debug!(id = %doc.id, "document outside configured window, dropped");
                }
                Err(e) => {
                    error!(id = %doc.id, error = %e, "failed to map document, skipping");
                }
            }
        }

        debug!(
            mapped = actions.len(),
            total = chunk.len(),
            "mapped chunk"
        );
        actions
    }

    /// Map a single document. `Ok(None)` means the document fell outside
    /// the configured window.
    fn map_document(&self, doc: &SourceDocument) -> Result<Option<WriteAction>, MapError> {
        let raw = nested_value(&doc.source, &self.timestamp_field)
            .ok_or_else(|| MapError::TimestampMissing(self.timestamp_field.clone()))?;

        let timestamp = raw
            .as_i64()
            .or_else(|| raw.as_f64().map(|f| f as i64))
            .ok_or_else(|| MapError::TimestampNotNumeric(raw.to_string()))?;

        let seconds = match self.time_unit {
            TimeUnit::EpochMillis => timestamp.div_euclid(1_000),
            TimeUnit::Raw | TimeUnit::EpochSeconds => timestamp,
        };
        let date = Utc
            .timestamp_opt(seconds, 0)
            .single()
            .ok_or(MapError::TimestampOutOfRange(timestamp))?;

        if let Some(range) = &self.range {
            if !range.contains(timestamp) {
                return Ok(None);
            }
        }

        let formatted = date.format(self.date_format.strftime()).to_string();
        let index = format!("{}-{}", self.dest_index_base, formatted);

        Ok(Some(WriteAction::new(
            index,
            doc.id.clone(),
            doc.source.clone(),
        )))
    }
}

/// Walk a dot-separated path through nested objects.
///
/// A missing intermediate key yields `None` rather than an error.
fn nested_value<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, key| current.as_object()?.get(key))
}
