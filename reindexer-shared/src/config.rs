//! Validated configuration for a reindex run.
//!
//! Settings are grouped the way they are consumed: connection parameters for
//! the search engine, engine parameters for the pipeline, and the optional
//! time-window query. `ReindexConfig::validate` collects every violation
//! rather than stopping at the first, so a misconfigured run reports all of
//! its problems at once.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::enums::{DateFormat, SortOrder, TimeUnit};
use crate::range::{resolve_bounds, RangeError, ResolvedRange};

/// Longest accepted request timeout, in seconds.
const MAX_TIMEOUT_SECS: u64 = 86_400;

/// Largest accepted chunk size.
const MAX_BATCH_SIZE: usize = 1_000;

/// Largest accepted retry budget per chunk.
const MAX_RETRIES: u32 = 10;

/// A configuration that failed validation.
///
/// `issues` holds one human-readable message per violation.
#[derive(Debug, Clone, Error)]
#[error("invalid configuration: {}", .issues.join("; "))]
pub struct ConfigError {
    /// One message per violation.
    pub issues: Vec<String>,
}

/// Connection parameters for the search engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// Engine URL, e.g. `http://localhost:9200`.
    pub url: String,
    /// Basic-auth username.
    pub username: String,
    /// Basic-auth password.
    pub password: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl ConnectionSettings {
    fn collect_issues(&self, issues: &mut Vec<String>) {
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            issues.push(format!(
                "url {:?} must start with http:// or https://",
                self.url
            ));
        }
        if self.timeout_secs == 0 {
            issues.push("timeout_secs must be a positive integer".to_string());
        } else if self.timeout_secs > MAX_TIMEOUT_SECS {
            issues.push(format!(
                "timeout_secs must be less than or equal to {}",
                MAX_TIMEOUT_SECS
            ));
        }
    }
}

/// Pipeline parameters: what to read, how to chunk it, where to write it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// The index to stream documents out of.
    pub source_index: String,
    /// Dot-separated path of the timestamp field inside `_source`.
    pub timestamp_field: String,
    /// Base name of the destination indices; the formatted date is appended.
    pub dest_index_base: String,
    /// Number of documents per chunk.
    pub batch_size: usize,
    /// Attempts per chunk before it is counted as failed.
    pub max_retries: u32,
    /// Date pattern appended to the destination index name.
    pub date_format: DateFormat,
}

impl EngineSettings {
    fn collect_issues(&self, issues: &mut Vec<String>) {
        if self.source_index.is_empty() {
            issues.push("source_index must not be empty".to_string());
        }
        if self.timestamp_field.is_empty() {
            issues.push("timestamp_field must not be empty".to_string());
        }
        if self.dest_index_base.is_empty() {
            issues.push("dest_index_base must not be empty".to_string());
        }
        if self.batch_size < 1 {
            issues.push("batch_size must be greater than or equal to 1".to_string());
        } else if self.batch_size > MAX_BATCH_SIZE {
            issues.push(format!(
                "batch_size must be less than or equal to {}",
                MAX_BATCH_SIZE
            ));
        }
        if self.max_retries < 1 {
            issues.push("max_retries must be greater than or equal to 1".to_string());
        } else if self.max_retries > MAX_RETRIES {
            issues.push(format!(
                "max_retries must be less than or equal to {}",
                MAX_RETRIES
            ));
        }
    }
}

/// Optional time-window restriction on the source scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuerySettings {
    /// Whether to scan a time window instead of the whole index.
    pub enabled: bool,
    /// Inclusive lower bound, `YYYY-MM-DD`.
    pub gte: Option<String>,
    /// Inclusive upper bound, `YYYY-MM-DD`.
    pub lte: Option<String>,
    /// How timestamps are represented in documents and bounds.
    pub time_unit: TimeUnit,
    /// Scan order over the timestamp field.
    pub sort_order: SortOrder,
}

impl QuerySettings {
    /// Resolve the configured bounds for the engine query and the mapper's
    /// re-check. Returns `None` when range scanning is disabled.
    pub fn resolve(&self) -> Result<Option<ResolvedRange>, RangeError> {
        if !self.enabled {
            return Ok(None);
        }
        resolve_bounds(self.gte.as_deref(), self.lte.as_deref(), self.time_unit).map(Some)
    }

    fn collect_issues(&self, issues: &mut Vec<String>) {
        for (name, bound) in [("gte", &self.gte), ("lte", &self.lte)] {
            if let Some(value) = bound {
                if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
                    issues.push(format!("{} must be in YYYY-MM-DD format", name));
                }
            }
        }
        if self.enabled && self.gte.is_none() && self.lte.is_none() {
            issues.push("range scan requires at least one of gte, lte".to_string());
        }
    }
}

/// The complete, validated configuration consumed by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReindexConfig {
    /// Search-engine connection parameters.
    pub connection: ConnectionSettings,
    /// Pipeline parameters.
    pub engine: EngineSettings,
    /// Optional time-window query.
    pub query: QuerySettings,
}

impl ReindexConfig {
    /// Check every setting and report all violations together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut issues = Vec::new();
        self.connection.collect_issues(&mut issues);
        self.engine.collect_issues(&mut issues);
        self.query.collect_issues(&mut issues);

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ConfigError { issues })
        }
    }
}
