//! Dependency initialization and wiring for the reindexer.

use std::env;
use std::str::FromStr;
use std::sync::Arc;

use tracing::info;

use crate::IndexingError;
use reindexer_pipeline::Orchestrator;
use reindexer_repository::{ConnectionManager, OpenSearchConnector};
use reindexer_shared::{
    ConnectionSettings, DateFormat, EngineSettings, QuerySettings, ReindexConfig, SortOrder,
    TimeUnit,
};

/// Default search engine URL.
const DEFAULT_ENGINE_URL: &str = "http://localhost:9200";

/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default chunk size.
const DEFAULT_BATCH_SIZE: usize = 500;

/// Default retry budget per chunk.
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: engine URL (default: http://localhost:9200)
    /// - `OPENSEARCH_USERNAME` / `OPENSEARCH_PASSWORD`: basic-auth credentials
    /// - `OPENSEARCH_TIMEOUT_SECS`: per-request timeout (default: 30)
    /// - `SOURCE_INDEX`: index to stream documents from (required)
    /// - `TIMESTAMP_FIELD`: dot-separated timestamp field path (required)
    /// - `DEST_INDEX_BASE`: destination index base (default: source index)
    /// - `BATCH_SIZE`: documents per chunk (default: 500)
    /// - `MAX_RETRIES`: attempts per chunk (default: 3)
    /// - `DATE_FORMAT`: partition date pattern (default: YYYYmm)
    /// - `RANGE_ENABLED`: restrict the scan to a time window (default: false)
    /// - `RANGE_GTE` / `RANGE_LTE`: inclusive window bounds, YYYY-MM-DD
    /// - `TIME_UNIT`: raw | epoch_second | epoch_millis (default: raw)
    /// - `SORT_ORDER`: asc | desc (default: asc)
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If configuration is invalid or the engine is
    ///   unreachable
    pub async fn new() -> Result<Self, IndexingError> {
        let config = load_config()?;
        config
            .validate()
            .map_err(|e| IndexingError::config(e.to_string()))?;

        info!(
            url = %config.connection.url,
            source = %config.engine.source_index,
            dest_base = %config.engine.dest_index_base,
            range_enabled = config.query.enabled,
            "initializing dependencies"
        );

        let connector = OpenSearchConnector::new(
            config.connection.clone(),
            config.engine.clone(),
            config.query.clone(),
        );
        let connections = Arc::new(ConnectionManager::new(Arc::new(connector)));

        // Fail fast when the engine is unreachable.
        connections
            .ensure()
            .await
            .map_err(|e| IndexingError::config(format!("search engine unreachable: {}", e)))?;

        info!("search engine connection verified");

        let orchestrator = Orchestrator::new(connections, config.engine, config.query);

        Ok(Self { orchestrator })
    }
}

fn load_config() -> Result<ReindexConfig, IndexingError> {
    let source_index = required("SOURCE_INDEX")?;
    let dest_index_base =
        env::var("DEST_INDEX_BASE").unwrap_or_else(|_| source_index.clone());

    Ok(ReindexConfig {
        connection: ConnectionSettings {
            url: env::var("OPENSEARCH_URL").unwrap_or_else(|_| DEFAULT_ENGINE_URL.to_string()),
            username: env::var("OPENSEARCH_USERNAME").unwrap_or_default(),
            password: env::var("OPENSEARCH_PASSWORD").unwrap_or_default(),
            timeout_secs: parse_var("OPENSEARCH_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
        },
        engine: EngineSettings {
            source_index,
            timestamp_field: required("TIMESTAMP_FIELD")?,
            dest_index_base,
            batch_size: parse_var("BATCH_SIZE", DEFAULT_BATCH_SIZE)?,
            max_retries: parse_var("MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            date_format: parse_enum_var("DATE_FORMAT", DateFormat::YearMonth)?,
        },
        query: QuerySettings {
            enabled: parse_bool_var("RANGE_ENABLED", false)?,
            gte: env::var("RANGE_GTE").ok().filter(|s| !s.is_empty()),
            lte: env::var("RANGE_LTE").ok().filter(|s| !s.is_empty()),
            time_unit: parse_enum_var("TIME_UNIT", TimeUnit::Raw)?,
            sort_order: parse_enum_var("SORT_ORDER", SortOrder::Asc)?,
        },
    })
}

fn required(name: &str) -> Result<String, IndexingError> {
    env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| IndexingError::config(format!("{} must be set", name)))
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, IndexingError> {
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => raw
            .parse()
            .map_err(|_| IndexingError::config(format!("{} has invalid value {:?}", name, raw))),
    }
}

fn parse_enum_var<T>(name: &str, default: T) -> Result<T, IndexingError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => raw
            .parse()
            .map_err(|e| IndexingError::config(format!("{}: {}", name, e))),
    }
}

fn parse_bool_var(name: &str, default: bool) -> Result<bool, IndexingError> {
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => parse_bool(&raw)
            .ok_or_else(|| IndexingError::config(format!("{} has invalid value {:?}", name, raw))),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}
