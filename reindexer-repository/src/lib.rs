//! # Reindexer Repository
//!
//! This crate provides traits and implementations for interacting with the
//! search engine. It includes definitions for errors, the client and
//! connector interfaces, the guarded connection manager, and a concrete
//! implementation for OpenSearch.

pub mod connection;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod types;

pub use connection::ConnectionManager;
pub use errors::SearchError;
pub use interfaces::{DocumentStream, SearchConnector, SearchEngineClient};
pub use opensearch::{OpenSearchClient, OpenSearchConnector};
pub use types::BulkTotals;
