//! OpenSearch implementation of the search engine interfaces.
//!
//! This module provides concrete implementations of `SearchEngineClient`
//! and `SearchConnector` using the OpenSearch client crate.

mod client;
mod queries;
mod response;
mod scan;

pub use client::{OpenSearchClient, OpenSearchConnector};
