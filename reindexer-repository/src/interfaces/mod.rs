//! Interface definitions for the search engine.
//!
//! This module defines the abstract `SearchEngineClient` and
//! `SearchConnector` traits that allow for dependency injection and
//! swappable search backend implementations.

mod connector;
mod search_engine_client;

pub use connector::SearchConnector;
pub use search_engine_client::{DocumentStream, SearchEngineClient};
