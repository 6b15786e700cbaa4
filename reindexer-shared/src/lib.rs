//! # Reindexer Shared
//!
//! Shared types and data structures for the reindexer system: the validated
//! configuration model, the closed enums it is built from, source/destination
//! document types, and range-bound resolution.

pub mod config;
pub mod document;
pub mod enums;
pub mod range;

pub use config::{ConfigError, ConnectionSettings, EngineSettings, QuerySettings, ReindexConfig};
pub use document::{SourceDocument, WriteAction};
pub use enums::{DateFormat, SortOrder, TimeUnit, UnsupportedValue};
pub use range::{RangeBound, RangeError, ResolvedRange};
