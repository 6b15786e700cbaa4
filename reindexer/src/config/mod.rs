//! Configuration and dependency wiring for the reindexer.

mod dependencies;

pub use dependencies::Dependencies;
