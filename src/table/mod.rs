//! Schema validation engine for tabula
//!
//! The table wrapper intercepts every write and delete for validation
//! before delegating persistence to its record store.
//!
//! # Design Principles
//!
//! - Violations abort writes before they reach the store
//! - Refresh validates the whole table and reconciles uniqueness state
//! - Behavior toggles are explicit per-instance configuration
//! - Store failures propagate uninterpreted

mod config;
mod engine;
mod errors;

pub use config::TableConfig;
pub use engine::SchemaTable;
pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, Severity};
