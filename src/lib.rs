//! tabula - a schema-inferring, constraint-enforcing layer for record
//! tables
//!
//! A table's schema is learned from its data and from caller
//! declarations, then enforced on every write: per-column type tags, a
//! not-null column set, and per-column uniqueness.

pub mod classify;
pub mod constraint;
pub mod observability;
pub mod store;
pub mod table;
