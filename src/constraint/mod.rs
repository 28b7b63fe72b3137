//! Constraint state subsystem for tabula
//!
//! The constraint mapping is the schema state for one table: the
//! established type per column, the not-null column set, and the
//! uniqueness seen-sets. It is derived, in-memory-only state owned by
//! its table wrapper and rebuilt from storage by a full refresh.
//!
//! # Invariants
//!
//! - A column's established type is always a single tag; heterogeneity
//!   observed while reporting lives only in `SchemaReport`
//! - For every uniqueness-tracked column, the seen-set equals the
//!   classified values currently present in storage
//! - The mapping raises no violations itself; enforcement belongs to
//!   the table engine interpreting mapping state

mod declaration;
mod mapping;
mod report;

pub use declaration::{ColumnDeclaration, SchemaDeclaration};
pub use mapping::ConstraintMapping;
pub use report::{ColumnReport, SchemaReport};
