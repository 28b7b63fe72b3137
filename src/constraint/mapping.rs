//! The per-table constraint mapping

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::classify::{ClassifiedValue, ScalarType};

use super::declaration::SchemaDeclaration;
use super::report::{ColumnReport, SchemaReport};

/// Schema state for one table: established column types, the not-null
/// column set, and the uniqueness seen-sets.
///
/// The mapping accumulates and reports; it never raises violations.
/// Seen-sets exist only for columns declared unique and are kept in sync
/// by the table engine on every write, delete, and full refresh.
#[derive(Debug, Clone, Default)]
pub struct ConstraintMapping {
    types: BTreeMap<String, ScalarType>,
    not_null: BTreeSet<String>,
    seen: BTreeMap<String, HashSet<ClassifiedValue>>,
}

impl ConstraintMapping {
    /// Creates an empty mapping with no constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mapping seeded from a declaration.
    pub fn from_declaration(declaration: &SchemaDeclaration) -> Self {
        let mut mapping = Self::new();
        mapping.update(declaration);
        mapping
    }

    /// Merges caller-supplied declarations into current state.
    ///
    /// A declared type overwrites the established one; flags only ever
    /// add constraints. Marking a column unique creates its empty
    /// seen-set; clearing constraints requires a full schema reset.
    pub fn update(&mut self, declaration: &SchemaDeclaration) {
        for (column, decl) in &declaration.columns {
            if let Some(tag) = decl.scalar_type {
                self.types.insert(column.clone(), tag);
            }
            if decl.not_null {
                self.not_null.insert(column.clone());
            }
            if decl.unique {
                self.seen.entry(column.clone()).or_default();
            }
        }
    }

    /// The established type for a column, if any.
    pub fn established(&self, column: &str) -> Option<ScalarType> {
        self.types.get(column).copied()
    }

    /// Columns that must be present in every record.
    pub fn not_null_columns(&self) -> &BTreeSet<String> {
        &self.not_null
    }

    /// Whether a column is under uniqueness tracking.
    pub fn is_unique_tracked(&self, column: &str) -> bool {
        self.seen.contains_key(column)
    }

    /// Columns under uniqueness tracking, in name order.
    pub fn tracked_columns(&self) -> impl Iterator<Item = &str> {
        self.seen.keys().map(String::as_str)
    }

    /// Whether a classified value is already present in a column.
    pub fn seen_contains(&self, column: &str, value: &ClassifiedValue) -> bool {
        self.seen
            .get(column)
            .map(|set| set.contains(value))
            .unwrap_or(false)
    }

    /// Records a value as present in a tracked column. No-op for
    /// untracked columns.
    pub fn add_seen(&mut self, column: &str, value: ClassifiedValue) {
        if let Some(set) = self.seen.get_mut(column) {
            set.insert(value);
        }
    }

    /// Removes a value from a tracked column's seen-set. Best-effort:
    /// absence is not an error.
    pub fn remove_seen(&mut self, column: &str, value: &ClassifiedValue) {
        if let Some(set) = self.seen.get_mut(column) {
            set.remove(value);
        }
    }

    /// Replaces every tracked column's seen-set with the values observed
    /// by a completed full scan. Columns missing from `fresh` vacate to
    /// empty; untracked columns in `fresh` are ignored.
    pub fn replace_seen(&mut self, mut fresh: BTreeMap<String, HashSet<ClassifiedValue>>) {
        for (column, set) in self.seen.iter_mut() {
            *set = fresh.remove(column).unwrap_or_default();
        }
    }

    /// Read-only snapshot combining, per column, its type tag and flags.
    pub fn report(&self) -> SchemaReport {
        let mut report = SchemaReport::default();

        let columns: BTreeSet<&String> = self
            .types
            .keys()
            .chain(self.not_null.iter())
            .chain(self.seen.keys())
            .collect();

        for column in columns {
            let mut entry = ColumnReport {
                not_null: self.not_null.contains(column),
                unique: self.seen.contains_key(column),
                ..ColumnReport::default()
            };
            if let Some(tag) = self.types.get(column) {
                entry.observe(*tag);
            }
            report.columns.insert(column.clone(), entry);
        }

        report
    }
}
