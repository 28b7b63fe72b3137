//! Read-only schema snapshots

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::classify::ScalarType;

/// Snapshot of one column's constraints.
///
/// `scalar_type` is the single established tag and is present exactly
/// when one distinct type is known. `observed` lists every distinct type
/// seen during a report-mode refresh, in first-observation order; it has
/// more than one entry only over heterogeneous historical data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnReport {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub scalar_type: Option<ScalarType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub observed: Vec<ScalarType>,
    #[serde(default)]
    pub not_null: bool,
    #[serde(default)]
    pub unique: bool,
}

impl ColumnReport {
    /// Record one observed tag, keeping the list distinct and ordered,
    /// and collapse `scalar_type` to the single tag when unambiguous.
    pub(crate) fn observe(&mut self, tag: ScalarType) {
        if !self.observed.contains(&tag) {
            self.observed.push(tag);
        }
        self.scalar_type = match self.observed.as_slice() {
            [single] => Some(*single),
            _ => None,
        };
    }
}

/// Snapshot of a whole table's constraints, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaReport {
    pub columns: BTreeMap<String, ColumnReport>,
}

impl SchemaReport {
    pub fn get(&self, column: &str) -> Option<&ColumnReport> {
        self.columns.get(column)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
