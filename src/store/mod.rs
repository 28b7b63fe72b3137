//! Record storage collaborators for tabula
//!
//! The table engine validates; a `RecordStore` persists. The engine
//! interprets no store failure beyond propagating it, so any backend
//! satisfying the trait can sit underneath a schema table.
//!
//! # Implementations
//!
//! - `MemoryStore`: Vec-backed, no persistence
//! - `JsonlStore`: one CRC32-checksummed JSON line per record,
//!   rewritten atomically on mutation, verified on load

mod errors;
mod jsonl;
mod memory;

pub use errors::{StoreError, StoreResult};
pub use jsonl::JsonlStore;
pub use memory::MemoryStore;

use serde_json::{Map, Value};

/// A record is a flat mapping of column name to scalar value.
pub type Record = Map<String, Value>;

/// The storage collaborator the table engine delegates persistence to.
///
/// `keys` arguments name the columns identifying a row; `filter`
/// arguments match records by equality on every given column.
pub trait RecordStore {
    /// Table identity.
    fn name(&self) -> &str;

    /// Enumerate every record (full scan).
    fn all(&self) -> StoreResult<Vec<Record>>;

    /// Records matching the equality filter.
    fn find(&self, filter: &Record) -> StoreResult<Vec<Record>>;

    /// Append a record.
    fn insert(&mut self, record: Record) -> StoreResult<()>;

    /// Append a record unless one already matches it on `keys`.
    /// Returns whether the record was inserted.
    fn insert_ignore(&mut self, record: Record, keys: &[&str]) -> StoreResult<bool>;

    /// Append a batch of records.
    fn insert_many(&mut self, records: Vec<Record>) -> StoreResult<()>;

    /// Merge the record's fields into every row matching it on `keys`.
    /// Returns the number of rows updated.
    fn update(&mut self, record: Record, keys: &[&str]) -> StoreResult<usize>;

    /// Update rows matching on `keys`, or insert when none match.
    fn upsert(&mut self, record: Record, keys: &[&str]) -> StoreResult<()>;

    /// Remove records matching the equality filter.
    /// Returns the number of rows removed.
    fn delete(&mut self, filter: &Record) -> StoreResult<usize>;
}

/// Whether a record satisfies an equality filter on every filter column.
pub(crate) fn matches(record: &Record, filter: &Record) -> bool {
    filter
        .iter()
        .all(|(column, value)| record.get(column) == Some(value))
}

/// Builds the equality filter identifying a record by its key columns.
pub(crate) fn key_filter(record: &Record, keys: &[&str]) -> StoreResult<Record> {
    let mut filter = Record::new();
    for key in keys {
        let value = record
            .get(*key)
            .ok_or_else(|| StoreError::MissingKey(key.to_string()))?;
        filter.insert(key.to_string(), value.clone());
    }
    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_matches_requires_every_filter_column() {
        let row = record(json!({"id": 1, "name": "a"}));
        assert!(matches(&row, &record(json!({"id": 1}))));
        assert!(matches(&row, &Record::new()));
        assert!(!matches(&row, &record(json!({"id": 2}))));
        assert!(!matches(&row, &record(json!({"id": 1, "missing": true}))));
    }

    #[test]
    fn test_key_filter_extracts_key_columns() {
        let row = record(json!({"id": 1, "name": "a"}));
        let filter = key_filter(&row, &["id"]).unwrap();
        assert_eq!(filter, record(json!({"id": 1})));
    }

    #[test]
    fn test_key_filter_rejects_missing_key() {
        let row = record(json!({"name": "a"}));
        let err = key_filter(&row, &["id"]).unwrap_err();
        assert!(matches!(err, StoreError::MissingKey(ref k) if k == "id"));
    }
}
