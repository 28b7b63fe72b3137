//! In-memory record store

use super::{key_filter, matches, Record, RecordStore, StoreResult};

/// Vec-backed store with no persistence. Insertion order is scan order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    name: String,
    records: Vec<Record>,
}

impl MemoryStore {
    /// Creates an empty table with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Vec::new(),
        }
    }

    /// Creates a table pre-populated with records.
    pub fn with_records(name: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn all(&self) -> StoreResult<Vec<Record>> {
        Ok(self.records.clone())
    }

    fn find(&self, filter: &Record) -> StoreResult<Vec<Record>> {
        Ok(self
            .records
            .iter()
            .filter(|record| matches(record, filter))
            .cloned()
            .collect())
    }

    fn insert(&mut self, record: Record) -> StoreResult<()> {
        self.records.push(record);
        Ok(())
    }

    fn insert_ignore(&mut self, record: Record, keys: &[&str]) -> StoreResult<bool> {
        let filter = key_filter(&record, keys)?;
        if self.records.iter().any(|existing| matches(existing, &filter)) {
            return Ok(false);
        }
        self.records.push(record);
        Ok(true)
    }

    fn insert_many(&mut self, records: Vec<Record>) -> StoreResult<()> {
        self.records.extend(records);
        Ok(())
    }

    fn update(&mut self, record: Record, keys: &[&str]) -> StoreResult<usize> {
        let filter = key_filter(&record, keys)?;
        let mut updated = 0;
        for existing in self.records.iter_mut() {
            if matches(existing, &filter) {
                for (column, value) in &record {
                    existing.insert(column.clone(), value.clone());
                }
                updated += 1;
            }
        }
        Ok(updated)
    }

    fn upsert(&mut self, record: Record, keys: &[&str]) -> StoreResult<()> {
        if self.update(record.clone(), keys)? == 0 {
            self.insert(record)?;
        }
        Ok(())
    }

    fn delete(&mut self, filter: &Record) -> StoreResult<usize> {
        let before = self.records.len();
        self.records.retain(|record| !matches(record, filter));
        Ok(before - self.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().unwrap().clone()
    }

    fn seeded() -> MemoryStore {
        MemoryStore::with_records(
            "users",
            vec![
                record(json!({"id": 1, "name": "alice"})),
                record(json!({"id": 2, "name": "bob"})),
            ],
        )
    }

    #[test]
    fn test_insert_and_scan() {
        let mut store = MemoryStore::new("users");
        store.insert(record(json!({"id": 1}))).unwrap();
        assert_eq!(store.all().unwrap().len(), 1);
        assert_eq!(store.name(), "users");
    }

    #[test]
    fn test_find_by_equality() {
        let store = seeded();
        let found = store.find(&record(json!({"name": "bob"}))).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["id"], json!(2));
    }

    #[test]
    fn test_insert_ignore_skips_existing_key() {
        let mut store = seeded();
        let inserted = store
            .insert_ignore(record(json!({"id": 1, "name": "other"})), &["id"])
            .unwrap();
        assert!(!inserted);
        assert_eq!(store.len(), 2);

        let inserted = store
            .insert_ignore(record(json!({"id": 3, "name": "carol"})), &["id"])
            .unwrap();
        assert!(inserted);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_update_merges_fields() {
        let mut store = seeded();
        let updated = store
            .update(record(json!({"id": 1, "name": "alicia"})), &["id"])
            .unwrap();
        assert_eq!(updated, 1);
        let found = store.find(&record(json!({"id": 1}))).unwrap();
        assert_eq!(found[0]["name"], json!("alicia"));
    }

    #[test]
    fn test_upsert_inserts_when_no_match() {
        let mut store = seeded();
        store
            .upsert(record(json!({"id": 9, "name": "zoe"})), &["id"])
            .unwrap();
        assert_eq!(store.len(), 3);

        store
            .upsert(record(json!({"id": 9, "name": "zora"})), &["id"])
            .unwrap();
        assert_eq!(store.len(), 3);
        let found = store.find(&record(json!({"id": 9}))).unwrap();
        assert_eq!(found[0]["name"], json!("zora"));
    }

    #[test]
    fn test_delete_returns_removed_count() {
        let mut store = seeded();
        let removed = store.delete(&record(json!({"id": 2}))).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);

        let removed = store.delete(&record(json!({"id": 42}))).unwrap();
        assert_eq!(removed, 0);
    }
}
