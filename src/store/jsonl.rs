//! File-backed record store: checksummed JSON lines
//!
//! Layout: one record per line, `crc32_hex:json_object`. The checksum
//! covers the JSON text and is verified on every load; a mismatch aborts
//! the load. Mutations rewrite the whole file through a temp file in the
//! same directory followed by a rename, so a crash mid-write leaves the
//! previous file intact.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crc32fast::Hasher;
use serde_json::Value;

use super::{key_filter, matches, Record, RecordStore, StoreError, StoreResult};

/// Record store persisted as a checksummed JSON-lines file.
#[derive(Debug)]
pub struct JsonlStore {
    name: String,
    path: PathBuf,
    records: Vec<Record>,
}

impl JsonlStore {
    /// Opens a table file, creating an empty table if the file does not
    /// exist yet. Every line's checksum is verified during the load.
    pub fn open(path: impl Into<PathBuf>, name: impl Into<String>) -> StoreResult<Self> {
        let path = path.into();
        let name = name.into();
        let records = if path.exists() {
            load_records(&path, &name)?
        } else {
            Vec::new()
        };
        Ok(Self {
            name,
            path,
            records,
        })
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> StoreResult<()> {
        let tmp = self.path.with_extension("jsonl.tmp");

        let mut buffer = String::new();
        for record in &self.records {
            let line = serde_json::to_string(&Value::Object(record.clone()))?;
            buffer.push_str(&format!("{:08x}:{}\n", line_checksum(&line), line));
        }

        let mut file = fs::File::create(&tmp).map_err(|e| StoreError::io(&self.name, e))?;
        file.write_all(buffer.as_bytes())
            .map_err(|e| StoreError::io(&self.name, e))?;
        file.sync_all().map_err(|e| StoreError::io(&self.name, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| StoreError::io(&self.name, e))?;
        Ok(())
    }
}

fn line_checksum(line: &str) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(line.as_bytes());
    hasher.finalize()
}

fn load_records(path: &Path, name: &str) -> StoreResult<Vec<Record>> {
    let contents = fs::read_to_string(path).map_err(|e| StoreError::io(name, e))?;
    let mut records = Vec::new();

    for (index, raw) in contents.lines().enumerate() {
        let line = index + 1;
        if raw.is_empty() {
            continue;
        }

        let (checksum_hex, body) = raw.split_once(':').ok_or_else(|| StoreError::Malformed {
            line,
            reason: "missing checksum separator".into(),
        })?;
        let stored = u32::from_str_radix(checksum_hex, 16).map_err(|_| StoreError::Malformed {
            line,
            reason: "checksum is not hexadecimal".into(),
        })?;

        let computed = line_checksum(body);
        if computed != stored {
            return Err(StoreError::ChecksumMismatch {
                line,
                computed,
                stored,
            });
        }

        let value: Value = serde_json::from_str(body)?;
        match value {
            Value::Object(record) => records.push(record),
            _ => {
                return Err(StoreError::Malformed {
                    line,
                    reason: "record is not a JSON object".into(),
                })
            }
        }
    }

    Ok(records)
}

impl RecordStore for JsonlStore {
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
        self.persist()
    }

    fn insert_ignore(&mut self, record: Record, keys: &[&str]) -> StoreResult<bool> {
        let filter = key_filter(&record, keys)?;
        if self.records.iter().any(|existing| matches(existing, &filter)) {
            return Ok(false);
        }
        self.records.push(record);
        self.persist()?;
        Ok(true)
    }

    fn insert_many(&mut self, records: Vec<Record>) -> StoreResult<()> {
        self.records.extend(records);
        self.persist()
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
        if updated > 0 {
            self.persist()?;
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
        let removed = before - self.records.len();
        if removed > 0 {
            self.persist()?;
        }
        Ok(removed)
    }
}
