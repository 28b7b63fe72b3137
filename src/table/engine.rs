//! The schema-enforcing table wrapper
//!
//! `SchemaTable` owns one constraint mapping and one record store. Every
//! write is intercepted for a uniqueness check before it reaches the
//! store; a full refresh walks storage to detect type drift and null
//! violations and to reconcile the uniqueness seen-sets.
//!
//! # Invariants
//!
//! - A rejected write never reaches the store
//! - Staged uniqueness values commit only after the store confirms the
//!   write, and are discarded on store failure
//! - A failing scan mutates no schema state
//! - Delete always runs a reconciling refresh, even when the delegated
//!   removal failed

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde_json::Value;

use crate::classify::{classify_record, render_record, ClassifiedValue, ScalarType};
use crate::constraint::{ColumnDeclaration, ConstraintMapping, SchemaDeclaration, SchemaReport};
use crate::observability::Logger;
use crate::store::{Record, RecordStore};

use super::config::TableConfig;
use super::errors::{SchemaError, SchemaResult};

/// A record table with an inferred, enforced schema.
pub struct SchemaTable<S: RecordStore> {
    store: S,
    mapping: ConstraintMapping,
    config: TableConfig,
}

/// Uniqueness values staged by an in-flight write. Committed into the
/// seen-sets only after the store confirms the write.
#[derive(Default)]
struct UniquenessStage {
    staged: Vec<(String, ClassifiedValue)>,
}

impl UniquenessStage {
    fn holds(&self, column: &str, value: &ClassifiedValue) -> bool {
        self.staged
            .iter()
            .any(|(c, v)| c == column && v == value)
    }
}

/// What a completed full scan produced.
struct ScanOutcome {
    report: Option<SchemaReport>,
    seen: BTreeMap<String, HashSet<ClassifiedValue>>,
    records: usize,
}

impl<S: RecordStore> SchemaTable<S> {
    /// Wraps a store, running the initial refresh against its current
    /// contents.
    pub fn new(store: S, config: TableConfig) -> SchemaResult<Self> {
        Self::with_schema(store, config, &SchemaDeclaration::new())
    }

    /// Wraps a store with declared constraints, validating its current
    /// contents against them.
    pub fn with_schema(
        store: S,
        config: TableConfig,
        declaration: &SchemaDeclaration,
    ) -> SchemaResult<Self> {
        let mut table = Self {
            store,
            mapping: ConstraintMapping::from_declaration(declaration),
            config,
        };
        table.refresh()?;
        Ok(table)
    }

    /// The underlying table's name.
    pub fn name(&self) -> &str {
        self.store.name()
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Read access to the storage collaborator.
    pub fn store(&self) -> &S {
        &self.store
    }

    #[cfg(test)]
    fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Every stored record.
    pub fn all(&self) -> SchemaResult<Vec<Record>> {
        self.store.all().map_err(SchemaError::store)
    }

    /// Stored records matching the equality filter.
    pub fn find(&self, filter: &Record) -> SchemaResult<Vec<Record>> {
        self.store.find(filter).map_err(SchemaError::store)
    }

    /// Re-validates every stored record against the current constraints
    /// and reconciles the uniqueness seen-sets.
    pub fn refresh(&mut self) -> SchemaResult<()> {
        let outcome = self.scan(false)?;
        self.finish_scan(outcome);
        Ok(())
    }

    /// Like `refresh`, additionally reporting every distinct type
    /// observed per column across the scanned records.
    pub fn refresh_report(&mut self) -> SchemaResult<SchemaReport> {
        let mut outcome = self.scan(true)?;
        let report = outcome.report.take().unwrap_or_default();
        self.finish_scan(outcome);
        Ok(report)
    }

    /// Current constraint snapshot; `refresh` forces a full scan first.
    pub fn get_schema(&mut self, refresh: bool) -> SchemaResult<SchemaReport> {
        if refresh {
            self.refresh_report()
        } else {
            Ok(self.mapping.report())
        }
    }

    /// Replaces the schema wholesale, discarding learned uniqueness
    /// state.
    pub fn set_schema(&mut self, declaration: &SchemaDeclaration) {
        self.mapping = ConstraintMapping::from_declaration(declaration);
    }

    /// Merges additional constraint declarations into the schema.
    pub fn update_schema(&mut self, declaration: &SchemaDeclaration) {
        self.mapping.update(declaration);
    }

    /// Inserts a record after type, not-null, and uniqueness checks.
    pub fn insert(&mut self, record: Record) -> SchemaResult<()> {
        self.validate_types(&record)?;
        self.validate_not_null(&record)?;
        let stage = self.stage_record(&record)?;
        self.store.insert(record).map_err(SchemaError::store)?;
        self.commit(stage);
        Ok(())
    }

    /// Inserts unless a record already matches on `keys`. All write
    /// checks still apply; the stage commits only if the row was
    /// actually inserted.
    pub fn insert_ignore(&mut self, record: Record, keys: &[&str]) -> SchemaResult<bool> {
        self.validate_types(&record)?;
        self.validate_not_null(&record)?;
        let stage = self.stage_record(&record)?;
        let inserted = self
            .store
            .insert_ignore(record, keys)
            .map_err(SchemaError::store)?;
        if inserted {
            self.commit(stage);
        }
        Ok(inserted)
    }

    /// Inserts a batch, checking each row in input order. A row
    /// duplicating an earlier row of the same batch is rejected before
    /// anything reaches the store.
    pub fn insert_many(&mut self, records: Vec<Record>) -> SchemaResult<()> {
        let mut stage = UniquenessStage::default();
        for record in &records {
            self.validate_types(record)?;
            self.validate_not_null(record)?;
            self.stage_into(record, &mut stage)?;
        }
        self.store
            .insert_many(records)
            .map_err(SchemaError::store)?;
        self.commit(stage);
        Ok(())
    }

    /// Updates rows matching on `keys`. The record may be partial, so
    /// only type and uniqueness checks apply; absent required columns
    /// are caught by the next refresh.
    pub fn update(&mut self, record: Record, keys: &[&str]) -> SchemaResult<usize> {
        self.validate_types(&record)?;
        let stage = self.stage_record(&record)?;
        let updated = self
            .store
            .update(record, keys)
            .map_err(SchemaError::store)?;
        self.commit(stage);
        Ok(updated)
    }

    /// Updates rows matching on `keys`, inserting when none match. Like
    /// `update`, the record may be partial.
    pub fn upsert(&mut self, record: Record, keys: &[&str]) -> SchemaResult<()> {
        self.validate_types(&record)?;
        let stage = self.stage_record(&record)?;
        self.store
            .upsert(record, keys)
            .map_err(SchemaError::store)?;
        self.commit(stage);
        Ok(())
    }

    /// Removes records matching the filter, vacating their values from
    /// the uniqueness seen-sets first. A reconciling refresh always runs
    /// afterwards; if both the removal and the refresh fail, the refresh
    /// error wins.
    pub fn delete(&mut self, filter: &Record) -> SchemaResult<usize> {
        let matched = self.find(filter)?;
        for record in &matched {
            for (column, value) in classify_record(record, self.config.normalize_on_read) {
                self.mapping.remove_seen(&column, &value);
            }
        }

        let deleted = self.store.delete(filter).map_err(SchemaError::store);
        if deleted.is_err() {
            Logger::warn(
                "delete_failed_reconciling",
                &[("table", self.store.name())],
            );
        }
        let refreshed = self.refresh();

        refreshed?;
        deleted
    }

    /// Sanitizes one record for import; see `sanitize_many`.
    pub fn sanitize_one(&mut self, record: Record) -> SchemaResult<Record> {
        let batch = self.sanitize_many(vec![record])?;
        Ok(batch.into_iter().next().unwrap_or_default())
    }

    /// Sanitizes a batch of heterogeneous records for import.
    ///
    /// Numeric values hitting an established string column are rewritten
    /// to their string rendering instead of rejected; any other conflict
    /// is a type-conflict error. Newly observed column types extend the
    /// schema as the batch proceeds, so a widening decision made early in
    /// the batch applies to the rest of it. With `sanitize_on_import`
    /// disabled, the batch passes through unchanged and nothing is
    /// learned.
    pub fn sanitize_many(&mut self, records: Vec<Record>) -> SchemaResult<Vec<Record>> {
        if !self.config.sanitize_on_import {
            return Ok(records);
        }

        self.refresh()?;

        let mut sanitized = Vec::with_capacity(records.len());
        let mut rewritten = 0usize;
        for record in &records {
            sanitized.push(self.sanitize_record(record, &mut rewritten)?);
        }

        Logger::info(
            "sanitize_batch",
            &[
                ("table", self.store.name()),
                ("records", &sanitized.len().to_string()),
                ("rewritten", &rewritten.to_string()),
            ],
        );
        Ok(sanitized)
    }

    fn sanitize_record(&mut self, record: &Record, rewritten: &mut usize) -> SchemaResult<Record> {
        let classified = classify_record(record, self.config.normalize_on_read);

        let mut to_string: BTreeSet<String> = BTreeSet::new();
        let mut learned = SchemaDeclaration::new();
        for (column, value) in &classified {
            let observed = value.scalar_type();
            match self.mapping.established(column) {
                Some(expected) if expected != observed => {
                    if expected == ScalarType::String && observed.is_numeric() {
                        to_string.insert(column.clone());
                    } else {
                        return Err(SchemaError::type_conflict(
                            column.as_str(),
                            expected,
                            observed,
                        ));
                    }
                }
                Some(_) => {}
                None => {
                    learned =
                        learned.column(column.as_str(), ColumnDeclaration::of_type(observed));
                }
            }
        }
        self.mapping.update(&learned);

        let mut out = Record::new();
        for (column, value) in classified {
            let rendered = if to_string.contains(&column) {
                *rewritten += 1;
                Value::String(value.render_text())
            } else {
                value.render()
            };
            out.insert(column, rendered);
        }
        Ok(out)
    }

    /// Applies the column type rule to every present field of a record:
    /// a mismatch is accepted only when the established type is string
    /// and the observed type numeric.
    fn validate_types(&self, record: &Record) -> SchemaResult<()> {
        for (column, value) in classify_record(record, self.config.normalize_on_read) {
            let observed = value.scalar_type();
            if let Some(expected) = self.mapping.established(&column) {
                if expected != observed
                    && !(expected == ScalarType::String && observed.is_numeric())
                {
                    return Err(SchemaError::type_conflict(column, expected, observed));
                }
            }
        }
        Ok(())
    }

    /// Checks that every required column is present in the record's
    /// rendered view.
    fn validate_not_null(&self, record: &Record) -> SchemaResult<()> {
        let rendered = render_record(record, self.config.normalize_on_read);
        let missing: Vec<String> = self
            .mapping
            .not_null_columns()
            .iter()
            .filter(|column| !rendered.contains_key(column.as_str()))
            .cloned()
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::null_violation(missing))
        }
    }

    fn stage_record(&self, record: &Record) -> SchemaResult<UniquenessStage> {
        let mut stage = UniquenessStage::default();
        self.stage_into(record, &mut stage)?;
        Ok(stage)
    }

    fn stage_into(&self, record: &Record, stage: &mut UniquenessStage) -> SchemaResult<()> {
        for (column, value) in classify_record(record, self.config.normalize_on_read) {
            if !self.mapping.is_unique_tracked(&column) {
                continue;
            }
            if self.mapping.seen_contains(&column, &value) || stage.holds(&column, &value) {
                return Err(SchemaError::not_unique(column, &value));
            }
            stage.staged.push((column, value));
        }
        Ok(())
    }

    fn commit(&mut self, stage: UniquenessStage) {
        for (column, value) in stage.staged {
            self.mapping.add_seen(&column, value);
        }
    }

    fn finish_scan(&mut self, outcome: ScanOutcome) {
        self.mapping.replace_seen(outcome.seen);
        Logger::info(
            "schema_refresh",
            &[
                ("table", self.store.name()),
                ("records", &outcome.records.to_string()),
            ],
        );
    }

    /// Walks every stored record, enforcing type and not-null
    /// constraints. Collects fresh seen-sets, and the type report when
    /// requested. Leaves all schema state untouched; the caller applies
    /// the outcome only on success.
    fn scan(&self, want_report: bool) -> SchemaResult<ScanOutcome> {
        let mut report = want_report.then(|| self.mapping.report());
        let mut seen: BTreeMap<String, HashSet<ClassifiedValue>> = self
            .mapping
            .tracked_columns()
            .map(|column| (column.to_string(), HashSet::new()))
            .collect();

        let records = self.store.all().map_err(SchemaError::store)?;
        let mut count = 0usize;
        for record in &records {
            count += 1;
            for (column, value) in classify_record(record, self.config.normalize_on_read) {
                let observed = value.scalar_type();
                let effective = match self.mapping.established(&column) {
                    Some(expected) if expected != observed => {
                        if expected == ScalarType::String && observed.is_numeric() {
                            ScalarType::String
                        } else {
                            return Err(SchemaError::type_conflict(column, expected, observed));
                        }
                    }
                    Some(expected) => expected,
                    None => observed,
                };

                if let Some(report) = report.as_mut() {
                    report
                        .columns
                        .entry(column.clone())
                        .or_default()
                        .observe(effective);
                }
                if let Some(set) = seen.get_mut(&column) {
                    set.insert(value);
                }
            }

            let rendered = render_record(record, self.config.normalize_on_read);
            let missing: Vec<String> = self
                .mapping
                .not_null_columns()
                .iter()
                .filter(|column| !rendered.contains_key(column.as_str()))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(SchemaError::null_violation(missing));
            }
        }

        Ok(ScanOutcome {
            report,
            seen,
            records: count,
        })
    }
}
