//! Schema engine error types
//!
//! Error codes:
//! - TABULA_TYPE_CONFLICT (REJECT)
//! - TABULA_NULL_VIOLATION (REJECT)
//! - TABULA_NOT_UNIQUE (REJECT)
//! - TABULA_STORE_ERROR (ERROR)

use std::fmt;

use crate::classify::{ClassifiedValue, ScalarType};
use crate::store::StoreError;

/// Severity levels for schema engine errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The offending write or scan is rejected; the table stays usable
    Reject,
    /// The delegated store operation failed
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Engine-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Observed type incompatible with the established column type
    TypeConflict,
    /// A required column is absent from a record
    NullViolation,
    /// Duplicate value for a uniqueness-tracked column
    NotUnique,
    /// Opaque failure from the storage collaborator
    Store,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::TypeConflict => "TABULA_TYPE_CONFLICT",
            SchemaErrorCode::NullViolation => "TABULA_NULL_VIOLATION",
            SchemaErrorCode::NotUnique => "TABULA_NOT_UNIQUE",
            SchemaErrorCode::Store => "TABULA_STORE_ERROR",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SchemaErrorCode::Store => Severity::Error,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema engine error with full context
#[derive(Debug)]
pub struct SchemaError {
    /// Error code
    code: SchemaErrorCode,
    /// Human-readable message
    message: String,
    /// Offending column, when a single column is implicated
    column: Option<String>,
    /// Every missing column of the offending record, for null violations
    missing: Vec<String>,
    /// Underlying store error if applicable
    source: Option<StoreError>,
}

impl SchemaError {
    /// Create a type conflict error
    pub fn type_conflict(column: impl Into<String>, expected: ScalarType, observed: ScalarType) -> Self {
        let column = column.into();
        Self {
            message: format!(
                "Column '{}' observed type {}, expected {}",
                column, observed, expected
            ),
            code: SchemaErrorCode::TypeConflict,
            column: Some(column),
            missing: Vec::new(),
            source: None,
        }
    }

    /// Create a null violation error naming every missing column
    pub fn null_violation(missing: Vec<String>) -> Self {
        Self {
            code: SchemaErrorCode::NullViolation,
            message: format!("Required columns missing: {}", missing.join(", ")),
            column: None,
            missing,
            source: None,
        }
    }

    /// Create a uniqueness violation error
    pub fn not_unique(column: impl Into<String>, value: &ClassifiedValue) -> Self {
        let column = column.into();
        Self {
            message: format!("Duplicate value '{}' for unique column '{}'", value, column),
            code: SchemaErrorCode::NotUnique,
            column: Some(column),
            missing: Vec::new(),
            source: None,
        }
    }

    /// Wrap a store failure
    pub fn store(source: StoreError) -> Self {
        Self {
            code: SchemaErrorCode::Store,
            message: format!("Store operation failed: {}", source),
            column: None,
            missing: Vec::new(),
            source: Some(source),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the offending column if a single one is implicated
    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    /// Returns the missing columns for a null violation
    pub fn missing_columns(&self) -> &[String] {
        &self.missing
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for schema engine operations
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SchemaErrorCode::TypeConflict.code(), "TABULA_TYPE_CONFLICT");
        assert_eq!(SchemaErrorCode::NullViolation.code(), "TABULA_NULL_VIOLATION");
        assert_eq!(SchemaErrorCode::NotUnique.code(), "TABULA_NOT_UNIQUE");
        assert_eq!(SchemaErrorCode::Store.code(), "TABULA_STORE_ERROR");
    }

    #[test]
    fn test_severity_levels() {
        assert_eq!(SchemaErrorCode::TypeConflict.severity(), Severity::Reject);
        assert_eq!(SchemaErrorCode::NotUnique.severity(), Severity::Reject);
        assert_eq!(SchemaErrorCode::Store.severity(), Severity::Error);
    }

    #[test]
    fn test_type_conflict_names_both_tags() {
        let err = SchemaError::type_conflict("age", ScalarType::Integer, ScalarType::String);
        let display = err.to_string();
        assert!(display.contains("age"));
        assert!(display.contains("integer"));
        assert!(display.contains("string"));
        assert_eq!(err.column(), Some("age"));
    }

    #[test]
    fn test_null_violation_names_every_missing_column() {
        let err = SchemaError::null_violation(vec!["email".into(), "name".into()]);
        assert_eq!(err.missing_columns(), ["email", "name"]);
        assert!(err.to_string().contains("email, name"));
    }

    #[test]
    fn test_not_unique_names_value_and_column() {
        let err = SchemaError::not_unique("id", &ClassifiedValue::Integer(1));
        let display = err.to_string();
        assert!(display.contains("'1'"));
        assert!(display.contains("id"));
    }

    #[test]
    fn test_store_error_preserves_source() {
        let err = SchemaError::store(StoreError::MissingKey("id".into()));
        assert_eq!(err.code(), SchemaErrorCode::Store);
        assert!(std::error::Error::source(&err).is_some());
    }
}
