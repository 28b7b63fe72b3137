//! Caller-supplied constraint declarations

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::classify::ScalarType;

/// Declared constraints for one column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDeclaration {
    /// Declared type, if any
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub scalar_type: Option<ScalarType>,
    /// Column must be present in every record
    #[serde(default)]
    pub not_null: bool,
    /// Column values must be unique across the table
    #[serde(default)]
    pub unique: bool,
}

impl ColumnDeclaration {
    /// Declare a column of the given type
    pub fn of_type(scalar_type: ScalarType) -> Self {
        Self {
            scalar_type: Some(scalar_type),
            ..Self::default()
        }
    }

    /// Declare an integer column
    pub fn integer() -> Self {
        Self::of_type(ScalarType::Integer)
    }

    /// Declare a float column
    pub fn float() -> Self {
        Self::of_type(ScalarType::Float)
    }

    /// Declare a string column
    pub fn string() -> Self {
        Self::of_type(ScalarType::String)
    }

    /// Declare a timestamp column
    pub fn timestamp() -> Self {
        Self::of_type(ScalarType::Timestamp)
    }

    /// Declare a column with no type commitment
    pub fn untyped() -> Self {
        Self::default()
    }

    /// Require the column in every record
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Track the column for uniqueness
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// A set of column declarations to seed or extend a schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaDeclaration {
    pub columns: BTreeMap<String, ColumnDeclaration>,
}

impl SchemaDeclaration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column declaration, builder style.
    pub fn column(mut self, name: impl Into<String>, declaration: ColumnDeclaration) -> Self {
        self.columns.insert(name.into(), declaration);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_chain() {
        let decl = ColumnDeclaration::integer().not_null().unique();
        assert_eq!(decl.scalar_type, Some(ScalarType::Integer));
        assert!(decl.not_null);
        assert!(decl.unique);
    }

    #[test]
    fn test_untyped_declares_flags_only() {
        let decl = ColumnDeclaration::untyped().not_null();
        assert_eq!(decl.scalar_type, None);
        assert!(decl.not_null);
        assert!(!decl.unique);
    }

    #[test]
    fn test_serialized_shape() {
        let decl = SchemaDeclaration::new()
            .column("id", ColumnDeclaration::string().unique())
            .column("age", ColumnDeclaration::integer());

        let value = serde_json::to_value(&decl).unwrap();
        assert_eq!(
            value,
            json!({
                "age": {"type": "integer", "not_null": false, "unique": false},
                "id": {"type": "string", "not_null": false, "unique": true},
            })
        );
    }

    #[test]
    fn test_deserialize_defaults_missing_flags() {
        let decl: SchemaDeclaration =
            serde_json::from_value(json!({"email": {"not_null": true}})).unwrap();
        let email = &decl.columns["email"];
        assert_eq!(email.scalar_type, None);
        assert!(email.not_null);
        assert!(!email.unique);
    }
}
