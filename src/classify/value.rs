//! Canonical type tags and classified values
//!
//! Supported scalar types:
//! - integer: 64-bit signed integer
//! - float: 64-bit floating point
//! - string: UTF-8 string
//! - timestamp: naive date/time (dates promote to midnight)

use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical rendering of a timestamp: ISO-8601 with second precision.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// The closed type vocabulary tracked per column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    /// 64-bit signed integer
    Integer,
    /// 64-bit floating point
    Float,
    /// UTF-8 string
    String,
    /// Naive date/time
    Timestamp,
}

impl ScalarType {
    /// Whether this tag is one of the numeric types that an established
    /// string column absorbs.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ScalarType::Integer | ScalarType::Float)
    }

    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarType::Integer => "integer",
            ScalarType::Float => "float",
            ScalarType::String => "string",
            ScalarType::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// A field value after classification.
///
/// Held in uniqueness seen-sets, so it must be hashable; floats are
/// compared and hashed by bit pattern.
#[derive(Debug, Clone)]
pub enum ClassifiedValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Timestamp(NaiveDateTime),
}

impl ClassifiedValue {
    /// The type tag this value carries.
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            ClassifiedValue::Integer(_) => ScalarType::Integer,
            ClassifiedValue::Float(_) => ScalarType::Float,
            ClassifiedValue::Text(_) => ScalarType::String,
            ClassifiedValue::Timestamp(_) => ScalarType::Timestamp,
        }
    }

    /// Renders the value for the storage / null-check view.
    ///
    /// Value-preserving except timestamps, which render to ISO-8601 text.
    pub fn render(&self) -> Value {
        match self {
            ClassifiedValue::Integer(i) => Value::from(*i),
            ClassifiedValue::Float(f) => Value::from(*f),
            ClassifiedValue::Text(s) => Value::String(s.clone()),
            ClassifiedValue::Timestamp(ts) => {
                Value::String(ts.format(TIMESTAMP_FORMAT).to_string())
            }
        }
    }

    /// Renders the value as plain text, used when a numeric value is
    /// absorbed into an established string column.
    pub fn render_text(&self) -> String {
        match self {
            ClassifiedValue::Integer(i) => i.to_string(),
            ClassifiedValue::Float(f) => f.to_string(),
            ClassifiedValue::Text(s) => s.clone(),
            ClassifiedValue::Timestamp(ts) => ts.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

impl fmt::Display for ClassifiedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render_text())
    }
}

impl PartialEq for ClassifiedValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ClassifiedValue::Integer(a), ClassifiedValue::Integer(b)) => a == b,
            (ClassifiedValue::Float(a), ClassifiedValue::Float(b)) => {
                a.to_bits() == b.to_bits()
            }
            (ClassifiedValue::Text(a), ClassifiedValue::Text(b)) => a == b,
            (ClassifiedValue::Timestamp(a), ClassifiedValue::Timestamp(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ClassifiedValue {}

impl Hash for ClassifiedValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            ClassifiedValue::Integer(i) => {
                state.write_u8(0);
                i.hash(state);
            }
            ClassifiedValue::Float(f) => {
                state.write_u8(1);
                f.to_bits().hash(state);
            }
            ClassifiedValue::Text(s) => {
                state.write_u8(2);
                s.hash(state);
            }
            ClassifiedValue::Timestamp(ts) => {
                state.write_u8(3);
                ts.hash(state);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashSet;

    #[test]
    fn test_type_names() {
        assert_eq!(ScalarType::Integer.type_name(), "integer");
        assert_eq!(ScalarType::Float.type_name(), "float");
        assert_eq!(ScalarType::String.type_name(), "string");
        assert_eq!(ScalarType::Timestamp.type_name(), "timestamp");
    }

    #[test]
    fn test_scalar_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ScalarType::Timestamp).unwrap(),
            "\"timestamp\""
        );
    }

    #[test]
    fn test_value_carries_its_tag() {
        assert_eq!(
            ClassifiedValue::Integer(5).scalar_type(),
            ScalarType::Integer
        );
        assert_eq!(
            ClassifiedValue::Text("x".into()).scalar_type(),
            ScalarType::String
        );
    }

    #[test]
    fn test_timestamp_renders_to_iso_text() {
        let ts = NaiveDate::from_ymd_opt(2020, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        let rendered = ClassifiedValue::Timestamp(ts).render();
        assert_eq!(rendered, Value::String("2020-01-02T03:04:05".into()));
    }

    #[test]
    fn test_numeric_render_preserves_value() {
        assert_eq!(ClassifiedValue::Integer(42).render(), Value::from(42));
        assert_eq!(ClassifiedValue::Float(1.5).render(), Value::from(1.5));
    }

    #[test]
    fn test_floats_hash_by_bit_pattern() {
        let mut set = HashSet::new();
        assert!(set.insert(ClassifiedValue::Float(1.5)));
        assert!(!set.insert(ClassifiedValue::Float(1.5)));
        assert!(set.insert(ClassifiedValue::Float(2.5)));
    }

    #[test]
    fn test_cross_type_values_are_distinct() {
        let mut set = HashSet::new();
        assert!(set.insert(ClassifiedValue::Integer(1)));
        assert!(set.insert(ClassifiedValue::Text("1".into())));
        assert!(set.insert(ClassifiedValue::Float(1.0)));
    }
}
