//! Scalar value normalization and classification
//!
//! String inputs are NFKC-normalized, trimmed, and opportunistically
//! reinterpreted as integer, float, or timestamp. Empty strings and lone
//! hyphens are absent fields: they contribute nothing to classification
//! and are dropped from the rendered record view.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{Map, Value};
use unicode_normalization::UnicodeNormalization;

use super::value::ClassifiedValue;

/// Datetime formats accepted by the lenient parse, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Date-only formats; matches promote to a timestamp at midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%b %d, %Y", "%B %d, %Y"];

/// Classifies a single raw field value.
///
/// Returns `None` when the field is absent by the presence rule: JSON
/// null, or (under normalization) a string that trims to empty or to a
/// lone hyphen. With `normalize` disabled, strings are not reinterpreted
/// at all and classify verbatim as text.
pub fn classify_value(value: &Value, normalize: bool) -> Option<ClassifiedValue> {
    match value {
        Value::Null => None,
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(ClassifiedValue::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Some(ClassifiedValue::Float(f))
            } else {
                Some(ClassifiedValue::Text(n.to_string()))
            }
        }
        Value::String(s) => {
            if normalize {
                classify_string(s)
            } else {
                Some(ClassifiedValue::Text(s.clone()))
            }
        }
        Value::Bool(b) => Some(ClassifiedValue::Text(b.to_string())),
        other => Some(ClassifiedValue::Text(other.to_string())),
    }
}

/// Classifies every present field of a record, preserving field order.
pub fn classify_record(
    record: &Map<String, Value>,
    normalize: bool,
) -> Vec<(String, ClassifiedValue)> {
    record
        .iter()
        .filter_map(|(k, v)| classify_value(v, normalize).map(|cv| (k.clone(), cv)))
        .collect()
}

/// Renders a record for the storage / null-check view.
///
/// Fields absent by the presence rule are dropped; timestamps render to
/// ISO-8601 text; everything else keeps its classified value.
pub fn render_record(record: &Map<String, Value>, normalize: bool) -> Map<String, Value> {
    let mut rendered = Map::new();
    for (key, cv) in classify_record(record, normalize) {
        rendered.insert(key, cv.render());
    }
    rendered
}

fn classify_string(raw: &str) -> Option<ClassifiedValue> {
    let normalized: String = raw.nfkc().collect();
    let trimmed = normalized.trim();

    if is_integer_literal(trimmed) {
        return match trimmed.parse::<i64>() {
            Ok(i) => Some(ClassifiedValue::Integer(i)),
            // Out of i64 range; fall back to the wider representation.
            Err(_) => trimmed
                .parse::<f64>()
                .map(ClassifiedValue::Float)
                .ok()
                .or_else(|| Some(ClassifiedValue::Text(trimmed.to_string()))),
        };
    }

    if is_float_literal(trimmed) {
        if let Ok(f) = trimmed.parse::<f64>() {
            return Some(ClassifiedValue::Float(f));
        }
    }

    if trimmed.is_empty() || trimmed == "-" {
        return None;
    }

    if let Some(ts) = parse_datetime(trimmed) {
        return Some(ClassifiedValue::Timestamp(ts));
    }

    Some(ClassifiedValue::Text(trimmed.to_string()))
}

fn is_integer_literal(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Exactly one decimal point with digits everywhere else; a single-sided
/// digit group suffices (".5" and "5." both qualify).
fn is_float_literal(s: &str) -> bool {
    s.chars().filter(|c| *c == '.').count() == 1
        && s.chars().any(|c| c.is_ascii_digit())
        && s.chars().all(|c| c == '.' || c.is_ascii_digit())
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, format) {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ScalarType;
    use serde_json::json;

    fn classify(value: Value) -> Option<ClassifiedValue> {
        classify_value(&value, true)
    }

    #[test]
    fn test_digit_string_classifies_as_integer() {
        assert_eq!(classify(json!("42")), Some(ClassifiedValue::Integer(42)));
        assert_eq!(classify(json!("007")), Some(ClassifiedValue::Integer(7)));
    }

    #[test]
    fn test_decimal_string_classifies_as_float() {
        assert_eq!(classify(json!("3.14")), Some(ClassifiedValue::Float(3.14)));
        assert_eq!(classify(json!(".5")), Some(ClassifiedValue::Float(0.5)));
        assert_eq!(classify(json!("5.")), Some(ClassifiedValue::Float(5.0)));
    }

    #[test]
    fn test_multiple_dots_stay_text() {
        assert_eq!(
            classify(json!("5.5.5")),
            Some(ClassifiedValue::Text("5.5.5".into()))
        );
    }

    #[test]
    fn test_lone_dot_stays_text() {
        assert_eq!(classify(json!(".")), Some(ClassifiedValue::Text(".".into())));
    }

    #[test]
    fn test_empty_and_hyphen_are_absent() {
        assert_eq!(classify(json!("")), None);
        assert_eq!(classify(json!("-")), None);
        assert_eq!(classify(json!("   ")), None);
        assert_eq!(classify(json!(" - ")), None);
    }

    #[test]
    fn test_null_is_absent() {
        assert_eq!(classify(Value::Null), None);
    }

    #[test]
    fn test_datetime_string_classifies_as_timestamp() {
        let cv = classify(json!("2020-01-02 03:04:05")).unwrap();
        assert_eq!(cv.scalar_type(), ScalarType::Timestamp);
        assert_eq!(cv.render_text(), "2020-01-02T03:04:05");
    }

    #[test]
    fn test_rfc3339_classifies_as_timestamp() {
        let cv = classify(json!("2020-01-02T03:04:05Z")).unwrap();
        assert_eq!(cv.scalar_type(), ScalarType::Timestamp);
    }

    #[test]
    fn test_date_promotes_to_midnight_timestamp() {
        let cv = classify(json!("2020-01-02")).unwrap();
        assert_eq!(cv.render_text(), "2020-01-02T00:00:00");
    }

    #[test]
    fn test_unparseable_string_stays_text() {
        assert_eq!(
            classify(json!("young")),
            Some(ClassifiedValue::Text("young".into()))
        );
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        assert_eq!(classify(json!("  42 ")), Some(ClassifiedValue::Integer(42)));
    }

    #[test]
    fn test_fullwidth_digits_normalize_to_integer() {
        // NFKC folds fullwidth forms onto ASCII digits.
        assert_eq!(classify(json!("１２３")), Some(ClassifiedValue::Integer(123)));
    }

    #[test]
    fn test_native_numbers_pass_through() {
        assert_eq!(classify(json!(5)), Some(ClassifiedValue::Integer(5)));
        assert_eq!(classify(json!(2.5)), Some(ClassifiedValue::Float(2.5)));
    }

    #[test]
    fn test_untyped_scalars_classify_as_text() {
        assert_eq!(classify(json!(true)), Some(ClassifiedValue::Text("true".into())));
        assert_eq!(
            classify(json!([1, 2])),
            Some(ClassifiedValue::Text("[1,2]".into()))
        );
    }

    #[test]
    fn test_normalization_disabled_keeps_strings_verbatim() {
        assert_eq!(
            classify_value(&json!("42"), false),
            Some(ClassifiedValue::Text("42".into()))
        );
        assert_eq!(
            classify_value(&json!(""), false),
            Some(ClassifiedValue::Text("".into()))
        );
        assert_eq!(
            classify_value(&json!("  x "), false),
            Some(ClassifiedValue::Text("  x ".into()))
        );
    }

    #[test]
    fn test_classify_record_drops_absent_fields() {
        let record = json!({"a": "1", "b": "", "c": "-", "d": null})
            .as_object()
            .unwrap()
            .clone();
        let classified = classify_record(&record, true);
        assert_eq!(classified.len(), 1);
        assert_eq!(classified[0].0, "a");
    }

    #[test]
    fn test_render_record_matches_presence_rule() {
        let record = json!({"when": "2021-06-01", "note": "", "n": "7"})
            .as_object()
            .unwrap()
            .clone();
        let rendered = render_record(&record, true);
        assert!(!rendered.contains_key("note"));
        assert_eq!(rendered["when"], json!("2021-06-01T00:00:00"));
        assert_eq!(rendered["n"], json!(7));
    }
}
