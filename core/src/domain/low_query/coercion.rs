//! Classification of raw, dynamically-typed filter values.
//!
//! Coercion runs once per condition and never looks at the operator; checking
//! that the resulting shape suits the operator belongs to the predicate compiler.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::domain::low_query::value_objects::{CoercedValue, ScalarValue};

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

pub fn coerce(raw: &Value) -> CoercedValue {
    match raw {
        Value::String(s) if s.contains(',') => coerce_pair(s)
            .unwrap_or_else(|| CoercedValue::Scalar(ScalarValue::Text(s.clone()))),
        Value::Array(items) => {
            CoercedValue::Collection(items.iter().map(ScalarValue::from_json).collect())
        }
        other => CoercedValue::Scalar(ScalarValue::from_json(other)),
    }
}

fn coerce_pair(s: &str) -> Option<CoercedValue> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [low, high] = parts.as_slice() else {
        return None;
    };

    if let (Some(low), Some(high)) = (parse_number(low), parse_number(high)) {
        return Some(CoercedValue::NumericPair(low, high));
    }

    if let (Some(low), Some(high)) = (parse_datetime(low), parse_datetime(high)) {
        return Some(CoercedValue::DatePair(low, high));
    }

    None
}

fn parse_number(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Parses RFC 3339, common `date time` layouts and bare dates (midnight UTC).
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.and_utc())
        .or_else(|| {
            parse_naive_date(s)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        })
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    parse_naive_date(s).or_else(|| parse_datetime(s).map(|dt| dt.date_naive()))
}

fn parse_naive_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}
