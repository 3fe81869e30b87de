use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::{
    common::entities::app_errors::CoreError,
    low_query::{
        coercion::{parse_date, parse_datetime},
        entities::{FilterCondition, ProjectionSpec, SortSpec},
    },
    schema::entities::FieldKind,
};

/// A single dynamically-typed filter operand.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
    Uuid(Uuid),
}

impl ScalarValue {
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ScalarValue::Null,
            serde_json::Value::Bool(b) => ScalarValue::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => ScalarValue::Int(i),
                None => ScalarValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => ScalarValue::Text(s.clone()),
            other => ScalarValue::Text(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    /// Converts the operand to the representation a field of `kind` stores.
    ///
    /// Returns `None` when the operand cannot stand for a value of that kind.
    pub fn conform(&self, kind: FieldKind) -> Option<ScalarValue> {
        use ScalarValue as V;

        match (self, kind) {
            (V::Null, _) => Some(V::Null),

            (V::Text(s), FieldKind::String) => Some(V::Text(s.clone())),
            (V::Int(i), FieldKind::String) => Some(V::Text(i.to_string())),
            (V::Float(f), FieldKind::String) => Some(V::Text(f.to_string())),
            (V::Bool(b), FieldKind::String) => Some(V::Text(b.to_string())),
            (V::Uuid(u), FieldKind::String) => Some(V::Text(u.to_string())),

            (V::Int(i), FieldKind::Integer) => Some(V::Int(*i)),
            (V::Float(f), FieldKind::Integer) => Some(integral_or_float(*f)),
            (V::Text(s), FieldKind::Integer) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .map(V::Int)
                    .or_else(|| parse_finite(s).map(integral_or_float))
            }

            (V::Int(i), FieldKind::Float) => Some(V::Float(*i as f64)),
            (V::Float(f), FieldKind::Float) => Some(V::Float(*f)),
            (V::Text(s), FieldKind::Float) => parse_finite(s.trim()).map(V::Float),

            (V::Bool(b), FieldKind::Boolean) => Some(V::Bool(*b)),
            (V::Int(0), FieldKind::Boolean) => Some(V::Bool(false)),
            (V::Int(1), FieldKind::Boolean) => Some(V::Bool(true)),
            (V::Text(s), FieldKind::Boolean) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(V::Bool(true)),
                "false" | "0" => Some(V::Bool(false)),
                _ => None,
            },

            (V::Timestamp(t), FieldKind::Timestamp) => Some(V::Timestamp(*t)),
            (V::Date(d), FieldKind::Timestamp) => {
                d.and_hms_opt(0, 0, 0).map(|dt| V::Timestamp(dt.and_utc()))
            }
            (V::Text(s), FieldKind::Timestamp) => parse_datetime(s.trim()).map(V::Timestamp),

            (V::Date(d), FieldKind::Date) => Some(V::Date(*d)),
            (V::Timestamp(t), FieldKind::Date) => Some(V::Date(t.date_naive())),
            (V::Text(s), FieldKind::Date) => parse_date(s.trim()).map(V::Date),

            (V::Uuid(u), FieldKind::Uuid) => Some(V::Uuid(*u)),
            (V::Text(s), FieldKind::Uuid) => Uuid::parse_str(s.trim()).ok().map(V::Uuid),

            _ => None,
        }
    }
}

fn parse_finite(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|f| f.is_finite())
}

fn integral_or_float(f: f64) -> ScalarValue {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        ScalarValue::Int(f as i64)
    } else {
        ScalarValue::Float(f)
    }
}

/// Result of classifying a raw filter value, before any operator is considered.
#[derive(Debug, Clone, PartialEq)]
pub enum CoercedValue {
    Scalar(ScalarValue),
    NumericPair(f64, f64),
    DatePair(DateTime<Utc>, DateTime<Utc>),
    Collection(Vec<ScalarValue>),
}

/// Caller-facing, 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_no: i64,
    pub page_size: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_no: 1,
            page_size: 20,
        }
    }
}

impl PageRequest {
    pub fn new(page_no: i64, page_size: i64) -> Self {
        Self { page_no, page_size }
    }

    /// Validates the request and converts it to a 0-indexed window.
    pub fn window(&self, max_page_size: i64) -> Result<PageWindow, CoreError> {
        if self.page_size <= 0 || self.page_size > max_page_size {
            return Err(CoreError::InvalidPageRequest {
                page_no: self.page_no,
                page_size: self.page_size,
            });
        }

        let offset = (self.page_no.max(1) - 1)
            .checked_mul(self.page_size)
            .ok_or(CoreError::InvalidPageRequest {
                page_no: self.page_no,
                page_size: self.page_size,
            })?;

        Ok(PageWindow {
            offset: offset as u64,
            limit: self.page_size as u64,
        })
    }
}

/// Engine-facing offset/limit pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u64,
}

/// Requested result shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProjectionRequest {
    /// Every scalar field of the root entity.
    #[default]
    Entity,
    /// A view predeclared in the schema.
    View(String),
    /// Exactly the listed paths (plus identifiers).
    Paths(Vec<ProjectionSpec>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LowQueryInput {
    pub entity: String,
    pub conditions: Vec<FilterCondition>,
    pub sorts: Vec<SortSpec>,
    pub projection: ProjectionRequest,
    pub page: PageRequest,
}

/// What an engine hands back for one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub rows: Vec<serde_json::Value>,
    pub total_row_count: i64,
}
