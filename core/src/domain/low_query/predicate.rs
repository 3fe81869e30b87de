use crate::domain::{
    common::entities::app_errors::CoreError,
    low_query::{
        coercion::coerce,
        entities::{FilterCondition, Operator},
        path::{ColumnRef, resolve},
        value_objects::{CoercedValue, ScalarValue},
    },
    schema::{entities::FieldKind, ports::SchemaRegistry},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

/// Where the wildcard goes in a LIKE pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeMode {
    Anywhere,
    Start,
    End,
}

/// Engine-neutral boolean expression over resolved columns.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Compare {
        column: ColumnRef,
        op: CompareOp,
        value: ScalarValue,
    },
    /// `pattern` is the raw operand; engines add wildcards according to `mode`.
    Like {
        column: ColumnRef,
        pattern: String,
        mode: LikeMode,
        case_insensitive: bool,
    },
    InList {
        column: ColumnRef,
        values: Vec<ScalarValue>,
        negated: bool,
    },
    Between {
        column: ColumnRef,
        low: ScalarValue,
        high: ScalarValue,
        negated: bool,
    },
    IsNull {
        column: ColumnRef,
        negated: bool,
    },
}

impl Predicate {
    /// Conjunction of `preds`; a single member is returned unwrapped.
    pub fn all(preds: Vec<Predicate>) -> Option<Predicate> {
        Self::combine(preds, Predicate::And)
    }

    /// Disjunction of `preds`; a single member is returned unwrapped.
    pub fn any(preds: Vec<Predicate>) -> Option<Predicate> {
        Self::combine(preds, Predicate::Or)
    }

    fn combine(mut preds: Vec<Predicate>, wrap: fn(Vec<Predicate>) -> Predicate) -> Option<Predicate> {
        match preds.len() {
            0 => None,
            1 => preds.pop(),
            _ => Some(wrap(preds)),
        }
    }

    /// Visits every column the predicate reads.
    pub fn for_each_column<'a>(&'a self, f: &mut impl FnMut(&'a ColumnRef)) {
        match self {
            Predicate::And(preds) | Predicate::Or(preds) => {
                for pred in preds {
                    pred.for_each_column(f);
                }
            }
            Predicate::Compare { column, .. }
            | Predicate::Like { column, .. }
            | Predicate::InList { column, .. }
            | Predicate::Between { column, .. }
            | Predicate::IsNull { column, .. } => f(column),
        }
    }
}

/// Compiles one filter condition: resolve the path, coerce the value, dispatch
/// on the operator.
pub fn compile_predicate<S: SchemaRegistry + ?Sized>(
    schema: &S,
    root: &str,
    condition: &FilterCondition,
) -> Result<Predicate, CoreError> {
    let column = resolve(schema, root, &condition.path)?;
    let operator = condition.operator;
    let raw = &condition.value;
    let invalid = || CoreError::invalid_value(operator, raw);
    let kind = column.field.kind;

    let predicate = match operator {
        Operator::IsNull | Operator::IsNotNull => Predicate::IsNull {
            column,
            negated: operator == Operator::IsNotNull,
        },

        Operator::Eq | Operator::Ne => {
            let value = scalar(coerce(raw)).ok_or_else(invalid)?;
            let value = value.conform(kind).ok_or_else(invalid)?;
            let negated = operator == Operator::Ne;
            if value.is_null() {
                Predicate::IsNull { column, negated }
            } else {
                let op = if negated { CompareOp::Ne } else { CompareOp::Eq };
                Predicate::Compare { column, op, value }
            }
        }

        Operator::Like | Operator::StartsWith | Operator::EndsWith => {
            if kind != FieldKind::String {
                return Err(invalid());
            }
            let pattern = match scalar(coerce(raw)).and_then(|v| v.conform(kind)) {
                Some(ScalarValue::Text(s)) => s,
                _ => return Err(invalid()),
            };
            let (mode, case_insensitive) = match operator {
                Operator::Like => (LikeMode::Anywhere, true),
                Operator::StartsWith => (LikeMode::Start, false),
                _ => (LikeMode::End, false),
            };
            Predicate::Like {
                column,
                pattern,
                mode,
                case_insensitive,
            }
        }

        Operator::Gt | Operator::Ge | Operator::Lt | Operator::Le => {
            if !kind.is_ordered() {
                return Err(invalid());
            }
            let value = scalar(coerce(raw))
                .and_then(|v| v.conform(kind))
                .filter(|v| !v.is_null())
                .ok_or_else(invalid)?;
            let op = match operator {
                Operator::Gt => CompareOp::Gt,
                Operator::Ge => CompareOp::Ge,
                Operator::Lt => CompareOp::Lt,
                _ => CompareOp::Le,
            };
            Predicate::Compare { column, op, value }
        }

        Operator::In | Operator::NotIn => {
            let CoercedValue::Collection(items) = coerce(raw) else {
                return Err(invalid());
            };
            let values = items
                .iter()
                .map(|item| item.conform(kind).filter(|v| !v.is_null()))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(invalid)?;
            Predicate::InList {
                column,
                values,
                negated: operator == Operator::NotIn,
            }
        }

        Operator::Between | Operator::NotBetween => {
            let (low, high) = match coerce(raw) {
                CoercedValue::NumericPair(low, high) => {
                    (ScalarValue::Float(low), ScalarValue::Float(high))
                }
                CoercedValue::DatePair(low, high) => {
                    (ScalarValue::Timestamp(low), ScalarValue::Timestamp(high))
                }
                _ => return Err(invalid()),
            };
            if !kind.is_ordered() {
                return Err(invalid());
            }
            let low = low.conform(kind).ok_or_else(invalid)?;
            let high = high.conform(kind).ok_or_else(invalid)?;
            Predicate::Between {
                column,
                low,
                high,
                negated: operator == Operator::NotBetween,
            }
        }
    };

    Ok(predicate)
}

fn scalar(value: CoercedValue) -> Option<ScalarValue> {
    match value {
        CoercedValue::Scalar(v) => Some(v),
        _ => None,
    }
}

/// Escapes LIKE metacharacters and adds the wildcards `mode` asks for.
pub fn like_pattern(raw: &str, mode: LikeMode) -> String {
    let mut escaped = String::with_capacity(raw.len() + 2);
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }

    match mode {
        LikeMode::Anywhere => format!("%{escaped}%"),
        LikeMode::Start => format!("{escaped}%"),
        LikeMode::End => format!("%{escaped}"),
    }
}
