//! Evaluates compiled queries over JSON tables held in memory.
//!
//! Rows are keyed by column name. Comparisons follow SQL: a null never
//! compares, so it fails every comparison and every negated comparison, and
//! nulls sort last ascending and first descending.

use std::{cmp::Ordering, collections::HashMap, path::Path, sync::Arc};

use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::{
    domain::{
        common::entities::app_errors::CoreError,
        low_query::{
            path::{ColumnRef, RelationChain},
            ports::QueryEngine,
            predicate::{CompareOp, LikeMode, Predicate},
            query::{CompiledQuery, JoinKind},
            sort::OrderDirection,
            value_objects::{PageWindow, RowSet, ScalarValue},
        },
    },
    infrastructure::low_query::mappers::nest_row,
};

pub type Row = Map<String, Value>;

#[derive(Debug, Clone, Default)]
pub struct InMemoryQueryEngine {
    tables: Arc<HashMap<String, Vec<Row>>>,
}

/// One root row together with the rows its joins reached, keyed by chain key.
struct JoinedRow<'a> {
    bound: HashMap<String, Option<&'a Row>>,
}

impl<'a> JoinedRow<'a> {
    fn row(&self, chain: &RelationChain) -> Option<&'a Row> {
        self.bound.get(&chain.key()).copied().flatten()
    }

    fn cell(&self, column: &ColumnRef) -> Option<&'a Value> {
        self.row(&column.chain)
            .and_then(|row| row.get(&column.field.column))
            .filter(|v| !v.is_null())
    }

    fn scalar(&self, column: &ColumnRef) -> Option<ScalarValue> {
        self.cell(column)
            .and_then(|v| ScalarValue::from_json(v).conform(column.field.kind))
            .filter(|v| !v.is_null())
    }
}

impl InMemoryQueryEngine {
    pub fn new(tables: HashMap<String, Vec<Row>>) -> Self {
        Self {
            tables: Arc::new(tables),
        }
    }

    /// Loads `{ "<table>": [ { "<column>": value, ... }, ... ] }`.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let tables: HashMap<String, Vec<Row>> = serde_json::from_str(json).map_err(|e| {
            error!("Failed to parse fixtures: {}", e);
            CoreError::InvalidSchema(format!("invalid fixtures: {e}"))
        })?;
        Ok(Self::new(tables))
    }

    pub fn from_file(path: &Path) -> Result<Self, CoreError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            error!("Failed to read fixtures {}: {}", path.display(), e);
            CoreError::InvalidSchema(format!("cannot read fixtures {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    fn table(&self, name: &str) -> Result<&[Row], CoreError> {
        self.tables
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| CoreError::QueryExecution(format!("relation \"{name}\" does not exist")))
    }

    fn join<'a>(&'a self, root: &'a Row, chains: &[(RelationChain, JoinKind)]) -> Result<Option<JoinedRow<'a>>, CoreError> {
        let mut bound: HashMap<String, Option<&'a Row>> = HashMap::new();

        for (chain, kind) in chains {
            let Some(step) = chain.steps.last() else {
                continue;
            };
            let parent = if chain.len() == 1 {
                Some(root)
            } else {
                bound.get(&chain.parent().key()).copied().flatten()
            };

            let target = match parent.and_then(|p| p.get(&step.source_column)).filter(|v| !v.is_null()) {
                Some(key) => self
                    .table(&step.target_table)?
                    .iter()
                    .find(|row| row.get(&step.target_column).is_some_and(|v| v == key)),
                None => None,
            };

            if target.is_none() && *kind == JoinKind::Inner {
                return Ok(None);
            }
            bound.insert(chain.key(), target);
        }

        bound.insert(String::new(), Some(root));
        Ok(Some(JoinedRow { bound }))
    }
}

impl QueryEngine for InMemoryQueryEngine {
    async fn fetch_page(&self, query: &CompiledQuery, window: PageWindow) -> Result<RowSet, CoreError> {
        let chains: Vec<(RelationChain, JoinKind)> =
            query.joins().into_iter().map(|j| (j.chain, j.kind)).collect();

        let mut matched = Vec::new();
        for root in self.table(&query.table)? {
            let Some(joined) = self.join(root, &chains)? else {
                continue;
            };
            let keep = query
                .predicate
                .as_ref()
                .is_none_or(|p| evaluate(p, &joined) == Some(true));
            if keep {
                matched.push(joined);
            }
        }

        matched.sort_by(|a, b| {
            query
                .order
                .iter()
                .map(|o| {
                    let ord = compare_nulls_last(a.scalar(&o.column), b.scalar(&o.column));
                    match o.direction {
                        OrderDirection::Asc => ord,
                        OrderDirection::Desc => ord.reverse(),
                    }
                })
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });

        let total_row_count = matched.len() as i64;
        let columns = query.projection.columns();
        let rows = matched
            .iter()
            .skip(window.offset as usize)
            .take(window.limit as usize)
            .map(|joined| {
                let flat: Row = columns
                    .iter()
                    .map(|c| (c.label.clone(), joined.cell(&c.column).cloned().unwrap_or(Value::Null)))
                    .collect();
                nest_row(&query.projection, &flat)
            })
            .collect();

        debug!(table = %query.table, total_row_count, "in-memory page");

        Ok(RowSet {
            rows,
            total_row_count,
        })
    }
}

/// Three-valued evaluation; `None` stands for SQL's unknown.
fn evaluate(predicate: &Predicate, row: &JoinedRow<'_>) -> Option<bool> {
    match predicate {
        Predicate::And(preds) => {
            let results: Vec<Option<bool>> = preds.iter().map(|p| evaluate(p, row)).collect();
            if results.contains(&Some(false)) {
                Some(false)
            } else if results.contains(&None) {
                None
            } else {
                Some(true)
            }
        }
        Predicate::Or(preds) => {
            let results: Vec<Option<bool>> = preds.iter().map(|p| evaluate(p, row)).collect();
            if results.contains(&Some(true)) {
                Some(true)
            } else if results.contains(&None) {
                None
            } else {
                Some(false)
            }
        }

        Predicate::IsNull { column, negated } => Some(row.cell(column).is_none() != *negated),

        Predicate::Compare { column, op, value } => {
            let ord = compare(&row.scalar(column)?, value)?;
            Some(match op {
                CompareOp::Eq => ord == Ordering::Equal,
                CompareOp::Ne => ord != Ordering::Equal,
                CompareOp::Gt => ord == Ordering::Greater,
                CompareOp::Ge => ord != Ordering::Less,
                CompareOp::Lt => ord == Ordering::Less,
                CompareOp::Le => ord != Ordering::Greater,
            })
        }

        Predicate::Like {
            column,
            pattern,
            mode,
            case_insensitive,
        } => {
            let ScalarValue::Text(text) = row.scalar(column)? else {
                return Some(false);
            };
            let (text, pattern) = if *case_insensitive {
                (text.to_lowercase(), pattern.to_lowercase())
            } else {
                (text, pattern.clone())
            };
            Some(match mode {
                LikeMode::Anywhere => text.contains(&pattern),
                LikeMode::Start => text.starts_with(&pattern),
                LikeMode::End => text.ends_with(&pattern),
            })
        }

        Predicate::InList {
            column,
            values,
            negated,
        } => {
            if values.is_empty() {
                return Some(*negated);
            }
            let cell = row.scalar(column)?;
            if values.iter().any(|v| compare(&cell, v) == Some(Ordering::Equal)) {
                return Some(!*negated);
            }
            // A null member leaves a non-matching row unknown.
            if values.iter().any(ScalarValue::is_null) {
                return None;
            }
            Some(*negated)
        }

        Predicate::Between {
            column,
            low,
            high,
            negated,
        } => {
            let cell = row.scalar(column)?;
            let inside = compare(&cell, low)? != Ordering::Less
                && compare(&cell, high)? != Ordering::Greater;
            Some(inside != *negated)
        }
    }
}

fn compare(a: &ScalarValue, b: &ScalarValue) -> Option<Ordering> {
    use ScalarValue as V;

    match (a, b) {
        (V::Bool(a), V::Bool(b)) => Some(a.cmp(b)),
        (V::Int(a), V::Int(b)) => Some(a.cmp(b)),
        (V::Int(a), V::Float(b)) => (*a as f64).partial_cmp(b),
        (V::Float(a), V::Int(b)) => a.partial_cmp(&(*b as f64)),
        (V::Float(a), V::Float(b)) => a.partial_cmp(b),
        (V::Text(a), V::Text(b)) => Some(a.cmp(b)),
        (V::Timestamp(a), V::Timestamp(b)) => Some(a.cmp(b)),
        (V::Date(a), V::Date(b)) => Some(a.cmp(b)),
        (V::Uuid(a), V::Uuid(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Orders as Postgres does: null is greater than every value.
fn compare_nulls_last(a: Option<ScalarValue>, b: Option<ScalarValue>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => compare(&a, &b).unwrap_or(Ordering::Equal),
    }
}
