//! Renders compiled queries to sea-query statements.
//!
//! Tables and projected columns get short positional aliases (`t0`, `t1`, ...
//! and `c0`, `c1`, ...). Postgres truncates identifiers past 63 bytes, so
//! names derived from relation paths cannot be used directly; rows are mapped
//! back to their projection labels with [`column_label`].

use std::collections::HashMap;

use sea_orm::{
    DbBackend, Statement,
    sea_query::{
        Alias, Asterisk, Condition, Expr, Func, JoinType, Order, Query, SelectStatement,
    },
};

use crate::domain::low_query::{
    path::{ColumnRef, RelationChain},
    predicate::{CompareOp, Predicate, like_pattern},
    query::{CompiledQuery, JoinKind},
    sort::OrderDirection,
    value_objects::{PageWindow, ScalarValue},
};

/// Label of the count column in [`SqlRenderer::count_statement`].
pub const COUNT_COLUMN: &str = "num_items";

/// Label of the projected column at `position` in [`FetchTree::columns`].
///
/// [`FetchTree::columns`]: crate::domain::low_query::projection::FetchTree::columns
pub fn column_label(position: usize) -> String {
    format!("c{position}")
}

fn table_alias(position: usize) -> String {
    format!("t{position}")
}

/// Table alias per relation chain: `t0` for the root, then one per join in
/// join order.
#[derive(Debug)]
struct TableAliases {
    by_chain: HashMap<String, String>,
}

impl TableAliases {
    fn new(query: &CompiledQuery) -> Self {
        let mut by_chain = HashMap::from([(String::new(), table_alias(0))]);
        for (position, join) in query.joins().iter().enumerate() {
            by_chain.insert(join.chain.key(), table_alias(position + 1));
        }
        Self { by_chain }
    }

    // Every chain a predicate, an ordering or the projection uses is one of `joins()`.
    fn of(&self, chain: &RelationChain) -> Alias {
        let alias = self
            .by_chain
            .get(&chain.key())
            .cloned()
            .unwrap_or_else(|| table_alias(0));
        Alias::new(alias)
    }

    fn column(&self, column: &ColumnRef) -> Expr {
        Expr::col((self.of(&column.chain), Alias::new(&column.field.column)))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SqlRenderer {
    backend: DbBackend,
}

impl Default for SqlRenderer {
    fn default() -> Self {
        Self {
            backend: DbBackend::Postgres,
        }
    }
}

impl SqlRenderer {
    pub fn new(backend: DbBackend) -> Self {
        Self { backend }
    }

    /// The page itself: projected columns, filters, ordering and the window.
    pub fn page_select(&self, query: &CompiledQuery, window: PageWindow) -> SelectStatement {
        let aliases = TableAliases::new(query);
        let mut select = self.base_select(query, &aliases, false);

        for (position, projected) in query.projection.columns().iter().enumerate() {
            select.expr_as(aliases.column(&projected.column), Alias::new(column_label(position)));
        }

        for instruction in &query.order {
            let order = match instruction.direction {
                OrderDirection::Asc => Order::Asc,
                OrderDirection::Desc => Order::Desc,
            };
            select.order_by(
                (
                    aliases.of(&instruction.column.chain),
                    Alias::new(&instruction.column.field.column),
                ),
                order,
            );
        }

        select.limit(window.limit).offset(window.offset);
        select
    }

    /// `COUNT(*)` over the filtered rows; left joins cannot change it and are skipped.
    pub fn count_select(&self, query: &CompiledQuery) -> SelectStatement {
        let aliases = TableAliases::new(query);
        let mut select = self.base_select(query, &aliases, true);
        select.expr_as(Expr::col(Asterisk).count(), Alias::new(COUNT_COLUMN));
        select
    }

    pub fn page_statement(&self, query: &CompiledQuery, window: PageWindow) -> Statement {
        self.backend.build(&self.page_select(query, window))
    }

    pub fn count_statement(&self, query: &CompiledQuery) -> Statement {
        self.backend.build(&self.count_select(query))
    }

    fn base_select(&self, query: &CompiledQuery, aliases: &TableAliases, inner_only: bool) -> SelectStatement {
        let mut select = Query::select();
        select.from_as(Alias::new(&query.table), aliases.of(&RelationChain::default()));

        for join in query.joins() {
            if inner_only && join.kind != JoinKind::Inner {
                continue;
            }
            let join_type = match join.kind {
                JoinKind::Inner => JoinType::InnerJoin,
                JoinKind::Left => JoinType::LeftJoin,
            };
            add_join(&mut select, aliases, &join.chain, join_type);
        }

        if let Some(predicate) = &query.predicate {
            select.cond_where(render_condition(aliases, predicate));
        }

        select
    }
}

fn add_join(select: &mut SelectStatement, aliases: &TableAliases, chain: &RelationChain, join_type: JoinType) {
    let Some(step) = chain.steps.last() else {
        return;
    };
    let parent = aliases.of(&chain.parent());
    let alias = aliases.of(chain);

    select.join_as(
        join_type,
        Alias::new(&step.target_table),
        alias.clone(),
        Expr::col((parent, Alias::new(&step.source_column)))
            .equals((alias, Alias::new(&step.target_column))),
    );
}

fn render_condition(aliases: &TableAliases, predicate: &Predicate) -> Condition {
    let expr = match predicate {
        Predicate::And(preds) => {
            return preds
                .iter()
                .fold(Condition::all(), |cond, p| cond.add(render_condition(aliases, p)));
        }
        Predicate::Or(preds) => {
            return preds
                .iter()
                .fold(Condition::any(), |cond, p| cond.add(render_condition(aliases, p)));
        }

        Predicate::Compare { column, op, value } => {
            let col = aliases.column(column);
            let value = to_sql_value(value);
            match op {
                CompareOp::Eq => col.eq(value),
                CompareOp::Ne => col.ne(value),
                CompareOp::Gt => col.gt(value),
                CompareOp::Ge => col.gte(value),
                CompareOp::Lt => col.lt(value),
                CompareOp::Le => col.lte(value),
            }
        }

        // Postgres treats backslash as the default LIKE escape.
        Predicate::Like {
            column,
            pattern,
            mode,
            case_insensitive: true,
        } => Expr::expr(Func::lower(aliases.column(column)))
            .like(like_pattern(&pattern.to_lowercase(), *mode)),
        Predicate::Like {
            column,
            pattern,
            mode,
            case_insensitive: false,
        } => aliases.column(column).like(like_pattern(pattern, *mode)),

        Predicate::InList {
            column,
            values,
            negated,
        } => match (values.is_empty(), negated) {
            (true, false) => Expr::cust("1=0"),
            (true, true) => Expr::cust("1=1"),
            (false, false) => aliases.column(column).is_in(values.iter().map(to_sql_value)),
            (false, true) => aliases.column(column).is_not_in(values.iter().map(to_sql_value)),
        },

        Predicate::Between {
            column,
            low,
            high,
            negated,
        } => {
            let (low, high) = (to_sql_value(low), to_sql_value(high));
            if *negated {
                aliases.column(column).not_between(low, high)
            } else {
                aliases.column(column).between(low, high)
            }
        }

        Predicate::IsNull { column, negated } => {
            if *negated {
                aliases.column(column).is_not_null()
            } else {
                aliases.column(column).is_null()
            }
        }
    };

    Condition::all().add(expr)
}

pub fn to_sql_value(value: &ScalarValue) -> sea_orm::Value {
    match value {
        ScalarValue::Null => sea_orm::Value::String(None),
        ScalarValue::Bool(b) => sea_orm::Value::Bool(Some(*b)),
        ScalarValue::Int(i) => sea_orm::Value::BigInt(Some(*i)),
        ScalarValue::Float(f) => sea_orm::Value::Double(Some(*f)),
        ScalarValue::Text(s) => sea_orm::Value::String(Some(Box::new(s.clone()))),
        ScalarValue::Timestamp(t) => sea_orm::Value::ChronoDateTimeUtc(Some(Box::new(*t))),
        ScalarValue::Date(d) => sea_orm::Value::ChronoDate(Some(Box::new(*d))),
        ScalarValue::Uuid(u) => sea_orm::Value::Uuid(Some(Box::new(*u))),
    }
}
