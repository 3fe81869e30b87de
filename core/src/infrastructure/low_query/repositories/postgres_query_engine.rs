use sea_orm::{ConnectionTrait, DatabaseConnection, FromQueryResult, JsonValue};
use serde_json::Value;
use tracing::{debug, error};

use crate::{
    domain::{
        common::entities::app_errors::CoreError,
        low_query::{
            ports::QueryEngine,
            query::CompiledQuery,
            value_objects::{PageWindow, RowSet},
        },
    },
    infrastructure::low_query::{
        mappers::{nest_row, relabel_row},
        sql_renderer::{COUNT_COLUMN, SqlRenderer},
    },
};

#[derive(Debug, Clone)]
pub struct PostgresQueryEngine {
    pub db: DatabaseConnection,
    renderer: SqlRenderer,
}

impl PostgresQueryEngine {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            renderer: SqlRenderer::default(),
        }
    }

    async fn fetch_rows(&self, query: &CompiledQuery, window: PageWindow) -> Result<Vec<Value>, CoreError> {
        let statement = self.renderer.page_statement(query, window);
        debug!(sql = %statement.sql, "page query");

        let rows = JsonValue::find_by_statement(statement)
            .all(&self.db)
            .await
            .map_err(|e| {
                error!("Failed to fetch {} rows: {}", query.entity, e);
                CoreError::QueryExecution(e.to_string())
            })?;

        let columns = query.projection.columns();
        Ok(rows
            .into_iter()
            .map(|row| match row {
                Value::Object(positional) => {
                    nest_row(&query.projection, &relabel_row(&columns, positional))
                }
                other => other,
            })
            .collect())
    }

    async fn count_rows(&self, query: &CompiledQuery) -> Result<i64, CoreError> {
        let statement = self.renderer.count_statement(query);
        debug!(sql = %statement.sql, "count query");

        let row = self.db.query_one(statement).await.map_err(|e| {
            error!("Failed to count {} rows: {}", query.entity, e);
            CoreError::QueryExecution(e.to_string())
        })?;

        row.map(|row| row.try_get::<i64>("", COUNT_COLUMN))
            .transpose()
            .map_err(|e| {
                error!("Failed to read {} row count: {}", query.entity, e);
                CoreError::QueryExecution(e.to_string())
            })
            .map(|count| count.unwrap_or(0))
    }
}

impl QueryEngine for PostgresQueryEngine {
    async fn fetch_page(&self, query: &CompiledQuery, window: PageWindow) -> Result<RowSet, CoreError> {
        let (rows, total_row_count) =
            futures::try_join!(self.fetch_rows(query, window), self.count_rows(query))?;

        Ok(RowSet {
            rows,
            total_row_count,
        })
    }
}
