use crate::domain::{
    common::entities::app_errors::CoreError,
    low_query::{
        ports::QueryEngine,
        query::CompiledQuery,
        value_objects::{PageWindow, RowSet},
    },
};

pub mod in_memory_query_engine;
pub mod postgres_query_engine;

use in_memory_query_engine::InMemoryQueryEngine;
use postgres_query_engine::PostgresQueryEngine;

/// The engine selected at startup.
#[derive(Debug, Clone)]
pub enum QueryEngineRepository {
    Postgres(PostgresQueryEngine),
    InMemory(InMemoryQueryEngine),
}

impl QueryEngine for QueryEngineRepository {
    async fn fetch_page(&self, query: &CompiledQuery, window: PageWindow) -> Result<RowSet, CoreError> {
        match self {
            QueryEngineRepository::Postgres(engine) => engine.fetch_page(query, window).await,
            QueryEngineRepository::InMemory(engine) => engine.fetch_page(query, window).await,
        }
    }
}
