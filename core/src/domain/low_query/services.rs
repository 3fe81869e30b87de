use serde_json::Value;
use tracing::{debug, error, instrument};

use crate::domain::{
    common::{entities::app_errors::CoreError, services::Service},
    low_query::{
        entities::Page,
        ports::{QueryEngine, QueryService},
        query::{CompiledQuery, compile_query},
        value_objects::LowQueryInput,
    },
    schema::ports::SchemaRegistry,
};

impl<S, E> QueryService for Service<S, E>
where
    S: SchemaRegistry,
    E: QueryEngine,
{
    #[instrument(skip(self, input), fields(entity = %input.entity, page_no = input.page.page_no, page_size = input.page.page_size))]
    async fn query_page(&self, input: LowQueryInput) -> Result<Page<Value>, CoreError> {
        let window = input.page.window(self.max_page_size)?;
        let query = self.compile(&input)?;

        debug!(?query, ?window, "compiled low query");

        let rows = self
            .engine
            .fetch_page(&query, window)
            .await
            .map_err(|e| {
                error!("failed to fetch page for {}: {}", query.entity, e);
                e
            })?;

        Ok(Page::new(rows.rows, rows.total_row_count, input.page.page_size))
    }

    fn compile(&self, input: &LowQueryInput) -> Result<CompiledQuery, CoreError> {
        compile_query(self.schema.as_ref(), input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        low_query::{
            entities::{FilterCondition, LogicGroup, Operator},
            ports::MockQueryEngine,
            value_objects::{PageRequest, PageWindow, RowSet},
        },
        schema::entities::test_support::sample_schema,
    };
    use serde_json::json;

    fn input(page_no: i64, page_size: i64) -> LowQueryInput {
        LowQueryInput {
            entity: "User".to_string(),
            conditions: vec![FilterCondition::new(
                "department.name",
                Operator::Like,
                LogicGroup::And,
                json!("Sales"),
            )],
            page: PageRequest::new(page_no, page_size),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_query_page_computes_window_and_totals() {
        let mut engine = MockQueryEngine::new();
        engine
            .expect_fetch_page()
            .withf(|query, window| {
                query.entity == "User"
                    && query.predicate.is_some()
                    && *window == PageWindow { offset: 20, limit: 10 }
            })
            .times(1)
            .returning(|_, _| {
                Box::pin(async {
                    Ok(RowSet {
                        rows: (0..5).map(|i| json!({ "id": i })).collect(),
                        total_row_count: 25,
                    })
                })
            });

        let service = Service::new(sample_schema(), engine);
        let page = service.query_page(input(3, 10)).await.unwrap();

        assert_eq!(page.rows.len(), 5);
        assert_eq!(page.total_row_count, 25);
        assert_eq!(page.total_page_count, 3);
    }

    #[tokio::test]
    async fn test_max_page_size_is_at_least_one() {
        let mut engine = MockQueryEngine::new();
        engine
            .expect_fetch_page()
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(RowSet::default()) }));

        let service = Service::new(sample_schema(), engine).with_max_page_size(0);
        assert_eq!(service.max_page_size, 1);

        let page = service.query_page(input(1, 1)).await.unwrap();
        assert_eq!(page.total_page_count, 0);
    }

    #[tokio::test]
    async fn test_invalid_page_fails_before_engine() {
        let mut engine = MockQueryEngine::new();
        engine.expect_fetch_page().never();

        let service = Service::new(sample_schema(), engine).with_max_page_size(50);

        for size in [0, -5, 51] {
            assert_eq!(
                service.query_page(input(1, size)).await,
                Err(CoreError::InvalidPageRequest {
                    page_no: 1,
                    page_size: size,
                })
            );
        }
    }

    #[tokio::test]
    async fn test_compile_errors_fail_before_engine() {
        let mut engine = MockQueryEngine::new();
        engine.expect_fetch_page().never();
        let service = Service::new(sample_schema(), engine);

        let mut bad = input(1, 10);
        bad.conditions[0].path = "department.budget".to_string();

        assert!(matches!(
            service.query_page(bad).await,
            Err(CoreError::PathResolution { segment, .. }) if segment == "budget"
        ));
    }

    #[tokio::test]
    async fn test_engine_errors_propagate() {
        let mut engine = MockQueryEngine::new();
        engine.expect_fetch_page().returning(|_, _| {
            Box::pin(async { Err(CoreError::QueryExecution("connection reset".to_string())) })
        });
        let service = Service::new(sample_schema(), engine);

        assert_eq!(
            service.query_page(input(1, 10)).await,
            Err(CoreError::QueryExecution("connection reset".to_string()))
        );
    }
}
