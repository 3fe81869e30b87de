use super::handlers::get_records::{__path_get_records, get_records};
use super::handlers::query_records::{__path_query_records, query_records};
use crate::application::http::server::app_state::AppState;

use axum::{
    Router,
    routing::{get, post},
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(paths(get_records, query_records))]
pub struct LowQueryApiDoc;

pub fn low_query_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            &format!(
                "{}/entities/{{entity}}/records",
                state.args.server.root_path
            ),
            get(get_records),
        )
        .route(
            &format!(
                "{}/entities/{{entity}}/records/query",
                state.args.server.root_path
            ),
            post(query_records),
        )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use clap::Parser;
    use lowquery_core::{application::create_service, domain::common::LowQueryConfig};
    use serde_json::{Value, json};
    use test_context::{AsyncTestContext, test_context};

    use crate::{
        application::http::server::{app_state::AppState, http_server::api_router},
        args::Args,
    };

    struct RecordsContext {
        server: TestServer,
    }

    impl AsyncTestContext for RecordsContext {
        async fn setup() -> Self {
            let demos = concat!(env!("CARGO_MANIFEST_DIR"), "/../demos");
            let args = Arc::new(Args::parse_from([
                "lowquery".to_string(),
                "--engine".to_string(),
                "memory".to_string(),
                "--schema".to_string(),
                format!("{demos}/schema.json"),
                "--fixtures".to_string(),
                format!("{demos}/fixtures.json"),
                "--max-page-size".to_string(),
                "100".to_string(),
            ]));

            let service = create_service(LowQueryConfig::from(args.as_ref().clone()))
                .await
                .expect("demo service");
            let router = api_router(AppState::new(args, service)).expect("router");

            Self {
                server: TestServer::new(router).expect("test server"),
            }
        }
    }

    fn ids(body: &Value) -> Vec<i64> {
        body["rows"]
            .as_array()
            .map(|rows| rows.iter().filter_map(|r| r["id"].as_i64()).collect())
            .unwrap_or_default()
    }

    #[test_context(RecordsContext)]
    #[tokio::test]
    async fn test_end_to_end_filter_sort_projection(ctx: &mut RecordsContext) {
        let response = ctx
            .server
            .get("/entities/User/records")
            .add_query_param("filter[status]", "1")
            .add_query_param("filter[age][between]", "18,30")
            .add_query_param("sort", "-createdAt")
            .add_query_param("fields", "name,status")
            .add_query_param("page_size", "20")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(ids(&body), vec![14, 13, 11, 10, 8, 7, 5, 4, 2]);
        assert_eq!(body["total_row_count"], json!(9));
        assert_eq!(body["total_page_count"], json!(1));
        assert_eq!(body["rows"][0], json!({ "id": 14, "name": "Peggy", "status": 1 }));
    }

    #[test_context(RecordsContext)]
    #[tokio::test]
    async fn test_pagination_totals(ctx: &mut RecordsContext) {
        let response = ctx
            .server
            .get("/entities/User/records")
            .add_query_param("sort", "id")
            .add_query_param("page_no", "3")
            .add_query_param("page_size", "10")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(ids(&body), vec![21, 22, 23, 24, 25]);
        assert_eq!(body["total_row_count"], json!(25));
        assert_eq!(body["total_page_count"], json!(3));
    }

    #[test_context(RecordsContext)]
    #[tokio::test]
    async fn test_relation_filter_and_nested_projection(ctx: &mut RecordsContext) {
        let response = ctx
            .server
            .get("/entities/User/records")
            .add_query_param("filter[department.company.code]", "ACME")
            .add_query_param("fields", "name,department.name,department.company.name")
            .add_query_param("sort", "id")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(ids(&body), vec![4, 8, 12, 16, 20, 24]);
        assert_eq!(
            body["rows"][0],
            json!({
                "id": 4,
                "name": "Dave",
                "department": {
                    "id": 10,
                    "name": "Sales",
                    "company": { "id": 100, "name": "Acme" }
                }
            })
        );
    }

    #[test_context(RecordsContext)]
    #[tokio::test]
    async fn test_view_keeps_users_without_department(ctx: &mut RecordsContext) {
        let response = ctx
            .server
            .get("/entities/User/records")
            .add_query_param("view", "UserSummary")
            .add_query_param("filter[deptId][is_null]", "")
            .add_query_param("sort", "id")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(ids(&body), vec![3, 7, 11, 15, 19, 23]);
        assert_eq!(body["rows"][0], json!({ "id": 3, "name": "Carol", "department": null }));
    }

    #[test_context(RecordsContext)]
    #[tokio::test]
    async fn test_post_query_with_or_group(ctx: &mut RecordsContext) {
        let response = ctx
            .server
            .post("/entities/User/records/query")
            .json(&json!({
                "conditions": [
                    { "columnKey": "status", "operator": "EQ", "columnValue": 2, "logicType": "OR" },
                    { "path": "email", "operator": "IS_NULL", "logic": "OR" }
                ],
                "sorts": [ { "path": "id", "direction": "ASC" } ],
                "fields": ["name"],
                "page_size": 50
            }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(ids(&body), vec![3, 5, 6, 9, 10, 12, 15, 18, 20, 21, 24, 25]);
    }

    #[test_context(RecordsContext)]
    #[tokio::test]
    async fn test_client_errors(ctx: &mut RecordsContext) {
        let unknown_path = ctx
            .server
            .get("/entities/User/records")
            .add_query_param("filter[unknownRel.x]", "1")
            .await;
        unknown_path.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = unknown_path.json();
        assert_eq!(body["code"], json!("E_BAD_REQUEST"));
        assert!(body["message"].as_str().unwrap_or_default().contains("unknownRel"));

        ctx.server
            .get("/entities/User/records")
            .add_query_param("filter[age][between]", "18")
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        ctx.server
            .get("/entities/User/records")
            .add_query_param("page_size", "0")
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        ctx.server
            .get("/entities/User/records")
            .add_query_param("page_size", "101")
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        ctx.server
            .get("/entities/User/records")
            .add_query_param("filter[age][around]", "18")
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        ctx.server
            .get("/entities/Ghost/records")
            .await
            .assert_status(StatusCode::NOT_FOUND);

        ctx.server
            .post("/entities/User/records/query")
            .json(&json!({ "fields": ["name"], "view": "UserSummary" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[test_context(RecordsContext)]
    #[tokio::test]
    async fn test_health(ctx: &mut RecordsContext) {
        let response = ctx.server.get("/health/live").await;
        response.assert_status_ok();
        response.assert_json(&json!({ "status": "UP" }));
    }
}
