use axum::extract::{Path, State};
use lowquery_core::domain::low_query::{entities::Page, ports::QueryService};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::application::http::{
    query_builder::input_from_params,
    query_extractor::RecordQueryExtractor,
    server::{
        api_entities::{api_error::ApiError, response::Response},
        app_state::AppState,
    },
};

/// One page of nested records.
#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct RecordsResponse {
    #[schema(value_type = Vec<Object>)]
    pub rows: Vec<Value>,
    pub total_row_count: i64,
    pub total_page_count: i64,
}

impl From<Page<Value>> for RecordsResponse {
    fn from(page: Page<Value>) -> Self {
        Self {
            rows: page.rows,
            total_row_count: page.total_row_count,
            total_page_count: page.total_page_count,
        }
    }
}

#[utoipa::path(
    get,
    path = "/{entity}/records",
    tag = "records",
    summary = "List records",
    description = "Filters, sorts, projects and pages the records of an entity. Filters use `filter[path][op]=value` (AND group) and `or[path][op]=value` (OR group); `in`/`not_in` take comma lists and a missing operator means `eq`.",
    params(
        ("entity" = String, Path, description = "Entity name"),
        ("sort" = Option<String>, Query, description = "Comma list of paths, `-` prefix for descending"),
        ("fields" = Option<String>, Query, description = "Comma list of projection paths"),
        ("view" = Option<String>, Query, description = "Predeclared view name"),
        ("page_no" = Option<i64>, Query, description = "1-indexed page number"),
        ("page_size" = Option<i64>, Query, description = "Rows per page"),
    ),
    responses(
        (status = 200, body = RecordsResponse),
        (status = 400, description = "Invalid path, operator value or page request"),
        (status = 404, description = "Unknown entity"),
    ),
)]
pub async fn get_records(
    Path(entity): Path<String>,
    State(state): State<AppState>,
    RecordQueryExtractor(params): RecordQueryExtractor,
) -> Result<Response<RecordsResponse>, ApiError> {
    let page = state
        .service
        .query_page(input_from_params(entity, params))
        .await
        .map_err(ApiError::from)?;

    Ok(Response::OK(page.into()))
}
