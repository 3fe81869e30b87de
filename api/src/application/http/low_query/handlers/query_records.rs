use axum::extract::{Path, State};
use lowquery_core::domain::low_query::ports::QueryService;

use crate::application::http::{
    low_query::{handlers::get_records::RecordsResponse, validators::QueryRecordsValidator},
    query_builder::input_from_body,
    server::{
        api_entities::{
            api_error::{ApiError, ValidateJson},
            response::Response,
        },
        app_state::AppState,
    },
};

#[utoipa::path(
    post,
    path = "/{entity}/records/query",
    tag = "records",
    summary = "Query records",
    description = "Same as listing records, with the search state sent as JSON. Conditions accept the legacy `columnKey`/`columnValue`/`logicType` names.",
    params(
        ("entity" = String, Path, description = "Entity name"),
    ),
    request_body = QueryRecordsValidator,
    responses(
        (status = 200, body = RecordsResponse),
        (status = 400, description = "Invalid body, path, operator value or page request"),
        (status = 404, description = "Unknown entity"),
    ),
)]
pub async fn query_records(
    Path(entity): Path<String>,
    State(state): State<AppState>,
    ValidateJson(payload): ValidateJson<QueryRecordsValidator>,
) -> Result<Response<RecordsResponse>, ApiError> {
    let page = state
        .service
        .query_page(input_from_body(entity, payload))
        .await
        .map_err(ApiError::from)?;

    Ok(Response::OK(page.into()))
}
