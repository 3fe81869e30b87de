use axum::{extract::FromRequestParts, http::request::Parts};

use super::{query_params::RecordQueryParams, server::api_entities::api_error::ApiError};

/// Extractor for record query strings (filters, sort, projection, pagination).
///
/// Usage:
/// ```rust,ignore
/// async fn handler(
///     RecordQueryExtractor(params): RecordQueryExtractor,
/// ) -> Result<Response<Page<Value>>, ApiError> {
///     // Use params.filters, params.sort, params.fields, params.page_no
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RecordQueryExtractor(pub RecordQueryParams);

impl<S> FromRequestParts<S> for RecordQueryExtractor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query_string = parts.uri.query().unwrap_or("");
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query_string)
            .map_err(|e| ApiError::BadRequest(format!("invalid query string: {e}")))?;

        let params = RecordQueryParams::from_pairs(&pairs)
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        Ok(RecordQueryExtractor(params))
    }
}
