use thiserror::Error;

use crate::domain::low_query::entities::Operator;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("cannot resolve segment '{segment}' of path '{path}'")]
    PathResolution { path: String, segment: String },

    #[error("operator {operator} cannot be applied to value {value}")]
    InvalidOperatorValue { operator: Operator, value: String },

    #[error("invalid page request: page_no={page_no}, page_size={page_size}")]
    InvalidPageRequest { page_no: i64, page_size: i64 },

    #[error("unknown entity '{0}'")]
    UnknownEntity(String),

    #[error("entity '{entity}' has no view named '{view}'")]
    UnknownView { entity: String, view: String },

    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    #[error("query execution failed: {0}")]
    QueryExecution(String),

    #[error("Internal server error")]
    InternalServerError,
}

impl CoreError {
    pub fn path_resolution(path: &str, segment: &str) -> Self {
        Self::PathResolution {
            path: path.to_string(),
            segment: segment.to_string(),
        }
    }

    pub fn invalid_value(operator: Operator, value: &serde_json::Value) -> Self {
        Self::InvalidOperatorValue {
            operator,
            value: value.to_string(),
        }
    }

    /// Errors caused by the caller's metadata or request rather than by the engine.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CoreError::PathResolution { .. }
                | CoreError::InvalidOperatorValue { .. }
                | CoreError::InvalidPageRequest { .. }
                | CoreError::UnknownEntity(_)
                | CoreError::UnknownView { .. }
        )
    }
}
