use lowquery_core::domain::low_query::entities::{FilterCondition, SortSpec};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// JSON body of `POST .../records/query`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_projection"))]
pub struct QueryRecordsValidator {
    #[serde(default)]
    #[validate(custom(function = "validate_condition_paths"))]
    pub conditions: Vec<FilterCondition>,

    #[serde(default)]
    pub sorts: Vec<SortSpec>,

    /// Projection paths; empty selects every field of the entity.
    #[serde(default)]
    pub fields: Vec<String>,

    /// Predeclared view; cannot be combined with `fields`.
    #[serde(default)]
    pub view: Option<String>,

    #[serde(default)]
    pub page_no: Option<i64>,

    #[serde(default)]
    pub page_size: Option<i64>,
}

fn validate_condition_paths(conditions: &[FilterCondition]) -> Result<(), ValidationError> {
    if conditions.iter().any(|c| c.path.trim().is_empty()) {
        return Err(ValidationError::new("empty_path").with_message("condition path is required".into()));
    }
    Ok(())
}

fn validate_projection(body: &QueryRecordsValidator) -> Result<(), ValidationError> {
    if body.view.is_some() && !body.fields.is_empty() {
        return Err(ValidationError::new("projection")
            .with_message("use either fields or view, not both".into()));
    }
    Ok(())
}
