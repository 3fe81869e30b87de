//! Turns HTTP query inputs into compiler inputs.

use lowquery_core::domain::low_query::{
    entities::{FilterCondition, Operator, ProjectionSpec},
    value_objects::{LowQueryInput, PageRequest, ProjectionRequest},
};
use serde_json::Value;

use super::{
    low_query::validators::QueryRecordsValidator,
    query_params::{FilterParam, RecordQueryParams},
};

/// Query-string values are always text; list operators take comma lists and
/// null tests ignore the value.
pub fn filter_value(operator: Operator, raw: &str) -> Value {
    match operator {
        Operator::In | Operator::NotIn => Value::Array(
            raw.split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| Value::String(v.to_string()))
                .collect(),
        ),
        Operator::IsNull | Operator::IsNotNull => Value::Null,
        _ => Value::String(raw.to_string()),
    }
}

impl From<FilterParam> for FilterCondition {
    fn from(param: FilterParam) -> Self {
        FilterCondition {
            value: filter_value(param.operator, &param.value),
            path: param.path,
            operator: param.operator,
            logic: param.logic,
        }
    }
}

pub fn projection_request(view: Option<String>, fields: Vec<String>) -> ProjectionRequest {
    match view {
        Some(view) => ProjectionRequest::View(view),
        None if fields.is_empty() => ProjectionRequest::Entity,
        None => ProjectionRequest::Paths(fields.iter().map(|f| ProjectionSpec::new(f)).collect()),
    }
}

fn page_request(page_no: Option<i64>, page_size: Option<i64>) -> PageRequest {
    let default = PageRequest::default();
    PageRequest::new(
        page_no.unwrap_or(default.page_no),
        page_size.unwrap_or(default.page_size),
    )
}

pub fn input_from_params(entity: String, params: RecordQueryParams) -> LowQueryInput {
    LowQueryInput {
        entity,
        conditions: params.filters.into_iter().map(FilterCondition::from).collect(),
        sorts: params.sort,
        projection: projection_request(params.view, params.fields),
        page: page_request(params.page_no, params.page_size),
    }
}

pub fn input_from_body(entity: String, body: QueryRecordsValidator) -> LowQueryInput {
    LowQueryInput {
        entity,
        conditions: body.conditions,
        sorts: body.sorts,
        projection: projection_request(body.view, body.fields),
        page: page_request(body.page_no, body.page_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lowquery_core::domain::low_query::entities::LogicGroup;
    use serde_json::json;

    #[test]
    fn test_filter_values_by_operator() {
        assert_eq!(filter_value(Operator::In, "1, 2,,3"), json!(["1", "2", "3"]));
        assert_eq!(filter_value(Operator::NotIn, ""), json!([]));
        assert_eq!(filter_value(Operator::IsNotNull, "whatever"), Value::Null);
        assert_eq!(filter_value(Operator::Between, "18,30"), json!("18,30"));
    }

    #[test]
    fn test_input_from_params_defaults() {
        let input = input_from_params(
            "User".to_string(),
            RecordQueryParams {
                filters: vec![FilterParam {
                    path: "status".to_string(),
                    operator: Operator::In,
                    logic: LogicGroup::Or,
                    value: "1,2".to_string(),
                }],
                ..Default::default()
            },
        );

        assert_eq!(input.page, PageRequest::new(1, 20));
        assert_eq!(input.projection, ProjectionRequest::Entity);
        assert_eq!(
            input.conditions,
            vec![FilterCondition::new("status", Operator::In, LogicGroup::Or, json!(["1", "2"]))]
        );
    }

    #[test]
    fn test_view_takes_precedence() {
        assert_eq!(
            projection_request(Some("UserSummary".to_string()), vec![]),
            ProjectionRequest::View("UserSummary".to_string())
        );
        assert_eq!(
            projection_request(None, vec!["name".to_string()]),
            ProjectionRequest::Paths(vec![ProjectionSpec::new("name")])
        );
    }
}
