use lowquery_core::domain::low_query::entities::{LogicGroup, Operator, SortSpec};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryParamsError {
    #[error("unknown filter operator '{0}'")]
    UnknownOperator(String),

    #[error("malformed filter parameter '{0}'")]
    MalformedFilter(String),

    #[error("'{key}' must be an integer, got '{value}'")]
    InvalidNumber { key: String, value: String },
}

/// One `filter[...]` / `or[...]` query parameter, value still raw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterParam {
    pub path: String,
    pub operator: Operator,
    pub logic: LogicGroup,
    pub value: String,
}

/// Parsed record query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordQueryParams {
    pub filters: Vec<FilterParam>,
    pub sort: Vec<SortSpec>,
    pub fields: Vec<String>,
    pub view: Option<String>,
    pub page_no: Option<i64>,
    pub page_size: Option<i64>,
}

impl RecordQueryParams {
    /// Parses query pairs in the order they appear.
    ///
    /// Handles formats like:
    /// - filter[path]=value (defaults to eq)
    /// - filter[path][operator]=value
    /// - or[path][operator]=value (OR group)
    /// - sort=path or sort=-path,other.path
    /// - fields=name,department.name or view=UserSummary
    /// - page_no=1, page_size=20
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, QueryParamsError> {
        let mut params = Self::default();

        for (key, value) in pairs {
            if let Some(rest) = key.strip_prefix("filter[") {
                params.filters.push(parse_filter(key, rest, LogicGroup::And, value)?);
            } else if let Some(rest) = key.strip_prefix("or[") {
                params.filters.push(parse_filter(key, rest, LogicGroup::Or, value)?);
            } else {
                match key.as_str() {
                    "sort" => params.sort.extend(SortSpec::parse_list(value)),
                    "fields" => params.fields.extend(
                        value
                            .split(',')
                            .map(str::trim)
                            .filter(|f| !f.is_empty())
                            .map(str::to_string),
                    ),
                    "view" if !value.trim().is_empty() => {
                        params.view = Some(value.trim().to_string())
                    }
                    "page_no" => params.page_no = Some(parse_number(key, value)?),
                    "page_size" => params.page_size = Some(parse_number(key, value)?),
                    _ => {}
                }
            }
        }

        Ok(params)
    }
}

/// `rest` is the key after its opening bracket: `path]` or `path][op]`.
fn parse_filter(
    key: &str,
    rest: &str,
    logic: LogicGroup,
    value: &str,
) -> Result<FilterParam, QueryParamsError> {
    let malformed = || QueryParamsError::MalformedFilter(key.to_string());

    let end_bracket = rest.find(']').ok_or_else(malformed)?;
    let path = rest[..end_bracket].trim();
    if path.is_empty() {
        return Err(malformed());
    }

    let remaining = &rest[end_bracket + 1..];
    let operator = if remaining.is_empty() {
        Operator::Eq
    } else if let Some(op) = remaining
        .strip_prefix('[')
        .and_then(|r| r.strip_suffix(']'))
    {
        op.parse::<Operator>()
            .map_err(|_| QueryParamsError::UnknownOperator(op.to_string()))?
    } else {
        return Err(malformed());
    };

    Ok(FilterParam {
        path: path.to_string(),
        operator,
        logic,
        value: value.to_string(),
    })
}

fn parse_number(key: &str, value: &str) -> Result<i64, QueryParamsError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| QueryParamsError::InvalidNumber {
            key: key.to_string(),
            value: value.to_string(),
        })
}
