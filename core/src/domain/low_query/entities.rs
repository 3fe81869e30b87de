use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Comparison operator a UI filter editor can pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    Eq,
    Ne,
    Like,
    StartsWith,
    EndsWith,
    Gt,
    Ge,
    Lt,
    Le,
    In,
    NotIn,
    Between,
    NotBetween,
    IsNull,
    IsNotNull,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "EQ",
            Operator::Ne => "NE",
            Operator::Like => "LIKE",
            Operator::StartsWith => "STARTS_WITH",
            Operator::EndsWith => "ENDS_WITH",
            Operator::Gt => "GT",
            Operator::Ge => "GE",
            Operator::Lt => "LT",
            Operator::Le => "LE",
            Operator::In => "IN",
            Operator::NotIn => "NOT_IN",
            Operator::Between => "BETWEEN",
            Operator::NotBetween => "NOT_BETWEEN",
            Operator::IsNull => "IS_NULL",
            Operator::IsNotNull => "IS_NOT_NULL",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "eq" => Ok(Operator::Eq),
            "ne" => Ok(Operator::Ne),
            "like" => Ok(Operator::Like),
            "starts_with" => Ok(Operator::StartsWith),
            "ends_with" => Ok(Operator::EndsWith),
            "gt" => Ok(Operator::Gt),
            "ge" | "gte" => Ok(Operator::Ge),
            "lt" => Ok(Operator::Lt),
            "le" | "lte" => Ok(Operator::Le),
            "in" => Ok(Operator::In),
            "not_in" => Ok(Operator::NotIn),
            "between" => Ok(Operator::Between),
            "not_between" => Ok(Operator::NotBetween),
            "is_null" => Ok(Operator::IsNull),
            "is_not_null" => Ok(Operator::IsNotNull),
            _ => Err(()),
        }
    }
}

/// Which of the two combinable groups a filter condition belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogicGroup {
    #[default]
    And,
    Or,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FilterCondition {
    #[serde(alias = "columnKey")]
    pub path: String,
    pub operator: Operator,
    #[serde(default, alias = "logicType")]
    pub logic: LogicGroup,
    #[serde(default, alias = "columnValue")]
    #[schema(value_type = Object)]
    pub value: serde_json::Value,
}

impl FilterCondition {
    pub fn new(path: &str, operator: Operator, logic: LogicGroup, value: serde_json::Value) -> Self {
        Self {
            path: path.to_string(),
            operator,
            logic,
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SortSpec {
    #[serde(alias = "columnKey")]
    pub path: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(path: &str, direction: SortDirection) -> Self {
        Self {
            path: path.to_string(),
            direction,
        }
    }

    /// Parses `field` / `-field` comma lists, e.g. `"-createdAt,name"`.
    pub fn parse_list(s: &str) -> Vec<SortSpec> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| match part.strip_prefix('-') {
                Some(field) => SortSpec::new(field, SortDirection::Desc),
                None => SortSpec::new(part.strip_prefix('+').unwrap_or(part), SortDirection::Asc),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct ProjectionSpec {
    #[serde(alias = "columnPath")]
    pub path: String,
}

impl ProjectionSpec {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
        }
    }
}

/// One bounded slice of a result set plus its totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub total_row_count: i64,
    pub total_page_count: i64,
}

impl<T> Page<T> {
    pub fn new(rows: Vec<T>, total_row_count: i64, page_size: i64) -> Self {
        let total_page_count = if page_size > 0 && total_row_count > 0 {
            total_row_count / page_size + i64::from(total_row_count % page_size != 0)
        } else {
            0
        };

        Self {
            rows,
            total_row_count,
            total_page_count,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            rows: self.rows.into_iter().map(f).collect(),
            total_row_count: self.total_row_count,
            total_page_count: self.total_page_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operator_parse() {
        assert_eq!("eq".parse::<Operator>(), Ok(Operator::Eq));
        assert_eq!("GTE".parse::<Operator>(), Ok(Operator::Ge));
        assert_eq!("not_between".parse::<Operator>(), Ok(Operator::NotBetween));
        assert!("approximately".parse::<Operator>().is_err());
    }

    #[test]
    fn test_filter_condition_accepts_legacy_names() {
        let cond: FilterCondition = serde_json::from_value(json!({
            "columnKey": "department.name",
            "operator": "LIKE",
            "logicType": "OR",
            "columnValue": "sales"
        }))
        .unwrap();
        assert_eq!(cond.path, "department.name");
        assert_eq!(cond.operator, Operator::Like);
        assert_eq!(cond.logic, LogicGroup::Or);
        assert_eq!(cond.value, json!("sales"));
    }

    #[test]
    fn test_sort_parse_list() {
        let sorts = SortSpec::parse_list("-createdAt, name,,department.name");
        assert_eq!(
            sorts,
            vec![
                SortSpec::new("createdAt", SortDirection::Desc),
                SortSpec::new("name", SortDirection::Asc),
                SortSpec::new("department.name", SortDirection::Asc),
            ]
        );
    }

    #[test]
    fn test_page_counts() {
        let page = Page::new(vec![1, 2, 3, 4, 5], 25, 10);
        assert_eq!(page.total_page_count, 3);
        assert_eq!(Page::<i32>::new(vec![], 0, 10).total_page_count, 0);
        assert_eq!(Page::<i32>::new(vec![], 20, 10).total_page_count, 2);
    }

    #[test]
    fn test_page_counts_with_huge_page_size() {
        assert_eq!(Page::<i32>::new(vec![], 25, i64::MAX).total_page_count, 1);
        assert_eq!(Page::<i32>::new(vec![], i64::MAX, i64::MAX - 1).total_page_count, 2);
    }
}
