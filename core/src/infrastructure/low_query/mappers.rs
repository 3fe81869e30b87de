use serde_json::{Map, Value};

use crate::{
    domain::low_query::projection::{FetchNode, FetchTree, ProjectedColumn},
    infrastructure::low_query::sql_renderer::column_label,
};

/// Renames the positional columns of a rendered page query (`c0`, `c1`, ...)
/// back to their projection labels.
pub fn relabel_row(columns: &[ProjectedColumn], mut positional: Map<String, Value>) -> Map<String, Value> {
    columns
        .iter()
        .enumerate()
        .map(|(position, column)| {
            let value = positional.remove(&column_label(position)).unwrap_or(Value::Null);
            (column.label.clone(), value)
        })
        .collect()
}

/// Rebuilds the nested result shape from a row whose columns are labelled with
/// their projection path (`department.company.name`).
///
/// A related entity whose identifier is null was not found by its left join
/// and becomes `null`.
pub fn nest_row(tree: &FetchTree, flat: &Map<String, Value>) -> Value {
    nest_node(&tree.root, "", flat)
}

fn nest_node(node: &FetchNode, prefix: &str, flat: &Map<String, Value>) -> Value {
    let mut object = Map::new();

    for name in node.fields.keys() {
        let value = flat
            .get(&format!("{prefix}{name}"))
            .cloned()
            .unwrap_or(Value::Null);
        object.insert(name.clone(), value);
    }

    for (relation, child) in &node.children {
        let child_prefix = format!("{prefix}{relation}.");
        let present = flat
            .get(&format!("{child_prefix}{}", child.node.id))
            .is_some_and(|id| !id.is_null());

        let value = if present {
            nest_node(&child.node, &child_prefix, flat)
        } else {
            Value::Null
        };
        object.insert(relation.clone(), value);
    }

    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        low_query::{entities::ProjectionSpec, projection::plan_projection, value_objects::ProjectionRequest},
        schema::entities::test_support::sample_schema,
    };
    use serde_json::json;

    fn tree() -> FetchTree {
        plan_projection(
            &sample_schema(),
            "User",
            &ProjectionRequest::Paths(vec![
                ProjectionSpec::new("name"),
                ProjectionSpec::new("department.name"),
                ProjectionSpec::new("department.company.code"),
            ]),
        )
        .unwrap()
    }

    #[test]
    fn test_nests_by_label() {
        let flat = json!({
            "id": 1,
            "name": "Alice",
            "department.id": 10,
            "department.name": "Sales",
            "department.company.id": 100,
            "department.company.code": "ACME",
        });

        assert_eq!(
            nest_row(&tree(), flat.as_object().unwrap()),
            json!({
                "id": 1,
                "name": "Alice",
                "department": {
                    "id": 10,
                    "name": "Sales",
                    "company": { "id": 100, "code": "ACME" }
                }
            })
        );
    }

    #[test]
    fn test_missing_relation_is_null() {
        let flat = json!({
            "id": 2,
            "name": "Bob",
            "department.id": null,
            "department.name": null,
            "department.company.id": null,
            "department.company.code": null,
        });

        assert_eq!(
            nest_row(&tree(), flat.as_object().unwrap()),
            json!({ "id": 2, "name": "Bob", "department": null })
        );
    }

    #[test]
    fn test_relabels_positional_columns() {
        let tree = tree();
        let positional = json!({
            "c0": 1,
            "c1": "Alice",
            "c2": 10,
            "c3": "Sales",
            "c4": "ACME",
            "c5": 100,
        });

        let flat = relabel_row(&tree.columns(), positional.as_object().unwrap().clone());

        assert_eq!(flat.get("department.company.code"), Some(&json!("ACME")));
        assert_eq!(
            nest_row(&tree, &flat),
            json!({
                "id": 1,
                "name": "Alice",
                "department": {
                    "id": 10,
                    "name": "Sales",
                    "company": { "id": 100, "code": "ACME" }
                }
            })
        );
    }
}
