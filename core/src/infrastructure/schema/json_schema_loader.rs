//! Loads the entity schema from a JSON document.
//!
//! ```json
//! { "entities": [ {
//!     "name": "User", "table": "sys_user", "id": "id",
//!     "fields": [ { "name": "createdAt", "column": "created_at", "kind": "TIMESTAMP" } ],
//!     "relations": [ { "name": "department", "target": "Department",
//!                      "source_key": "dept_id", "target_key": "id" } ],
//!     "views": [ { "name": "UserSummary", "paths": ["name", "department.name"] } ]
//! } ] }
//! ```

use std::{path::Path, sync::LazyLock};

use regex::Regex;
use serde::Deserialize;
use tracing::{error, info};

use crate::domain::{
    common::entities::app_errors::CoreError,
    low_query::{projection::plan_projection, value_objects::ProjectionRequest},
    schema::entities::{EntityDef, FieldKind, Schema},
};

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
});

#[derive(Debug, Deserialize)]
struct SchemaFile {
    entities: Vec<EntityFile>,
}

#[derive(Debug, Deserialize)]
struct EntityFile {
    name: String,
    table: String,
    #[serde(default = "default_id", alias = "id_field")]
    id: String,
    #[serde(default)]
    fields: Vec<FieldFile>,
    #[serde(default)]
    relations: Vec<RelationFile>,
    #[serde(default)]
    views: Vec<ViewFile>,
}

#[derive(Debug, Deserialize)]
struct FieldFile {
    name: String,
    column: Option<String>,
    kind: FieldKind,
}

#[derive(Debug, Deserialize)]
struct RelationFile {
    name: String,
    target: String,
    source_key: String,
    #[serde(default = "default_id")]
    target_key: String,
}

#[derive(Debug, Deserialize)]
struct ViewFile {
    name: String,
    paths: Vec<String>,
}

fn default_id() -> String {
    "id".to_string()
}

pub fn load_schema_file(path: &Path) -> Result<Schema, CoreError> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        error!("Failed to read schema {}: {}", path.display(), e);
        CoreError::InvalidSchema(format!("cannot read {}: {e}", path.display()))
    })?;

    let schema = parse_schema(&json)?;
    info!(entities = ?schema.entity_names(), "schema loaded from {}", path.display());
    Ok(schema)
}

pub fn parse_schema(json: &str) -> Result<Schema, CoreError> {
    let file: SchemaFile = serde_json::from_str(json).map_err(|e| {
        error!("Failed to parse schema: {}", e);
        CoreError::InvalidSchema(e.to_string())
    })?;

    let mut schema = Schema::new();
    for entity in file.entities {
        if schema.entities().any(|e| e.name == entity.name) {
            return Err(invalid(format!("entity '{}' is declared twice", entity.name)));
        }
        schema.insert(build_entity(entity)?);
    }

    validate(&schema)?;
    Ok(schema)
}

fn build_entity(file: EntityFile) -> Result<EntityDef, CoreError> {
    check_identifier(&file.name)?;
    check_identifier(&file.table)?;

    let mut entity = EntityDef::new(&file.name, &file.table, &file.id);

    for field in &file.fields {
        let column = field.column.as_deref().unwrap_or(&field.name);
        check_identifier(&field.name)?;
        check_identifier(column)?;
        entity = entity.field_with_column(&field.name, column, field.kind);
    }

    for relation in &file.relations {
        check_identifier(&relation.name)?;
        if entity.fields.contains_key(&relation.name) {
            return Err(invalid(format!(
                "'{}.{}' is both a field and a relation",
                file.name, relation.name
            )));
        }
        entity = entity.relation(
            &relation.name,
            &relation.target,
            &relation.source_key,
            &relation.target_key,
        );
    }

    for view in &file.views {
        check_identifier(&view.name)?;
        let paths: Vec<&str> = view.paths.iter().map(String::as_str).collect();
        entity = entity.view(&view.name, &paths);
    }

    Ok(entity)
}

fn validate(schema: &Schema) -> Result<(), CoreError> {
    for entity in schema.entities() {
        if entity.id().is_none() {
            return Err(invalid(format!(
                "entity '{}' has no identifier field '{}'",
                entity.name, entity.id_field
            )));
        }

        for relation in entity.relations.values() {
            let Some(target) = schema.entities().find(|e| e.name == relation.target) else {
                return Err(invalid(format!(
                    "relation '{}.{}' targets unknown entity '{}'",
                    entity.name, relation.name, relation.target
                )));
            };
            if !has_column(entity, &relation.source_key) {
                return Err(invalid(format!(
                    "relation '{}.{}' uses unknown column '{}'",
                    entity.name, relation.name, relation.source_key
                )));
            }
            if !has_column(target, &relation.target_key) {
                return Err(invalid(format!(
                    "relation '{}.{}' joins unknown column '{}.{}'",
                    entity.name, relation.name, target.name, relation.target_key
                )));
            }
        }

        for view in entity.views.keys() {
            plan_projection(schema, &entity.name, &ProjectionRequest::View(view.clone())).map_err(
                |e| invalid(format!("view '{}.{}' does not resolve: {e}", entity.name, view)),
            )?;
        }
    }

    Ok(())
}

fn has_column(entity: &EntityDef, column: &str) -> bool {
    entity.fields.values().any(|f| f.column == column)
}

fn check_identifier(name: &str) -> Result<(), CoreError> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(invalid(format!("'{name}' is not a valid identifier")))
    }
}

fn invalid(message: String) -> CoreError {
    error!("Invalid schema: {}", message);
    CoreError::InvalidSchema(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::ports::SchemaRegistry;
    use serde_json::json;

    fn document() -> serde_json::Value {
        json!({
            "entities": [
                {
                    "name": "Department",
                    "table": "sys_dept",
                    "fields": [
                        { "name": "id", "kind": "INTEGER" },
                        { "name": "name", "kind": "STRING" }
                    ]
                },
                {
                    "name": "User",
                    "table": "sys_user",
                    "fields": [
                        { "name": "id", "kind": "INTEGER" },
                        { "name": "name", "kind": "STRING" },
                        { "name": "deptId", "column": "dept_id", "kind": "INTEGER" }
                    ],
                    "relations": [
                        { "name": "department", "target": "Department", "source_key": "dept_id" }
                    ],
                    "views": [ { "name": "Summary", "paths": ["name", "department.name"] } ]
                }
            ]
        })
    }

    #[test]
    fn test_parse_valid_schema() {
        let schema = parse_schema(&document().to_string()).unwrap();

        assert_eq!(schema.entity_names(), vec!["Department", "User"]);
        assert_eq!(schema.relation_target("User", "department"), Some("Department"));
        assert_eq!(schema.field("User", "deptId").map(|f| f.column.as_str()), Some("dept_id"));
        assert_eq!(schema.relation("User", "department").map(|r| r.target_key.as_str()), Some("id"));
        assert!(schema.view("User", "Summary").is_some());
    }

    #[test]
    fn test_rejects_bad_identifiers() {
        let mut doc = document();
        doc["entities"][0]["table"] = json!("sys_dept; DROP TABLE x");
        assert!(matches!(parse_schema(&doc.to_string()), Err(CoreError::InvalidSchema(_))));
    }

    #[test]
    fn test_rejects_dangling_relation() {
        let mut doc = document();
        doc["entities"][1]["relations"][0]["target"] = json!("Team");
        assert!(matches!(
            parse_schema(&doc.to_string()),
            Err(CoreError::InvalidSchema(msg)) if msg.contains("Team")
        ));

        let mut doc = document();
        doc["entities"][1]["relations"][0]["source_key"] = json!("team_id");
        assert!(matches!(
            parse_schema(&doc.to_string()),
            Err(CoreError::InvalidSchema(msg)) if msg.contains("team_id")
        ));
    }

    #[test]
    fn test_rejects_missing_identifier_and_broken_view() {
        let mut doc = document();
        doc["entities"][0]["id"] = json!("code");
        assert!(parse_schema(&doc.to_string()).is_err());

        let mut doc = document();
        doc["entities"][1]["views"][0]["paths"] = json!(["department.budget"]);
        assert!(matches!(
            parse_schema(&doc.to_string()),
            Err(CoreError::InvalidSchema(msg)) if msg.contains("Summary")
        ));
    }
}
