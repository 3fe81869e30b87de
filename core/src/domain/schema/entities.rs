use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::schema::ports::SchemaRegistry;

/// Storage type of a scalar field; drives how filter values are conformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldKind {
    String,
    Integer,
    Float,
    Boolean,
    Timestamp,
    Date,
    Uuid,
}

impl FieldKind {
    pub fn is_ordered(&self) -> bool {
        !matches!(self, FieldKind::Boolean)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub column: String,
    pub kind: FieldKind,
}

/// To-one association: `source.source_key = target.target_key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDef {
    pub name: String,
    pub target: String,
    pub source_key: String,
    pub target_key: String,
}

/// Predeclared result shape of an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewDef {
    pub name: String,
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDef {
    pub name: String,
    pub table: String,
    pub id_field: String,
    pub fields: BTreeMap<String, FieldDef>,
    pub relations: BTreeMap<String, RelationDef>,
    pub views: BTreeMap<String, ViewDef>,
}

impl EntityDef {
    pub fn new(name: impl Into<String>, table: impl Into<String>, id_field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            id_field: id_field.into(),
            fields: BTreeMap::new(),
            relations: BTreeMap::new(),
            views: BTreeMap::new(),
        }
    }

    /// Adds a field whose column has the same name.
    pub fn field(self, name: &str, kind: FieldKind) -> Self {
        self.field_with_column(name, name, kind)
    }

    pub fn field_with_column(mut self, name: &str, column: &str, kind: FieldKind) -> Self {
        self.fields.insert(
            name.to_string(),
            FieldDef {
                name: name.to_string(),
                column: column.to_string(),
                kind,
            },
        );
        self
    }

    pub fn relation(mut self, name: &str, target: &str, source_key: &str, target_key: &str) -> Self {
        self.relations.insert(
            name.to_string(),
            RelationDef {
                name: name.to_string(),
                target: target.to_string(),
                source_key: source_key.to_string(),
                target_key: target_key.to_string(),
            },
        );
        self
    }

    pub fn view(mut self, name: &str, paths: &[&str]) -> Self {
        self.views.insert(
            name.to_string(),
            ViewDef {
                name: name.to_string(),
                paths: paths.iter().map(|p| p.to_string()).collect(),
            },
        );
        self
    }

    pub fn id(&self) -> Option<&FieldDef> {
        self.fields.get(&self.id_field)
    }
}

/// Registry of entity definitions keyed by entity name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    entities: HashMap<String, EntityDef>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity(mut self, entity: EntityDef) -> Self {
        self.insert(entity);
        self
    }

    pub fn insert(&mut self, entity: EntityDef) {
        self.entities.insert(entity.name.clone(), entity);
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityDef> {
        self.entities.values()
    }

    pub fn entity_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entities.keys().cloned().collect();
        names.sort();
        names
    }
}

impl SchemaRegistry for Schema {
    fn entity(&self, name: &str) -> Option<&EntityDef> {
        self.entities.get(name)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::sample_schema;
    use super::*;

    #[test]
    fn test_registry_lookups() {
        let schema = sample_schema();
        assert!(schema.has_relation("User", "department"));
        assert!(!schema.has_relation("User", "name"));
        assert_eq!(schema.relation_target("Department", "company"), Some("Company"));
        assert!(schema.has_field("User", "createdAt"));
        assert_eq!(schema.field("User", "createdAt").map(|f| f.column.as_str()), Some("created_at"));
        assert!(schema.view("User", "UserSummary").is_some());
        assert!(schema.entity("Nope").is_none());
    }
}
