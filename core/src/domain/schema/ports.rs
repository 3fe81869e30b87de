use crate::domain::schema::entities::{EntityDef, FieldDef, RelationDef, ViewDef};

/// Name-based lookup of entities, their fields and their associations.
///
/// Implementations only need [`SchemaRegistry::entity`]; every other lookup is
/// derived from it.
pub trait SchemaRegistry: Send + Sync {
    fn entity(&self, name: &str) -> Option<&EntityDef>;

    fn field(&self, entity: &str, name: &str) -> Option<&FieldDef> {
        self.entity(entity).and_then(|e| e.fields.get(name))
    }

    fn relation(&self, entity: &str, name: &str) -> Option<&RelationDef> {
        self.entity(entity).and_then(|e| e.relations.get(name))
    }

    fn has_field(&self, entity: &str, name: &str) -> bool {
        self.field(entity, name).is_some()
    }

    fn has_relation(&self, entity: &str, name: &str) -> bool {
        self.relation(entity, name).is_some()
    }

    fn relation_target(&self, entity: &str, name: &str) -> Option<&str> {
        self.relation(entity, name).map(|r| r.target.as_str())
    }

    fn view(&self, entity: &str, name: &str) -> Option<&ViewDef> {
        self.entity(entity).and_then(|e| e.views.get(name))
    }
}
