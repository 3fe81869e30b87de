use crate::domain::{
    common::entities::app_errors::CoreError,
    schema::{
        entities::{EntityDef, FieldKind},
        ports::SchemaRegistry,
    },
};

/// One association traversal, with everything an engine needs to perform it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JoinStep {
    pub relation: String,
    pub source_entity: String,
    pub target_entity: String,
    pub target_table: String,
    pub source_column: String,
    pub target_column: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RelationChain {
    pub steps: Vec<JoinStep>,
}

impl RelationChain {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn push(&mut self, step: JoinStep) {
        self.steps.push(step);
    }

    /// The chain without its last step; the root chain is its own parent.
    pub fn parent(&self) -> RelationChain {
        let len = self.steps.len().saturating_sub(1);
        RelationChain {
            steps: self.steps[..len].to_vec(),
        }
    }

    /// Dot-joined relation names, empty for the root.
    pub fn key(&self) -> String {
        self.steps
            .iter()
            .map(|s| s.relation.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Leaf field of a resolved path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldHandle {
    pub entity: String,
    pub name: String,
    pub column: String,
    pub kind: FieldKind,
}

/// A column reachable from the root entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub chain: RelationChain,
    pub field: FieldHandle,
}

pub fn root_entity<'a, S: SchemaRegistry + ?Sized>(
    schema: &'a S,
    root: &str,
) -> Result<&'a EntityDef, CoreError> {
    schema
        .entity(root)
        .ok_or_else(|| CoreError::UnknownEntity(root.to_string()))
}

/// Builds the join step for `relation` on `entity`, or fails naming the segment.
pub fn join_step<S: SchemaRegistry + ?Sized>(
    schema: &S,
    entity: &EntityDef,
    relation: &str,
    path: &str,
) -> Result<JoinStep, CoreError> {
    let rel = entity
        .relations
        .get(relation)
        .ok_or_else(|| CoreError::path_resolution(path, relation))?;
    let target = schema
        .entity(&rel.target)
        .ok_or_else(|| CoreError::path_resolution(path, relation))?;

    Ok(JoinStep {
        relation: rel.name.clone(),
        source_entity: entity.name.clone(),
        target_entity: target.name.clone(),
        target_table: target.table.clone(),
        source_column: rel.source_key.clone(),
        target_column: rel.target_key.clone(),
    })
}

pub fn field_handle(entity: &EntityDef, name: &str, path: &str) -> Result<FieldHandle, CoreError> {
    entity
        .fields
        .get(name)
        .map(|f| FieldHandle {
            entity: entity.name.clone(),
            name: f.name.clone(),
            column: f.column.clone(),
            kind: f.kind,
        })
        .ok_or_else(|| CoreError::path_resolution(path, name))
}

/// Splits a dot-separated path, rejecting empty paths and empty segments.
pub fn split_path(path: &str) -> Result<Vec<&str>, CoreError> {
    let trimmed = path.trim();
    let segments: Vec<&str> = trimmed.split('.').map(str::trim).collect();

    if let Some(empty) = segments.iter().find(|s| s.is_empty()) {
        return Err(CoreError::path_resolution(trimmed, empty));
    }

    Ok(segments)
}

/// Resolves `path` against `root` into the joins it needs and its leaf field.
pub fn resolve<S: SchemaRegistry + ?Sized>(
    schema: &S,
    root: &str,
    path: &str,
) -> Result<ColumnRef, CoreError> {
    let segments = split_path(path)?;
    let path = path.trim();
    let (leaf, relations) = segments
        .split_last()
        .ok_or_else(|| CoreError::path_resolution(path, ""))?;

    let mut entity = root_entity(schema, root)?;
    let mut chain = RelationChain::default();

    for relation in relations {
        let step = join_step(schema, entity, relation, path)?;
        entity = root_entity(schema, &step.target_entity)?;
        chain.push(step);
    }

    let field = field_handle(entity, leaf, path)?;

    Ok(ColumnRef { chain, field })
}
