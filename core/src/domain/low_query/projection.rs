//! Plans which fields and relations a query materializes.
//!
//! The plan is an explicit tree: children are keyed by relation name, so specs
//! sharing a prefix fan out under one node instead of duplicating it.

use std::collections::{BTreeMap, btree_map::Entry};

use crate::domain::{
    common::entities::app_errors::CoreError,
    low_query::{
        path::{
            ColumnRef, FieldHandle, JoinStep, RelationChain, field_handle, join_step, root_entity,
            split_path,
        },
        value_objects::ProjectionRequest,
    },
    schema::{entities::EntityDef, ports::SchemaRegistry},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchNode {
    pub entity: String,
    pub id: String,
    pub fields: BTreeMap<String, FieldHandle>,
    pub children: BTreeMap<String, FetchChild>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchChild {
    pub step: JoinStep,
    pub node: FetchNode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTree {
    pub root: FetchNode,
}

/// A projected column together with the label it is returned under
/// (`department.company.name`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedColumn {
    pub label: String,
    pub column: ColumnRef,
}

impl FetchNode {
    /// A node holding only the entity's identifier.
    fn with_id(entity: &EntityDef, path: &str) -> Result<Self, CoreError> {
        let id = field_handle(entity, &entity.id_field, path)?;
        Ok(Self {
            entity: entity.name.clone(),
            id: id.name.clone(),
            fields: BTreeMap::from([(id.name.clone(), id)]),
            children: BTreeMap::new(),
        })
    }

    pub fn id_field(&self) -> Option<&FieldHandle> {
        self.fields.get(&self.id)
    }
}

impl FetchTree {
    /// Every relation chain the tree traverses, parents before children.
    pub fn chains(&self) -> Vec<RelationChain> {
        let mut chains = Vec::new();
        collect_chains(&self.root, &RelationChain::default(), &mut chains);
        chains
    }

    /// Every projected column, depth first, fields before children.
    pub fn columns(&self) -> Vec<ProjectedColumn> {
        let mut columns = Vec::new();
        collect_columns(&self.root, &RelationChain::default(), "", &mut columns);
        columns
    }
}

fn collect_chains(node: &FetchNode, chain: &RelationChain, out: &mut Vec<RelationChain>) {
    for child in node.children.values() {
        let mut next = chain.clone();
        next.push(child.step.clone());
        out.push(next.clone());
        collect_chains(&child.node, &next, out);
    }
}

fn collect_columns(node: &FetchNode, chain: &RelationChain, prefix: &str, out: &mut Vec<ProjectedColumn>) {
    for field in node.fields.values() {
        out.push(ProjectedColumn {
            label: format!("{prefix}{}", field.name),
            column: ColumnRef {
                chain: chain.clone(),
                field: field.clone(),
            },
        });
    }

    for (name, child) in &node.children {
        let mut next = chain.clone();
        next.push(child.step.clone());
        collect_columns(&child.node, &next, &format!("{prefix}{name}."), out);
    }
}

pub fn plan_projection<S: SchemaRegistry + ?Sized>(
    schema: &S,
    root: &str,
    request: &ProjectionRequest,
) -> Result<FetchTree, CoreError> {
    let entity = root_entity(schema, root)?;

    match request {
        ProjectionRequest::Entity => full_entity(entity),
        ProjectionRequest::Paths(specs) if specs.is_empty() => full_entity(entity),
        ProjectionRequest::Paths(specs) => {
            plan_paths(schema, entity, specs.iter().map(|s| s.path.as_str()))
        }
        ProjectionRequest::View(name) => {
            let view = schema.view(root, name).ok_or_else(|| CoreError::UnknownView {
                entity: root.to_string(),
                view: name.clone(),
            })?;
            plan_paths(schema, entity, view.paths.iter().map(String::as_str))
        }
    }
}

fn full_entity(entity: &EntityDef) -> Result<FetchTree, CoreError> {
    let mut root = FetchNode::with_id(entity, &entity.id_field)?;
    for field in entity.fields.keys() {
        let handle = field_handle(entity, field, field)?;
        root.fields.insert(handle.name.clone(), handle);
    }
    Ok(FetchTree { root })
}

fn plan_paths<'p, S: SchemaRegistry + ?Sized>(
    schema: &S,
    entity: &EntityDef,
    paths: impl Iterator<Item = &'p str>,
) -> Result<FetchTree, CoreError> {
    let mut root = FetchNode::with_id(entity, &entity.id_field)?;
    for path in paths {
        add_path(schema, entity, &mut root, path)?;
    }
    Ok(FetchTree { root })
}

fn add_path<S: SchemaRegistry + ?Sized>(
    schema: &S,
    root_entity_def: &EntityDef,
    root: &mut FetchNode,
    path: &str,
) -> Result<(), CoreError> {
    let segments = split_path(path)?;
    let path = path.trim();
    let Some((leaf, relations)) = segments.split_last() else {
        return Err(CoreError::path_resolution(path, ""));
    };

    let mut entity = root_entity_def;
    let mut node = root;

    for segment in relations {
        let (next_entity, next_node) = descend(schema, entity, node, segment, path)?;
        entity = next_entity;
        node = next_node;
    }

    if entity.fields.contains_key(*leaf) {
        let handle = field_handle(entity, leaf, path)?;
        node.fields.insert(handle.name.clone(), handle);
    } else if entity.relations.contains_key(*leaf) {
        descend(schema, entity, node, leaf, path)?;
    } else {
        return Err(CoreError::path_resolution(path, leaf));
    }

    Ok(())
}

/// Moves to the child for `relation`, creating it (with its identifier) on
/// first use.
fn descend<'s, 'n, S: SchemaRegistry + ?Sized>(
    schema: &'s S,
    entity: &EntityDef,
    node: &'n mut FetchNode,
    relation: &str,
    path: &str,
) -> Result<(&'s EntityDef, &'n mut FetchNode), CoreError> {
    let step = join_step(schema, entity, relation, path)?;
    let target = root_entity(schema, &step.target_entity)?;

    let child = match node.children.entry(step.relation.clone()) {
        Entry::Occupied(entry) => entry.into_mut(),
        Entry::Vacant(entry) => entry.insert(FetchChild {
            node: FetchNode::with_id(target, path)?,
            step,
        }),
    };

    Ok((target, &mut child.node))
}
