use std::collections::BTreeMap;

use crate::domain::{
    common::entities::app_errors::CoreError,
    low_query::{
        condition::build_condition_tree,
        path::{ColumnRef, RelationChain, root_entity},
        predicate::Predicate,
        projection::{FetchTree, plan_projection},
        sort::{OrderInstruction, build_order},
        value_objects::LowQueryInput,
    },
    schema::ports::SchemaRegistry,
};

/// How a relation chain is joined into the root table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// Rows without the related entity are kept; its fields read as null.
    Left,
    /// Rows without the related entity are excluded.
    Inner,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedJoin {
    pub chain: RelationChain,
    pub kind: JoinKind,
}

/// Everything an engine needs to run one paged query.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub entity: String,
    pub table: String,
    pub predicate: Option<Predicate>,
    pub order: Vec<OrderInstruction>,
    pub projection: FetchTree,
}

impl CompiledQuery {
    /// Chains read by the predicate or the ordering, every prefix included.
    pub fn inner_join_chains(&self) -> Vec<RelationChain> {
        let mut chains = Vec::new();
        let mut add = |chain: &RelationChain| {
            for depth in 1..=chain.len() {
                let prefix = RelationChain {
                    steps: chain.steps[..depth].to_vec(),
                };
                if !chains.contains(&prefix) {
                    chains.push(prefix);
                }
            }
        };

        if let Some(predicate) = &self.predicate {
            predicate.for_each_column(&mut |column: &ColumnRef| add(&column.chain));
        }
        for instruction in &self.order {
            add(&instruction.column.chain);
        }

        chains
    }

    /// Joins to perform, deduplicated by chain and ordered so parents come
    /// before children. A chain used both for filtering and projection is inner.
    pub fn joins(&self) -> Vec<PlannedJoin> {
        let mut joins: BTreeMap<String, PlannedJoin> = BTreeMap::new();

        for chain in self.projection.chains() {
            joins.insert(
                chain.key(),
                PlannedJoin {
                    chain,
                    kind: JoinKind::Left,
                },
            );
        }
        for chain in self.inner_join_chains() {
            joins.insert(
                chain.key(),
                PlannedJoin {
                    chain,
                    kind: JoinKind::Inner,
                },
            );
        }

        let mut joins: Vec<PlannedJoin> = joins.into_values().collect();
        joins.sort_by_key(|join| join.chain.len());
        joins
    }
}

/// Compiles filters, ordering and projection for `input.entity`.
pub fn compile_query<S: SchemaRegistry + ?Sized>(
    schema: &S,
    input: &LowQueryInput,
) -> Result<CompiledQuery, CoreError> {
    let root = input.entity.trim();
    let entity = root_entity(schema, root)?;

    Ok(CompiledQuery {
        entity: entity.name.clone(),
        table: entity.table.clone(),
        predicate: build_condition_tree(schema, root, &input.conditions)?,
        order: build_order(schema, root, &input.sorts)?,
        projection: plan_projection(schema, root, &input.projection)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        low_query::{
            entities::{FilterCondition, LogicGroup, Operator, ProjectionSpec, SortDirection, SortSpec},
            value_objects::ProjectionRequest,
        },
        schema::entities::test_support::sample_schema,
    };
    use serde_json::json;

    fn input() -> LowQueryInput {
        LowQueryInput {
            entity: "User".to_string(),
            conditions: vec![FilterCondition::new(
                "department.company.code",
                Operator::Eq,
                LogicGroup::And,
                json!("ACME"),
            )],
            sorts: vec![SortSpec::new("name", SortDirection::Asc)],
            projection: ProjectionRequest::Paths(vec![
                ProjectionSpec::new("name"),
                ProjectionSpec::new("department.name"),
            ]),
            ..Default::default()
        }
    }

    #[test]
    fn test_compile_query() {
        let query = compile_query(&sample_schema(), &input()).unwrap();
        assert_eq!(query.entity, "User");
        assert_eq!(query.table, "sys_user");
        assert!(query.predicate.is_some());
        assert_eq!(query.order.len(), 1);
        assert_eq!(query.projection.root.children.len(), 1);
    }

    #[test]
    fn test_inner_joins_cover_prefixes() {
        let query = compile_query(&sample_schema(), &input()).unwrap();
        let keys: Vec<String> = query.inner_join_chains().iter().map(RelationChain::key).collect();
        assert_eq!(keys, vec!["department", "department.company"]);
    }

    #[test]
    fn test_filter_join_wins_over_projection_join() {
        let query = compile_query(&sample_schema(), &input()).unwrap();
        let joins: Vec<(String, JoinKind)> = query
            .joins()
            .into_iter()
            .map(|j| (j.chain.key(), j.kind))
            .collect();
        assert_eq!(
            joins,
            vec![
                ("department".to_string(), JoinKind::Inner),
                ("department.company".to_string(), JoinKind::Inner),
            ]
        );

        let mut projection_only = input();
        projection_only.conditions.clear();
        let query = compile_query(&sample_schema(), &projection_only).unwrap();
        assert_eq!(query.joins()[0].kind, JoinKind::Left);
    }

    #[test]
    fn test_unknown_entity() {
        let mut bad = input();
        bad.entity = "Ghost".to_string();
        assert_eq!(
            compile_query(&sample_schema(), &bad),
            Err(CoreError::UnknownEntity("Ghost".to_string()))
        );
    }
}
