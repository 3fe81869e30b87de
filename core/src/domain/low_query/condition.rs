use crate::domain::{
    common::entities::app_errors::CoreError,
    low_query::{
        entities::{FilterCondition, LogicGroup},
        predicate::{Predicate, compile_predicate},
    },
    schema::ports::SchemaRegistry,
};

/// Combines filter conditions into one predicate.
///
/// Conditions tagged `AND` form a conjunction, conditions tagged `OR` a
/// disjunction, and the two groups are joined with AND. No conditions means no
/// filter.
pub fn build_condition_tree<S: SchemaRegistry + ?Sized>(
    schema: &S,
    root: &str,
    conditions: &[FilterCondition],
) -> Result<Option<Predicate>, CoreError> {
    let mut and_group = Vec::new();
    let mut or_group = Vec::new();

    for condition in conditions {
        let predicate = compile_predicate(schema, root, condition)?;
        match condition.logic {
            LogicGroup::And => and_group.push(predicate),
            LogicGroup::Or => or_group.push(predicate),
        }
    }

    let groups = [Predicate::all(and_group), Predicate::any(or_group)]
        .into_iter()
        .flatten()
        .collect();

    Ok(Predicate::all(groups))
}
