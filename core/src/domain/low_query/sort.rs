use crate::domain::{
    common::entities::app_errors::CoreError,
    low_query::{
        entities::{SortDirection, SortSpec},
        path::{ColumnRef, resolve},
    },
    schema::ports::SchemaRegistry,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderInstruction {
    pub column: ColumnRef,
    pub direction: OrderDirection,
}

/// Turns sort specs into order instructions, keeping their order and dropping
/// `NONE` entries.
pub fn build_order<S: SchemaRegistry + ?Sized>(
    schema: &S,
    root: &str,
    sorts: &[SortSpec],
) -> Result<Vec<OrderInstruction>, CoreError> {
    sorts
        .iter()
        .filter_map(|sort| {
            let direction = match sort.direction {
                SortDirection::Asc => OrderDirection::Asc,
                SortDirection::Desc => OrderDirection::Desc,
                SortDirection::None => return None,
            };
            Some(resolve(schema, root, &sort.path).map(|column| OrderInstruction { column, direction }))
        })
        .collect()
}
