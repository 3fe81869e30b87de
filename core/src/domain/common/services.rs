use std::sync::Arc;

use crate::domain::{
    common::DEFAULT_MAX_PAGE_SIZE, low_query::ports::QueryEngine, schema::ports::SchemaRegistry,
};

/// Holds the schema registry and the execution engine every query runs against.
#[derive(Debug)]
pub struct Service<S, E>
where
    S: SchemaRegistry,
    E: QueryEngine,
{
    pub schema: Arc<S>,
    pub engine: Arc<E>,
    pub max_page_size: i64,
}

impl<S, E> Service<S, E>
where
    S: SchemaRegistry,
    E: QueryEngine,
{
    pub fn new(schema: S, engine: E) -> Self {
        Self {
            schema: Arc::new(schema),
            engine: Arc::new(engine),
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }

    /// Caps `page_size`; anything below 1 is raised to 1.
    pub fn with_max_page_size(mut self, max_page_size: i64) -> Self {
        self.max_page_size = max_page_size.max(1);
        self
    }
}

impl<S, E> Clone for Service<S, E>
where
    S: SchemaRegistry,
    E: QueryEngine,
{
    fn clone(&self) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            engine: Arc::clone(&self.engine),
            max_page_size: self.max_page_size,
        }
    }
}
