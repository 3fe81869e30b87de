use std::future::Future;

use serde_json::Value;

use crate::domain::{
    common::entities::app_errors::CoreError,
    low_query::{
        entities::Page,
        query::CompiledQuery,
        value_objects::{LowQueryInput, PageWindow, RowSet},
    },
};

/// Executes compiled queries against a concrete store.
#[cfg_attr(test, mockall::automock)]
pub trait QueryEngine: Send + Sync {
    /// Returns the rows inside `window` plus the number of rows matching the
    /// query as a whole.
    fn fetch_page(
        &self,
        query: &CompiledQuery,
        window: PageWindow,
    ) -> impl Future<Output = Result<RowSet, CoreError>> + Send;
}

pub trait QueryService: Send + Sync {
    fn query_page(
        &self,
        input: LowQueryInput,
    ) -> impl Future<Output = Result<Page<Value>, CoreError>> + Send;

    fn compile(&self, input: &LowQueryInput) -> Result<CompiledQuery, CoreError>;
}
