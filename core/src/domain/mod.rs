pub mod common;
pub mod low_query;
pub mod schema;
