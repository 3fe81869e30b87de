pub mod db;
pub mod low_query;
pub mod schema;
