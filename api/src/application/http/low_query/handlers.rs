pub mod get_records;
pub mod query_records;
