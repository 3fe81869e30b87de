pub mod json_schema_loader;
