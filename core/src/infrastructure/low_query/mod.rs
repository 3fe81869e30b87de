pub mod mappers;
pub mod repositories;
pub mod sql_renderer;
