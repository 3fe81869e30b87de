pub mod coercion;
pub mod condition;
pub mod entities;
pub mod path;
pub mod ports;
pub mod predicate;
pub mod projection;
pub mod query;
pub mod services;
pub mod sort;
pub mod value_objects;
