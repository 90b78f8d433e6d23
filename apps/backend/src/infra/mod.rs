//! Infrastructure layer - database, schema, and state assembly.

pub mod db;
pub mod db_errors;
pub mod schema_guard;
pub mod state;
