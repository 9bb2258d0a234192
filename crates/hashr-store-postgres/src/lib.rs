//! PostgreSQL backend for the hashr sample catalog.
//!
//! The schema is provisioned table by table: each table is probed through
//! `information_schema` and created only when missing.

mod config;
mod schema;
mod store;

pub use config::PostgresConfig;
pub use store::PostgresStore;
