//! SQLite backend for the hashr sample catalog.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. The schema mirrors the
//! PostgreSQL one; ordered string sequences are stored as JSON text.

mod encode;
mod schema;
mod store;

pub use store::SqliteStore;

#[cfg(test)]
mod tests;
