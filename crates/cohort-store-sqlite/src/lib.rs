//! SQLite backend for the Cohort accelerator store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! pool without blocking the async runtime. Multi-statement writes (rule
//! replacement, block updates, placement recomputation, association
//! replace-sets) run inside explicit transactions.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
