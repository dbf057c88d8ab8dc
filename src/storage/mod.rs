//! Storage module for task lifecycle events
//!
//! This module handles persistence of crawl tasks and their reports, including:
//! - The `TaskStateStore` interface called by the crawl core
//! - SQLite database initialization and schema management
//! - An in-memory store for embedding and tests

mod memory;
mod schema;
mod sqlite;
mod traits;

pub use memory::{MemoryStore, StoredTask};
pub use sqlite::SqliteStore;
pub use traits::{
    ReportRecord, StoreError, StoreResult, TaskCompletedRecord, TaskCreatedRecord,
    TaskStateStore, ANALYSIS_TYPE,
};

use std::path::Path;

/// Opens or creates the task database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
pub fn open_store(path: &Path) -> StoreResult<SqliteStore> {
    SqliteStore::new(path)
}
