//! Storage traits and error types
//!
//! This module defines the narrow interface the crawl core uses to record
//! task lifecycle events, plus the records passed through it.

use crate::report::CrawlReport;
use crate::state::TaskStatus;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store lock poisoned")]
    Poisoned,
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Analysis type recorded with crawl reports
pub const ANALYSIS_TYPE: &str = "site_crawl";

/// Lifecycle event recorded after a successful submission
#[derive(Debug, Clone, PartialEq)]
pub struct TaskCreatedRecord {
    pub task_id: String,
    pub target: String,
    pub status: TaskStatus,
    pub started_at: DateTime<Utc>,
    /// Upper bound of the polling wall clock
    pub estimated_duration: Duration,
}

impl TaskCreatedRecord {
    pub fn new(
        task_id: impl Into<String>,
        target: impl Into<String>,
        started_at: DateTime<Utc>,
        estimated_duration: Duration,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            target: target.into(),
            status: TaskStatus::InProgress,
            started_at,
            estimated_duration,
        }
    }
}

/// Lifecycle event recorded once a report has been produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCompletedRecord {
    pub task_id: String,
    pub status: TaskStatus,
}

impl TaskCompletedRecord {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            status: TaskStatus::Complete,
        }
    }
}

/// Final aggregate of a task, keyed by its task id
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRecord {
    pub task_id: String,
    pub website_id: String,
    pub report: CrawlReport,
    pub analysis_type: String,
}

/// Trait for task state storage backends
///
/// Every operation is an upsert keyed by task id, so calling it more than
/// once for the same task leaves a single stored row. Implementations must be
/// thread-safe.
#[async_trait]
pub trait TaskStateStore: Send + Sync {
    /// Records that a task was accepted by the provider
    ///
    /// A task already recorded as completed keeps its completed status.
    async fn record_task_created(&self, record: &TaskCreatedRecord) -> StoreResult<()>;

    /// Records that a task finished with a report
    async fn record_task_completed(&self, record: &TaskCompletedRecord) -> StoreResult<()>;

    /// Persists the final report of a task, replacing any earlier copy
    async fn store_report(&self, record: &ReportRecord) -> StoreResult<()>;

    /// Returns the stored report of a task that already completed
    ///
    /// Used after a restart to detect prior completion without polling.
    async fn completed_report(&self, _task_id: &str) -> StoreResult<Option<CrawlReport>> {
        Ok(None)
    }
}
