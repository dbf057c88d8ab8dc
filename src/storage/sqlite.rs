//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the TaskStateStore trait.
//! Every write is an `INSERT ... ON CONFLICT(task_id) DO UPDATE`.

use crate::report::CrawlReport;
use crate::state::TaskStatus;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{
    ReportRecord, StoreError, StoreResult, TaskCompletedRecord, TaskCreatedRecord,
    TaskStateStore,
};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite storage backend
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Creates a new SqliteStore instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StoreError)` - Failed to open database
    pub fn new(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Returns the recorded status of a task
    pub fn task_status(&self, task_id: &str) -> StoreResult<Option<TaskStatus>> {
        let conn = self.lock()?;
        let status: Option<String> = conn
            .query_row(
                "SELECT status FROM crawl_tasks WHERE task_id = ?1",
                params![task_id],
                |row| row.get(0),
            )
            .optional()?;

        status
            .map(|s| {
                TaskStatus::from_db_string(&s)
                    .ok_or_else(|| StoreError::Database(format!("Unknown task status: {}", s)))
            })
            .transpose()
    }

    /// Number of stored reports for a task
    pub fn report_count(&self, task_id: &str) -> StoreResult<u32> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM crawl_reports WHERE task_id = ?1",
            params![task_id],
            |row| row.get(0),
        )?;
        Ok(count as u32)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

#[async_trait]
impl TaskStateStore for SqliteStore {
    async fn record_task_created(&self, record: &TaskCreatedRecord) -> StoreResult<()> {
        let conn = self.lock()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO crawl_tasks
                (task_id, target, status, started_at, estimated_duration_secs, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(task_id) DO UPDATE SET
                target = excluded.target,
                started_at = COALESCE(crawl_tasks.started_at, excluded.started_at),
                estimated_duration_secs = excluded.estimated_duration_secs,
                status = CASE
                    WHEN crawl_tasks.status = ?7 THEN crawl_tasks.status
                    ELSE excluded.status
                END,
                updated_at = excluded.updated_at",
            params![
                record.task_id,
                record.target,
                record.status.to_db_string(),
                record.started_at.to_rfc3339(),
                i64::try_from(record.estimated_duration.as_secs()).unwrap_or(i64::MAX),
                now,
                TaskStatus::Complete.to_db_string(),
            ],
        )?;

        Ok(())
    }

    async fn record_task_completed(&self, record: &TaskCompletedRecord) -> StoreResult<()> {
        let conn = self.lock()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO crawl_tasks (task_id, status, completed_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT(task_id) DO UPDATE SET
                status = excluded.status,
                completed_at = COALESCE(crawl_tasks.completed_at, excluded.completed_at),
                updated_at = excluded.updated_at",
            params![record.task_id, record.status.to_db_string(), now],
        )?;

        Ok(())
    }

    async fn store_report(&self, record: &ReportRecord) -> StoreResult<()> {
        let report_json = serde_json::to_string(&record.report)?;
        let conn = self.lock()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO crawl_reports (task_id, website_id, analysis_type, report_json, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(task_id) DO UPDATE SET
                website_id = excluded.website_id,
                analysis_type = excluded.analysis_type,
                report_json = excluded.report_json",
            params![
                record.task_id,
                record.website_id,
                record.analysis_type,
                report_json,
                now
            ],
        )?;

        Ok(())
    }

    async fn completed_report(&self, task_id: &str) -> StoreResult<Option<CrawlReport>> {
        let report_json: Option<String> = {
            let conn = self.lock()?;
            conn.query_row(
                "SELECT r.report_json FROM crawl_reports r
                 JOIN crawl_tasks t ON t.task_id = r.task_id
                 WHERE r.task_id = ?1 AND t.status = ?2",
                params![task_id, TaskStatus::Complete.to_db_string()],
                |row| row.get(0),
            )
            .optional()?
        };

        match report_json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}
