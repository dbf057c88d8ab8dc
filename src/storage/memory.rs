//! In-memory storage implementation
//!
//! Keeps task rows and reports in hash maps behind a mutex. Useful when the
//! crawl core is embedded without a database, and in tests.

use crate::report::CrawlReport;
use crate::state::TaskStatus;
use crate::storage::traits::{
    ReportRecord, StoreError, StoreResult, TaskCompletedRecord, TaskCreatedRecord,
    TaskStateStore,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Stored state of one task
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTask {
    pub target: Option<String>,
    pub status: TaskStatus,
    pub report: Option<ReportRecord>,
}

/// In-memory storage backend
#[derive(Debug, Default)]
pub struct MemoryStore {
    tasks: Mutex<HashMap<String, StoredTask>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of a stored task
    pub fn task(&self, task_id: &str) -> Option<StoredTask> {
        self.lock().ok()?.get(task_id).cloned()
    }

    /// Number of stored reports
    pub fn report_count(&self) -> usize {
        self.lock()
            .map(|tasks| tasks.values().filter(|t| t.report.is_some()).count())
            .unwrap_or(0)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, HashMap<String, StoredTask>>> {
        self.tasks.lock().map_err(|_| StoreError::Poisoned)
    }
}

fn empty_task(status: TaskStatus) -> StoredTask {
    StoredTask {
        target: None,
        status,
        report: None,
    }
}

#[async_trait]
impl TaskStateStore for MemoryStore {
    async fn record_task_created(&self, record: &TaskCreatedRecord) -> StoreResult<()> {
        let mut tasks = self.lock()?;
        let task = tasks
            .entry(record.task_id.clone())
            .or_insert_with(|| empty_task(record.status));

        task.target = Some(record.target.clone());
        if task.status != TaskStatus::Complete {
            task.status = record.status;
        }
        Ok(())
    }

    async fn record_task_completed(&self, record: &TaskCompletedRecord) -> StoreResult<()> {
        let mut tasks = self.lock()?;
        tasks
            .entry(record.task_id.clone())
            .or_insert_with(|| empty_task(record.status))
            .status = record.status;
        Ok(())
    }

    async fn store_report(&self, record: &ReportRecord) -> StoreResult<()> {
        let mut tasks = self.lock()?;
        tasks
            .entry(record.task_id.clone())
            .or_insert_with(|| empty_task(TaskStatus::InProgress))
            .report = Some(record.clone());
        Ok(())
    }

    async fn completed_report(&self, task_id: &str) -> StoreResult<Option<CrawlReport>> {
        let tasks = self.lock()?;
        Ok(tasks
            .get(task_id)
            .filter(|task| task.status == TaskStatus::Complete)
            .and_then(|task| task.report.as_ref())
            .map(|record| record.report.clone()))
    }
}
