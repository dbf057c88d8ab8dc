//! In-memory record of one remote crawl job

use crate::config::CrawlOptions;
use crate::state::TaskStatus;
use crate::AuditError;
use chrono::{DateTime, Utc};

/// One remote crawl job auditing up to `max_pages` pages of a target
///
/// The task id is fixed at construction and cannot be changed afterwards.
/// Status changes go through [`CrawlTask::transition`], which only accepts
/// forward moves.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlTask {
    task_id: String,
    status: TaskStatus,

    /// Canonical target URL (e.g. `https://example.com`)
    pub target_url: String,

    /// Identifier the stored report is filed under
    pub website_id: String,

    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,

    /// Latest page count observed while polling
    pub pages_found_so_far: u32,

    pub max_pages: u32,
    pub checks_threshold: u8,
}

impl CrawlTask {
    /// Creates a task for a job the provider has just accepted
    pub fn new(
        task_id: impl Into<String>,
        target_url: impl Into<String>,
        website_id: impl Into<String>,
        options: &CrawlOptions,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            status: TaskStatus::Created,
            target_url: target_url.into(),
            website_id: website_id.into(),
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            pages_found_so_far: 0,
            max_pages: options.max_pages,
            checks_threshold: options.checks_threshold,
        }
    }

    /// Rebuilds an in-progress task after a restart, from its known id
    pub fn resume(
        task_id: impl Into<String>,
        target_url: impl Into<String>,
        website_id: impl Into<String>,
        options: &CrawlOptions,
    ) -> Self {
        let mut task = Self::new(task_id, target_url, website_id, options);
        task.status = TaskStatus::InProgress;
        task.started_at = Some(task.created_at);
        task
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Moves the task to `next`, stamping the matching timestamp
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The transition was applied (or was a same-state no-op)
    /// * `Err(AuditError::InvalidTransition)` - The move would go backwards or leave a terminal state
    pub fn transition(&mut self, next: TaskStatus) -> Result<(), AuditError> {
        if !self.status.can_transition_to(next) {
            return Err(AuditError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }

        if self.status == next {
            return Ok(());
        }

        let now = Utc::now();
        match next {
            TaskStatus::InProgress => self.started_at = Some(now),
            TaskStatus::Complete => self.completed_at = Some(now),
            _ => {}
        }

        tracing::debug!(
            task_id = %self.task_id,
            from = %self.status,
            to = %next,
            "Task status changed"
        );
        self.status = next;
        Ok(())
    }

    /// Records the page count reported by the provider
    ///
    /// Counts never go down; a lower value from a stale listing is ignored.
    pub fn record_progress(&mut self, pages_found: u32) {
        self.pages_found_so_far = self.pages_found_so_far.max(pages_found);
    }
}
