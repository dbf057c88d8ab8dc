//! Task status polling
//!
//! One sequential loop per task: wait one interval, check the status, repeat
//! until the task is ready or the attempt budget runs out. A failed check is
//! an inconclusive attempt; it consumes budget but never ends the loop.

use crate::config::PollingConfig;
use crate::observer::CrawlObserver;
use crate::provider::{AuditProvider, RemoteStatus};
use crate::state::{CrawlTask, TaskStatus};
use crate::{CrawlError, PollError};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Polls the provider for the status of crawl tasks
#[derive(Clone)]
pub struct StatusPoller {
    provider: Arc<dyn AuditProvider>,
    observer: Arc<dyn CrawlObserver>,
    config: PollingConfig,
}

impl StatusPoller {
    pub fn new(
        provider: Arc<dyn AuditProvider>,
        observer: Arc<dyn CrawlObserver>,
        config: PollingConfig,
    ) -> Self {
        Self {
            provider,
            observer,
            config,
        }
    }

    pub fn config(&self) -> PollingConfig {
        self.config
    }

    /// Makes a single status check
    pub async fn poll(&self, task_id: &str) -> Result<RemoteStatus, PollError> {
        Ok(self.provider.get_status(task_id).await?)
    }

    /// Polls until the provider reports the task as ready
    ///
    /// The task's page count is updated on every successful check. When the
    /// budget runs out the task moves to `TimedOut`. Cancellation leaves the
    /// task untouched.
    ///
    /// # Returns
    ///
    /// * `Ok(RemoteStatus)` - The task is ready on the provider side
    /// * `Err(CrawlError::TimedOut)` - `max_attempts` checks were made without success
    /// * `Err(CrawlError::Cancelled)` - The token was cancelled during a wait
    pub async fn poll_until_ready(
        &self,
        task: &mut CrawlTask,
        cancel: &CancellationToken,
    ) -> Result<RemoteStatus, CrawlError> {
        let task_id = task.task_id().to_string();
        let max_attempts = self.config.max_attempts;
        let mut last_error: Option<PollError> = None;

        for attempt in 1..=max_attempts {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    self.observer.on_cancelled(&task_id, attempt - 1);
                    return Err(CrawlError::Cancelled { task_id });
                }
                _ = tokio::time::sleep(self.config.interval) => {}
            }

            self.observer
                .on_poll_attempt(&task_id, attempt, max_attempts);

            match self.poll(&task_id).await {
                Ok(status) => {
                    if let Some(pages) = status.pages_found_so_far {
                        task.record_progress(pages);
                    }
                    self.observer.on_progress(&task_id, attempt, &status);

                    if status.is_complete {
                        return Ok(status);
                    }
                }
                Err(err) => {
                    self.observer.on_poll_error(&task_id, attempt, &err);
                    last_error = Some(err);
                }
            }
        }

        if let Err(err) = task.transition(TaskStatus::TimedOut) {
            tracing::warn!(task_id = %task_id, error = %err, "Could not mark task as timed out");
        }
        self.observer.on_timed_out(&task_id, max_attempts);

        Err(CrawlError::TimedOut {
            task_id,
            attempts: max_attempts,
            last_error: last_error.map(|e| e.to_string()),
        })
    }
}
