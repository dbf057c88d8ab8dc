//! Crawler coordinator - remote crawl orchestration
//!
//! This module ties the crawl stages together, including:
//! - Submitting jobs and recording new tasks
//! - Detecting prior completion after a restart
//! - Polling, fetching and building the report
//! - Recording lifecycle events without letting store failures stop the crawl

use crate::config::{CrawlOptions, PollingConfig};
use crate::crawler::fetcher::ResultFetcher;
use crate::crawler::poller::StatusPoller;
use crate::crawler::submitter::TaskSubmitter;
use crate::observer::{CrawlObserver, TracingObserver};
use crate::provider::AuditProvider;
use crate::report::{build_report, CrawlReport};
use crate::state::{CrawlTask, TaskStatus};
use crate::storage::{
    ReportRecord, StoreResult, TaskCompletedRecord, TaskCreatedRecord, TaskStateStore,
    ANALYSIS_TYPE,
};
use crate::url::{normalize_target, website_id_for};
use crate::{CrawlError, SubmitError};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Main crawl coordinator
///
/// Cheap to clone; every clone shares the same provider, store and observer.
/// Each task is polled through its own `&mut CrawlTask`, so independent
/// tasks can run concurrently while a single task is never polled twice.
#[derive(Clone)]
pub struct CrawlCoordinator {
    submitter: TaskSubmitter,
    poller: StatusPoller,
    fetcher: ResultFetcher,
    store: Arc<dyn TaskStateStore>,
    observer: Arc<dyn CrawlObserver>,
}

impl CrawlCoordinator {
    /// Creates a coordinator that reports through [`TracingObserver`]
    pub fn new(
        provider: Arc<dyn AuditProvider>,
        store: Arc<dyn TaskStateStore>,
        polling: PollingConfig,
    ) -> Self {
        Self::with_observer(provider, store, polling, Arc::new(TracingObserver))
    }

    /// Creates a coordinator with a custom observer
    pub fn with_observer(
        provider: Arc<dyn AuditProvider>,
        store: Arc<dyn TaskStateStore>,
        polling: PollingConfig,
        observer: Arc<dyn CrawlObserver>,
    ) -> Self {
        Self {
            submitter: TaskSubmitter::new(provider.clone()),
            poller: StatusPoller::new(provider.clone(), observer.clone(), polling),
            fetcher: ResultFetcher::new(provider),
            store,
            observer,
        }
    }

    /// Submits a crawl for `target` and records the new task
    ///
    /// The report is filed under the target's host.
    pub async fn start_crawl(
        &self,
        target: &str,
        options: &CrawlOptions,
    ) -> Result<CrawlTask, SubmitError> {
        self.start_crawl_for(target, None, options).await
    }

    /// Submits a crawl and files its report under `website_id`, when given
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlTask)` - An `InProgress` task carrying the provider's task id
    /// * `Err(SubmitError)` - The job was not accepted
    pub async fn start_crawl_for(
        &self,
        target: &str,
        website_id: Option<&str>,
        options: &CrawlOptions,
    ) -> Result<CrawlTask, SubmitError> {
        let handle = self.submitter.submit(target, options).await?;
        let website_id = resolve_website_id(website_id, &handle.job.target);

        let mut task = CrawlTask::new(handle.task_id, handle.job.target, website_id, options);
        advance(&mut task, TaskStatus::InProgress);

        self.observer.on_submitted(task.task_id(), &task.target_url);

        let record = TaskCreatedRecord::new(
            task.task_id(),
            task.target_url.clone(),
            task.started_at.unwrap_or(task.created_at),
            self.poller.config().budget(),
        );
        let result = self.store.record_task_created(&record).await;
        self.report_store_error(task.task_id(), "record_task_created", result);

        Ok(task)
    }

    /// Rebuilds an in-progress task from a known task id, e.g. after a restart
    ///
    /// No remote call is made; the task can be handed to [`Self::poll_until_done`].
    pub fn resume_crawl(
        &self,
        task_id: &str,
        target: &str,
        website_id: Option<&str>,
        options: &CrawlOptions,
    ) -> Result<CrawlTask, SubmitError> {
        let target = normalize_target(target)
            .map_err(|e| SubmitError::InvalidTarget(format!("{}: {}", target.trim(), e)))?;
        let website_id = resolve_website_id(website_id, &target);

        Ok(CrawlTask::resume(task_id, target, website_id, options))
    }

    /// Waits for a task to finish and builds its report
    ///
    /// A report already stored for a completed task is returned without any
    /// remote call. Store failures are reported to the observer and never
    /// change the outcome.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The task finished and its report was built
    /// * `Err(CrawlError::TimedOut)` - The attempt budget ran out
    /// * `Err(CrawlError::Failed)` - The pages could not be retrieved
    /// * `Err(CrawlError::Cancelled)` - The token was cancelled between checks
    /// * `Err(CrawlError::AlreadyFinished)` - The task had already failed or timed out
    pub async fn poll_until_done(
        &self,
        task: &mut CrawlTask,
        cancel: &CancellationToken,
    ) -> Result<CrawlReport, CrawlError> {
        let task_id = task.task_id().to_string();

        match self.store.completed_report(&task_id).await {
            Ok(Some(report)) => {
                tracing::info!(task_id = %task_id, "Task already completed, using stored report");
                if task.status() == TaskStatus::Created {
                    advance(task, TaskStatus::InProgress);
                }
                if task.status() == TaskStatus::InProgress {
                    advance(task, TaskStatus::Complete);
                }
                if task.status() == TaskStatus::Complete {
                    self.observer.on_complete(&task_id, &report);
                    return Ok(report);
                }
            }
            Ok(None) => {}
            Err(err) => self.observer.on_store_error(&task_id, "completed_report", &err),
        }

        match task.status() {
            TaskStatus::Created => {
                advance(task, TaskStatus::InProgress);
            }
            TaskStatus::InProgress => {}
            status => return Err(CrawlError::AlreadyFinished { task_id, status }),
        }

        self.poller.poll_until_ready(task, cancel).await?;

        let pages = match self.fetcher.fetch(&task_id, task.max_pages).await {
            Ok(pages) => pages,
            Err(reason) => {
                self.observer.on_fetch_failed(&task_id, &reason);
                advance(task, TaskStatus::Failed);
                return Err(CrawlError::Failed { task_id, reason });
            }
        };

        let report = build_report(pages);

        let record = ReportRecord {
            task_id: task_id.clone(),
            website_id: task.website_id.clone(),
            report: report.clone(),
            analysis_type: ANALYSIS_TYPE.to_string(),
        };
        let result = self.store.store_report(&record).await;
        self.report_store_error(&task_id, "store_report", result);

        let result = self
            .store
            .record_task_completed(&TaskCompletedRecord::new(task_id.clone()))
            .await;
        self.report_store_error(&task_id, "record_task_completed", result);

        advance(task, TaskStatus::Complete);
        self.observer.on_complete(&task_id, &report);

        Ok(report)
    }

    fn report_store_error(&self, task_id: &str, operation: &str, result: StoreResult<()>) {
        if let Err(err) = result {
            self.observer.on_store_error(task_id, operation, &err);
        }
    }
}

/// Applies a status change, logging it when the state machine refuses
///
/// Returns whether the task is now in `next`.
fn advance(task: &mut CrawlTask, next: TaskStatus) -> bool {
    match task.transition(next) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(task_id = %task.task_id(), error = %err, "Rejected task status change");
            false
        }
    }
}

fn resolve_website_id(website_id: Option<&str>, target: &str) -> String {
    website_id
        .map(str::to_string)
        .or_else(|| website_id_for(target))
        .unwrap_or_else(|| target.to_string())
}
