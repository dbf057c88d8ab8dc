//! Crawl lifecycle observers
//!
//! The crawl control flow reports what happens through a [`CrawlObserver`]
//! instead of logging directly. [`TracingObserver`] is the default and turns
//! every event into a structured `tracing` event.

use crate::provider::RemoteStatus;
use crate::report::CrawlReport;
use crate::storage::StoreError;
use crate::{FetchError, PollError};

/// Trait for crawl lifecycle observers
///
/// Every method has an empty default, so implementations only override the
/// events they care about. Implementations must be thread-safe.
pub trait CrawlObserver: Send + Sync {
    /// A job was accepted by the provider
    fn on_submitted(&self, _task_id: &str, _target_url: &str) {}

    /// A status check is about to be made
    ///
    /// # Arguments
    ///
    /// * `task_id` - The polled task
    /// * `attempt` - One-based attempt number
    /// * `max_attempts` - Attempt budget of the loop
    fn on_poll_attempt(&self, _task_id: &str, _attempt: u32, _max_attempts: u32) {}

    /// A status check failed; the attempt still counts against the budget
    fn on_poll_error(&self, _task_id: &str, _attempt: u32, _error: &PollError) {}

    /// A status check succeeded
    fn on_progress(&self, _task_id: &str, _attempt: u32, _status: &RemoteStatus) {}

    /// The task finished and its report was built
    fn on_complete(&self, _task_id: &str, _report: &CrawlReport) {}

    /// The attempt budget ran out
    fn on_timed_out(&self, _task_id: &str, _attempts: u32) {}

    /// The poll loop was cancelled by the caller
    fn on_cancelled(&self, _task_id: &str, _attempts: u32) {}

    /// Pages of a finished task could not be retrieved
    fn on_fetch_failed(&self, _task_id: &str, _error: &FetchError) {}

    /// A storage call failed; the crawl carries on regardless
    ///
    /// # Arguments
    ///
    /// * `task_id` - The task being recorded
    /// * `operation` - Name of the failed store operation
    /// * `error` - The store error
    fn on_store_error(&self, _task_id: &str, _operation: &str, _error: &StoreError) {}
}

/// Observer that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl CrawlObserver for NoopObserver {}

/// Observer that logs every event through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl CrawlObserver for TracingObserver {
    fn on_submitted(&self, task_id: &str, target_url: &str) {
        tracing::info!(task_id, target_url, "Crawl task submitted");
    }

    fn on_poll_attempt(&self, task_id: &str, attempt: u32, max_attempts: u32) {
        tracing::debug!(task_id, attempt, max_attempts, "Checking task status");
    }

    fn on_poll_error(&self, task_id: &str, attempt: u32, error: &PollError) {
        tracing::warn!(task_id, attempt, error = %error, "Status check failed");
    }

    fn on_progress(&self, task_id: &str, attempt: u32, status: &RemoteStatus) {
        if status.is_complete {
            tracing::info!(
                task_id,
                attempt,
                pages = status.pages_found_so_far,
                "Task reported ready"
            );
        } else {
            tracing::debug!(task_id, attempt, "Task still running");
        }
    }

    fn on_complete(&self, task_id: &str, report: &CrawlReport) {
        tracing::info!(
            task_id,
            total_pages = report.total_pages,
            average_score = report.average_score,
            total_errors = report.total_errors,
            "Crawl report ready"
        );
    }

    fn on_timed_out(&self, task_id: &str, attempts: u32) {
        tracing::warn!(task_id, attempts, "Task timed out");
    }

    fn on_cancelled(&self, task_id: &str, attempts: u32) {
        tracing::info!(task_id, attempts, "Polling cancelled");
    }

    fn on_fetch_failed(&self, task_id: &str, error: &FetchError) {
        tracing::error!(task_id, error = %error, "Failed to fetch crawl results");
    }

    fn on_store_error(&self, task_id: &str, operation: &str, error: &StoreError) {
        tracing::warn!(task_id, operation, error = %error, "Store call failed");
    }
}
