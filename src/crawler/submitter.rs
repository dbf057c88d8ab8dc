//! Crawl job submission
//!
//! Builds the job specification for a target and sends it to the provider.
//! Submission has no side effects beyond the remote call; recording the new
//! task is left to the caller.

use crate::config::{validate_crawl_options, CrawlOptions};
use crate::provider::{is_success_code, AuditProvider, JobSpec};
use crate::url::normalize_target;
use crate::SubmitError;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Number of hex characters kept from the job fingerprint
const TAG_LENGTH: usize = 16;

/// Handle of a job the provider has accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskHandle {
    pub task_id: String,
    pub job: JobSpec,
}

/// Computes the job tag: a short SHA-256 fingerprint of target and options
///
/// The same target with the same options always yields the same tag, which
/// makes duplicate submissions easy to spot in the provider's task listing.
pub fn job_tag(target: &str, options: &CrawlOptions) -> String {
    let mut hasher = Sha256::new();
    hasher.update(target.as_bytes());
    hasher.update(options.max_pages.to_be_bytes());
    hasher.update([options.checks_threshold, u8::from(options.enable_javascript)]);
    let digest = hex::encode(hasher.finalize());
    digest[..TAG_LENGTH].to_string()
}

/// Builds the job specification for a target
///
/// # Arguments
///
/// * `target` - User-supplied target, with or without scheme
/// * `options` - Job options
///
/// # Returns
///
/// * `Ok(JobSpec)` - Job with a canonical `https://` target
/// * `Err(SubmitError::InvalidTarget)` - Target is malformed after normalization
/// * `Err(SubmitError::InvalidOptions)` - An option is out of range
pub fn build_job(target: &str, options: &CrawlOptions) -> Result<JobSpec, SubmitError> {
    let target = normalize_target(target)
        .map_err(|e| SubmitError::InvalidTarget(format!("{}: {}", target.trim(), e)))?;
    validate_crawl_options(options).map_err(|e| SubmitError::InvalidOptions(e.to_string()))?;

    Ok(JobSpec {
        tag: job_tag(&target, options),
        target,
        max_crawl_pages: options.max_pages,
        enable_javascript: options.enable_javascript,
        enable_browser_rendering: options.enable_javascript,
        checks_threshold: options.checks_threshold,
        disable_cookie_popup: true,
        suppress_bot_signature: true,
    })
}

/// Sends crawl jobs to the audit provider
#[derive(Clone)]
pub struct TaskSubmitter {
    provider: Arc<dyn AuditProvider>,
}

impl TaskSubmitter {
    pub fn new(provider: Arc<dyn AuditProvider>) -> Self {
        Self { provider }
    }

    /// Submits a crawl job for `target`
    pub async fn submit(
        &self,
        target: &str,
        options: &CrawlOptions,
    ) -> Result<TaskHandle, SubmitError> {
        let job = build_job(target, options)?;
        let ack = self.provider.submit_job(&job).await?;

        if !is_success_code(ack.status_code) {
            return Err(SubmitError::RemoteRejected {
                status_code: ack.status_code,
                message: ack.status_message,
            });
        }

        if ack.task_id.is_empty() {
            return Err(SubmitError::RemoteRejected {
                status_code: ack.status_code,
                message: "provider returned no task id".to_string(),
            });
        }

        Ok(TaskHandle {
            task_id: ack.task_id,
            job,
        })
    }
}
