//! Audit provider boundary
//!
//! This module defines the contract with the remote site-audit provider:
//! - `AuditProvider`: the three remote operations plus a status lookup
//! - `HttpAuditProvider`: the JSON-over-HTTPS implementation with Basic auth
//! - wire types for job specs, ready-task listings and page records

mod client;
mod wire;

pub use client::{build_http_client, HttpAuditProvider};
pub use wire::{
    ApiResponse, ApiTask, PagesResult, RawHtags, RawMeta, RawPage, RawTiming, ReadyEntry,
};

use crate::{FetchError, PollError, SubmitError};
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Errors raised by a provider implementation
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP status {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Provider status {status_code}: {message}")]
    Api { status_code: u32, message: String },

    #[error("Malformed response: {0}")]
    Decode(String),
}

/// Returns true for provider status codes that mean success
///
/// The provider uses five-digit codes; the `2xxxx` range is success
/// (`20000` Ok, `20100` Task Created).
pub fn is_success_code(status_code: u32) -> bool {
    (20000..30000).contains(&status_code)
}

/// Job specification sent when submitting a crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobSpec {
    /// Canonical, scheme-qualified target
    pub target: String,
    pub max_crawl_pages: u32,
    pub enable_javascript: bool,
    pub enable_browser_rendering: bool,
    pub checks_threshold: u8,
    pub disable_cookie_popup: bool,
    pub suppress_bot_signature: bool,
    /// Fingerprint of target and options
    pub tag: String,
}

/// Provider acknowledgement of a submitted job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitAck {
    pub task_id: String,
    pub status_code: u32,
    pub status_message: String,
}

/// One entry of the provider's ready-tasks listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyTask {
    pub id: String,
    pub status_message: String,
    pub result_count: u32,
}

/// Status of a task as seen from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteStatus {
    pub is_complete: bool,
    pub pages_found_so_far: Option<u32>,
}

/// A single `field operator value` filter on the pages listing
#[derive(Debug, Clone, PartialEq)]
pub struct PageFilter {
    pub field: String,
    pub operator: String,
    pub value: serde_json::Value,
}

impl PageFilter {
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

/// Query for the per-page results of a finished task
#[derive(Debug, Clone, PartialEq)]
pub struct PagesQuery {
    pub task_id: String,
    pub limit: u32,
    pub filters: Vec<PageFilter>,
    pub order_by: Vec<String>,
}

/// Abstraction over the remote audit provider, enabling testability
#[async_trait]
pub trait AuditProvider: Send + Sync {
    /// Submits a crawl job and returns the provider's acknowledgement
    async fn submit_job(&self, job: &JobSpec) -> Result<SubmitAck, ProviderError>;

    /// Lists every task the provider considers finished
    async fn list_ready_tasks(&self) -> Result<Vec<ReadyTask>, ProviderError>;

    /// Retrieves page records of a finished task
    async fn get_job_pages(&self, query: &PagesQuery) -> Result<Vec<RawPage>, ProviderError>;

    /// Looks up the status of one task
    ///
    /// The provider has no per-task status call, so this scans the ready-tasks
    /// listing: a missing id means the task is still running, not that it is
    /// unknown. A provider with a direct status endpoint overrides only this.
    async fn get_status(&self, task_id: &str) -> Result<RemoteStatus, ProviderError> {
        let ready = self.list_ready_tasks().await?;

        Ok(match ready.into_iter().find(|task| task.id == task_id) {
            Some(task) => RemoteStatus {
                is_complete: true,
                pages_found_so_far: Some(task.result_count).filter(|count| *count > 0),
            },
            None => RemoteStatus {
                is_complete: false,
                pages_found_so_far: None,
            },
        })
    }
}

impl From<ProviderError> for SubmitError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Transport(e) => SubmitError::NetworkFailure(e.to_string()),
            ProviderError::HttpStatus { status, message } => SubmitError::RemoteRejected {
                status_code: u32::from(status),
                message,
            },
            ProviderError::Api {
                status_code,
                message,
            } => SubmitError::RemoteRejected {
                status_code,
                message,
            },
            ProviderError::Decode(msg) => {
                SubmitError::NetworkFailure(format!("malformed response: {}", msg))
            }
        }
    }
}

impl From<ProviderError> for PollError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Transport(e) => PollError::Network(e.to_string()),
            ProviderError::HttpStatus { status, message } => PollError::Rejected {
                status_code: u32::from(status),
                message,
            },
            ProviderError::Api {
                status_code,
                message,
            } => PollError::Rejected {
                status_code,
                message,
            },
            ProviderError::Decode(msg) => PollError::Malformed(msg),
        }
    }
}

impl From<ProviderError> for FetchError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Transport(e) => FetchError::NetworkFailure(e.to_string()),
            ProviderError::HttpStatus { status, message } => FetchError::RemoteRejected {
                status_code: u32::from(status),
                message,
            },
            ProviderError::Api {
                status_code,
                message,
            } => FetchError::RemoteRejected {
                status_code,
                message,
            },
            ProviderError::Decode(msg) => {
                FetchError::NetworkFailure(format!("malformed response: {}", msg))
            }
        }
    }
}
