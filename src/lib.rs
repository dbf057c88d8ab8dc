//! crawl-audit: remote site-audit crawl orchestration
//!
//! This crate submits multi-page website audit jobs to an external analysis
//! provider, waits for them through bounded polling, fetches the per-page
//! results and turns them into a scored, categorized [`report::CrawlReport`].

pub mod config;
pub mod crawler;
pub mod observer;
pub mod provider;
pub mod report;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for crawl-audit operations
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Submit failed: {0}")]
    Submit(#[from] SubmitError),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Crawl did not complete: {0}")]
    Crawl(#[from] CrawlError),

    #[error("Provider error: {0}")]
    Provider(#[from] provider::ProviderError),

    #[error("Storage error: {0}")]
    Store(#[from] storage::StoreError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Invalid task transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::TaskStatus,
        to: state::TaskStatus,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Errors raised while submitting a crawl job
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Provider rejected the job (status {status_code}): {message}")]
    RemoteRejected { status_code: u32, message: String },

    #[error("Network failure while submitting: {0}")]
    NetworkFailure(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Invalid crawl options: {0}")]
    InvalidOptions(String),
}

/// Errors from a single status check
///
/// These never end a poll loop on their own; each one consumes one attempt.
#[derive(Debug, Clone, Error)]
pub enum PollError {
    #[error("Network failure while polling: {0}")]
    Network(String),

    #[error("Malformed ready-tasks response: {0}")]
    Malformed(String),

    #[error("Provider rejected the status request (status {status_code}): {message}")]
    Rejected { status_code: u32, message: String },
}

/// Errors raised while retrieving the pages of a finished job
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Provider rejected the pages request (status {status_code}): {message}")]
    RemoteRejected { status_code: u32, message: String },

    #[error("Provider returned no pages for task {task_id}")]
    EmptyResult { task_id: String },

    #[error("Network failure while fetching pages: {0}")]
    NetworkFailure(String),
}

/// Terminal outcomes of a poll loop other than a finished report
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Task {task_id} timed out after {attempts} status checks")]
    TimedOut {
        task_id: String,
        attempts: u32,
        last_error: Option<String>,
    },

    #[error("Task {task_id} failed: {reason}")]
    Failed { task_id: String, reason: FetchError },

    #[error("Polling of task {task_id} was cancelled")]
    Cancelled { task_id: String },

    #[error("Task {task_id} is already {status}")]
    AlreadyFinished {
        task_id: String,
        status: state::TaskStatus,
    },
}

impl CrawlError {
    /// Id of the task this outcome belongs to
    pub fn task_id(&self) -> &str {
        match self {
            Self::TimedOut { task_id, .. }
            | Self::Failed { task_id, .. }
            | Self::Cancelled { task_id }
            | Self::AlreadyFinished { task_id, .. } => task_id,
        }
    }
}

/// Result type alias for crawl-audit operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, CrawlOptions, PollingConfig};
pub use crawler::CrawlCoordinator;
pub use observer::{CrawlObserver, TracingObserver};
pub use report::{CrawlReport, Issue, IssueCategory, PageResult};
pub use state::{CrawlTask, TaskStatus};
