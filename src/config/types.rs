use serde::{Deserialize, Deserializer};
use std::time::Duration;

/// Default number of pages the provider is asked to crawl
pub const DEFAULT_MAX_PAGES: u32 = 100;

/// Default minimum percentage of provider checks run per page
pub const DEFAULT_CHECKS_THRESHOLD: u8 = 90;

/// Default wait between two status checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Default number of status checks before a task is considered timed out
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 60;

/// Main configuration structure for crawl-audit
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub provider: ProviderConfig,
    #[serde(default)]
    pub crawl: CrawlOptions,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Audit provider connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the provider API (e.g. "https://api.dataforseo.com")
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// HTTP Basic login
    pub login: String,

    /// HTTP Basic password
    pub password: String,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Job options sent with every crawl submission
///
/// Both `max_pages` and `checks_threshold` are passed to the provider as-is;
/// how the provider interprets them is its own business.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CrawlOptions {
    /// Maximum number of pages to crawl
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Render pages with JavaScript before auditing
    #[serde(rename = "enable-javascript", default = "default_true")]
    pub enable_javascript: bool,

    /// Minimum percentage of available checks to run per page
    #[serde(rename = "checks-threshold", default = "default_checks_threshold")]
    pub checks_threshold: u8,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            enable_javascript: true,
            checks_threshold: DEFAULT_CHECKS_THRESHOLD,
        }
    }
}

/// Status polling schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PollingConfig {
    /// Wait before each status check
    #[serde(
        rename = "interval-secs",
        default = "default_poll_interval",
        deserialize_with = "duration_from_secs"
    )]
    pub interval: Duration,

    /// Number of status checks before giving up
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl PollingConfig {
    /// Wall-clock ceiling of a full poll loop, saturating at `Duration::MAX`
    pub fn budget(&self) -> Duration {
        self.interval
            .checked_mul(self.max_attempts)
            .unwrap_or(Duration::MAX)
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,

    /// Directory for markdown reports
    #[serde(rename = "report-dir", default)]
    pub report_dir: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            report_dir: None,
        }
    }
}

fn default_request_timeout() -> u64 {
    60
}

fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}

fn default_checks_threshold() -> u8 {
    DEFAULT_CHECKS_THRESHOLD
}

fn default_true() -> bool {
    true
}

fn default_poll_interval() -> Duration {
    DEFAULT_POLL_INTERVAL
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_POLL_ATTEMPTS
}

fn default_database_path() -> String {
    "./crawl-audit.db".to_string()
}

fn duration_from_secs<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_secs)
}
