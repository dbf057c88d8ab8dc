//! Report module for crawl results
//!
//! This module turns raw provider page records into typed results and the
//! aggregate report, including:
//! - Issue classification from check flags
//! - Aggregate metrics (health, average score, issue totals)
//! - Markdown and console rendering

mod aggregate;
mod classifier;
mod markdown;
mod types;

pub use aggregate::{average_score, build_report};
pub use classifier::{classify_flag, detect_issues, normalize_page, ISSUE_TABLE};
pub use markdown::{format_markdown_report, print_report_summary, write_markdown_report};
pub use types::{
    CrawlReport, Headings, ImageStats, Issue, IssueCategory, LinkStats, PageResult,
    HEALTHY_SCORE_THRESHOLD,
};
