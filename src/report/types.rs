//! Report data structures
//!
//! These are the typed, provider-independent shapes produced from raw page
//! records. All of them serialize to JSON so a report can be stored as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Fixed set of issue categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
    Seo,
    Performance,
    Security,
    Technical,
    Content,
    Redirect,
    Error,
}

impl IssueCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seo => "seo",
            Self::Performance => "performance",
            Self::Security => "security",
            Self::Technical => "technical",
            Self::Content => "content",
            Self::Redirect => "redirect",
            Self::Error => "error",
        }
    }

    /// Returns all categories in display order
    pub fn all() -> [Self; 7] {
        [
            Self::Seo,
            Self::Performance,
            Self::Security,
            Self::Technical,
            Self::Content,
            Self::Redirect,
            Self::Error,
        ]
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single problem detected on a page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub category: IssueCategory,
    pub description: String,
    pub page_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Headings {
    pub h1: Vec<String>,
    pub h2: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageStats {
    pub total: u32,
    pub broken: u32,
    pub missing_alt: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStats {
    pub internal: u32,
    pub external: u32,
    pub broken: u32,
}

/// Normalized audit result of one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    pub url: String,
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub headings: Headings,
    pub status_code: u16,
    pub load_time_ms: u64,
    pub size_bytes: u64,
    pub word_count: u32,
    pub image_stats: ImageStats,
    pub link_stats: LinkStats,
    pub raw_checks: BTreeMap<String, bool>,
    /// Provider-computed score, used verbatim
    pub on_page_score: f64,
    pub issues: Vec<Issue>,
}

impl PageResult {
    /// Returns true if the page meets the healthy score threshold
    ///
    /// Health depends on the score alone; a healthy page may still carry issues.
    pub fn is_healthy(&self) -> bool {
        self.on_page_score >= HEALTHY_SCORE_THRESHOLD
    }
}

/// Score from which a page counts as healthy
pub const HEALTHY_SCORE_THRESHOLD: f64 = 80.0;

/// Aggregate report of one completed crawl
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlReport {
    pub total_pages: u32,
    pub healthy_pages: u32,
    pub pages_with_issues: u32,
    pub average_score: u32,
    pub total_errors: u32,
    pub pages: Vec<PageResult>,
    pub issues_by_category: BTreeMap<IssueCategory, Vec<Issue>>,
    pub crawl_date: DateTime<Utc>,
}

impl CrawlReport {
    /// Number of issues in a category
    pub fn issue_count(&self, category: IssueCategory) -> usize {
        self.issues_by_category
            .get(&category)
            .map(Vec::len)
            .unwrap_or(0)
    }
}
