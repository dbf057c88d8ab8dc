//! Page normalization and issue classification
//!
//! Raw check flags are mapped to issues through a literal lookup table.
//! Flags that are not in the table, or that are `false`, produce nothing.

use crate::provider::RawPage;
use crate::report::types::{Headings, ImageStats, Issue, IssueCategory, LinkStats, PageResult};

/// Known check flags: `(flag, category, description)`, in emission order
pub const ISSUE_TABLE: &[(&str, IssueCategory, &str)] = &[
    ("no_title", IssueCategory::Seo, "Missing title tag"),
    ("no_description", IssueCategory::Seo, "Missing meta description"),
    ("no_h1_tag", IssueCategory::Seo, "Missing H1 tag"),
    ("title_too_long", IssueCategory::Seo, "Title tag too long"),
    ("title_too_short", IssueCategory::Seo, "Title tag too short"),
    ("duplicate_title_tag", IssueCategory::Seo, "Duplicate title tag"),
    ("no_image_alt", IssueCategory::Seo, "Images missing alt text"),
    ("high_loading_time", IssueCategory::Performance, "High page loading time"),
    ("high_waiting_time", IssueCategory::Performance, "High server waiting time"),
    ("large_page_size", IssueCategory::Performance, "Large page size"),
    ("is_http", IssueCategory::Security, "HTTP instead of HTTPS"),
    ("https_to_http_links", IssueCategory::Security, "HTTPS page links to HTTP pages"),
    ("frame", IssueCategory::Technical, "Page contains frames"),
    ("no_doctype", IssueCategory::Technical, "Missing DOCTYPE declaration"),
    ("no_encoding_meta_tag", IssueCategory::Technical, "Missing encoding meta tag"),
    ("deprecated_html_tags", IssueCategory::Technical, "Deprecated HTML tags used"),
    ("lorem_ipsum", IssueCategory::Content, "Placeholder lorem ipsum text"),
    ("low_content_rate", IssueCategory::Content, "Low text-to-HTML ratio"),
    ("is_redirect", IssueCategory::Redirect, "Page redirects to another URL"),
    ("is_broken", IssueCategory::Error, "Broken page"),
    ("is_4xx_code", IssueCategory::Error, "4xx client error"),
    ("is_5xx_code", IssueCategory::Error, "5xx server error"),
];

/// Looks up the category and description of a check flag
pub fn classify_flag(flag: &str) -> Option<(IssueCategory, &'static str)> {
    ISSUE_TABLE
        .iter()
        .find(|(name, _, _)| *name == flag)
        .map(|(_, category, description)| (*category, *description))
}

/// Translates the raw flags of a page into issues
pub fn detect_issues(page_url: &str, checks: &std::collections::BTreeMap<String, bool>) -> Vec<Issue> {
    ISSUE_TABLE
        .iter()
        .filter(|(flag, _, _)| checks.get(*flag).copied().unwrap_or(false))
        .map(|(_, category, description)| Issue {
            category: *category,
            description: (*description).to_string(),
            page_url: page_url.to_string(),
        })
        .collect()
}

/// Normalizes a raw provider page into a [`PageResult`]
///
/// The provider's score is passed through; missing counters become zero.
pub fn normalize_page(raw: &RawPage) -> PageResult {
    let meta = raw.meta.clone().unwrap_or_default();
    let htags = meta.htags.unwrap_or_default();
    let raw_checks = raw.check_flags();
    let issues = detect_issues(&raw.url, &raw_checks);

    let load_time_ms = raw
        .page_timing
        .as_ref()
        .and_then(|timing| timing.duration_time)
        .filter(|ms| ms.is_finite() && *ms >= 0.0)
        .map(|ms| ms.round() as u64)
        .unwrap_or(0);

    PageResult {
        url: raw.url.clone(),
        title: meta.title.filter(|t| !t.is_empty()),
        meta_description: meta.description.filter(|d| !d.is_empty()),
        headings: Headings {
            h1: htags.h1,
            h2: htags.h2,
        },
        status_code: raw.status_code.unwrap_or(200),
        load_time_ms,
        size_bytes: raw.size.unwrap_or(0),
        word_count: meta
            .content
            .and_then(|content| content.plain_text_word_count)
            .unwrap_or(0),
        image_stats: ImageStats {
            total: meta.images_count.unwrap_or(0),
            broken: meta.broken_images_count.unwrap_or(0),
            missing_alt: meta.images_without_alt_count.unwrap_or(0),
        },
        link_stats: LinkStats {
            internal: meta.internal_links_count.unwrap_or(0),
            external: meta.external_links_count.unwrap_or(0),
            broken: meta.broken_links_count.unwrap_or(0),
        },
        raw_checks,
        on_page_score: raw.onpage_score.unwrap_or(0.0),
        issues,
    }
}
