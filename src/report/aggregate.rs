//! Report aggregation over a full set of page results

use crate::report::types::{CrawlReport, Issue, IssueCategory, PageResult};
use chrono::Utc;
use std::collections::BTreeMap;

/// Rounded mean of page scores; 0 for an empty set
///
/// Halves round up, and the result is clamped to `[0, 100]`.
pub fn average_score(scores: &[f64]) -> u32 {
    if scores.is_empty() {
        return 0;
    }

    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    mean.round().clamp(0.0, 100.0) as u32
}

/// Builds the aggregate report for a completed crawl
///
/// - `healthy_pages` counts pages scoring at least 80
/// - `pages_with_issues` is every other page
/// - `total_errors` counts issues across all pages, independently of health
pub fn build_report(pages: Vec<PageResult>) -> CrawlReport {
    let total_pages = pages.len() as u32;
    let healthy_pages = pages.iter().filter(|page| page.is_healthy()).count() as u32;

    let scores: Vec<f64> = pages.iter().map(|page| page.on_page_score).collect();
    let total_errors = pages.iter().map(|page| page.issues.len()).sum::<usize>() as u32;

    let mut issues_by_category: BTreeMap<IssueCategory, Vec<Issue>> = BTreeMap::new();
    for issue in pages.iter().flat_map(|page| page.issues.iter()) {
        issues_by_category
            .entry(issue.category)
            .or_default()
            .push(issue.clone());
    }

    CrawlReport {
        total_pages,
        healthy_pages,
        pages_with_issues: total_pages - healthy_pages,
        average_score: average_score(&scores),
        total_errors,
        pages,
        issues_by_category,
        crawl_date: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::types::{Headings, ImageStats, LinkStats};
    use rand::Rng;

    fn page(url: &str, score: f64, issues: &[(IssueCategory, &str)]) -> PageResult {
        PageResult {
            url: url.to_string(),
            title: None,
            meta_description: None,
            headings: Headings::default(),
            status_code: 200,
            load_time_ms: 0,
            size_bytes: 0,
            word_count: 0,
            image_stats: ImageStats::default(),
            link_stats: LinkStats::default(),
            raw_checks: Default::default(),
            on_page_score: score,
            issues: issues
                .iter()
                .map(|(category, description)| Issue {
                    category: *category,
                    description: description.to_string(),
                    page_url: url.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_aggregate_metrics() {
        let report = build_report(vec![
            page("https://example.com/", 95.0, &[(IssueCategory::Seo, "Missing H1 tag")]),
            page("https://example.com/a", 80.0, &[]),
            page(
                "https://example.com/b",
                42.0,
                &[
                    (IssueCategory::Error, "Broken page"),
                    (IssueCategory::Seo, "Missing title tag"),
                ],
            ),
            page("https://example.com/c", 79.9, &[]),
        ]);

        assert_eq!(report.total_pages, 4);
        assert_eq!(report.healthy_pages, 2);
        assert_eq!(report.pages_with_issues, 2);
        assert_eq!(report.total_errors, 3);
        // (95 + 80 + 42 + 79.9) / 4 = 74.225
        assert_eq!(report.average_score, 74);
        assert_eq!(report.issue_count(IssueCategory::Seo), 2);
        assert_eq!(report.issue_count(IssueCategory::Error), 1);
        assert_eq!(report.issue_count(IssueCategory::Security), 0);
    }

    #[test]
    fn test_health_and_issue_count_are_independent() {
        let report = build_report(vec![
            page("https://example.com/", 99.0, &[(IssueCategory::Content, "Low text-to-HTML ratio")]),
            page("https://example.com/slow", 10.0, &[]),
        ]);

        assert_eq!(report.healthy_pages, 1);
        assert_eq!(report.pages_with_issues, 1);
        assert_eq!(report.total_errors, 1);
    }

    #[test]
    fn test_issue_grouping_keeps_page_urls() {
        let report = build_report(vec![
            page("https://example.com/1", 90.0, &[(IssueCategory::Redirect, "Page redirects to another URL")]),
            page("https://example.com/2", 90.0, &[(IssueCategory::Redirect, "Page redirects to another URL")]),
        ]);

        let redirects = &report.issues_by_category[&IssueCategory::Redirect];
        let urls: Vec<&str> = redirects.iter().map(|i| i.page_url.as_str()).collect();
        assert_eq!(urls, vec!["https://example.com/1", "https://example.com/2"]);
    }

    #[test]
    fn test_average_score_rounding() {
        assert_eq!(average_score(&[]), 0);
        assert_eq!(average_score(&[50.0, 51.0]), 51);
        assert_eq!(average_score(&[0.0, 0.0, 1.0]), 0);
        assert_eq!(average_score(&[100.0]), 100);
    }

    #[test]
    fn test_average_score_matches_integer_mean() {
        let mut rng = rand::thread_rng();

        for _ in 0..500 {
            let len = rng.gen_range(1..=60);
            let scores: Vec<u32> = (0..len).map(|_| rng.gen_range(0..=100)).collect();

            let sum: u32 = scores.iter().sum();
            let n = scores.len() as u32;
            // round-half-up of sum / n in integer arithmetic
            let expected = (2 * sum + n) / (2 * n);

            let as_f64: Vec<f64> = scores.iter().map(|s| f64::from(*s)).collect();
            let actual = average_score(&as_f64);

            assert!(actual <= 100, "average {} out of range for {:?}", actual, scores);
            assert_eq!(actual, expected, "scores: {:?}", scores);
        }
    }

    #[test]
    fn test_page_totals_always_balance() {
        let mut rng = rand::thread_rng();

        for _ in 0..200 {
            let len = rng.gen_range(1..=40);
            let pages: Vec<PageResult> = (0..len)
                .map(|i| page(&format!("https://example.com/{}", i), f64::from(rng.gen_range(0..=100u32)), &[]))
                .collect();

            let report = build_report(pages);
            assert_eq!(report.total_pages, report.healthy_pages + report.pages_with_issues);
        }
    }
}
