//! Markdown report generation
//!
//! This module renders a human-readable markdown version of a crawl report,
//! including overview metrics, issue breakdowns and a per-page table.

use crate::report::types::{CrawlReport, IssueCategory};
use crate::AuditError;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Maximum number of pages listed in the per-page table
const MAX_PAGE_ROWS: usize = 200;

/// Maximum number of issues listed per category
const MAX_ISSUES_PER_CATEGORY: usize = 50;

/// Writes a markdown report to a file
///
/// # Arguments
///
/// * `report` - The crawl report
/// * `target_url` - Site the report belongs to, used in the heading
/// * `output_path` - Path where the markdown file should be written
pub fn write_markdown_report(
    report: &CrawlReport,
    target_url: &str,
    output_path: &Path,
) -> Result<(), AuditError> {
    let markdown = format_markdown_report(report, target_url);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl report as markdown
pub fn format_markdown_report(report: &CrawlReport, target_url: &str) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Site Audit: {}\n\n", target_url));
    md.push_str(&format!(
        "- **Crawl Date**: {}\n\n",
        report.crawl_date.format("%Y-%m-%d %H:%M UTC")
    ));

    // Overview
    md.push_str("## Overview\n\n");
    md.push_str(&format!("- **Total Pages**: {}\n", report.total_pages));
    md.push_str(&format!(
        "- **Healthy Pages** (score >= 80): {}\n",
        report.healthy_pages
    ));
    md.push_str(&format!(
        "- **Pages Needing Attention**: {}\n",
        report.pages_with_issues
    ));
    md.push_str(&format!("- **Average Score**: {}\n", report.average_score));
    md.push_str(&format!("- **Total Issues**: {}\n\n", report.total_errors));

    // Issues per category
    md.push_str("## Issues by Category\n\n");
    md.push_str("| Category | Issues |\n");
    md.push_str("|----------|--------|\n");
    for category in IssueCategory::all() {
        md.push_str(&format!(
            "| {} | {} |\n",
            category,
            report.issue_count(category)
        ));
    }
    md.push('\n');

    for (category, issues) in &report.issues_by_category {
        if issues.is_empty() {
            continue;
        }

        md.push_str(&format!("### {} ({})\n\n", category, issues.len()));
        for issue in issues.iter().take(MAX_ISSUES_PER_CATEGORY) {
            md.push_str(&format!("- {}: {}\n", issue.description, issue.page_url));
        }
        if issues.len() > MAX_ISSUES_PER_CATEGORY {
            md.push_str(&format!(
                "\n... and {} more\n",
                issues.len() - MAX_ISSUES_PER_CATEGORY
            ));
        }
        md.push('\n');
    }

    // Pages
    if !report.pages.is_empty() {
        md.push_str("## Pages\n\n");
        md.push_str("| URL | Score | Load (ms) | Words | Issues |\n");
        md.push_str("|-----|-------|-----------|-------|--------|\n");

        for page in report.pages.iter().take(MAX_PAGE_ROWS) {
            md.push_str(&format!(
                "| {} | {:.1} | {} | {} | {} |\n",
                page.url,
                page.on_page_score,
                page.load_time_ms,
                page.word_count,
                page.issues.len()
            ));
        }
        if report.pages.len() > MAX_PAGE_ROWS {
            md.push_str(&format!(
                "\n... and {} more pages\n",
                report.pages.len() - MAX_PAGE_ROWS
            ));
        }
        md.push('\n');
    }

    md
}

/// Prints the report overview to stdout
pub fn print_report_summary(report: &CrawlReport, target_url: &str) {
    println!("=== Site Audit: {} ===\n", target_url);

    println!("Overview:");
    println!("  Total pages: {}", report.total_pages);
    println!("  Healthy pages: {}", report.healthy_pages);
    println!("  Pages needing attention: {}", report.pages_with_issues);
    println!("  Average score: {}", report.average_score);
    println!("  Total issues: {}", report.total_errors);
    println!();

    if report.total_errors > 0 {
        println!("Issues by Category:");
        let mut counts: Vec<_> = report
            .issues_by_category
            .iter()
            .map(|(category, issues)| (category, issues.len()))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        for (category, count) in counts {
            let percentage = (count as f64 / report.total_errors as f64) * 100.0;
            println!("  {}: {} ({:.1}%)", category, count, percentage);
        }
        println!();
    }
}
