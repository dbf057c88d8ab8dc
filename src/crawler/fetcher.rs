//! Result retrieval for finished tasks
//!
//! This module requests the per-page records of a finished crawl, including:
//! - Filtering to pages that answered with HTTP 200
//! - Ordering sitemap pages first
//! - Normalizing each record into a `PageResult`

use crate::provider::{AuditProvider, PageFilter, PagesQuery, RawPage};
use crate::report::{normalize_page, PageResult};
use crate::FetchError;
use std::sync::Arc;

/// Sort order that puts pages listed in the sitemap first
pub const SITEMAP_FIRST_ORDER: &str = "meta.in_sitemap,desc";

/// Builds the pages query for a finished task
pub fn pages_query(task_id: &str, limit: u32) -> PagesQuery {
    PagesQuery {
        task_id: task_id.to_string(),
        limit,
        filters: vec![PageFilter::new("status_code", "=", 200)],
        order_by: vec![SITEMAP_FIRST_ORDER.to_string()],
    }
}

/// Retrieves the pages of finished crawl tasks
#[derive(Clone)]
pub struct ResultFetcher {
    provider: Arc<dyn AuditProvider>,
}

impl ResultFetcher {
    pub fn new(provider: Arc<dyn AuditProvider>) -> Self {
        Self { provider }
    }

    /// Fetches the raw page records of a task
    ///
    /// Zero pages is an error: an empty site cannot be told apart from a
    /// provider fault here, so the caller decides what it means.
    pub async fn fetch_raw(&self, task_id: &str, limit: u32) -> Result<Vec<RawPage>, FetchError> {
        let pages = self
            .provider
            .get_job_pages(&pages_query(task_id, limit))
            .await?;

        if pages.is_empty() {
            return Err(FetchError::EmptyResult {
                task_id: task_id.to_string(),
            });
        }

        tracing::debug!(task_id, pages = pages.len(), "Fetched page records");
        Ok(pages)
    }

    /// Fetches and normalizes the pages of a task, at most `limit` of them
    pub async fn fetch(&self, task_id: &str, limit: u32) -> Result<Vec<PageResult>, FetchError> {
        let raw = self.fetch_raw(task_id, limit).await?;
        Ok(raw.iter().take(limit as usize).map(normalize_page).collect())
    }
}
