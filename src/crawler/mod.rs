//! Crawler module for remote crawl orchestration
//!
//! This module contains the lifecycle of one provider-side crawl, including:
//! - Job submission with target normalization
//! - Bounded, cancellable status polling
//! - Retrieval of per-page results
//! - Overall coordination and lifecycle recording

mod coordinator;
mod fetcher;
mod poller;
mod submitter;

pub use coordinator::CrawlCoordinator;
pub use fetcher::{pages_query, ResultFetcher, SITEMAP_FIRST_ORDER};
pub use poller::StatusPoller;
pub use submitter::{build_job, job_tag, TaskHandle, TaskSubmitter};
