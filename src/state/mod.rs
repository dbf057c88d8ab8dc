//! State module for tracking crawl task progress
//!
//! # Components
//!
//! - `TaskStatus`: lifecycle states of a remote crawl task and the allowed transitions
//! - `CrawlTask`: the in-memory record of one remote crawl job

mod task;
mod task_status;

// Re-export main types
pub use task::CrawlTask;
pub use task_status::TaskStatus;
