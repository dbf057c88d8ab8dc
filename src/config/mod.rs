//! Configuration module for crawl-audit
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use crawl_audit::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Polling every {:?}", config.polling.interval);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlOptions, OutputConfig, PollingConfig, ProviderConfig, DEFAULT_CHECKS_THRESHOLD,
    DEFAULT_MAX_PAGES, DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL,
};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate_crawl_options;
