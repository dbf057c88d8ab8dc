use crate::config::types::{Config, CrawlOptions, OutputConfig, PollingConfig, ProviderConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on pages per crawl accepted by the provider
const MAX_PAGES_LIMIT: u32 = 10_000;

/// Longest accepted wait between two status checks (one day)
const MAX_POLL_INTERVAL_SECS: u64 = 86_400;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_provider_config(&config.provider)?;
    validate_crawl_options(&config.crawl)?;
    validate_polling_config(&config.polling)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates provider connection settings
fn validate_provider_config(config: &ProviderConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if config.login.is_empty() {
        return Err(ConfigError::Validation("login cannot be empty".to_string()));
    }

    if config.password.is_empty() {
        return Err(ConfigError::Validation(
            "password cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates job options, whether they come from the file or from a caller override
pub fn validate_crawl_options(options: &CrawlOptions) -> Result<(), ConfigError> {
    if options.max_pages < 1 || options.max_pages > MAX_PAGES_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max-pages must be between 1 and {}, got {}",
            MAX_PAGES_LIMIT, options.max_pages
        )));
    }

    if options.checks_threshold < 1 || options.checks_threshold > 100 {
        return Err(ConfigError::Validation(format!(
            "checks-threshold must be between 1 and 100, got {}",
            options.checks_threshold
        )));
    }

    Ok(())
}

/// Validates the polling schedule
fn validate_polling_config(config: &PollingConfig) -> Result<(), ConfigError> {
    if config.interval.is_zero() {
        return Err(ConfigError::Validation(
            "interval-secs must be >= 1".to_string(),
        ));
    }

    if config.interval.as_secs() > MAX_POLL_INTERVAL_SECS {
        return Err(ConfigError::Validation(format!(
            "interval-secs must be <= {}, got {}",
            MAX_POLL_INTERVAL_SECS,
            config.interval.as_secs()
        )));
    }

    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    if matches!(config.report_dir.as_deref(), Some("")) {
        return Err(ConfigError::Validation(
            "report-dir cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn provider() -> ProviderConfig {
        ProviderConfig {
            base_url: "https://api.example.com".to_string(),
            login: "user".to_string(),
            password: "pass".to_string(),
            request_timeout_secs: 60,
        }
    }

    #[test]
    fn test_validate_provider_config() {
        assert!(validate_provider_config(&provider()).is_ok());

        let mut bad = provider();
        bad.base_url = "ftp://api.example.com".to_string();
        assert!(matches!(
            validate_provider_config(&bad),
            Err(ConfigError::InvalidUrl(_))
        ));

        let mut bad = provider();
        bad.base_url = "not a url".to_string();
        assert!(validate_provider_config(&bad).is_err());

        let mut bad = provider();
        bad.login.clear();
        assert!(validate_provider_config(&bad).is_err());

        let mut bad = provider();
        bad.password.clear();
        assert!(validate_provider_config(&bad).is_err());
    }

    #[test]
    fn test_validate_crawl_options() {
        assert!(validate_crawl_options(&CrawlOptions::default()).is_ok());

        let options = CrawlOptions {
            max_pages: 0,
            ..CrawlOptions::default()
        };
        assert!(validate_crawl_options(&options).is_err());

        let options = CrawlOptions {
            checks_threshold: 101,
            ..CrawlOptions::default()
        };
        assert!(validate_crawl_options(&options).is_err());

        let options = CrawlOptions {
            max_pages: 10_000,
            checks_threshold: 100,
            enable_javascript: false,
        };
        assert!(validate_crawl_options(&options).is_ok());
    }

    #[test]
    fn test_validate_polling_config() {
        assert!(validate_polling_config(&PollingConfig::default()).is_ok());

        let zero_interval = PollingConfig {
            interval: Duration::ZERO,
            max_attempts: 5,
        };
        assert!(validate_polling_config(&zero_interval).is_err());

        let zero_attempts = PollingConfig {
            interval: Duration::from_secs(1),
            max_attempts: 0,
        };
        assert!(validate_polling_config(&zero_attempts).is_err());
    }

    #[test]
    fn test_validate_polling_interval_upper_bound() {
        let one_day = PollingConfig {
            interval: Duration::from_secs(86_400),
            max_attempts: u32::MAX,
        };
        assert!(validate_polling_config(&one_day).is_ok());

        let huge = PollingConfig {
            interval: Duration::from_secs(i64::MAX as u64),
            max_attempts: 60,
        };
        let err = validate_polling_config(&huge).unwrap_err();
        assert!(err.to_string().contains("interval-secs must be <= 86400"));
    }
}
