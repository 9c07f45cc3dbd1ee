use crate::config::types::{BulkConfig, Config, FetcherConfig};
use crate::ConfigError;

/// Upper bound on concurrently fetched bulk rows
pub const MAX_CONCURRENT_ROWS: usize = 16;

/// Upper bound on redirect hops
pub const MAX_REDIRECTS: usize = 20;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.database.path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "database.path cannot be empty".to_string(),
        ));
    }

    if config.checkpoints.dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "checkpoints.dir cannot be empty".to_string(),
        ));
    }

    validate_fetcher_config(&config.fetcher)?;
    validate_bulk_config(&config.bulk)?;
    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request-timeout-secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "connect-timeout-secs must be >= 1, got {}",
            config.connect_timeout_secs
        )));
    }

    if config.max_redirects > MAX_REDIRECTS {
        return Err(ConfigError::Validation(format!(
            "max-redirects must be <= {}, got {}",
            MAX_REDIRECTS, config.max_redirects
        )));
    }

    Ok(())
}

/// Validates bulk configuration
fn validate_bulk_config(config: &BulkConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_rows < 1 || config.max_concurrent_rows > MAX_CONCURRENT_ROWS {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-rows must be between 1 and {}, got {}",
            MAX_CONCURRENT_ROWS, config.max_concurrent_rows
        )));
    }

    Ok(())
}
