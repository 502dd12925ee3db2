use crate::config::types::{
    Config, CrawlerConfig, DiscoveryConfig, OutputConfig, UserAgentConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
///
/// Seed URLs are not parsed here; an unparseable seed is logged and skipped
/// when the allowed-domain set is built.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_discovery_config(&config.discovery)?;

    if config.seeds.is_empty() {
        return Err(ConfigError::Validation(
            "at least one seed URL is required".to_string(),
        ));
    }

    Ok(())
}

/// Validates politeness configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_requests < 1 || config.max_concurrent_requests > 1000 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_requests must be between 1 and 1000, got {}",
            config.max_concurrent_requests
        )));
    }

    if config.max_concurrent_requests_per_domain < 1 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_requests_per_domain must be >= 1, got {}",
            config.max_concurrent_requests_per_domain
        )));
    }

    validate_seconds("download_delay", config.download_delay)?;
    validate_seconds("autothrottle_start_delay", config.autothrottle_start_delay)?;
    validate_seconds("autothrottle_max_delay", config.autothrottle_max_delay)?;
    validate_seconds("request_timeout", config.request_timeout)?;

    if config.autothrottle_max_delay < config.download_delay {
        return Err(ConfigError::Validation(format!(
            "autothrottle_max_delay ({}s) must not be lower than download_delay ({}s)",
            config.autothrottle_max_delay, config.download_delay
        )));
    }

    if !(config.autothrottle_target_concurrency > 0.0
        && config.autothrottle_target_concurrency.is_finite())
    {
        return Err(ConfigError::Validation(format!(
            "autothrottle_target_concurrency must be > 0, got {}",
            config.autothrottle_target_concurrency
        )));
    }

    if config.request_timeout == 0.0 {
        return Err(ConfigError::Validation(
            "request_timeout must be > 0".to_string(),
        ));
    }

    Ok(())
}

/// Checks that a duration in seconds is finite and non-negative
fn validate_seconds(name: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Validation(format!(
            "{} must be a non-negative number of seconds, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if let Some(contact) = &config.contact_url {
        Url::parse(contact)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates link discovery configuration
fn validate_discovery_config(config: &DiscoveryConfig) -> Result<(), ConfigError> {
    parse_selector(&config.next_page_selector)?;
    Ok(())
}

/// Parses a CSS selector, mapping failures to a configuration error
pub fn parse_selector(css: &str) -> Result<Selector, ConfigError> {
    if css.trim().is_empty() {
        return Err(ConfigError::InvalidSelector(
            "selector cannot be empty".to_string(),
        ));
    }
    Selector::parse(css).map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", css, e)))
}
