//! Configuration validation.

use crate::config::{Config, HOSTNAME_PLACEHOLDER};

/// Validate the configuration.
///
/// Checks for:
/// - Non-empty, distinct primary and backup hosts
/// - A health check URL template containing the `<hostname>` placeholder
/// - An http(s) provider API URL and credentials
/// - Non-zero timeouts
/// - A known log level
///
/// # Returns
///
/// `Ok(())` if valid, or an error message describing every problem found.
pub fn validate_config(config: &Config) -> Result<(), String> {
    let mut errors = Vec::new();

    let primary = config.failover.primary.trim();
    let backup = config.failover.backup.trim();

    if primary.is_empty() {
        errors.push("failover.primary cannot be empty".to_string());
    }
    if backup.is_empty() {
        errors.push("failover.backup cannot be empty".to_string());
    }
    if !primary.is_empty() && primary.eq_ignore_ascii_case(backup) {
        errors.push(format!(
            "failover.primary and failover.backup must differ (both are '{}')",
            primary
        ));
    }

    // Health check endpoint
    if !config.health_check.url.contains(HOSTNAME_PLACEHOLDER) {
        errors.push(format!(
            "health_check.url must contain the {} placeholder",
            HOSTNAME_PLACEHOLDER
        ));
    }
    if config.health_check.username.is_some() != config.health_check.password.is_some() {
        errors.push("health_check.username and health_check.password must be set together".to_string());
    }
    if config.health_check.timeout.is_zero() {
        errors.push("health_check.timeout must be greater than zero".to_string());
    }

    // Provider API
    let api_url = config.provider.api_url.trim();
    if api_url.is_empty() {
        errors.push("provider.api_url cannot be empty".to_string());
    } else if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
        errors.push(format!(
            "provider.api_url '{}' must start with http:// or https://",
            api_url
        ));
    }
    if config.provider.username.is_empty() {
        errors.push("provider.username cannot be empty".to_string());
    }
    if config.provider.list_timeout.is_zero() {
        errors.push("provider.list_timeout must be greater than zero".to_string());
    }
    if config.provider.switch_timeout.is_zero() {
        errors.push("provider.switch_timeout must be greater than zero".to_string());
    }

    // Validate log level
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.global.log_level.to_lowercase().as_str()) {
        errors.push(format!(
            "invalid log level '{}', must be one of: {}",
            config.global.log_level,
            valid_levels.join(", ")
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("; "))
    }
}
