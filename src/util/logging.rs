//! Logging initialization and configuration.

use crate::config::LogFormat;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging system.
///
/// `RUST_LOG` takes precedence over `level` when set.
///
/// # Arguments
///
/// * `level` - Log level filter (e.g., "info", "debug")
/// * `format` - Log output format (json or pretty)
pub fn init_logging(level: &str, format: &LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => {
            registry.with(fmt::layer().json()).init();
        }
        LogFormat::Pretty => {
            registry.with(fmt::layer().with_target(false)).init();
        }
    }
}

/// Pick the effective log level from the CLI flags and the config.
///
/// `--verbose` wins over `--log-level`, which wins over the config file.
pub fn effective_level<'a>(verbose: bool, cli_level: Option<&'a str>, config_level: &'a str) -> &'a str {
    if verbose {
        "debug"
    } else {
        cli_level.unwrap_or(config_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Logging can only be initialized once per process, so init_logging is
    // not exercised here.
    #[test]
    fn test_verbose_forces_debug() {
        assert_eq!(effective_level(true, Some("warn"), "info"), "debug");
    }

    #[test]
    fn test_cli_level_overrides_config() {
        assert_eq!(effective_level(false, Some("warn"), "info"), "warn");
        assert_eq!(effective_level(false, None, "error"), "error");
    }
}
