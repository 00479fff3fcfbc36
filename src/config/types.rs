//! Configuration data types.

use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Placeholder in the health check URL template that is replaced with the
/// resolved address of each target.
pub const HOSTNAME_PLACEHOLDER: &str = "<hostname>";

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Global settings
    #[serde(default)]
    pub global: GlobalConfig,

    /// The two load balancers being watched
    pub failover: FailoverConfig,

    /// IP-management API access
    pub provider: ProviderConfig,

    /// Health check endpoint settings
    pub health_check: HealthCheckConfig,
}

/// Global configuration settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GlobalConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            metrics: MetricsConfig::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Metrics endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Whether the metrics endpoint is served
    #[serde(default)]
    pub enabled: bool,

    /// Address to bind metrics server
    #[serde(default = "default_metrics_address")]
    pub address: SocketAddr,

    /// Path for metrics endpoint
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            address: default_metrics_address(),
            path: default_metrics_path(),
        }
    }
}

/// Primary and backup host names.
#[derive(Debug, Clone, Deserialize)]
pub struct FailoverConfig {
    /// Host that normally owns the failover IPs
    pub primary: String,

    /// Host the failover IPs are moved to while the primary is down
    pub backup: String,
}

/// IP-management API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the API, e.g. `https://robot-ws.your-server.de/`
    pub api_url: String,

    /// Basic auth user
    pub username: String,

    /// Basic auth password
    pub password: String,

    /// Timeout for listing failover IPs
    #[serde(default = "default_list_timeout", with = "humantime_serde")]
    pub list_timeout: Duration,

    /// Timeout for a single switch request; the provider applies the
    /// change before answering, which can take up to a minute
    #[serde(default = "default_switch_timeout", with = "humantime_serde")]
    pub switch_timeout: Duration,
}

/// Health check endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthCheckConfig {
    /// URL template containing the `<hostname>` placeholder
    pub url: String,

    /// Optional basic auth user
    #[serde(default)]
    pub username: Option<String>,

    /// Optional basic auth password
    #[serde(default)]
    pub password: Option<String>,

    /// Timeout for a single probe
    #[serde(default = "default_probe_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl HealthCheckConfig {
    /// Build the check URL for a resolved address.
    ///
    /// IPv6 addresses are bracketed so a port after the placeholder stays
    /// unambiguous.
    pub fn url_for(&self, address: IpAddr) -> String {
        let host = match address {
            IpAddr::V4(v4) => v4.to_string(),
            IpAddr::V6(v6) => format!("[{}]", v6),
        };
        self.url.replace(HOSTNAME_PLACEHOLDER, &host)
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

fn default_metrics_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9100))
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_list_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_switch_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_probe_timeout() -> Duration {
    Duration::from_secs(5)
}

/// Custom serde module for humantime durations.
mod humantime_serde {
    use serde::{self, Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
