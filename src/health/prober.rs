//! Single-shot HTTP health probe.
//!
//! A target counts as reachable when its check URL answers at all, with any
//! status. Timeouts, refused connections and TLS errors count as unreachable.
//! The prober never retries; hysteresis belongs to the failover controller.

use crate::config::HealthCheckConfig;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Reports whether a URL is reachable.
pub trait HealthProbe {
    fn probe(&self, url: &str) -> impl Future<Output = bool> + Send;
}

/// Basic auth credentials for the check endpoint.
#[derive(Debug, Clone)]
struct Credentials {
    username: String,
    password: String,
}

/// Probes the load balancer's stats page over HTTP(S).
///
/// Certificate validation is disabled: the endpoints are our own load
/// balancers, usually addressed by IP with a certificate for their name.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
    credentials: Option<Credentials>,
}

impl HttpProber {
    /// Create a prober with the given per-request timeout.
    pub fn new(
        timeout: Duration,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(true)
            .build()?;

        let credentials = username.map(|username| Credentials {
            username,
            password: password.unwrap_or_default(),
        });

        Ok(Self {
            client,
            credentials,
        })
    }

    /// Create a prober from the health check configuration.
    pub fn from_config(config: &HealthCheckConfig) -> Result<Self, reqwest::Error> {
        Self::new(
            config.timeout,
            config.username.clone(),
            config.password.clone(),
        )
    }
}

impl HealthProbe for HttpProber {
    async fn probe(&self, url: &str) -> bool {
        let mut request = self.client.get(url);
        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.username, Some(&credentials.password));
        }

        match request.send().await {
            Ok(response) => {
                debug!(url = %url, status = %response.status(), "health check answered");
                true
            }
            Err(e) => {
                debug!(url = %url, error = %e, "health check failed");
                false
            }
        }
    }
}
