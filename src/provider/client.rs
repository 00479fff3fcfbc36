//! HTTP client for the IP-management API.

use crate::config::ProviderConfig;
use crate::provider::types::FailoverEnvelope;
use crate::provider::{FailoverIp, FailoverIpSource, SwitchService};
use reqwest::{Client, StatusCode};
use std::net::IpAddr;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

/// Errors returned by the IP-management API.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Client for the provider's failover endpoints.
#[derive(Debug, Clone)]
pub struct RobotClient {
    http: Client,
    base_url: String,
    username: String,
    password: String,
    list_timeout: Duration,
    switch_timeout: Duration,
}

impl RobotClient {
    /// Create a client from the provider configuration.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
            list_timeout: config.list_timeout,
            switch_timeout: config.switch_timeout,
        })
    }

    fn failover_url(&self) -> String {
        format!("{}/failover", self.base_url)
    }

    fn failover_ip_url(&self, ip: IpAddr) -> String {
        format!("{}/failover/{}", self.base_url, ip)
    }

    /// Point `ip` at `target`. The provider answers once the route is live.
    pub async fn set_active_server(&self, ip: IpAddr, target: IpAddr) -> Result<(), ProviderError> {
        let response = self
            .http
            .post(self.failover_ip_url(ip))
            .basic_auth(&self.username, Some(&self.password))
            .form(&[("active_server_ip", target.to_string())])
            .timeout(self.switch_timeout)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        debug!(ip = %ip, target = %target, status = %status, body = %body, "switch response");

        if status.is_success() {
            Ok(())
        } else {
            Err(ProviderError::Status { status, body })
        }
    }
}

impl FailoverIpSource for RobotClient {
    async fn list_failover_ips(&self) -> Result<Vec<FailoverIp>, ProviderError> {
        let response = self
            .http
            .get(self.failover_url())
            .basic_auth(&self.username, Some(&self.password))
            .timeout(self.list_timeout)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Status { status, body });
        }

        let entries: Vec<FailoverEnvelope> = serde_json::from_str(&body)?;
        Ok(entries.into_iter().map(|entry| entry.failover).collect())
    }
}

impl SwitchService for RobotClient {
    async fn switch(&self, ip: IpAddr, target: IpAddr) -> bool {
        match self.set_active_server(ip, target).await {
            Ok(()) => {
                info!(ip = %ip, target = %target, "switched {} to {}", ip, target);
                true
            }
            Err(e) => {
                error!(ip = %ip, target = %target, error = %e, "could not change target of {}", ip);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_server::TestServer;

    fn client_for(server: &TestServer) -> RobotClient {
        RobotClient::new(&ProviderConfig {
            api_url: format!("http://{}/", server.addr),
            username: "robot".to_string(),
            password: "secret".to_string(),
            list_timeout: Duration::from_secs(5),
            switch_timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_urls_strip_trailing_slash() {
        let client = RobotClient::new(&ProviderConfig {
            api_url: "https://robot-ws.example.com/".to_string(),
            username: "robot".to_string(),
            password: "secret".to_string(),
            list_timeout: Duration::from_secs(5),
            switch_timeout: Duration::from_secs(60),
        })
        .unwrap();

        assert_eq!(client.failover_url(), "https://robot-ws.example.com/failover");
        assert_eq!(
            client.failover_ip_url("203.0.113.10".parse().unwrap()),
            "https://robot-ws.example.com/failover/203.0.113.10"
        );
    }

    #[tokio::test]
    async fn test_list_failover_ips() {
        let server = TestServer::start(
            200,
            r#"[{"failover": {"ip": "203.0.113.10", "active_server_ip": "198.51.100.1"}}]"#,
        );
        let client = client_for(&server);

        let ips = client.list_failover_ips().await.unwrap();
        assert_eq!(ips.len(), 1);
        assert_eq!(ips[0].active_server_ip.as_deref(), Some("198.51.100.1"));

        let requests = server.requests();
        assert!(requests[0].starts_with("GET /failover "));
        assert!(requests[0].to_lowercase().contains("authorization: basic "));
    }

    #[tokio::test]
    async fn test_list_rejects_error_status() {
        let server = TestServer::start(401, r#"{"error": {"status": 401}}"#);
        let client = client_for(&server);

        let err = client.list_failover_ips().await.unwrap_err();
        assert!(matches!(err, ProviderError::Status { status, .. } if status == StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn test_list_rejects_bad_json() {
        let server = TestServer::start(200, "not json");
        let client = client_for(&server);

        assert!(matches!(
            client.list_failover_ips().await.unwrap_err(),
            ProviderError::Decode(_)
        ));
    }

    #[tokio::test]
    async fn test_switch_posts_form() {
        let server = TestServer::start(200, "{}");
        let client = client_for(&server);

        let switched = client
            .switch("203.0.113.10".parse().unwrap(), "198.51.100.2".parse().unwrap())
            .await;
        assert!(switched);

        let requests = server.requests();
        assert!(requests[0].starts_with("POST /failover/203.0.113.10 "));
        assert!(requests[0].ends_with("active_server_ip=198.51.100.2"));
    }

    #[tokio::test]
    async fn test_switch_failure_is_false() {
        let server = TestServer::start(409, r#"{"error": {"code": "FAILOVER_ALREADY_ROUTED"}}"#);
        let client = client_for(&server);

        let switched = client
            .switch("203.0.113.10".parse().unwrap(), "198.51.100.2".parse().unwrap())
            .await;
        assert!(!switched);
    }

    #[tokio::test]
    async fn test_switch_unreachable_api_is_false() {
        let client = RobotClient::new(&ProviderConfig {
            api_url: "http://127.0.0.1:1/".to_string(),
            username: "robot".to_string(),
            password: "secret".to_string(),
            list_timeout: Duration::from_secs(1),
            switch_timeout: Duration::from_secs(1),
        })
        .unwrap();

        let switched = client
            .switch("203.0.113.10".parse().unwrap(), "198.51.100.2".parse().unwrap())
            .await;
        assert!(!switched);
    }
}
