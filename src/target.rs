//! Monitored endpoints.

use crate::config::HealthCheckConfig;
use std::fmt;
use std::io;
use std::net::IpAddr;
use thiserror::Error;
use tokio::net::lookup_host;

/// Which side of the cluster a target is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Primary,
    Backup,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Primary => "primary",
            Role::Backup => "backup",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while resolving a host name.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("DNS lookup for {host} failed: {source}")]
    Lookup {
        host: String,
        #[source]
        source: io::Error,
    },

    #[error("DNS lookup for {host} returned no addresses")]
    NoAddress { host: String },
}

/// A load balancer being watched.
///
/// The address is resolved once at startup and never refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub role: Role,
    pub hostname: String,
    pub address: IpAddr,
    pub check_url: String,
}

impl Target {
    /// Build a target from an already known address.
    pub fn new(
        role: Role,
        hostname: impl Into<String>,
        address: IpAddr,
        health_check: &HealthCheckConfig,
    ) -> Self {
        Self {
            role,
            hostname: hostname.into(),
            address,
            check_url: health_check.url_for(address),
        }
    }

    /// Resolve `hostname` and build its health check URL.
    pub async fn resolve(
        role: Role,
        hostname: &str,
        health_check: &HealthCheckConfig,
    ) -> Result<Self, ResolveError> {
        let address = lookup_address(hostname).await?;
        Ok(Self::new(role, hostname, address, health_check))
    }
}

/// Resolve a host name, preferring an IPv4 address.
///
/// IP literals are returned as-is without a lookup.
pub async fn lookup_address(hostname: &str) -> Result<IpAddr, ResolveError> {
    if let Ok(ip) = hostname.parse::<IpAddr>() {
        return Ok(ip);
    }

    let addresses: Vec<IpAddr> = lookup_host((hostname, 0))
        .await
        .map_err(|source| ResolveError::Lookup {
            host: hostname.to_string(),
            source,
        })?
        .map(|addr| addr.ip())
        .collect();

    addresses
        .iter()
        .find(|ip| ip.is_ipv4())
        .or_else(|| addresses.first())
        .copied()
        .ok_or_else(|| ResolveError::NoAddress {
            host: hostname.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn health_check() -> HealthCheckConfig {
        HealthCheckConfig {
            url: "https://<hostname>:8443/stats".to_string(),
            username: None,
            password: None,
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_ip_literal_skips_lookup() {
        let ip = lookup_address("198.51.100.4").await.unwrap();
        assert_eq!(ip, "198.51.100.4".parse::<IpAddr>().unwrap());
    }

    #[tokio::test]
    async fn test_resolve_localhost() {
        let ip = lookup_address("localhost").await.unwrap();
        assert!(ip.is_loopback());
    }

    #[tokio::test]
    async fn test_unknown_host_fails() {
        let result = lookup_address("no-such-host.invalid").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_resolve_builds_check_url() {
        let target = Target::resolve(Role::Backup, "203.0.113.20", &health_check())
            .await
            .unwrap();
        assert_eq!(target.role, Role::Backup);
        assert_eq!(target.hostname, "203.0.113.20");
        assert_eq!(target.check_url, "https://203.0.113.20:8443/stats");
    }

    #[tokio::test]
    async fn test_ipv6_check_url_is_bracketed() {
        let target = Target::resolve(Role::Primary, "2001:db8::10", &health_check())
            .await
            .unwrap();
        assert_eq!(target.check_url, "https://[2001:db8::10]:8443/stats");
    }

    #[tokio::test]
    async fn test_ipv6_target_is_reachable() {
        use crate::health::{HealthProbe, HttpProber};
        use crate::util::test_server::TestServer;

        // Hosts without IPv6 loopback have nothing to check.
        let Ok(server) = TestServer::bind("[::1]:0", 200, "OK") else {
            return;
        };
        let health_check = HealthCheckConfig {
            url: format!("http://<hostname>:{}/stats", server.addr.port()),
            ..health_check()
        };
        let target = Target::resolve(Role::Primary, "::1", &health_check)
            .await
            .unwrap();
        let prober = HttpProber::from_config(&health_check).unwrap();

        assert_eq!(
            target.check_url,
            format!("http://[::1]:{}/stats", server.addr.port())
        );
        assert!(prober.probe(&target.check_url).await);
        assert_eq!(server.requests().len(), 1);
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Primary.to_string(), "primary");
        assert_eq!(Role::Backup.to_string(), "backup");
    }
}
