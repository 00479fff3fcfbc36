//! Startup: resolve both targets and capture the managed failover IPs.
//!
//! Any error here is fatal; the daemon exits before the control loop starts.

use crate::config::Config;
use crate::provider::{discover_managed_ips, FailoverIpSource, ManagedIps, ProviderError};
use crate::target::{ResolveError, Role, Target};
use std::net::IpAddr;
use thiserror::Error;
use tracing::{debug, error, info};

/// Errors that stop the daemon at startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("could not find IP address of {role} host: {source}")]
    Resolve {
        role: Role,
        #[source]
        source: ResolveError,
    },

    #[error("could not get failover IPs for {host}: {source}")]
    Discovery {
        host: String,
        #[source]
        source: ProviderError,
    },

    #[error("no failover IPs are routed to {host} ({address})")]
    NoManagedIps { host: String, address: IpAddr },
}

/// Everything the control loop needs, fixed for the process lifetime.
#[derive(Debug, Clone)]
pub struct Cluster {
    pub primary: Target,
    pub backup: Target,
    pub managed_ips: ManagedIps,
}

/// Resolve both hosts and discover the failover IPs routed to the primary.
pub async fn bootstrap<S>(config: &Config, source: &S) -> Result<Cluster, StartupError>
where
    S: FailoverIpSource + Sync,
{
    let primary = resolve(Role::Primary, &config.failover.primary, config).await?;
    let backup = resolve(Role::Backup, &config.failover.backup, config).await?;

    let managed_ips = match discover_managed_ips(source, primary.address).await {
        Ok(ips) if ips.is_empty() => {
            error!(host = %primary.hostname, "could not get failover IPs: empty response");
            return Err(StartupError::NoManagedIps {
                host: primary.hostname.clone(),
                address: primary.address,
            });
        }
        Ok(ips) => ips,
        Err(e) => {
            error!(host = %primary.hostname, error = %e, "could not get failover IPs");
            return Err(StartupError::Discovery {
                host: primary.hostname.clone(),
                source: e,
            });
        }
    };

    info!(host = %primary.hostname, count = managed_ips.len(), "got active failover IPs");
    debug!(ips = ?managed_ips.as_slice(), "managed failover IPs");

    Ok(Cluster {
        primary,
        backup,
        managed_ips,
    })
}

async fn resolve(role: Role, hostname: &str, config: &Config) -> Result<Target, StartupError> {
    match Target::resolve(role, hostname, &config.health_check).await {
        Ok(target) => {
            info!(role = %role, host = %hostname, address = %target.address, "IP address found");
            Ok(target)
        }
        Err(source) => {
            error!(role = %role, host = %hostname, error = %source, "could not find IP address");
            Err(StartupError::Resolve { role, source })
        }
    }
}
