//! IP-management API: listing failover IPs and re-routing them.

mod client;
mod resolver;
mod types;

pub use client::{ProviderError, RobotClient};
pub use resolver::{discover_managed_ips, routed_to, ManagedIps};
pub use types::FailoverIp;

use std::future::Future;
use std::net::IpAddr;

/// Source of the provider's failover IP inventory.
pub trait FailoverIpSource {
    /// List every failover IP on the account.
    fn list_failover_ips(&self) -> impl Future<Output = Result<Vec<FailoverIp>, ProviderError>> + Send;
}

/// Re-routes one failover IP to a new target.
///
/// Returns `true` only on an explicit success from the provider. Failures
/// are logged by the implementation and never raised.
pub trait SwitchService {
    fn switch(&self, ip: IpAddr, target: IpAddr) -> impl Future<Output = bool> + Send;
}
