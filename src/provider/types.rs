//! Wire types of the IP-management API.

use serde::Deserialize;
use std::net::IpAddr;

/// One failover IP as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FailoverIp {
    /// The failover address itself
    pub ip: IpAddr,

    #[serde(default)]
    pub netmask: Option<String>,

    /// Server the address is assigned to
    #[serde(default)]
    pub server_ip: Option<String>,

    /// Server the address is currently routed to, if any
    #[serde(default)]
    pub active_server_ip: Option<String>,
}

/// The list endpoint wraps every object in a `failover` key.
#[derive(Debug, Deserialize)]
pub(crate) struct FailoverEnvelope {
    pub failover: FailoverIp,
}
