//! Discovery of the failover IPs routed to the primary.

use crate::provider::{FailoverIp, FailoverIpSource, ProviderError};
use std::net::IpAddr;
use std::slice;
use tracing::debug;

/// Failover IPs managed by this process.
///
/// Captured once at startup and never re-queried, so IPs added to the
/// account later are left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedIps(Vec<IpAddr>);

impl ManagedIps {
    /// Build a set from discovered addresses, dropping duplicates.
    pub fn new(ips: impl IntoIterator<Item = IpAddr>) -> Self {
        let mut unique: Vec<IpAddr> = Vec::new();
        for ip in ips {
            if !unique.contains(&ip) {
                unique.push(ip);
            }
        }
        Self(unique)
    }

    pub fn iter(&self) -> slice::Iter<'_, IpAddr> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[IpAddr] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a ManagedIps {
    type Item = &'a IpAddr;
    type IntoIter = slice::Iter<'a, IpAddr>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Select the failover IPs whose active target contains `address`.
///
/// This is a substring match, not equality: `10.0.0.1` also matches an
/// active target of `10.0.0.10`. Entries without an active target never
/// match.
pub fn routed_to(entries: &[FailoverIp], address: &str) -> Vec<IpAddr> {
    entries
        .iter()
        .filter(|entry| {
            entry
                .active_server_ip
                .as_deref()
                .is_some_and(|active| active.contains(address))
        })
        .map(|entry| entry.ip)
        .collect()
}

/// List the account's failover IPs and keep those routed to `address`.
///
/// An empty result is returned as-is; the caller decides whether that is
/// fatal.
pub async fn discover_managed_ips<S>(source: &S, address: IpAddr) -> Result<ManagedIps, ProviderError>
where
    S: FailoverIpSource + Sync,
{
    let entries = source.list_failover_ips().await?;
    let matched = routed_to(&entries, &address.to_string());
    debug!(
        listed = entries.len(),
        matched = matched.len(),
        address = %address,
        "filtered failover IPs"
    );
    Ok(ManagedIps::new(matched))
}
