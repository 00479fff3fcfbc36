//! failoverd - automatic failover IP switching for an active/passive load
//! balancer pair
//!
//! The daemon watches the primary load balancer and, after repeated failed
//! checks, re-routes the provider's failover IPs to the backup once the
//! backup itself checks out. The IPs are moved back after the primary has
//! been reachable for several consecutive checks.
//!
//! - [`config`]: YAML configuration
//! - [`bootstrap`]: DNS resolution and failover IP discovery at startup
//! - [`failover`]: the state machine and the control loop
//! - [`health`] / [`provider`]: the HTTP collaborators
//! - [`metrics`]: optional Prometheus endpoint

pub mod bootstrap;
pub mod config;
pub mod failover;
pub mod health;
pub mod metrics;
pub mod provider;
pub mod target;
pub mod util;

pub use config::Config;
