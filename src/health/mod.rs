//! Reachability probing of the load balancers.

mod prober;

pub use prober::{HealthProbe, HttpProber};
