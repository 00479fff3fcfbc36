//! Failover decision engine.

mod controller;
mod state;

pub use controller::{FailoverController, SwitchBatch, SwitchOutcome, TickOutcome};
pub use state::{FailoverPolicy, FailoverState, Phase, Step};
