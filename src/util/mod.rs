//! Utility functions and helpers.

mod logging;
mod shutdown;

#[cfg(test)]
pub(crate) mod test_server;

pub use logging::{effective_level, init_logging};
pub use shutdown::ShutdownSignal;
