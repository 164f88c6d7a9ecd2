//! Managed-server configuration.

use std::time::Duration;

/// Settings for one managed serve/stop lifecycle.
///
/// No persistent state; parameters apply per invocation of
/// [`run_with_shutdown`](crate::server::run_with_shutdown) or
/// [`shutdown_now`](crate::server::shutdown_now).
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Maximum time to wait for the listener to drain during graceful stop.
    ///
    /// This deadline is independent of the coordinator's grace period:
    /// it starts fresh when cancellation is observed.
    pub grace: Duration,
}

impl Default for ServerConfig {
    /// Default configuration: `grace = 10s`.
    fn default() -> Self {
        Self { grace: Duration::from_secs(10) }
    }
}
