//! # Managed-server lifecycle.
//!
//! Binds a listener's serve/stop lifecycle to a cancellation token:
//! - [`Server`] - trait for listeners (blocking serve, graceful stop)
//! - [`ServerFn`] - function-backed implementation
//! - [`run_with_shutdown`] - serve until the token fires, report one outcome
//! - [`shutdown_now`] - graceful stop under a deadline, result returned directly
//!
//! The module depends on the coordinator only through the
//! `CancellationToken` interface, so it runs standalone with any token
//! source.

mod config;
mod managed;

pub use config::ServerConfig;
pub use managed::{run_with_shutdown, shutdown_now, Completion, Server, ServerFn, ServerRef};
