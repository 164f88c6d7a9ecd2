//! # gracevisor
//!
//! **Gracevisor** is a lightweight graceful-shutdown coordination library
//! for Tokio applications.
//!
//! It converts asynchronous termination signals into a single cancellation
//! event, runs optional cleanup callbacks, and enforces a bounded grace
//! period after which it forcibly terminates the process if cleanup has not
//! finished. A companion module binds a network listener's serve/stop
//! lifecycle to the same cancellation event.
//!
//! ## Architecture
//! ```text
//!            SIGINT / SIGTERM / ...            handle.cancel()
//!                     │                              │
//!                     ▼                              ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │  Shutdown coordinator (one watcher task per install)          │
//! │  - per-signal tokio streams (coalescing, none lost)           │
//! │  - on first signal: log, on_shutdown(sig), cancel token       │
//! │  - then race: sleep(grace) | second signal                    │
//! │       └─► on_force_exit() ─► terminator.exit(exit_code)       │
//! └───────────────┬───────────────────────────────────────────────┘
//!                 │ CancellationToken (one-way, multi-reader)
//!       ┌─────────┴──────────┬─────────────────────┐
//!       ▼                    ▼                     ▼
//! application tasks   run_with_shutdown()   run_with_shutdown()
//!                      │ serve() ──► completion (oneshot, one value)
//!                      └ on cancel: timeout(grace, shutdown())
//!                        drain errors logged, never surfaced
//! ```
//!
//! ## Features
//! | Area              | Description                                                      | Key types / functions                          |
//! |-------------------|------------------------------------------------------------------|------------------------------------------------|
//! | **Coordination**  | Signal capture, one-shot cancellation, forced-exit race.         | [`ShutdownConfig`], [`ShutdownHandle`]         |
//! | **Managed server**| Listener lifecycle bound to the token, one-shot completion.      | [`Server`], [`run_with_shutdown`]              |
//! | **Errors**        | Typed outcomes for installation and serve/stop lifecycles.       | [`ShutdownError`], [`ServeError`]              |
//! | **Guards**        | Fail-fast invariant checks on the `?` path.                      | [`ensure`], [`InvariantError`]                 |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use gracevisor::{Signal, ShutdownConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let handle = ShutdownConfig::default()
//!         .with_signals([Signal::Interrupt, Signal::Terminate])
//!         .with_grace(Duration::from_secs(5))
//!         .without_force_exit()
//!         .install()?;
//!
//!     // ... spawn application work observing handle.token() ...
//!
//!     // Programmatic shutdown (admin endpoints, tests) takes the same
//!     // path as a signal-driven one:
//!     handle.cancel();
//!     handle.cancelled().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Guarantees
//! - `on_shutdown` fires strictly before the token is cancelled; the token
//!   is cancelled strictly before any dependent stop sequence begins;
//!   `on_force_exit` fires strictly before process termination.
//! - Cancellation is one-way and idempotent; double triggers are no-ops.
//! - A manual cancel before any signal never arms the forced-exit race.
//! - Grace periods are fresh deadlines, never derived from the already
//!   cancelled token.

mod core;
mod error;
mod guard;
mod server;
mod signals;

// ---- Public re-exports ----

pub use crate::core::{graceful_shutdown, ShutdownCause, ShutdownConfig, ShutdownHandle};
pub use error::{InvariantError, ServeError, ShutdownError};
pub use guard::{ensure, ensure_msg, ensure_or, ensure_with, ensure_with_msg, ensure_with_or};
pub use server::{
    run_with_shutdown, shutdown_now, Completion, Server, ServerConfig, ServerFn, ServerRef,
};
pub use signals::Signal;
