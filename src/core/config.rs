//! # Coordinator configuration.
//!
//! Provides [`ShutdownConfig`], the immutable settings an installed
//! coordinator runs with. Options are applied through consuming `with_*`
//! methods and validated once by [`ShutdownConfig::install`].
//!
//! ## Field semantics
//! - `signals`: signal set that triggers shutdown (must be non-empty)
//! - `grace`: wait after the first signal before forcing termination
//! - `force_exit`: whether the grace timer and second-signal race are armed
//! - `exit_code`: process status used on forced exit
//! - `on_shutdown` / `on_force_exit`: caller-supplied cleanup hooks

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::core::coordinator::{self, ShutdownHandle};
use crate::core::terminator::{OsExit, Terminate};
use crate::error::ShutdownError;
use crate::signals::{Signal, SignalSource};

/// Configuration for the shutdown coordinator.
///
/// Built with consuming `with_*` methods; consumed by [`install`](Self::install).
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use gracevisor::{Signal, ShutdownConfig};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ShutdownConfig::default()
///         .with_signals([Signal::Interrupt, Signal::Terminate, Signal::Hangup])
///         .with_grace(Duration::from_secs(30))
///         .with_exit_code(2)
///         .with_on_shutdown(|sig| println!("shutting down on {sig}"))
///         .install()?;
///
///     handle.cancelled().await;
///     Ok(())
/// }
/// ```
pub struct ShutdownConfig {
    pub(crate) signals: Vec<Signal>,
    pub(crate) grace: Duration,
    pub(crate) force_exit: bool,
    pub(crate) exit_code: i32,
    pub(crate) on_shutdown: Option<Box<dyn FnOnce(Signal) + Send + 'static>>,
    pub(crate) on_force_exit: Option<Box<dyn FnOnce() + Send + 'static>>,
    pub(crate) terminator: Arc<dyn Terminate>,
    pub(crate) source: Option<Box<dyn SignalSource>>,
}

impl ShutdownConfig {
    /// Creates a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets which signals trigger the shutdown.
    ///
    /// Replaces the default set. Duplicates are harmless.
    pub fn with_signals(mut self, signals: impl IntoIterator<Item = Signal>) -> Self {
        self.signals = signals.into_iter().collect();
        self
    }

    /// Sets the maximum time to wait for graceful shutdown before forcing exit.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Disables the forced exit after the grace period or a second signal.
    pub fn without_force_exit(mut self) -> Self {
        self.force_exit = false;
        self
    }

    /// Sets the exit code used for forced exits.
    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    /// Sets a callback invoked once, with the triggering signal, when
    /// shutdown begins.
    ///
    /// Runs on the watcher task strictly before the token is cancelled.
    /// Panics are not caught.
    pub fn with_on_shutdown(mut self, f: impl FnOnce(Signal) + Send + 'static) -> Self {
        self.on_shutdown = Some(Box::new(f));
        self
    }

    /// Sets a callback invoked immediately before forced termination.
    pub fn with_on_force_exit(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_force_exit = Some(Box::new(f));
        self
    }

    /// Overrides the process-termination primitive. Testing only.
    pub(crate) fn with_terminator(mut self, terminator: Arc<dyn Terminate>) -> Self {
        self.terminator = terminator;
        self
    }

    /// Overrides the signal source. Testing only.
    pub(crate) fn with_signal_source(mut self, source: impl SignalSource) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Installs the coordinator: registers signal handlers, spawns the
    /// watcher task, and returns the [`ShutdownHandle`].
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    /// [`ShutdownError::NoSignals`] if the signal set is empty,
    /// [`ShutdownError::SignalRegistration`] if OS registration fails.
    pub fn install(self) -> Result<ShutdownHandle, ShutdownError> {
        self.validate()?;
        coordinator::install(self)
    }

    pub(crate) fn validate(&self) -> Result<(), ShutdownError> {
        if self.signals.is_empty() {
            return Err(ShutdownError::NoSignals);
        }
        Ok(())
    }
}

impl Default for ShutdownConfig {
    /// Default configuration:
    ///
    /// - `signals = [Interrupt, Terminate]`
    /// - `grace = 10s`
    /// - `force_exit = true`
    /// - `exit_code = 1`
    /// - no callbacks
    fn default() -> Self {
        Self {
            signals: vec![Signal::Interrupt, Signal::Terminate],
            grace: Duration::from_secs(10),
            force_exit: true,
            exit_code: 1,
            on_shutdown: None,
            on_force_exit: None,
            terminator: Arc::new(OsExit),
            source: None,
        }
    }
}

impl fmt::Debug for ShutdownConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShutdownConfig")
            .field("signals", &self.signals)
            .field("grace", &self.grace)
            .field("force_exit", &self.force_exit)
            .field("exit_code", &self.exit_code)
            .field("on_shutdown", &self.on_shutdown.is_some())
            .field("on_force_exit", &self.on_force_exit.is_some())
            .finish()
    }
}
