//! # Shutdown coordinator: signal capture, one-shot cancellation, force-exit race.
//!
//! [`install`] wires the configured signal set to a fresh
//! [`CancellationToken`] and spawns a single watcher task that drives the
//! whole lifecycle:
//!
//! ```text
//! install(config)
//!   ├─► register signal streams (one per configured Signal)
//!   ├─► create CancellationToken + cause cell
//!   └─► spawn watcher:
//!        Armed ──(manual cancel)──► Idle (task ends, no race armed)
//!        Armed ──(first signal)───► Cancelling
//!              ├─ log "received signal"  (warn)
//!              ├─ on_shutdown(signal)
//!              ├─ record cause, cancel token
//!              ├─ force_exit disabled ──► Idle
//!              └─ race: sleep(grace) | second signal
//!                   └─► on_force_exit() ──► terminator.exit(exit_code)   Terminated
//! ```
//!
//! Ordering guarantees hold by sequential execution on the watcher task:
//! `on_shutdown` runs strictly before the token is cancelled, and
//! `on_force_exit` strictly before process termination.

use std::sync::{Arc, OnceLock};

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::core::config::ShutdownConfig;
use crate::error::ShutdownError;
use crate::signals::{OsSignals, Signal, SignalSource};

/// Why the token was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownCause {
    /// A configured OS signal arrived.
    Signal(Signal),
    /// [`ShutdownHandle::cancel`] was invoked.
    Manual,
}

/// Handle returned by [`ShutdownConfig::install`].
///
/// Read side of the coordinator: clone freely, hand [`token`](Self::token)
/// clones to components that only need to observe cancellation. The write
/// side stays with the coordinator; [`cancel`](Self::cancel) is the single
/// sanctioned manual trigger (programmatic shutdown, test teardown).
///
/// # Example
/// ```
/// use gracevisor::ShutdownConfig;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ShutdownConfig::default().install()?;
///     assert!(!handle.is_cancelled());
///
///     handle.cancel();
///     handle.cancelled().await;
///     assert!(handle.is_cancelled());
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct ShutdownHandle {
    pub(crate) token: CancellationToken,
    cause: Arc<OnceLock<ShutdownCause>>,
}

impl ShutdownHandle {
    /// Returns a token clone for components observing cancellation.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Completes once shutdown has been requested.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// Whether shutdown has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Returns the recorded cause once cancelled, `None` while active.
    pub fn cause(&self) -> Option<ShutdownCause> {
        self.cause.get().copied()
    }

    /// Requests shutdown manually, without a signal.
    ///
    /// Idempotent: repeated calls, or a call racing a signal, have no
    /// additional effect. Manual cancellation before any signal is treated
    /// as intentional completion and never arms the force-exit race.
    pub fn cancel(&self) {
        let _ = self.cause.set(ShutdownCause::Manual);
        self.token.cancel();
    }
}

/// Installs a coordinator with default settings.
///
/// Equivalent to `ShutdownConfig::default().install()`: listens for
/// interrupt and terminate, 10s grace, forced exit with status 1.
pub fn graceful_shutdown() -> Result<ShutdownHandle, ShutdownError> {
    ShutdownConfig::default().install()
}

/// Registers signal streams, spawns the watcher, returns the handle.
///
/// Called by [`ShutdownConfig::install`] after validation.
pub(crate) fn install(mut config: ShutdownConfig) -> Result<ShutdownHandle, ShutdownError> {
    let source: Box<dyn SignalSource> = match config.source.take() {
        Some(source) => source,
        None => Box::new(OsSignals::register(&config.signals).map_err(|err| {
            ShutdownError::SignalRegistration { error: err.to_string() }
        })?),
    };

    let handle = ShutdownHandle {
        token: CancellationToken::new(),
        cause: Arc::new(OnceLock::new()),
    };
    tokio::spawn(watch(config, source, handle.clone()));
    Ok(handle)
}

async fn watch(
    mut config: ShutdownConfig,
    mut source: Box<dyn SignalSource>,
    handle: ShutdownHandle,
) {
    let sig = tokio::select! {
        // Manual cancel: intentional completion, no race armed.
        _ = handle.token.cancelled() => return,
        sig = next_signal(&mut source) => sig,
    };

    warn!(signal = %sig, "received signal, shutting down");
    if let Some(on_shutdown) = config.on_shutdown.take() {
        on_shutdown(sig);
    }
    let _ = handle.cause.set(ShutdownCause::Signal(sig));
    handle.token.cancel();

    if !config.force_exit {
        return;
    }

    tokio::select! {
        _ = tokio::time::sleep(config.grace) => {
            warn!(grace = ?config.grace, "grace period elapsed, forcing exit");
        }
        sig = next_signal(&mut source) => {
            warn!(signal = %sig, "received second signal, forcing exit");
        }
    }
    if let Some(on_force_exit) = config.on_force_exit.take() {
        on_force_exit();
    }
    config.terminator.exit(config.exit_code);
}

/// Resolves with the next delivered signal; parks forever on a closed source
/// so the surrounding select falls back to its other branch.
async fn next_signal(source: &mut Box<dyn SignalSource>) -> Signal {
    match source.recv().await {
        Some(sig) => sig,
        None => futures::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::mpsc;
    use tokio::time::{timeout, Instant};

    use crate::core::terminator::Terminate;

    /// Channel-backed signal source with single-slot buffering.
    struct QueuedSignals(mpsc::Receiver<Signal>);

    #[async_trait]
    impl SignalSource for QueuedSignals {
        async fn recv(&mut self) -> Option<Signal> {
            self.0.recv().await
        }
    }

    /// Terminator that records exit codes instead of ending the process.
    struct RecordingExit {
        codes: mpsc::UnboundedSender<i32>,
        order: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Terminate for RecordingExit {
        fn exit(&self, code: i32) {
            self.order.lock().unwrap().push("exit");
            let _ = self.codes.send(code);
        }
    }

    struct Fixture {
        signals: mpsc::Sender<Signal>,
        codes: mpsc::UnboundedReceiver<i32>,
        order: Arc<Mutex<Vec<&'static str>>>,
    }

    fn fixture() -> (ShutdownConfig, Fixture) {
        let (sig_tx, sig_rx) = mpsc::channel(1);
        let (code_tx, code_rx) = mpsc::unbounded_channel();
        let order = Arc::new(Mutex::new(Vec::new()));

        let config = ShutdownConfig::default()
            .with_signal_source(QueuedSignals(sig_rx))
            .with_terminator(Arc::new(RecordingExit {
                codes: code_tx,
                order: Arc::clone(&order),
            }));
        (config, Fixture { signals: sig_tx, codes: code_rx, order })
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_cancel_is_idempotent_and_skips_force_exit() {
        let (config, mut fx) = fixture();
        let handle = config.install().expect("install");

        handle.cancel();
        handle.cancelled().await;
        assert!(handle.is_cancelled());
        assert_eq!(handle.cause(), Some(ShutdownCause::Manual));

        // Repeated trigger is a no-op.
        handle.cancel();
        assert_eq!(handle.cause(), Some(ShutdownCause::Manual));

        // Well past any grace period: the race was never armed.
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(fx.codes.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_signal_cancels_token_and_fires_on_shutdown_once() {
        let (config, fx) = fixture();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(None));

        let handle = {
            let calls = Arc::clone(&calls);
            let seen = Arc::clone(&seen);
            config
                .without_force_exit()
                .with_on_shutdown(move |sig| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    *seen.lock().unwrap() = Some(sig);
                })
                .install()
                .expect("install")
        };

        fx.signals.send(Signal::Interrupt).await.expect("send signal");
        timeout(Duration::from_secs(5), handle.cancelled())
            .await
            .expect("token cancelled");

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*seen.lock().unwrap(), Some(Signal::Interrupt));
        assert_eq!(handle.cause(), Some(ShutdownCause::Signal(Signal::Interrupt)));

        // Manual cancel after the signal is a no-op.
        handle.cancel();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(handle.cause(), Some(ShutdownCause::Signal(Signal::Interrupt)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_on_shutdown_runs_before_cancellation() {
        let (config, fx) = fixture();
        let slot: Arc<Mutex<Option<ShutdownHandle>>> = Arc::new(Mutex::new(None));
        let cancelled_during_callback = Arc::new(AtomicBool::new(true));

        let handle = {
            let slot = Arc::clone(&slot);
            let observed = Arc::clone(&cancelled_during_callback);
            config
                .without_force_exit()
                .with_on_shutdown(move |_| {
                    let guard = slot.lock().unwrap();
                    let handle = guard.as_ref().expect("handle stored");
                    observed.store(handle.is_cancelled(), Ordering::SeqCst);
                })
                .install()
                .expect("install")
        };
        *slot.lock().unwrap() = Some(handle.clone());

        fx.signals.send(Signal::Terminate).await.expect("send signal");
        timeout(Duration::from_secs(5), handle.cancelled())
            .await
            .expect("token cancelled");

        assert!(!cancelled_during_callback.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_exit_after_grace() {
        let (config, mut fx) = fixture();
        let order = Arc::clone(&fx.order);
        let handle = config
            .with_grace(Duration::from_millis(100))
            .with_exit_code(42)
            .with_on_force_exit({
                let order = Arc::clone(&fx.order);
                move || order.lock().unwrap().push("force_exit")
            })
            .install()
            .expect("install");

        let start = Instant::now();
        fx.signals.send(Signal::Interrupt).await.expect("send signal");
        timeout(Duration::from_secs(5), handle.cancelled())
            .await
            .expect("token cancelled");

        let code = timeout(Duration::from_secs(60), fx.codes.recv())
            .await
            .expect("terminator invoked")
            .expect("code recorded");
        assert_eq!(code, 42);
        assert!(start.elapsed() >= Duration::from_millis(100));
        assert_eq!(*order.lock().unwrap(), vec!["force_exit", "exit"]);

        // Exactly once.
        assert!(fx.codes.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_signal_forces_exit_before_grace() {
        let (config, mut fx) = fixture();
        let handle = config
            .with_grace(Duration::from_millis(500))
            .with_exit_code(2)
            .install()
            .expect("install");

        let start = Instant::now();
        fx.signals.send(Signal::Interrupt).await.expect("send first signal");
        timeout(Duration::from_secs(5), handle.cancelled())
            .await
            .expect("token cancelled");

        fx.signals.send(Signal::Interrupt).await.expect("send second signal");
        let code = timeout(Duration::from_secs(5), fx.codes.recv())
            .await
            .expect("terminator invoked")
            .expect("code recorded");
        assert_eq!(code, 2);
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_exit_disabled_never_terminates() {
        let (config, mut fx) = fixture();
        let handle = config
            .without_force_exit()
            .with_grace(Duration::from_millis(100))
            .install()
            .expect("install");

        fx.signals.send(Signal::Terminate).await.expect("send signal");
        timeout(Duration::from_secs(5), handle.cancelled())
            .await
            .expect("token cancelled");

        // The watcher is gone; a late signal finds no consumer.
        let _ = fx.signals.try_send(Signal::Terminate);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(fx.codes.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_graceful_shutdown_defaults_install() {
        let handle = graceful_shutdown().expect("install with defaults");
        assert!(!handle.is_cancelled());
        assert_eq!(handle.cause(), None);
        handle.cancel();
        handle.cancelled().await;
    }

    #[cfg(unix)]
    mod os_delivery {
        use super::super::*;
        use std::time::Duration;

        fn raise(name: &str) {
            let pid = std::process::id().to_string();
            let status = std::process::Command::new("kill")
                .args(["-s", name, &pid])
                .status()
                .expect("spawn kill");
            assert!(status.success(), "kill -s {name} failed");
        }

        async fn wait_cancelled(handle: &ShutdownHandle) -> bool {
            for _ in 0..200 {
                if handle.is_cancelled() {
                    return true;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            false
        }

        /// End-to-end delivery through real OS signals, and set filtering:
        /// a coordinator only reacts to the signals it registered for.
        #[tokio::test]
        async fn test_only_configured_signals_cancel() {
            let usr1 = ShutdownConfig::default()
                .with_signals([Signal::User1])
                .without_force_exit()
                .install()
                .expect("install usr1");
            let usr2 = ShutdownConfig::default()
                .with_signals([Signal::User2])
                .without_force_exit()
                .install()
                .expect("install usr2");

            raise("USR2");
            assert!(wait_cancelled(&usr2).await, "usr2 coordinator not cancelled");
            tokio::time::sleep(Duration::from_millis(100)).await;
            assert!(!usr1.is_cancelled(), "usr1 coordinator cancelled by USR2");

            raise("USR1");
            assert!(wait_cancelled(&usr1).await, "usr1 coordinator not cancelled");

            assert_eq!(usr1.cause(), Some(ShutdownCause::Signal(Signal::User1)));
            assert_eq!(usr2.cause(), Some(ShutdownCause::Signal(Signal::User2)));
        }
    }
}
