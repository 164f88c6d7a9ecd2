//! # Cross-platform OS signal identities and delivery.
//!
//! [`Signal`] names the termination signals the coordinator can observe.
//! [`SignalSource`] is the delivery seam: the production implementation
//! ([`OsSignals`]) merges one tokio signal stream per configured signal,
//! tests substitute a channel-backed source.
//!
//! ## Delivery semantics
//! Each tokio stream coalesces signals that arrive while a previous delivery
//! has not been consumed yet, matching OS semantics: no pending signal is
//! lost, but bursts collapse to one notification per signal kind.
//!
//! ## Platforms
//! **Unix:** every [`Signal`] variant maps to a `SignalKind`.
//!
//! **Windows:** only Ctrl-C is observable; every delivery is reported as
//! [`Signal::Interrupt`] and other configured signals are ignored.

use std::fmt;

use async_trait::async_trait;

/// Termination signal identity.
///
/// `as_str` yields the lowercase name used in structured log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// SIGINT (Ctrl-C in terminal).
    Interrupt,
    /// SIGTERM (default kill signal, used by systemd/Kubernetes).
    Terminate,
    /// SIGQUIT.
    Quit,
    /// SIGHUP.
    Hangup,
    /// SIGUSR1.
    User1,
    /// SIGUSR2.
    User2,
}

impl Signal {
    /// Returns the lowercase signal name.
    ///
    /// # Example
    /// ```
    /// use gracevisor::Signal;
    ///
    /// assert_eq!(Signal::Interrupt.as_str(), "interrupt");
    /// assert_eq!(Signal::Terminate.as_str(), "terminate");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Interrupt => "interrupt",
            Signal::Terminate => "terminate",
            Signal::Quit => "quit",
            Signal::Hangup => "hangup",
            Signal::User1 => "user1",
            Signal::User2 => "user2",
        }
    }

    #[cfg(unix)]
    pub(crate) fn kind(self) -> tokio::signal::unix::SignalKind {
        use tokio::signal::unix::SignalKind;
        match self {
            Signal::Interrupt => SignalKind::interrupt(),
            Signal::Terminate => SignalKind::terminate(),
            Signal::Quit => SignalKind::quit(),
            Signal::Hangup => SignalKind::hangup(),
            Signal::User1 => SignalKind::user_defined1(),
            Signal::User2 => SignalKind::user_defined2(),
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of termination signals consumed by the coordinator's watcher.
///
/// `recv` resolves with the next delivered signal, or `None` if the source
/// can produce no further signals.
#[async_trait]
pub(crate) trait SignalSource: Send + 'static {
    async fn recv(&mut self) -> Option<Signal>;
}

/// Production source: one tokio signal stream per configured signal.
#[cfg(unix)]
pub(crate) struct OsSignals {
    streams: Vec<(Signal, tokio::signal::unix::Signal)>,
}

#[cfg(unix)]
impl OsSignals {
    /// Registers process-level interest in the given signals.
    ///
    /// Registration is per-coordinator: each call creates independent
    /// streams, so multiple coordinators can coexist without interference.
    pub(crate) fn register(signals: &[Signal]) -> std::io::Result<Self> {
        use tokio::signal::unix::signal;

        let mut streams = Vec::with_capacity(signals.len());
        for &sig in signals {
            streams.push((sig, signal(sig.kind())?));
        }
        Ok(Self { streams })
    }
}

#[cfg(unix)]
#[async_trait]
impl SignalSource for OsSignals {
    async fn recv(&mut self) -> Option<Signal> {
        if self.streams.is_empty() {
            return futures::future::pending().await;
        }
        let waiters = self.streams.iter_mut().map(|(sig, stream)| {
            let sig = *sig;
            Box::pin(async move { stream.recv().await.map(|_| sig) })
        });
        let (received, _index, _rest) = futures::future::select_all(waiters).await;
        received
    }
}

/// Production source on non-unix targets: Ctrl-C only.
#[cfg(not(unix))]
pub(crate) struct OsSignals;

#[cfg(not(unix))]
impl OsSignals {
    pub(crate) fn register(_signals: &[Signal]) -> std::io::Result<Self> {
        Ok(Self)
    }
}

#[cfg(not(unix))]
#[async_trait]
impl SignalSource for OsSignals {
    async fn recv(&mut self) -> Option<Signal> {
        tokio::signal::ctrl_c().await.ok().map(|_| Signal::Interrupt)
    }
}
