//! Error types used by the shutdown coordinator and the managed server.
//!
//! This module defines three error enums:
//!
//! - [`ShutdownError`] - failures while installing the shutdown coordinator.
//! - [`ServeError`] - outcomes of a managed server's serve/stop lifecycle.
//! - [`InvariantError`] - fail-fast kind produced by the [`guard`](crate::guard) helpers.
//!
//! The enums provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced while installing the shutdown coordinator.
///
/// After a successful install the coordinator never reports an error;
/// its only observable effects are token cancellation, log lines, and
/// (when force-exit is enabled) process termination.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ShutdownError {
    /// The configured signal set was empty.
    #[error("no shutdown signals configured")]
    NoSignals,

    /// Registering OS signal handlers failed.
    #[error("signal registration failed: {error}")]
    SignalRegistration {
        /// The underlying registration error message.
        error: String,
    },
}

impl ShutdownError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use gracevisor::ShutdownError;
    ///
    /// let err = ShutdownError::NoSignals;
    /// assert_eq!(err.as_label(), "shutdown_no_signals");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ShutdownError::NoSignals => "shutdown_no_signals",
            ShutdownError::SignalRegistration { .. } => "shutdown_signal_registration",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ShutdownError::NoSignals => "no shutdown signals configured".to_string(),
            ShutdownError::SignalRegistration { error } => {
                format!("signal registration failed: {error}")
            }
        }
    }
}

/// # Outcomes of a managed server's serve/stop lifecycle.
///
/// [`ServeError::Closed`] is the expected-termination marker: a listener that
/// stopped because shutdown was requested returns it from `serve`, and the
/// completion channel reports it as success.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ServeError {
    /// The listener closed due to an intentional shutdown.
    #[error("listener closed")]
    Closed,

    /// Startup or runtime failure unrelated to shutdown.
    #[error("serve failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// Graceful stop did not drain within the grace period.
    #[error("graceful stop exceeded grace period {grace:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
    },
}

impl ServeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use gracevisor::ServeError;
    ///
    /// let err = ServeError::GraceExceeded { grace: Duration::from_secs(10) };
    /// assert_eq!(err.as_label(), "serve_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ServeError::Closed => "serve_closed",
            ServeError::Failed { .. } => "serve_failed",
            ServeError::GraceExceeded { .. } => "serve_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ServeError::Closed => "listener closed".to_string(),
            ServeError::Failed { error } => format!("serve failed: {error}"),
            ServeError::GraceExceeded { grace } => {
                format!("graceful stop exceeded grace period {grace:?}")
            }
        }
    }

    /// Indicates whether this is the intentional-close marker.
    ///
    /// The completion channel maps closed listeners to success.
    ///
    /// # Example
    /// ```
    /// use gracevisor::ServeError;
    ///
    /// assert!(ServeError::Closed.is_closed());
    /// assert!(!ServeError::Failed { error: "bind".into() }.is_closed());
    /// ```
    pub fn is_closed(&self) -> bool {
        matches!(self, ServeError::Closed)
    }
}

/// # Internal-invariant violation reported by the [`guard`](crate::guard) helpers.
///
/// Reserved for conditions that should never fail in correct code.
/// Not intended for input validation.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantError {
    /// Condition evaluated to false.
    #[error("invariant violated")]
    Violated,

    /// Condition evaluated to false, with context.
    #[error("invariant violated: {detail}")]
    ViolatedWith {
        /// Context supplied at the check site.
        detail: String,
    },
}

impl InvariantError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        "invariant_violated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(ShutdownError::NoSignals.as_label(), "shutdown_no_signals");
        assert_eq!(
            ShutdownError::SignalRegistration { error: "eperm".into() }.as_label(),
            "shutdown_signal_registration"
        );
        assert_eq!(ServeError::Closed.as_label(), "serve_closed");
        assert_eq!(InvariantError::Violated.as_label(), "invariant_violated");
    }

    #[test]
    fn test_messages_carry_detail() {
        let err = ServeError::Failed { error: "address in use".into() };
        assert!(err.as_message().contains("address in use"));

        let err = ShutdownError::SignalRegistration { error: "too many handlers".into() };
        assert!(err.to_string().contains("too many handlers"));
    }
}
