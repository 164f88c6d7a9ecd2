//! # Managed server: serve/stop lifecycle bound to a cancellation token.
//!
//! [`run_with_shutdown`] launches a [`Server`]'s blocking serve operation and
//! a shutdown watcher that reacts to the token, and reports the single
//! terminal outcome on a one-shot completion channel:
//!
//! ```text
//! run_with_shutdown(server, token, config)
//!   ├─► spawn serve():
//!   │     Err(Closed) ──► Ok(())   (intentional close is success)
//!   │     Err(other)  ──► Err     forwarded exactly once, channel closes
//!   └─► spawn watcher:
//!         token.cancelled()
//!           ├─ log "shutting down server"
//!           └─ timeout(config.grace, server.shutdown())
//!                └─ errors (incl. the deadline) are logged, never put on
//!                   the completion channel
//! ```
//!
//! The completion value is governed solely by `serve`: a listener whose
//! serve call returns cleanly after shutdown counts as a successful graceful
//! stop even when the drain itself overran its deadline.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::ServeError;
use crate::server::config::ServerConfig;

/// # Listener lifecycle seam.
///
/// `serve` blocks until the listener stops: [`ServeError::Closed`] marks an
/// intentional close, any other error a fatal startup or runtime failure.
/// `shutdown` performs the graceful stop and returns once drained; callers
/// apply the deadline.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use gracevisor::{ServeError, Server};
///
/// struct Echo;
///
/// #[async_trait]
/// impl Server for Echo {
///     async fn serve(&self) -> Result<(), ServeError> {
///         // accept loop runs here until shutdown closes the listener
///         Err(ServeError::Closed)
///     }
///
///     async fn shutdown(&self) -> Result<(), ServeError> {
///         // stop accepting, drain in-flight connections
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Server: Send + Sync + 'static {
    /// Runs the listener until termination or fatal startup error.
    async fn serve(&self) -> Result<(), ServeError>;

    /// Gracefully stops the listener, returning once drained.
    async fn shutdown(&self) -> Result<(), ServeError>;
}

/// Shared server handle (`Arc<dyn Server>`).
pub type ServerRef = Arc<dyn Server>;

/// Completion channel: yields exactly one terminal value, then closes.
pub type Completion = oneshot::Receiver<Result<(), ServeError>>;

/// Function-backed [`Server`] built from a serve closure and a stop closure.
///
/// Each call produces a fresh future, so the closures own no shared mutable
/// state. Useful for adapting listeners without a dedicated type, and in
/// tests.
pub struct ServerFn<F, G> {
    serve: F,
    stop: G,
}

impl<F, G> ServerFn<F, G> {
    /// Creates a new function-backed server.
    pub fn new(serve: F, stop: G) -> Self {
        Self { serve, stop }
    }

    /// Creates the server and returns it as a shared handle.
    pub fn arc(serve: F, stop: G) -> Arc<Self> {
        Arc::new(Self::new(serve, stop))
    }
}

#[async_trait]
impl<F, FFut, G, GFut> Server for ServerFn<F, G>
where
    F: Fn() -> FFut + Send + Sync + 'static,
    FFut: Future<Output = Result<(), ServeError>> + Send + 'static,
    G: Fn() -> GFut + Send + Sync + 'static,
    GFut: Future<Output = Result<(), ServeError>> + Send + 'static,
{
    async fn serve(&self) -> Result<(), ServeError> {
        (self.serve)().await
    }

    async fn shutdown(&self) -> Result<(), ServeError> {
        (self.stop)().await
    }
}

/// Runs `server` until it stops on its own or `token` requests shutdown.
///
/// Returns immediately with the completion channel. See the module docs for
/// the outcome normalization rules.
pub fn run_with_shutdown<S>(
    server: Arc<S>,
    token: CancellationToken,
    config: ServerConfig,
) -> Completion
where
    S: Server + ?Sized,
{
    let (done_tx, done_rx) = oneshot::channel();

    let serve_target = Arc::clone(&server);
    tokio::spawn(async move {
        let outcome = match serve_target.serve().await {
            Ok(()) => Ok(()),
            Err(err) if err.is_closed() => Ok(()),
            Err(err) => Err(err),
        };
        let _ = done_tx.send(outcome);
    });

    tokio::spawn(async move {
        token.cancelled().await;
        info!("shutting down server");
        // Fresh deadline: deriving it from the already-cancelled token
        // would make it expire immediately.
        if let Err(err) = shutdown_now(&*server, &config).await {
            warn!(error = %err, "graceful stop failed");
        }
    });

    done_rx
}

/// Gracefully stops `server` under `config.grace`, returning the result
/// directly.
///
/// Synchronous convenience for callers that manage the serve loop
/// themselves. Deadline expiry yields [`ServeError::GraceExceeded`].
pub async fn shutdown_now<S>(server: &S, config: &ServerConfig) -> Result<(), ServeError>
where
    S: Server + ?Sized,
{
    match tokio::time::timeout(config.grace, server.shutdown()).await {
        Ok(result) => result,
        Err(_) => Err(ServeError::GraceExceeded { grace: config.grace }),
    }
}
