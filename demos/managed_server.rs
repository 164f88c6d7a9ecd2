//! # Example: managed_server
//!
//! A TCP echo server bound to the shutdown coordinator: the listener serves
//! until a termination signal arrives, then drains under its own grace
//! period and reports a single terminal outcome.
//!
//! Demonstrates how to:
//! - Implement [`Server`] for a real listener.
//! - Compose the coordinator and [`run_with_shutdown`] through the token.
//! - Read the one-shot completion channel.
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► ShutdownConfig::install()
//!   ├─► TcpListener::bind()
//!   ├─► run_with_shutdown(server, handle.token(), config)
//!   │     ├─► serve(): accept loop until internal close flag
//!   │     └─► watcher: token cancelled ─► timeout(grace, shutdown())
//!   └─► completion.await
//!         ├─ Ok(())  ─► clean stop (including signal-driven)
//!         └─ Err(..) ─► startup/runtime failure
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example managed_server
//! # in another terminal: nc 127.0.0.1 <port>
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use gracevisor::{run_with_shutdown, ServeError, Server, ServerConfig, ShutdownConfig};

/// Echo listener with an internal close flag driven by `shutdown`.
struct EchoServer {
    listener: TcpListener,
    closed: CancellationToken,
}

#[async_trait]
impl Server for EchoServer {
    async fn serve(&self) -> Result<(), ServeError> {
        loop {
            tokio::select! {
                _ = self.closed.cancelled() => return Err(ServeError::Closed),
                accepted = self.listener.accept() => {
                    let (mut stream, peer) = accepted
                        .map_err(|err| ServeError::Failed { error: err.to_string() })?;
                    println!("[echo] connection from {peer}");
                    tokio::spawn(async move {
                        let mut buf = [0u8; 1024];
                        while let Ok(n) = stream.read(&mut buf).await {
                            if n == 0 || stream.write_all(&buf[..n]).await.is_err() {
                                break;
                            }
                        }
                    });
                }
            }
        }
    }

    async fn shutdown(&self) -> Result<(), ServeError> {
        self.closed.cancel();
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 1. Coordinator: Ctrl-C starts the drain, a second Ctrl-C forces exit
    let handle = ShutdownConfig::default()
        .with_grace(Duration::from_secs(10))
        .install()?;

    // 2. Bind up front so bind failures surface before serving
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    println!("[main] echo server on {}", listener.local_addr()?);

    let server = Arc::new(EchoServer {
        listener,
        closed: CancellationToken::new(),
    });

    // 3. Serve until the coordinator cancels
    let completion = run_with_shutdown(
        server,
        handle.token(),
        ServerConfig { grace: Duration::from_secs(5) },
    );

    // 4. Exactly one terminal value
    match completion.await? {
        Ok(()) => println!("[main] server stopped cleanly"),
        Err(err) => eprintln!("[main] server failed: {err}"),
    }
    Ok(())
}
