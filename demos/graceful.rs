//! # Example: graceful
//!
//! Minimal graceful-shutdown setup: install a coordinator, run a worker
//! loop against its token, and exit cleanly on Ctrl-C.
//!
//! Demonstrates how to:
//! - Install a coordinator with [`ShutdownConfig`].
//! - Observe the token from application tasks.
//! - React to the first signal (cleanup) and the second (forced exit).
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► ShutdownConfig::install()
//!   │     └─► watcher task armed on SIGINT/SIGTERM
//!   ├─► spawn worker (select: token | tick)
//!   └─► handle.cancelled().await
//!         ├─ first signal  ─► on_shutdown, token cancelled, worker stops
//!         └─ second signal ─► on_force_exit, process exits with code 1
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example graceful
//! ```

use std::time::Duration;

use gracevisor::{Signal, ShutdownConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 1. Install the coordinator (watcher task starts immediately)
    let handle = ShutdownConfig::default()
        .with_signals([Signal::Interrupt, Signal::Terminate])
        .with_grace(Duration::from_secs(5))
        .with_on_shutdown(|sig| println!("[main] cleanup started ({sig})"))
        .with_on_force_exit(|| println!("[main] cleanup incomplete, forcing exit"))
        .install()?;

    // 2. Application work observes a token clone
    let token = handle.token();
    let worker = tokio::spawn(async move {
        let mut tick = 0u64;
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    println!("[worker] stopping");
                    break;
                }
                _ = tokio::time::sleep(Duration::from_secs(1)) => {
                    tick += 1;
                    println!("[worker] tick {tick}");
                }
            }
        }
    });

    println!("[main] running, press Ctrl-C to stop (twice to force exit)");

    // 3. Wait for shutdown, then let the worker finish
    handle.cancelled().await;
    worker.await?;
    println!("[main] graceful shutdown complete");
    Ok(())
}
