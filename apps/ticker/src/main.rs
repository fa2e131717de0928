//! Ticker binary
//!
//! Runs one tick session against in-memory storage. Type `reset` (or `r`)
//! on stdin to issue a reset command; close stdin or press Ctrl-C to stop.

use std::io::BufRead;
use std::sync::Arc;
use ticker::{Session, SessionConfig, TokioTimer, parse_command};
use tickflow_testing::{CommandChannel, InMemoryStorage};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ticker=debug,tickflow_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SessionConfig::from_env();
    tracing::info!(?config, "Loaded configuration");

    let storage = InMemoryStorage::new();
    let session = Session::new(config, Arc::new(storage.clone()));
    let (commands, resets) = CommandChannel::new();

    // Blocking stdin reads stay on their own thread so they never hold up the loop
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            match parse_command(&line) {
                Some(command) => {
                    if resets.send(command).is_err() {
                        break;
                    }
                },
                None if line.trim().is_empty() => {},
                None => tracing::debug!(line = %line.trim(), "Ignoring unknown command"),
            }
        }
    });

    let mut snapshots = session.subscribe();
    let renderer = tokio::spawn(async move {
        loop {
            match snapshots.recv().await {
                Ok(snapshot) => tracing::info!(
                    tick_count = snapshot.tick_count,
                    is_tick = snapshot.is_tick,
                    is_reset = snapshot.is_reset,
                    "{}",
                    snapshot.summary()
                ),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Snapshot display fell behind");
                },
                Err(RecvError::Closed) => break,
            }
        }
    });

    tokio::select! {
        result = session.run(&TokioTimer, Arc::new(storage.clone()), &commands) => {
            let snapshot = result?;
            tracing::info!(tick_count = snapshot.tick_count, "Session complete");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted");
        }
    }

    drop(session);
    let _ = renderer.await;

    for (key, value) in storage.writes() {
        tracing::info!(key = %key, value = %value, "Persisted");
    }

    Ok(())
}
