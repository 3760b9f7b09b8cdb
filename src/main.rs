//! foodbot-daemon: scripted food-ordering assistant served over a local socket
//!
//! This daemon provides:
//! - A keyword-driven dialogue state machine for placing food orders
//! - Independent in-memory sessions, one per UI conversation
//! - IPC server for UI clients, with order event notifications
//!
//! Out of scope:
//! - Remote assistant, speech, vision and image-generation APIs
//! - Persistence of sessions or orders

mod config;
mod dialogue;
mod events;
mod ipc;
mod lifecycle;
mod session;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::ipc::Server;
use crate::lifecycle::ShutdownSignal;
use crate::session::{SessionEvent, SessionStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "foodbot-daemon starting");

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;
    config
        .ensure_dirs()
        .context("failed to create data directory")?;
    info!(
        ?config.socket_path,
        seeded = config.seed.is_some(),
        "configuration loaded"
    );

    let mut shutdown = ShutdownSignal::new().context("failed to register signal handlers")?;

    // Session store -> IPC subscribers and the audit log below
    let (event_tx, _event_rx) = broadcast::channel::<SessionEvent>(64);
    let store = Arc::new(SessionStore::new(config.seed, event_tx.clone()));

    let server = Server::new(&config.socket_path, Arc::clone(&store), config.reply_delay.clone())?;

    let mut audit_rx = event_tx.subscribe();

    info!("daemon initialized, entering main loop");

    tokio::select! {
        // Run the IPC server (accepts client connections)
        result = server.run() => {
            if let Err(e) = result {
                error!(?e, "IPC server error");
            }
        }

        // Log every order event
        _ = async {
            loop {
                match audit_rx.recv().await {
                    Ok(SessionEvent { session_id, event }) => {
                        info!(%session_id, %event, "order event");
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "order event receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }
        } => {
            info!("order event handler exited");
        }

        // Wait for shutdown signal
        _ = shutdown.wait() => {
            info!("shutdown signal received");
        }
    }

    info!("shutting down...");

    server.shutdown().await;
    info!(
        open_sessions = store.len().await,
        orders_confirmed = store.orders_confirmed().await,
        "foodbot-daemon stopped"
    );

    Ok(())
}
