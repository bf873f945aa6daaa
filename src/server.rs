//! TCP Server and Background Scheduler
//!
//! The [`Server`] owns the listener and runs everything that shares the store:
//!
//! ```text
//!                 ┌──────────────────────┐
//!   accept() ───> │ connection tasks     │──┐
//!                 │ (JoinSet, one each)  │  │
//!                 └──────────────────────┘  │      ┌───────────────┐
//!                 ┌──────────────────────┐  ├────> │ StorageEngine │
//!                 │ SnapshotTask         │──┤      └───────────────┘
//!                 │ ExpirySweeper        │──┘
//!                 └──────────────────────┘
//! ```
//!
//! ## Shutdown
//!
//! When the shutdown future completes the server stops accepting, then:
//! 1. signals every connection task and waits for all of them to finish
//! 2. signals the background tasks and waits for them (the snapshot task
//!    writes a final snapshot before it returns)
//!
//! Tasks stop at their next await point. A task that panicked or was aborted
//! is recorded in the [`ShutdownReport`] rather than propagated.

use crate::commands::CommandHandler;
use crate::config::ServerConfig;
use crate::connection::{handle_connection, ConnectionStats};
use crate::shutdown::Shutdown;
use crate::storage::{ExpirySweeper, SnapshotTask, StorageEngine};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinSet};
use tracing::{error, info, warn};

/// What happened during shutdown.
#[derive(Debug, Default)]
pub struct ShutdownReport {
    /// Connection tasks that were still running when shutdown began
    pub connections_closed: usize,
    /// Background tasks that were stopped
    pub background_stopped: usize,
    /// Tasks that ended with a panic or were aborted
    pub errors: Vec<JoinError>,
}

/// The NeuronKV TCP server.
pub struct Server {
    listener: TcpListener,
    storage: Arc<StorageEngine>,
    config: ServerConfig,
    stats: Arc<ConnectionStats>,
}

impl Server {
    /// Creates a server on an already bound listener.
    pub fn new(listener: TcpListener, storage: Arc<StorageEngine>, config: ServerConfig) -> Self {
        Self {
            listener,
            storage,
            config,
            stats: Arc::new(ConnectionStats::new()),
        }
    }

    /// Binds to the configured address and creates a server.
    pub async fn bind(config: ServerConfig, storage: Arc<StorageEngine>) -> std::io::Result<Self> {
        let listener = TcpListener::bind(config.bind_address()).await?;
        Ok(Self::new(listener, storage, config))
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Shared connection statistics.
    pub fn stats(&self) -> Arc<ConnectionStats> {
        Arc::clone(&self.stats)
    }

    /// Serves clients until `shutdown` completes, then stops every task.
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> ShutdownReport {
        let Server {
            listener,
            storage,
            config,
            stats,
        } = self;

        if let Ok(addr) = listener.local_addr() {
            info!("Listening on {}", addr);
        }

        let (notify_background, _) = watch::channel(false);
        let (notify_connections, _) = watch::channel(false);

        let mut background = JoinSet::new();
        background.spawn(
            SnapshotTask::new(
                Arc::clone(&storage),
                config.snapshot_interval,
                config.snapshot_path.clone(),
                config.analytics_path.clone(),
            )
            .run(Shutdown::new(notify_background.subscribe())),
        );
        background.spawn(
            ExpirySweeper::new(Arc::clone(&storage), config.sweep_interval)
                .run(Shutdown::new(notify_background.subscribe())),
        );

        let mut connections = JoinSet::new();
        let mut report = ShutdownReport::default();

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        let handler = CommandHandler::new(Arc::clone(&storage));
                        connections.spawn(handle_connection(
                            stream,
                            addr,
                            handler,
                            Arc::clone(&stats),
                            Shutdown::new(notify_connections.subscribe()),
                        ));
                    }
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                    }
                },
                Some(finished) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(e) = finished {
                        warn!(error = %e, "Connection task failed");
                        report.errors.push(e);
                    }
                }
                _ = &mut shutdown => {
                    info!("Shutdown signal received, stopping server...");
                    break;
                }
            }
        }

        drop(listener);

        info!(
            connections = connections.len(),
            "Cancelling outstanding tasks..."
        );

        report.connections_closed = connections.len();
        notify_connections.send_replace(true);
        drain(&mut connections, &mut report.errors).await;

        report.background_stopped = background.len();
        notify_background.send_replace(true);
        drain(&mut background, &mut report.errors).await;

        let store_stats = storage.stats();
        info!(
            connections_accepted = stats.connections_accepted.load(Ordering::Relaxed),
            commands_processed = stats.commands_processed.load(Ordering::Relaxed),
            keys = store_stats.keys,
            expired = store_stats.expired,
            "Server shutdown complete"
        );

        report
    }
}

/// Waits for every task in the set, collecting failures.
async fn drain(tasks: &mut JoinSet<()>, errors: &mut Vec<JoinError>) {
    while let Some(finished) = tasks.join_next().await {
        if let Err(e) = finished {
            warn!(error = %e, "Task ended abnormally during shutdown");
            errors.push(e);
        }
    }
}
