//! NeuronKV - A Minimal Networked Key-Value Store
//!
//! This is the main entry point for the NeuronKV server.
//! It reads the configuration, restores the last snapshot, and serves clients
//! until SIGINT or SIGTERM.

use neuronkv::config::USAGE;
use neuronkv::storage::load_snapshot;
use neuronkv::{CliAction, Server, ServerConfig, StorageEngine};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn print_banner(config: &ServerConfig) {
    println!(
        r#"
NeuronKV v{} - Minimal Networked Key-Value Store
──────────────────────────────────────────────────
Server starting on {}
Snapshots every {}s to {}
Expiry sweep every {}s

Use Ctrl+C to shutdown gracefully.
"#,
        neuronkv::VERSION,
        config.bind_address(),
        config.snapshot_interval.as_secs(),
        config.snapshot_path.display(),
        config.sweep_interval.as_secs(),
    );
}

/// Completes on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match ServerConfig::from_args(std::env::args().skip(1))? {
        CliAction::Run(config) => config,
        CliAction::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
        CliAction::Version => {
            println!("NeuronKV version {}", neuronkv::VERSION);
            return Ok(());
        }
    };

    // Set up logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    print_banner(&config);

    // Create the storage engine (shared across all connections)
    let storage = Arc::new(StorageEngine::new());

    match load_snapshot(&storage, &config.snapshot_path).await {
        Ok(Some(count)) => info!(
            keys = count,
            path = %config.snapshot_path.display(),
            "Restored snapshot"
        ),
        Ok(None) => info!(
            path = %config.snapshot_path.display(),
            "No snapshot found, starting empty"
        ),
        Err(e) => warn!(error = %e, "Failed to restore snapshot, starting empty"),
    }

    let server = Server::bind(config, storage).await?;
    let stats = server.stats();
    let report = server.run(shutdown_signal()).await;

    info!(
        bytes_read = stats.bytes_read.load(Ordering::Relaxed),
        bytes_written = stats.bytes_written.load(Ordering::Relaxed),
        "Traffic totals"
    );

    if !report.errors.is_empty() {
        warn!(failed = report.errors.len(), "Some tasks ended abnormally");
    }

    Ok(())
}
