//! # NeuronKV - A Minimal Networked Key-Value Store
//!
//! NeuronKV keeps string keys and string values in memory, lets keys expire
//! after a TTL, serves a line-based text protocol over TCP, snapshots its data
//! to disk periodically, and records per-key access analytics.
//!
//! ## Features
//!
//! - **Line Protocol**: `SET`, `GET`, `DEL` and `EXPIRE`, one command per line
//! - **TTL Support**: lazy expiry on access plus a periodic background sweep
//! - **Snapshots**: the value map and the analytics log are written as JSON
//! - **Access Analytics**: access count, last access time, size and TTL per key
//! - **Graceful Shutdown**: every task is stopped and awaited before exit
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              NeuronKV                                   │
//! │                                                                         │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐                  │
//! │  │ TCP Server  │───>│ Connection  │───>│  Command    │                  │
//! │  │ (Listener)  │    │  Handler    │    │  Handler    │                  │
//! │  └─────────────┘    └─────────────┘    └──────┬──────┘                  │
//! │                                               │                         │
//! │                                               ▼                         │
//! │  ┌─────────────┐    ┌──────────────────────────────────────────────┐   │
//! │  │   Line      │    │              StorageEngine                   │   │
//! │  │   Parser    │    │   values · deadlines · analytics (one lock)  │   │
//! │  └─────────────┘    └──────────────────────────────────────────────┘   │
//! │                                               ▲                         │
//! │                     ┌─────────────────────────┴───────────────────────┐ │
//! │                     │   SnapshotTask          ExpirySweeper           │ │
//! │                     │          (Background Tokio Tasks)               │ │
//! │                     └─────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use neuronkv::{Server, ServerConfig, StorageEngine};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let storage = Arc::new(StorageEngine::new());
//!     let server = Server::bind(ServerConfig::default(), storage).await?;
//!
//!     server.run(async { tokio::signal::ctrl_c().await.ok(); }).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`protocol`]: commands, replies and the line parser
//! - [`storage`]: the store, the expiry sweeper and snapshot persistence
//! - [`commands`]: command execution against the store
//! - [`connection`]: per-client connection handling
//! - [`server`]: accept loop, background tasks and shutdown

pub mod commands;
pub mod config;
pub mod connection;
pub mod protocol;
pub mod server;
pub mod shutdown;
pub mod storage;

// Re-export commonly used types for convenience
pub use commands::CommandHandler;
pub use config::{CliAction, ConfigError, ServerConfig};
pub use connection::{handle_connection, ConnectionStats};
pub use protocol::{parse_line, Command, ParseError, Reply};
pub use server::{Server, ShutdownReport};
pub use shutdown::Shutdown;
pub use storage::{AccessRecord, ExpirySweeper, SnapshotTask, StorageEngine, StoreError};

/// The default port NeuronKV listens on
pub const DEFAULT_PORT: u16 = 5002;

/// The default host NeuronKV binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Version of NeuronKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
