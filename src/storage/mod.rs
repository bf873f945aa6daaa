//! Storage Engine Module
//!
//! This module provides the core storage functionality for NeuronKV: the
//! lock-protected key-value store with TTLs and access analytics, the background
//! expiry sweeper, and snapshot persistence.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     StorageEngine                           │
//! │        values  ·  deadlines  ·  analytics  (one Mutex)      │
//! └─────────────────────────────────────────────────────────────┘
//!                 ▲                            ▲
//!                 │                            │
//!   ┌─────────────┴─────────────┐  ┌───────────┴───────────────┐
//!   │      ExpirySweeper        │  │       SnapshotTask        │
//!   │  (Background Tokio Task)  │  │  (Background Tokio Task)  │
//!   └───────────────────────────┘  └───────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use neuronkv::storage::StorageEngine;
//!
//! let engine = StorageEngine::new();
//!
//! engine.set("session", "token123");
//! engine.expire("session", 3600).unwrap();
//!
//! let snapshot = engine.snapshot().unwrap();
//! let restored = StorageEngine::new();
//! restored.restore(&snapshot).unwrap();
//! assert_eq!(restored.get("session"), Some("token123".to_string()));
//! ```

pub mod analytics;
pub mod engine;
pub mod expiry;
pub mod persistence;

// Re-export commonly used types
pub use analytics::{epoch_seconds, AccessRecord};
pub use engine::{StorageEngine, StorageStats, StoreError};
pub use expiry::ExpirySweeper;
pub use persistence::{load_snapshot, save_analytics, save_snapshot, PersistenceError, SnapshotTask};
