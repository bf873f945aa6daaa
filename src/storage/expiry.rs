//! Background Expiry Sweeper
//!
//! This module implements a background task that periodically removes expired
//! keys. This is "eager expiry", as opposed to the lazy expiry that GET performs
//! on the key it reads.
//!
//! ## Why Do We Need This?
//!
//! Lazy expiry only reclaims keys that are read again. A key that expires and is
//! never touched would otherwise stay in memory forever.
//!
//! ## Design
//!
//! The sweeper runs as a Tokio task and:
//! 1. Sleeps for the configured interval
//! 2. Calls [`StorageEngine::sweep`] with the current wall-clock time
//! 3. Logs what it removed
//!
//! It stops at the next sleep after the shutdown signal, never mid-sweep.

use crate::shutdown::Shutdown;
use crate::storage::StorageEngine;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{debug, info, trace};

/// Periodic eager-expiry task.
#[derive(Debug)]
pub struct ExpirySweeper {
    engine: Arc<StorageEngine>,

    /// Time between sweeps
    interval: Duration,
}

impl ExpirySweeper {
    pub fn new(engine: Arc<StorageEngine>, interval: Duration) -> Self {
        Self { engine, interval }
    }

    /// Runs one sweep now.
    pub fn sweep_once(&self) -> HashSet<String> {
        let removed = self.engine.sweep(SystemTime::now());

        if removed.is_empty() {
            trace!("Sweep found no expired keys");
        } else {
            debug!(
                expired = removed.len(),
                keys_remaining = self.engine.len(),
                "Expired keys cleaned up"
            );
        }

        removed
    }

    /// Sweeps every interval until shutdown is signalled.
    pub async fn run(self, mut shutdown: Shutdown) {
        info!(interval_secs = self.interval.as_secs_f64(), "Expiry sweeper started");

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.recv() => {
                    debug!("Expiry sweeper received shutdown signal");
                    return;
                }
            }

            self.sweep_once();
        }
    }
}
