//! Per-Key Access Analytics
//!
//! Every recorded access to a live key updates an [`AccessRecord`]. Records are a
//! historical log: they outlive the keys they describe and are only cleared by a
//! full store flush.
//!
//! Timestamps are Unix-epoch seconds as `f64`, which is also how they appear in
//! the analytics snapshot file.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Access statistics for a single key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessRecord {
    /// The key this record describes
    pub key: String,
    /// Number of recorded accesses (starts at 1)
    pub access_count: u64,
    /// Time of the most recent access, in epoch seconds
    pub last_accessed: f64,
    /// Byte length of the value at the most recent access
    pub size: usize,
    /// Absolute deadline at the most recent access, in epoch seconds
    pub ttl: Option<f64>,
}

impl AccessRecord {
    /// Creates the record for a key's first recorded access.
    pub fn first(key: &str, now: SystemTime, size: usize, ttl: Option<SystemTime>) -> Self {
        Self {
            key: key.to_owned(),
            access_count: 1,
            last_accessed: epoch_seconds(now),
            size,
            ttl: ttl.map(epoch_seconds),
        }
    }

    /// Records another access.
    pub fn touch(&mut self, now: SystemTime, size: usize, ttl: Option<SystemTime>) {
        self.access_count += 1;
        self.last_accessed = epoch_seconds(now);
        self.size = size;
        self.ttl = ttl.map(epoch_seconds);
    }
}

/// Converts a wall-clock instant to fractional seconds since the Unix epoch.
///
/// Instants before the epoch clamp to `0.0`.
pub fn epoch_seconds(time: SystemTime) -> f64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
