//! Snapshot Persistence
//!
//! Snapshots are best-effort: a failed write is logged and the next cycle tries
//! again. Two files are written:
//!
//! - the value snapshot, a JSON object `{ "key": "value", ... }`
//! - the analytics snapshot, a JSON array of access records
//!
//! Deadlines are not persisted. Keys restored from a snapshot never expire.
//!
//! Each file is written to `<path>.tmp` first and then renamed over the target,
//! so a crash mid-write leaves the previous snapshot intact.

use crate::shutdown::Shutdown;
use crate::storage::{StorageEngine, StoreError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

/// Errors that can occur while saving or loading snapshots.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PersistenceError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Writes `bytes` to `path` through a temporary sibling file.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), PersistenceError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, bytes)
        .await
        .map_err(|e| PersistenceError::io(&tmp, e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| PersistenceError::io(path, e))?;

    Ok(())
}

/// Writes the value snapshot to `path`.
///
/// # Returns
///
/// Returns the number of bytes written.
pub async fn save_snapshot(engine: &StorageEngine, path: &Path) -> Result<usize, PersistenceError> {
    let bytes = engine.snapshot()?;
    write_atomic(path, &bytes).await?;
    Ok(bytes.len())
}

/// Writes the analytics snapshot to `path` as a pretty-printed JSON array.
///
/// # Returns
///
/// Returns the number of records written.
pub async fn save_analytics(engine: &StorageEngine, path: &Path) -> Result<usize, PersistenceError> {
    let records = engine.analytics();
    let bytes = serde_json::to_vec_pretty(&records).map_err(StoreError::from)?;
    write_atomic(path, &bytes).await?;
    Ok(records.len())
}

/// Restores the value snapshot from `path`.
///
/// # Returns
///
/// - `Ok(Some(count))` with the number of keys loaded
/// - `Ok(None)` if the file does not exist
pub async fn load_snapshot(
    engine: &StorageEngine,
    path: &Path,
) -> Result<Option<usize>, PersistenceError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(PersistenceError::io(path, e)),
    };

    Ok(Some(engine.restore(&bytes)?))
}

/// Periodic snapshot writer.
#[derive(Debug)]
pub struct SnapshotTask {
    engine: Arc<StorageEngine>,

    /// Time between snapshots
    interval: Duration,

    snapshot_path: PathBuf,

    analytics_path: PathBuf,
}

impl SnapshotTask {
    pub fn new(
        engine: Arc<StorageEngine>,
        interval: Duration,
        snapshot_path: impl Into<PathBuf>,
        analytics_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            engine,
            interval,
            snapshot_path: snapshot_path.into(),
            analytics_path: analytics_path.into(),
        }
    }

    /// Writes both snapshot files, logging any failure.
    ///
    /// # Returns
    ///
    /// Returns `true` if both files were written.
    pub async fn save_once(&self) -> bool {
        let mut ok = true;

        match save_snapshot(&self.engine, &self.snapshot_path).await {
            Ok(bytes) => debug!(
                path = %self.snapshot_path.display(),
                bytes = bytes,
                "Saved store snapshot"
            ),
            Err(e) => {
                error!(error = %e, "Failed to save store snapshot");
                ok = false;
            }
        }

        match save_analytics(&self.engine, &self.analytics_path).await {
            Ok(records) => debug!(
                path = %self.analytics_path.display(),
                records = records,
                "Saved analytics snapshot"
            ),
            Err(e) => {
                error!(error = %e, "Failed to save analytics snapshot");
                ok = false;
            }
        }

        ok
    }

    /// Snapshots every interval until shutdown, then writes one final snapshot.
    pub async fn run(self, mut shutdown: Shutdown) {
        info!(
            interval_secs = self.interval.as_secs_f64(),
            path = %self.snapshot_path.display(),
            "Snapshot task started"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.recv() => {
                    debug!("Snapshot task received shutdown signal");
                    self.save_once().await;
                    return;
                }
            }

            info!("Saving store to disk");
            self.save_once().await;
        }
    }
}
