//! Thread-Safe Storage Engine with Expiry and Access Analytics
//!
//! This module implements the core store for NeuronKV: a mapping from string keys
//! to string values, a deadline table for keys with a TTL, and an analytics log
//! recording how each key has been accessed.
//!
//! ## Design Decisions
//!
//! 1. **One Lock**: All three maps live behind a single `Mutex`, so every
//!    operation is linearizable with respect to every other one.
//! 2. **Lazy Expiry**: GET, EXPIRE and DEL check the deadline of the key they touch.
//! 3. **Eager Sweep**: [`StorageEngine::sweep`] removes every expired key at once;
//!    it is driven by the background sweeper.
//! 4. **Wall-Clock Deadlines**: deadlines are `SystemTime`s, so "expired" means
//!    `deadline <= now` for both lazy and eager expiry.
//!
//! ## Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     StorageEngine                        │
//! │  ┌────────────────── Mutex<Keyspace> ─────────────────┐  │
//! │  │  values:    HashMap<String, String>                │  │
//! │  │  deadlines: HashMap<String, SystemTime>            │  │
//! │  │  analytics: HashMap<String, AccessRecord>          │  │
//! │  └────────────────────────────────────────────────────┘  │
//! │  counters: AtomicU64 (gets, sets, dels, expires, ...)    │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Every key in `deadlines` is also in `values`. Critical sections never await
//! and never do I/O.

use crate::storage::analytics::AccessRecord;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};
use thiserror::Error;

/// Errors returned by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// TTL was zero, negative, or too large to represent as a deadline
    #[error("invalid expire time: {0}")]
    InvalidTtl(i64),

    /// A snapshot could not be encoded or decoded
    #[error("snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The three maps guarded by the store lock.
#[derive(Debug, Default)]
struct Keyspace {
    values: HashMap<String, String>,
    deadlines: HashMap<String, SystemTime>,
    analytics: HashMap<String, AccessRecord>,
}

impl Keyspace {
    /// Records an access to `key` if it is present in the value map.
    fn touch(&mut self, key: &str, now: SystemTime) {
        let Some(value) = self.values.get(key) else {
            return;
        };
        let size = value.len();
        let ttl = self.deadlines.get(key).copied();

        match self.analytics.get_mut(key) {
            Some(record) => record.touch(now, size, ttl),
            None => {
                self.analytics
                    .insert(key.to_owned(), AccessRecord::first(key, now, size, ttl));
            }
        }
    }

    #[inline]
    fn is_expired(&self, key: &str, now: SystemTime) -> bool {
        self.deadlines
            .get(key)
            .map(|deadline| *deadline <= now)
            .unwrap_or(false)
    }

    /// Removes a key from both the value map and the deadline table.
    fn purge(&mut self, key: &str) -> bool {
        self.deadlines.remove(key);
        self.values.remove(key).is_some()
    }
}

/// The main storage engine for NeuronKV.
///
/// Wrap it in an `Arc` and share it between connection tasks and the background
/// tasks. All operations are synchronous and safe to call from any thread.
///
/// # Example
///
/// ```
/// use neuronkv::storage::StorageEngine;
///
/// let engine = StorageEngine::new();
///
/// engine.set("name", "neuron");
/// assert_eq!(engine.get("name"), Some("neuron".to_string()));
///
/// assert_eq!(engine.expire("name", 60).unwrap(), true);
/// assert_eq!(engine.expire("missing", 60).unwrap(), false);
///
/// assert!(engine.delete("name"));
/// assert_eq!(engine.get("name"), None);
/// ```
pub struct StorageEngine {
    keyspace: Mutex<Keyspace>,

    /// Statistics: total GET operations
    get_count: AtomicU64,

    /// Statistics: total SET operations
    set_count: AtomicU64,

    /// Statistics: total DEL operations
    del_count: AtomicU64,

    /// Statistics: total EXPIRE operations
    expire_count: AtomicU64,

    /// Statistics: keys removed because their deadline passed
    expired_count: AtomicU64,
}

impl std::fmt::Debug for StorageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageEngine")
            .field("keys", &self.len())
            .field("get_count", &self.get_count.load(Ordering::Relaxed))
            .field("set_count", &self.set_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for StorageEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageEngine {
    /// Creates an empty storage engine.
    pub fn new() -> Self {
        Self {
            keyspace: Mutex::new(Keyspace::default()),
            get_count: AtomicU64::new(0),
            set_count: AtomicU64::new(0),
            del_count: AtomicU64::new(0),
            expire_count: AtomicU64::new(0),
            expired_count: AtomicU64::new(0),
        }
    }

    /// Acquires the store lock.
    ///
    /// No critical section can leave the maps half-updated, so a poisoned lock
    /// is still safe to use.
    fn lock(&self) -> MutexGuard<'_, Keyspace> {
        self.keyspace.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sets a key to a value, clearing any deadline the key had.
    ///
    /// # Returns
    ///
    /// Returns `true` if a new key was created, `false` if an existing key was updated.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) -> bool {
        self.set_at(key.into(), value.into(), SystemTime::now())
    }

    pub(crate) fn set_at(&self, key: String, value: String, now: SystemTime) -> bool {
        self.set_count.fetch_add(1, Ordering::Relaxed);

        let mut keyspace = self.lock();
        keyspace.deadlines.remove(&key);
        let is_new = keyspace.values.insert(key.clone(), value).is_none();
        keyspace.touch(&key, now);

        is_new
    }

    /// Gets the value for a key.
    ///
    /// The access is recorded before the deadline is checked, so a key that is
    /// discovered to be expired by this call still gets an analytics update,
    /// sized by its pre-expiry value. Expired keys are removed and `None` is
    /// returned.
    pub fn get(&self, key: &str) -> Option<String> {
        self.get_at(key, SystemTime::now())
    }

    pub(crate) fn get_at(&self, key: &str, now: SystemTime) -> Option<String> {
        self.get_count.fetch_add(1, Ordering::Relaxed);

        let mut keyspace = self.lock();
        keyspace.touch(key, now);

        if keyspace.is_expired(key, now) {
            keyspace.purge(key);
            self.expired_count.fetch_add(1, Ordering::Relaxed);
            return None;
        }

        keyspace.values.get(key).cloned()
    }

    /// Sets the deadline of an existing key to `now + ttl_seconds`.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` if the deadline was set
    /// - `Ok(false)` if the key does not exist or had already expired
    /// - `Err(StoreError::InvalidTtl)` if `ttl_seconds` is not positive
    ///
    /// The access is recorded whenever the key is present, even when the TTL
    /// is rejected.
    pub fn expire(&self, key: &str, ttl_seconds: i64) -> Result<bool, StoreError> {
        self.expire_at(key, ttl_seconds, SystemTime::now())
    }

    pub(crate) fn expire_at(
        &self,
        key: &str,
        ttl_seconds: i64,
        now: SystemTime,
    ) -> Result<bool, StoreError> {
        self.expire_count.fetch_add(1, Ordering::Relaxed);

        let deadline = u64::try_from(ttl_seconds)
            .ok()
            .filter(|secs| *secs > 0)
            .and_then(|secs| now.checked_add(Duration::from_secs(secs)));

        let mut keyspace = self.lock();
        let Some(deadline) = deadline else {
            keyspace.touch(key, now);
            return Err(StoreError::InvalidTtl(ttl_seconds));
        };

        if !keyspace.values.contains_key(key) {
            return Ok(false);
        }

        if keyspace.is_expired(key, now) {
            keyspace.touch(key, now);
            keyspace.purge(key);
            self.expired_count.fetch_add(1, Ordering::Relaxed);
            return Ok(false);
        }

        keyspace.deadlines.insert(key.to_owned(), deadline);
        keyspace.touch(key, now);
        Ok(true)
    }

    /// Deletes a key and its deadline.
    ///
    /// # Returns
    ///
    /// Returns `true` if a live key was deleted, `false` if it didn't exist or
    /// had already expired.
    pub fn delete(&self, key: &str) -> bool {
        self.delete_at(key, SystemTime::now())
    }

    pub(crate) fn delete_at(&self, key: &str, now: SystemTime) -> bool {
        self.del_count.fetch_add(1, Ordering::Relaxed);

        let mut keyspace = self.lock();
        keyspace.touch(key, now);

        let expired = keyspace.is_expired(key, now);
        let removed = keyspace.purge(key);
        if expired {
            self.expired_count.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        removed
    }

    /// Records an access to `key` without reading or changing it.
    ///
    /// Used for requests that name a key but are rejected before reaching the
    /// store, such as `EXPIRE` with a non-numeric TTL.
    ///
    /// # Returns
    ///
    /// Returns `true` if the key was present and the access was recorded.
    pub fn record_access(&self, key: &str) -> bool {
        self.record_access_at(key, SystemTime::now())
    }

    pub(crate) fn record_access_at(&self, key: &str, now: SystemTime) -> bool {
        let mut keyspace = self.lock();
        if !keyspace.values.contains_key(key) {
            return false;
        }
        keyspace.touch(key, now);
        true
    }

    /// Removes every key whose deadline is at or before `now`.
    ///
    /// This is called by the background expiry sweeper.
    ///
    /// # Returns
    ///
    /// Returns the keys that were removed.
    pub fn sweep(&self, now: SystemTime) -> HashSet<String> {
        let mut keyspace = self.lock();

        let expired: HashSet<String> = keyspace
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            keyspace.purge(key);
        }

        if !expired.is_empty() {
            self.expired_count
                .fetch_add(expired.len() as u64, Ordering::Relaxed);
        }

        expired
    }

    /// Serializes the value map as a JSON object.
    ///
    /// Deadlines and analytics are not part of the snapshot.
    pub fn snapshot(&self) -> Result<Vec<u8>, StoreError> {
        let values = self.lock().values.clone();
        Ok(serde_json::to_vec(&values)?)
    }

    /// Replaces the value map with one produced by [`snapshot`](Self::snapshot).
    ///
    /// Restored keys have no deadline. Analytics are left untouched.
    ///
    /// # Returns
    ///
    /// Returns the number of keys loaded.
    pub fn restore(&self, bytes: &[u8]) -> Result<usize, StoreError> {
        let values: HashMap<String, String> = serde_json::from_slice(bytes)?;
        let count = values.len();

        let mut keyspace = self.lock();
        keyspace.values = values;
        keyspace.deadlines.clear();

        Ok(count)
    }

    /// Returns a copy of every analytics record, ordered by key.
    pub fn analytics(&self) -> Vec<AccessRecord> {
        let mut records: Vec<AccessRecord> = self.lock().analytics.values().cloned().collect();
        records.sort_by(|a, b| a.key.cmp(&b.key));
        records
    }

    /// Returns a copy of the analytics record for one key.
    pub fn access_record(&self, key: &str) -> Option<AccessRecord> {
        self.lock().analytics.get(key).cloned()
    }

    /// Checks if a key is present and not expired. Does not record an access.
    pub fn contains(&self, key: &str) -> bool {
        let keyspace = self.lock();
        keyspace.values.contains_key(key) && !keyspace.is_expired(key, SystemTime::now())
    }

    /// Returns the deadline of a key, if it has one. Does not record an access.
    pub fn deadline(&self, key: &str) -> Option<SystemTime> {
        self.lock().deadlines.get(key).copied()
    }

    /// Clears values, deadlines and analytics.
    pub fn flush(&self) {
        let mut keyspace = self.lock();
        keyspace.values.clear();
        keyspace.deadlines.clear();
        keyspace.analytics.clear();
    }

    /// Returns the number of keys in the value map, including expired keys
    /// that have not been removed yet.
    pub fn len(&self) -> usize {
        self.lock().values.len()
    }

    /// Returns true if the value map is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of keys that currently have a deadline.
    pub fn expiring_len(&self) -> usize {
        self.lock().deadlines.len()
    }

    /// Returns database statistics.
    pub fn stats(&self) -> StorageStats {
        StorageStats {
            keys: self.len() as u64,
            get_ops: self.get_count.load(Ordering::Relaxed),
            set_ops: self.set_count.load(Ordering::Relaxed),
            del_ops: self.del_count.load(Ordering::Relaxed),
            expire_ops: self.expire_count.load(Ordering::Relaxed),
            expired: self.expired_count.load(Ordering::Relaxed),
        }
    }
}

/// Database statistics.
#[derive(Debug, Clone, Copy)]
pub struct StorageStats {
    /// Number of keys currently stored
    pub keys: u64,
    /// Total GET operations
    pub get_ops: u64,
    /// Total SET operations
    pub set_ops: u64,
    /// Total DEL operations
    pub del_ops: u64,
    /// Total EXPIRE operations
    pub expire_ops: u64,
    /// Keys removed because they expired
    pub expired: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::UNIX_EPOCH;

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(1_000_000 + secs)
    }

    #[test]
    fn test_set_and_get() {
        let engine = StorageEngine::new();

        assert!(engine.set("foo", "bar"));
        assert_eq!(engine.get("foo"), Some("bar".to_string()));
    }

    #[test]
    fn test_get_nonexistent() {
        let engine = StorageEngine::new();
        assert_eq!(engine.get("nonexistent"), None);
        assert!(engine.access_record("nonexistent").is_none());
    }

    #[test]
    fn test_overwrite_clears_ttl() {
        let engine = StorageEngine::new();

        engine.set_at("k".into(), "v1".into(), at(0));
        assert!(engine.expire_at("k", 10, at(0)).unwrap());
        assert!(engine.deadline("k").is_some());

        assert!(!engine.set_at("k".into(), "v2".into(), at(1)));
        assert!(engine.deadline("k").is_none());

        // Well past the old deadline
        assert_eq!(engine.get_at("k", at(100)), Some("v2".to_string()));
    }

    #[test]
    fn test_empty_value() {
        let engine = StorageEngine::new();

        engine.set("k", "");
        assert_eq!(engine.get("k"), Some(String::new()));
        assert_eq!(engine.access_record("k").unwrap().size, 0);
    }

    #[test]
    fn test_delete() {
        let engine = StorageEngine::new();

        engine.set("key3", "value3");
        assert!(engine.delete("key3"));
        assert_eq!(engine.get("key3"), None);
        assert!(!engine.delete("key3"));
    }

    #[test]
    fn test_delete_removes_deadline() {
        let engine = StorageEngine::new();

        engine.set("k", "v");
        engine.expire("k", 100).unwrap();
        assert_eq!(engine.expiring_len(), 1);

        assert!(engine.delete("k"));
        assert_eq!(engine.expiring_len(), 0);
    }

    #[test]
    fn test_expire_missing_key() {
        let engine = StorageEngine::new();

        assert!(!engine.expire("missing", 10).unwrap());
        assert!(engine.is_empty());
        assert_eq!(engine.expiring_len(), 0);
        assert!(engine.access_record("missing").is_none());
    }

    #[test]
    fn test_expire_rejects_non_positive_ttl() {
        let engine = StorageEngine::new();
        engine.set("k", "v");

        assert!(matches!(
            engine.expire("k", 0),
            Err(StoreError::InvalidTtl(0))
        ));
        assert!(matches!(
            engine.expire("k", -5),
            Err(StoreError::InvalidTtl(-5))
        ));
        assert!(engine.deadline("k").is_none());
        // Rejected calls still count as accesses to a present key
        assert_eq!(engine.access_record("k").unwrap().access_count, 3);

        assert!(matches!(
            engine.expire("missing", 0),
            Err(StoreError::InvalidTtl(0))
        ));
        assert!(engine.access_record("missing").is_none());
    }

    #[test]
    fn test_expire_rejects_unrepresentable_ttl() {
        let engine = StorageEngine::new();
        engine.set("k", "v");

        assert!(engine.expire("k", i64::MAX).is_err());
        assert!(engine.deadline("k").is_none());
    }

    #[test]
    fn test_lazy_expiry() {
        let engine = StorageEngine::new();

        engine.set_at("foo".into(), "bar".into(), at(0));
        assert!(engine.expire_at("foo", 1, at(0)).unwrap());

        assert_eq!(engine.get_at("foo", at(0)), Some("bar".to_string()));

        // Deadline equal to now counts as expired
        assert_eq!(engine.get_at("foo", at(1)), None);
        assert_eq!(engine.len(), 0);
        assert_eq!(engine.expiring_len(), 0);
        assert_eq!(engine.stats().expired, 1);
    }

    #[test]
    fn test_expiry_real_clock() {
        let engine = StorageEngine::new();

        engine.set("foo", "bar");
        engine.expire("foo", 1).unwrap();

        std::thread::sleep(Duration::from_millis(1100));

        assert_eq!(engine.get("foo"), None);
        assert!(!engine.contains("foo"));
    }

    #[test]
    fn test_expired_key_is_absent_for_expire_and_delete() {
        let engine = StorageEngine::new();

        engine.set_at("a".into(), "1".into(), at(0));
        engine.set_at("b".into(), "2".into(), at(0));
        engine.expire_at("a", 1, at(0)).unwrap();
        engine.expire_at("b", 1, at(0)).unwrap();

        assert!(!engine.expire_at("a", 10, at(5)).unwrap());
        assert!(!engine.delete_at("b", at(5)));
        assert!(engine.is_empty());
        assert_eq!(engine.expiring_len(), 0);
    }

    #[test]
    fn test_get_records_access_before_expiring() {
        let engine = StorageEngine::new();

        engine.set_at("k".into(), "hello".into(), at(0));
        engine.expire_at("k", 2, at(0)).unwrap();

        assert_eq!(engine.get_at("k", at(3)), None);

        let record = engine.access_record("k").unwrap();
        assert_eq!(record.access_count, 3);
        assert_eq!(record.size, 5);
        assert_eq!(record.last_accessed, crate::storage::epoch_seconds(at(3)));

        // Now absent from the start, so nothing more is recorded
        assert_eq!(engine.get_at("k", at(4)), None);
        assert_eq!(engine.access_record("k").unwrap().access_count, 3);
    }

    #[test]
    fn test_analytics_track_each_operation() {
        let engine = StorageEngine::new();

        engine.set_at("k".into(), "abc".into(), at(0));
        let record = engine.access_record("k").unwrap();
        assert_eq!(record.access_count, 1);
        assert_eq!(record.size, 3);
        assert_eq!(record.ttl, None);

        engine.expire_at("k", 10, at(1)).unwrap();
        let record = engine.access_record("k").unwrap();
        assert_eq!(record.access_count, 2);
        assert_eq!(record.ttl, Some(crate::storage::epoch_seconds(at(11))));

        engine.set_at("k".into(), "abcdef".into(), at(2));
        let record = engine.access_record("k").unwrap();
        assert_eq!(record.access_count, 3);
        assert_eq!(record.size, 6);
        assert_eq!(record.ttl, None);

        engine.get_at("k", at(3));
        engine.delete_at("k", at(4));
        let record = engine.access_record("k").unwrap();
        assert_eq!(record.access_count, 5);
        assert_eq!(record.last_accessed, crate::storage::epoch_seconds(at(4)));
    }

    #[test]
    fn test_analytics_retained_after_delete() {
        let engine = StorageEngine::new();

        engine.set("gone", "v");
        engine.delete("gone");

        assert!(engine.is_empty());
        assert_eq!(engine.analytics().len(), 1);
        assert_eq!(engine.analytics()[0].key, "gone");

        engine.delete("gone");
        assert_eq!(engine.access_record("gone").unwrap().access_count, 2);
    }

    #[test]
    fn test_analytics_sorted_by_key() {
        let engine = StorageEngine::new();

        engine.set("zeta", "1");
        engine.set("alpha", "2");
        engine.set("mid", "3");

        let keys: Vec<String> = engine.analytics().into_iter().map(|r| r.key).collect();
        assert_eq!(keys, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_sweep() {
        let engine = StorageEngine::new();

        engine.set_at("key1".into(), "value1".into(), at(0));
        engine.set_at("key2".into(), "value2".into(), at(0));
        engine.set_at("key3".into(), "value3".into(), at(0));
        engine.set_at("key4".into(), "value4".into(), at(0));
        engine.expire_at("key1", 1, at(0)).unwrap();
        engine.expire_at("key2", 5, at(0)).unwrap();
        engine.expire_at("key3", 100, at(0)).unwrap();

        let removed = engine.sweep(at(5));
        let expected: HashSet<String> = ["key1", "key2"].iter().map(|s| s.to_string()).collect();
        assert_eq!(removed, expected);

        assert_eq!(engine.len(), 2);
        assert_eq!(engine.expiring_len(), 1);
        assert!(engine.deadline("key3").is_some());
        assert_eq!(engine.stats().expired, 2);

        assert!(engine.sweep(at(5)).is_empty());
    }

    #[test]
    fn test_sweep_keeps_analytics() {
        let engine = StorageEngine::new();

        engine.set_at("k".into(), "v".into(), at(0));
        engine.expire_at("k", 1, at(0)).unwrap();
        engine.sweep(at(10));

        assert!(engine.is_empty());
        assert_eq!(engine.access_record("k").unwrap().access_count, 2);
    }

    #[test]
    fn test_snapshot_restore() {
        let engine = StorageEngine::new();

        engine.set("foo", "bar");
        engine.set("baz", "qux");
        engine.set("temp", "soon-gone");
        engine.expire("temp", 100).unwrap();

        let bytes = engine.snapshot().unwrap();

        let restored = StorageEngine::new();
        assert_eq!(restored.restore(&bytes).unwrap(), 3);

        assert_eq!(restored.get("foo"), Some("bar".to_string()));
        assert_eq!(restored.get("baz"), Some("qux".to_string()));
        // TTLs are not persisted
        assert_eq!(restored.get("temp"), Some("soon-gone".to_string()));
        assert_eq!(restored.expiring_len(), 0);
    }

    #[test]
    fn test_snapshot_is_json_object() {
        let engine = StorageEngine::new();
        engine.set("foo", "bar");

        let json: serde_json::Value = serde_json::from_slice(&engine.snapshot().unwrap()).unwrap();
        assert_eq!(json, serde_json::json!({ "foo": "bar" }));
    }

    #[test]
    fn test_restore_replaces_values_and_clears_deadlines() {
        let engine = StorageEngine::new();

        engine.set("old", "v");
        engine.expire("old", 100).unwrap();

        engine.restore(br#"{"new": "value"}"#).unwrap();

        assert!(!engine.contains("old"));
        assert_eq!(engine.get("new"), Some("value".to_string()));
        assert_eq!(engine.expiring_len(), 0);
        // Analytics survive a restore
        assert!(engine.access_record("old").is_some());
    }

    #[test]
    fn test_restore_rejects_garbage() {
        let engine = StorageEngine::new();
        engine.set("keep", "me");

        assert!(matches!(
            engine.restore(b"not json"),
            Err(StoreError::Serialization(_))
        ));
        assert_eq!(engine.get("keep"), Some("me".to_string()));
    }

    #[test]
    fn test_record_access() {
        let engine = StorageEngine::new();
        engine.set_at("a".into(), "xyz".into(), at(0));

        assert!(engine.record_access_at("a", at(2)));
        let record = engine.access_record("a").unwrap();
        assert_eq!(record.access_count, 2);
        assert_eq!(record.size, 3);
        assert_eq!(record.last_accessed, crate::storage::epoch_seconds(at(2)));
        assert_eq!(engine.get_at("a", at(3)), Some("xyz".to_string()));

        assert!(!engine.record_access("missing"));
        assert!(engine.access_record("missing").is_none());
    }

    #[test]
    fn test_flush() {
        let engine = StorageEngine::new();

        engine.set("key1", "value1");
        engine.set("key2", "value2");
        engine.expire("key2", 10).unwrap();

        engine.flush();

        assert!(engine.is_empty());
        assert_eq!(engine.expiring_len(), 0);
        assert!(engine.analytics().is_empty());
    }

    #[test]
    fn test_concurrent_access() {
        use std::sync::Arc;
        use std::thread;

        let engine = Arc::new(StorageEngine::new());
        let mut handles = vec![];

        for i in 0..10 {
            let engine = Arc::clone(&engine);
            handles.push(thread::spawn(move || {
                for j in 0..100 {
                    let key = format!("key-{}-{}", i, j);
                    let value = format!("value-{}-{}", i, j);
                    engine.set(key.clone(), value.clone());
                    assert_eq!(engine.get(&key), Some(value));
                    if j % 2 == 0 {
                        assert!(engine.delete(&key));
                    }
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(engine.len(), 500);
        assert_eq!(engine.analytics().len(), 1000);
    }

    #[test]
    fn test_stats() {
        let engine = StorageEngine::new();

        engine.set("k", "v");
        engine.get("k");
        engine.get("missing");
        engine.expire("k", 5).unwrap();
        engine.delete("k");

        let stats = engine.stats();
        assert_eq!(stats.keys, 0);
        assert_eq!(stats.set_ops, 1);
        assert_eq!(stats.get_ops, 2);
        assert_eq!(stats.expire_ops, 1);
        assert_eq!(stats.del_ops, 1);
    }
}
