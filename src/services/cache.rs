//! Expiring key/value cache over an injectable storage backend.
//!
//! The cache never surfaces errors: storage and parse failures degrade to a
//! miss (on read) or a no-op (on write) and are reported through `tracing`
//! diagnostics only. Expired entries are treated as absent but are not
//! proactively evicted; they get overwritten by the next successful fetch.

use crate::error::Error;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Millisecond clock, injectable so TTL behavior is testable without
/// sleeping.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Persistent backing store for cache entries. Keys arriving here are
/// already sanitized to `[A-Za-z0-9._-]`.
pub trait CacheStorage: Send + Sync {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&self, key: &str, value: &str) -> Result<(), Error>;
    fn remove(&self, key: &str) -> Result<(), Error>;
    fn keys(&self) -> Vec<String>;
}

/// Directory-backed storage: one JSON file per key.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl CacheStorage for FileStorage {
    fn read(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn write(&self, key: &str, value: &str) -> Result<(), Error> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| Error::Io(format!("create cache dir: {e}")))?;
        fs::write(self.path_for(key), value)
            .map_err(|e| Error::Io(format!("write cache entry: {e}")))
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Io(format!("remove cache entry: {e}"))),
        }
    }

    fn keys(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                name.strip_suffix(".json").map(str::to_string)
            })
            .collect()
    }
}

/// In-memory storage for tests and cache-less runs.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStorage for MemoryStorage {
    fn read(&self, key: &str) -> Option<String> {
        lock_entries(&self.entries).get(key).cloned()
    }

    fn write(&self, key: &str, value: &str) -> Result<(), Error> {
        lock_entries(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        lock_entries(&self.entries).remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        lock_entries(&self.entries).keys().cloned().collect()
    }
}

fn lock_entries(
    entries: &Mutex<HashMap<String, String>>,
) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
    entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Persisted shape of one cache entry.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    stored_at_ms: i64,
    ttl_ms: i64,
    payload: serde_json::Value,
}

/// TTL cache. An entry is valid iff `now - stored_at_ms < ttl_ms`.
pub struct ExpiringCache {
    storage: Box<dyn CacheStorage>,
    clock: Box<dyn Clock>,
}

impl ExpiringCache {
    pub fn new(storage: Box<dyn CacheStorage>, clock: Box<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// Directory-backed cache on the system clock.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(Box::new(FileStorage::new(dir)), Box::new(SystemClock))
    }

    /// Read the entry for `key`. Absent, corrupt, and expired entries all
    /// report as a miss.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.storage.read(&sanitize_key(key))?;

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(key, error = %e, "discarding corrupt cache entry");
                return None;
            }
        };

        let age_ms = self.clock.now_ms() - entry.stored_at_ms;
        if age_ms >= entry.ttl_ms {
            debug!(key, age_ms, ttl_ms = entry.ttl_ms, "cache entry expired");
            return None;
        }

        match serde_json::from_value(entry.payload) {
            Ok(payload) => Some(payload),
            Err(e) => {
                debug!(key, error = %e, "cache payload failed to decode");
                None
            }
        }
    }

    /// Persist `payload` under `key`. Best-effort: failures are logged and
    /// swallowed.
    pub fn set<T: Serialize>(&self, key: &str, payload: &T, ttl_ms: i64) {
        let payload = match serde_json::to_value(payload) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "cache payload failed to encode");
                return;
            }
        };

        let entry = CacheEntry {
            stored_at_ms: self.clock.now_ms(),
            ttl_ms,
            payload,
        };

        let raw = match serde_json::to_string(&entry) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "cache entry failed to encode");
                return;
            }
        };

        if let Err(e) = self.storage.write(&sanitize_key(key), &raw) {
            warn!(key, error = %e, "cache write failed");
        }
    }

    /// Delete the entry for `key`, if any.
    pub fn remove(&self, key: &str) {
        if let Err(e) = self.storage.remove(&sanitize_key(key)) {
            warn!(key, error = %e, "cache remove failed");
        }
    }

    /// Delete every entry in the store.
    pub fn clear(&self) {
        for key in self.storage.keys() {
            if let Err(e) = self.storage.remove(&key) {
                warn!(key, error = %e, "cache remove failed");
            }
        }
    }

    /// Delete every entry whose key starts with `prefix`.
    pub fn remove_by_prefix(&self, prefix: &str) {
        let sanitized = sanitize_key(prefix);
        for key in self.storage.keys() {
            if key.starts_with(&sanitized) {
                if let Err(e) = self.storage.remove(&key) {
                    warn!(key, error = %e, "cache remove failed");
                }
            }
        }
    }
}

/// Map a logical key to a storage-safe key. The mapping is per-character,
/// so prefixes stay prefixes after sanitization.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    /// Manually advanced clock for deterministic TTL tests.
    pub struct ManualClock {
        now_ms: AtomicI64,
    }

    impl ManualClock {
        pub fn new(start_ms: i64) -> Self {
            Self {
                now_ms: AtomicI64::new(start_ms),
            }
        }

        pub fn advance(&self, delta_ms: i64) {
            self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
        }
    }

    impl Clock for Arc<ManualClock> {
        fn now_ms(&self) -> i64 {
            self.now_ms.load(Ordering::SeqCst)
        }
    }

    fn cache_with_clock(clock: Arc<ManualClock>) -> ExpiringCache {
        ExpiringCache::new(Box::new(MemoryStorage::new()), Box::new(clock))
    }

    #[test]
    fn get_within_ttl_returns_value() {
        let clock = Arc::new(ManualClock::new(1_000));
        let cache = cache_with_clock(clock.clone());

        cache.set("stocks:v1", &vec![1, 2, 3], 60_000);
        clock.advance(59_999);
        assert_eq!(cache.get::<Vec<i32>>("stocks:v1"), Some(vec![1, 2, 3]));
    }

    #[test]
    fn get_past_ttl_is_a_miss() {
        let clock = Arc::new(ManualClock::new(1_000));
        let cache = cache_with_clock(clock.clone());

        cache.set("stocks:v1", &"payload", 60_000);
        clock.advance(60_000);
        assert_eq!(cache.get::<String>("stocks:v1"), None);
    }

    #[test]
    fn overwrite_refreshes_ttl_window() {
        let clock = Arc::new(ManualClock::new(0));
        let cache = cache_with_clock(clock.clone());

        cache.set("k", &1, 100);
        clock.advance(90);
        cache.set("k", &2, 100);
        clock.advance(90);
        assert_eq!(cache.get::<i32>("k"), Some(2));
    }

    #[test]
    fn corrupt_entry_is_a_miss() {
        let storage = MemoryStorage::new();
        storage.write("bad", "not json at all").unwrap();
        let cache = ExpiringCache::new(
            Box::new(storage),
            Box::new(Arc::new(ManualClock::new(0))),
        );
        assert_eq!(cache.get::<String>("bad"), None);
    }

    #[test]
    fn mismatched_payload_type_is_a_miss() {
        let clock = Arc::new(ManualClock::new(0));
        let cache = cache_with_clock(clock);
        cache.set("k", &"text", 1_000);
        assert_eq!(cache.get::<Vec<f64>>("k"), None);
    }

    #[test]
    fn remove_by_prefix_leaves_other_families() {
        let clock = Arc::new(ManualClock::new(0));
        let cache = cache_with_clock(clock);

        cache.set("daily:AAPL", &1, 1_000);
        cache.set("daily:MSFT", &2, 1_000);
        cache.set("levels:AAPL", &3, 1_000);

        cache.remove_by_prefix("daily:");
        assert_eq!(cache.get::<i32>("daily:AAPL"), None);
        assert_eq!(cache.get::<i32>("daily:MSFT"), None);
        assert_eq!(cache.get::<i32>("levels:AAPL"), Some(3));
    }

    #[test]
    fn clear_empties_the_store() {
        let clock = Arc::new(ManualClock::new(0));
        let cache = cache_with_clock(clock);

        cache.set("stocks:v1", &1, 1_000);
        cache.set("daily:AAPL", &2, 1_000);
        cache.clear();
        assert_eq!(cache.get::<i32>("stocks:v1"), None);
        assert_eq!(cache.get::<i32>("daily:AAPL"), None);
    }

    #[test]
    fn file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ExpiringCache::with_dir(dir.path());

        cache.set("daily:KSIX.JK", &vec![1.5, 2.5], 60_000);
        assert_eq!(
            cache.get::<Vec<f64>>("daily:KSIX.JK"),
            Some(vec![1.5, 2.5])
        );

        cache.remove("daily:KSIX.JK");
        assert_eq!(cache.get::<Vec<f64>>("daily:KSIX.JK"), None);
    }

    #[test]
    fn sanitize_preserves_prefix_relationship() {
        let key = sanitize_key("daily:KSIX.JK");
        let prefix = sanitize_key("daily:");
        assert!(key.starts_with(&prefix));
    }
}
