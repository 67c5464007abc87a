//! Process-wide TTL cache with lazy, read-time eviction.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    stored_at: Instant,
}

/// Key → value store whose entries expire per-read against a
/// caller-supplied TTL, so the same key may be read with different
/// effective TTLs by different callers.
///
/// There is no background sweep: an expired entry is forgotten by the
/// `get` that observes it. A `set` replaces the entry rather than
/// mutating it. The store is guarded by one async mutex — critical
/// sections are short and the map is small, so finer locking buys
/// nothing here.
#[derive(Debug, Clone)]
pub struct TtlCache<V> {
    store: Arc<Mutex<HashMap<String, Entry<V>>>>,
}

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self {
            store: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<V: Clone> TtlCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored value, unless the key is absent or older than `ttl`.
    pub async fn get(&self, key: &str, ttl: Duration) -> Option<V> {
        let mut store = self.store.lock().await;
        let entry = store.get(key)?;
        if entry.stored_at.elapsed() > ttl {
            store.remove(key);
            return None;
        }
        Some(entry.value.clone())
    }

    pub async fn set(&self, key: &str, value: V) {
        let mut store = self.store.lock().await;
        store.insert(
            key.to_string(),
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Whether a key is currently stored, regardless of age.
    pub async fn contains(&self, key: &str) -> bool {
        self.store.lock().await.contains_key(key)
    }
}
