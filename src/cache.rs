//! Generic in-memory cache with TTL support.
//!
//! Entries expire after a per-entry time-to-live. A janitor thread evicts
//! expired entries on a fixed interval and is stopped and joined when the
//! cache is dropped. Reads record hit/miss statistics; an expired entry
//! reads as a miss even before the janitor has removed it.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, RwLock};

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Cache statistics snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub item_count: u64,
}

struct Shared<K, V> {
    items: RwLock<HashMap<K, Entry<V>>>,
    stats: Mutex<Stats>,
    shutdown: Mutex<bool>,
    shutdown_cond: Condvar,
}

/// Thread-safe in-memory cache with per-entry TTL.
pub struct Cache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    shared: Arc<Shared<K, V>>,
    janitor: Option<JoinHandle<()>>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Creates a cache whose janitor evicts expired entries every
    /// `cleanup_interval`.
    pub fn new(cleanup_interval: Duration) -> Self {
        let shared = Arc::new(Shared {
            items: RwLock::new(HashMap::new()),
            stats: Mutex::new(Stats::default()),
            shutdown: Mutex::new(false),
            shutdown_cond: Condvar::new(),
        });

        let janitor = {
            let shared = shared.clone();
            thread::spawn(move || janitor_loop(&shared, cleanup_interval))
        };

        Self {
            shared,
            janitor: Some(janitor),
        }
    }

    /// Returns the live value for `key`, if any.
    pub fn get(&self, key: &K) -> Option<V> {
        let value = {
            let items = self.shared.items.read();
            items
                .get(key)
                .filter(|entry| Instant::now() < entry.expires_at)
                .map(|entry| entry.value.clone())
        };

        let mut stats = self.shared.stats.lock();
        match &value {
            Some(_) => stats.hits += 1,
            None => stats.misses += 1,
        }
        value
    }

    /// Stores `value` under `key` for `ttl`, replacing any previous entry.
    pub fn insert(&self, key: K, value: V, ttl: Duration) {
        let mut items = self.shared.items.write();
        items.insert(
            key,
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        self.shared.stats.lock().item_count = items.len() as u64;
    }

    /// Removes `key` from the cache.
    pub fn remove(&self, key: &K) {
        let mut items = self.shared.items.write();
        items.remove(key);
        self.shared.stats.lock().item_count = items.len() as u64;
    }

    /// Current statistics snapshot.
    pub fn stats(&self) -> Stats {
        *self.shared.stats.lock()
    }
}

impl<K, V> Drop for Cache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        *self.shared.shutdown.lock() = true;
        self.shared.shutdown_cond.notify_all();
        if let Some(janitor) = self.janitor.take() {
            let _ = janitor.join();
        }
    }
}

fn janitor_loop<K: Eq + Hash, V>(shared: &Shared<K, V>, interval: Duration) {
    loop {
        {
            let mut shutdown = shared.shutdown.lock();
            if !*shutdown {
                let _ = shared.shutdown_cond.wait_for(&mut shutdown, interval);
            }
            if *shutdown {
                return;
            }
        }
        evict_expired(shared);
    }
}

fn evict_expired<K: Eq + Hash, V>(shared: &Shared<K, V>) {
    let now = Instant::now();
    let (evicted, remaining) = {
        let mut items = shared.items.write();
        let before = items.len();
        items.retain(|_, entry| now < entry.expires_at);
        ((before - items.len()) as u64, items.len() as u64)
    };

    let mut stats = shared.stats.lock();
    stats.evictions += evicted;
    stats.item_count = remaining;
    drop(stats);

    if evicted > 0 {
        tracing::debug!(evicted, "cache janitor evicted expired entries");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG: Duration = Duration::from_secs(60);

    #[test]
    fn test_insert_and_get() {
        let cache: Cache<String, u32> = Cache::new(LONG);
        cache.insert("a".into(), 1, LONG);

        assert_eq!(cache.get(&"a".into()), Some(1));
        assert_eq!(cache.get(&"b".into()), None);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.item_count, 1);
    }

    #[test]
    fn test_expired_entry_reads_as_miss() {
        let cache: Cache<&'static str, u32> = Cache::new(LONG);
        cache.insert("hot", 1, Duration::from_millis(10));

        assert_eq!(cache.get(&"hot"), Some(1));
        thread::sleep(Duration::from_millis(30));
        assert_eq!(cache.get(&"hot"), None);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_insert_replaces_previous_entry() {
        let cache: Cache<&'static str, u32> = Cache::new(LONG);
        cache.insert("k", 1, LONG);
        cache.insert("k", 2, LONG);

        assert_eq!(cache.get(&"k"), Some(2));
        assert_eq!(cache.stats().item_count, 1);
    }

    #[test]
    fn test_remove() {
        let cache: Cache<&'static str, u32> = Cache::new(LONG);
        cache.insert("k", 1, LONG);
        cache.remove(&"k");

        assert_eq!(cache.get(&"k"), None);
        assert_eq!(cache.stats().item_count, 0);
    }

    #[test]
    fn test_janitor_evicts_expired_entries() {
        let cache: Cache<&'static str, u32> = Cache::new(Duration::from_millis(5));
        cache.insert("short", 1, Duration::from_millis(1));
        cache.insert("long", 2, LONG);

        // Give the janitor a few intervals to run.
        thread::sleep(Duration::from_millis(100));

        let stats = cache.stats();
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.item_count, 1);
        assert_eq!(cache.get(&"long"), Some(2));
    }

    #[test]
    fn test_drop_stops_janitor() {
        let cache: Cache<&'static str, u32> = Cache::new(Duration::from_millis(5));
        cache.insert("k", 1, LONG);
        drop(cache);
    }
}
