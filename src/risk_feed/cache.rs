use std::{
    future::Future,
    hash::Hash,
    sync::atomic::{AtomicUsize, Ordering},
    time::{Duration, Instant},
};

use dashmap::DashMap;

/// Entry count above which an insertion first sweeps expired entries.
pub const SWEEP_THRESHOLD: usize = 1024;

/// In-memory cache whose entries expire `ttl` after insertion.
///
/// Backed by a [`DashMap`], so lookups from concurrent tasks do not contend on one lock.
/// Expired entries are dropped on the next lookup of their key, and every insertion that
/// grows the map past the sweep mark purges all expired entries. The mark starts at
/// [`SWEEP_THRESHOLD`] and is reset to twice the surviving size after each sweep, so the map
/// stays bounded by the number of live keys. Only successful values are ever stored.
#[derive(Debug)]
pub struct TtlCache<K, V>
where
    K: Eq + Hash,
{
    ttl: Duration,
    entries: DashMap<K, (Instant, V)>,
    sweep_at: AtomicUsize,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        TtlCache {
            ttl,
            entries: DashMap::new(),
            sweep_at: AtomicUsize::new(SWEEP_THRESHOLD),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value for `key`, if any.
    pub fn get(&self, key: &K) -> Option<V> {
        let fresh = {
            let entry = self.entries.get(key)?;
            let (stored_at, value) = entry.value();
            (stored_at.elapsed() < self.ttl).then(|| value.clone())
        };
        if fresh.is_none() {
            self.entries.remove(key);
        }
        fresh
    }

    pub fn insert(&self, key: K, value: V) {
        if self.entries.len() >= self.sweep_at.load(Ordering::Relaxed) {
            self.purge_expired();
            let next = (2 * self.entries.len()).max(SWEEP_THRESHOLD);
            self.sweep_at.store(next, Ordering::Relaxed);
        }
        self.entries.insert(key, (Instant::now(), value));
    }

    /// Return the cached value or compute, store and return a new one.
    ///
    /// Errors from `compute` are returned as is and nothing is cached. Two tasks missing the
    /// same key concurrently both compute; the last writer wins.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = compute().await?;
        self.insert(key, value.clone());
        Ok(value)
    }

    pub fn purge_expired(&self) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, (stored_at, _)| stored_at.elapsed() < ttl);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod cache_test {
    use super::*;

    #[test]
    fn test_get_insert() {
        let cache = TtlCache::new(Duration::from_secs(3600));
        assert_eq!(cache.get(&"433"), None);
        cache.insert("433", 1.458);
        assert_eq!(cache.get(&"433"), Some(1.458));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_zero_ttl_never_hits() {
        let cache = TtlCache::new(Duration::ZERO);
        cache.insert("99942".to_string(), "Apophis");
        assert_eq!(cache.get(&"99942".to_string()), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_purge_and_clear() {
        let expired = TtlCache::new(Duration::ZERO);
        expired.insert(1, 'a');
        expired.insert(2, 'b');
        expired.purge_expired();
        assert!(expired.is_empty());

        let long = TtlCache::new(Duration::from_secs(60));
        long.insert(1, 'a');
        long.purge_expired();
        assert_eq!(long.len(), 1);
        long.clear();
        assert!(long.is_empty());
    }

    #[test]
    fn test_expired_keys_do_not_accumulate() {
        let cache = TtlCache::new(Duration::ZERO);
        for des in 0..10_000 {
            cache.insert(format!("2024 A{des}"), des);
        }
        assert!(cache.len() <= SWEEP_THRESHOLD);
    }

    #[test]
    fn test_sweep_keeps_fresh_entries() {
        let cache = TtlCache::new(Duration::from_secs(3600));
        for des in 0..3 * SWEEP_THRESHOLD {
            cache.insert(des, ());
        }
        assert_eq!(cache.len(), 3 * SWEEP_THRESHOLD);
        assert_eq!(cache.get(&0), Some(()));
    }

    #[tokio::test]
    async fn test_get_or_try_insert_with() {
        let cache = TtlCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value: Result<u32, String> = cache
                .get_or_try_insert_with("k", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                })
                .await;
            assert_eq!(value, Ok(7));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(60));

        let failed: Result<u32, String> = cache
            .get_or_try_insert_with("k", || async { Err("down".to_string()) })
            .await;
        assert_eq!(failed, Err("down".to_string()));
        assert!(cache.is_empty());

        let ok: Result<u32, String> = cache.get_or_try_insert_with("k", || async { Ok(3) }).await;
        assert_eq!(ok, Ok(3));
    }
}
