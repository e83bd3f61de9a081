//! In-memory cache for API responses.
//!
//! One cache per request kind, keyed by the request inputs. Entries never
//! expire on their own; writers invalidate the keys their action made stale.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;

use tokio::sync::RwLock;

use crate::error::Result;

#[derive(Debug)]
pub struct Cache<K, V> {
    entries: RwLock<HashMap<K, V>>,
}

impl<K, V> Default for Cache<K, V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn insert(&self, key: K, value: V) {
        self.entries.write().await.insert(key, value);
    }

    /// Drops one entry so the next read refetches it.
    pub async fn invalidate(&self, key: &K) {
        self.entries.write().await.remove(key);
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Returns the cached value or runs `fetch` and caches its result.
    /// Errors are returned without being cached.
    pub async fn get_or_fetch<F, Fut>(&self, key: &K, fetch: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        if let Some(value) = self.get(key).await {
            return Ok(value);
        }
        let value = fetch().await?;
        self.insert(key.clone(), value.clone()).await;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_get_or_fetch_caches() {
        let cache: Cache<String, u64> = Cache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_fetch(&"key".to_string(), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                })
                .await
                .expect("Failed to fetch");
            assert_eq!(value, 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let cache: Cache<String, u64> = Cache::new();
        let calls = AtomicUsize::new(0);
        let fetch = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(7)
        };

        cache
            .get_or_fetch(&"key".to_string(), fetch)
            .await
            .expect("Failed to fetch");
        cache.invalidate(&"key".to_string()).await;
        cache
            .get_or_fetch(&"key".to_string(), fetch)
            .await
            .expect("Failed to fetch");

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_errors_not_cached() {
        let cache: Cache<String, u64> = Cache::new();
        let calls = AtomicUsize::new(0);

        let result = cache
            .get_or_fetch(&"key".to_string(), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Error::Validation("boom".to_string()))
            })
            .await;
        assert!(result.is_err());

        let value = cache
            .get_or_fetch(&"key".to_string(), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(9)
            })
            .await
            .expect("Failed to fetch");
        assert_eq!(value, 9);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache: Cache<u64, u64> = Cache::new();
        cache.insert(1, 10).await;
        cache.insert(2, 20).await;
        cache.clear().await;
        assert_eq!(cache.get(&1).await, None);
        assert_eq!(cache.get(&2).await, None);
    }
}
