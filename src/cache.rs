// src/cache.rs
//! Keyed TTL cache for query results, with explicit invalidation after mutations

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::trace;

pub const LOOKUP_TTL: Duration = Duration::from_secs(60 * 60);
pub const PROFILE_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct CacheEntry {
    value: serde_json::Value,
    expires_at: Instant,
}

#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh cached value for `key`, if any and if it still decodes as `T`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if entry.expires_at <= Instant::now() {
            trace!("Cache entry {} expired", key);
            return None;
        }
        serde_json::from_value(entry.value.clone()).ok()
    }

    pub async fn put<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                trace!("Not caching {}: {}", key, e);
                return;
            }
        };
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: now + ttl,
            },
        );
    }

    pub async fn invalidate(&self, key: &str) {
        if self.entries.write().await.remove(key).is_some() {
            trace!("Invalidated cache entry {}", key);
        }
    }

    pub async fn invalidate_prefix(&self, prefix: &str) {
        let mut entries = self.entries.write().await;
        entries.retain(|key, _| !key.starts_with(prefix));
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.get::<serde_json::Value>(key).await.is_some()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire() {
        let cache = QueryCache::new();
        cache
            .put("lookup:skills", &vec!["rust".to_string()], Duration::from_secs(10))
            .await;
        assert_eq!(
            cache.get::<Vec<String>>("lookup:skills").await,
            Some(vec!["rust".to_string()])
        );

        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(cache.get::<Vec<String>>("lookup:skills").await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entries_are_dropped_on_write() {
        let cache = QueryCache::new();
        for country in ["Germany", "France", "Spain"] {
            cache
                .put(&format!("lookup:cities:{}", country), &country, Duration::from_secs(5))
                .await;
        }
        cache.put("lookup:skills", &1, LOOKUP_TTL).await;
        assert_eq!(cache.len().await, 4);

        tokio::time::advance(Duration::from_secs(6)).await;
        cache.put("lookup:cities:Italy", &"Italy", LOOKUP_TTL).await;
        assert_eq!(cache.len().await, 2);
        assert!(cache.contains("lookup:skills").await);
        assert!(!cache.contains("lookup:cities:Germany").await);
    }

    #[tokio::test]
    async fn test_invalidate_prefix() {
        let cache = QueryCache::new();
        cache.put("recruiter:1", &1, PROFILE_TTL).await;
        cache.put("recruiter:2", &2, PROFILE_TTL).await;
        cache.put("company:1", &3, PROFILE_TTL).await;

        cache.invalidate_prefix("recruiter:").await;
        assert!(!cache.contains("recruiter:1").await);
        assert!(cache.contains("company:1").await);

        cache.invalidate("company:1").await;
        assert_eq!(cache.len().await, 0);
    }
}
