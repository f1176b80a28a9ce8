//! List-bucket entity cache
//!
//! Every cached value is a JSON list of entities, even when the bucket
//! logically holds one entity. Readers filter the list client-side and
//! writers overwrite the whole bucket, so composite buckets (order lines,
//! latest-feedback views) and single-entity buckets share one code path.
//!
//! Cache failures never surface to callers: reads degrade to a miss and
//! writes are dropped, with a warning either way. The database stays the
//! source of truth.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::key::{CacheEntity, CacheKeys, TtlTable};
use super::{CacheError, CacheService};

/// Typed list-bucket access over the cache service
#[derive(Clone)]
pub struct EntityCache {
    cache: Arc<CacheService>,
    keys: CacheKeys,
    ttl: TtlTable,
}

impl std::fmt::Debug for EntityCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityCache")
            .field("backend", &self.cache.backend_name())
            .field("keys", &self.keys)
            .finish()
    }
}

impl EntityCache {
    pub fn new(cache: Arc<CacheService>, keys: CacheKeys, ttl: TtlTable) -> Self {
        Self { cache, keys, ttl }
    }

    /// Key builder bound to the configured alias
    pub fn keys(&self) -> &CacheKeys {
        &self.keys
    }

    /// Read the whole list bucket
    ///
    /// A backend failure is logged and reported as a miss.
    pub async fn get_list<T>(&self, key: &str) -> Option<Vec<T>>
    where
        T: CacheEntity + DeserializeOwned,
    {
        match self.cache.get::<Vec<T>>(key).await {
            Ok(list) => list,
            Err(e) => {
                warn_degraded(key, "read", &e);
                None
            }
        }
    }

    /// Find the first entry in the list bucket matching the predicate
    pub async fn find<T, F>(&self, key: &str, matches: F) -> Option<T>
    where
        T: CacheEntity + DeserializeOwned,
        F: Fn(&T) -> bool,
    {
        self.get_list::<T>(key)
            .await
            .and_then(|list| list.into_iter().find(|item| matches(item)))
    }

    /// Overwrite the list bucket with the type's TTL
    pub async fn put_list<T>(&self, key: &str, items: &[T])
    where
        T: CacheEntity + Serialize,
    {
        let ttl = self.ttl.ttl_for(T::TYPE_NAME);
        if let Err(e) = self.cache.set(key, &items, Some(ttl)).await {
            warn_degraded(key, "write", &e);
        }
    }

    /// Drop a bucket
    ///
    /// A failed delete is logged and ignored; the entry then ages out
    /// through its TTL instead.
    pub async fn remove(&self, key: &str) {
        self.cache.invalidate_key(key).await;
    }
}

fn warn_degraded(key: &str, op: &str, error: &CacheError) {
    tracing::warn!(key = %key, op = %op, error = %error, "Cache unavailable, continuing without it");
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde::Deserialize;

    use super::*;
    use crate::core::config::{CacheBackendType, CacheConfig, EvictionPolicy};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: i64,
        label: String,
    }

    impl CacheEntity for Item {
        const TYPE_NAME: &'static str = "Item";
    }

    fn item(id: i64, label: &str) -> Item {
        Item {
            id,
            label: label.to_string(),
        }
    }

    async fn entity_cache() -> EntityCache {
        let config = CacheConfig {
            backend: CacheBackendType::Memory,
            max_entries: 1000,
            eviction_policy: EvictionPolicy::TinyLfu,
            redis_url: None,
        };
        let cache = Arc::new(CacheService::new(&config).await.unwrap());
        let expiry = HashMap::from([("default".to_string(), 300)]);
        let ttl = TtlTable::new(&expiry).unwrap();
        EntityCache::new(cache, CacheKeys::new("test"), ttl)
    }

    #[tokio::test]
    async fn test_get_list_miss() {
        let cache = entity_cache().await;
        let list: Option<Vec<Item>> = cache.get_list("missing").await;
        assert!(list.is_none());
    }

    #[tokio::test]
    async fn test_put_list_creates_bucket() {
        let cache = entity_cache().await;

        cache.put_list("bucket", &[item(1, "first")]).await;

        let list: Vec<Item> = cache.get_list("bucket").await.unwrap();
        assert_eq!(list, vec![item(1, "first")]);
    }

    #[tokio::test]
    async fn test_find_filters_client_side() {
        let cache = entity_cache().await;

        cache
            .put_list("bucket", &[item(1, "one"), item(2, "two"), item(3, "three")])
            .await;

        let found = cache.find::<Item, _>("bucket", |i| i.id == 2).await;
        assert_eq!(found, Some(item(2, "two")));

        let missing = cache.find::<Item, _>("bucket", |i| i.id == 99).await;
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_put_list_overwrites() {
        let cache = entity_cache().await;

        cache.put_list("bucket", &[item(1, "old")]).await;
        cache.put_list("bucket", &[item(2, "new")]).await;

        let list: Vec<Item> = cache.get_list("bucket").await.unwrap();
        assert_eq!(list, vec![item(2, "new")]);
    }

    #[tokio::test]
    async fn test_remove() {
        let cache = entity_cache().await;

        cache.put_list("bucket", &[item(1, "one")]).await;
        cache.remove("bucket").await;

        let list: Option<Vec<Item>> = cache.get_list("bucket").await;
        assert!(list.is_none());
    }

    #[tokio::test]
    async fn test_keys_accessor_uses_alias() {
        let cache = entity_cache().await;
        assert_eq!(cache.keys().entity::<Item>(7), "test_7_Item");
    }
}
