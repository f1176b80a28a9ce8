//! In-memory cache implementation using moka
//!
//! Uses moka for the main cache with TinyLFU eviction and per-entry TTLs.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;

use super::backend::CacheBackend;
use super::error::CacheError;
use crate::core::config::{CacheConfig, EvictionPolicy};

/// Cache entry with data and metadata
#[derive(Clone)]
struct CacheEntry {
    data: Vec<u8>,
    ttl: Option<Duration>,
}

/// Per-entry expiry tracking for variable TTLs
struct VariableTtlExpiry;

impl Expiry<String, CacheEntry> for VariableTtlExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_read(
        &self,
        _key: &String,
        _value: &CacheEntry,
        _read_at: Instant,
        duration_until_expiry: Option<Duration>,
        _last_modified_at: Instant,
    ) -> Option<Duration> {
        duration_until_expiry
    }
}

/// In-memory cache implementation
pub struct InMemoryCache {
    cache: Cache<String, CacheEntry>,
}

impl InMemoryCache {
    /// Create a new in-memory cache with the given configuration
    ///
    /// Note: moka uses TinyLFU eviction regardless of the eviction_policy setting.
    /// The LRU option exists for API compatibility but has the same behavior as TinyLFU.
    pub fn new(config: &CacheConfig) -> Self {
        let builder = Cache::builder()
            .max_capacity(config.max_entries)
            // Set initial capacity to reduce rehashing during warmup
            .initial_capacity((config.max_entries as usize / 4).min(10_000));

        // Note: moka always uses TinyLFU internally. The eviction_policy config
        // is kept for API compatibility but doesn't change behavior.
        if config.eviction_policy == EvictionPolicy::Lru {
            tracing::debug!(
                "LRU eviction policy selected but moka uses TinyLFU internally. \
                 TinyLFU provides similar recency-based eviction with better hit rates."
            );
        }

        let cache = builder.expire_after(VariableTtlExpiry).build();

        Self { cache }
    }

    /// Run pending eviction tasks (test-only, expired entries are lazily evicted)
    #[cfg(test)]
    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }
}

#[async_trait]
impl CacheBackend for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.cache.get(key).await.map(|entry| entry.data.clone()))
    }

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let entry = CacheEntry { data: value, ttl };
        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let existed = self.cache.contains_key(key);
        self.cache.invalidate(key).await;
        Ok(existed)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
