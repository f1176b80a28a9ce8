//! Cache module
//!
//! Provides caching infrastructure with pluggable backends:
//! - In-memory (default) - uses moka
//! - Redis (optional) - uses deadpool-redis

mod backend;
mod entity;
mod error;
mod key;
mod memory;
mod redis;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use backend::CacheBackend;
pub use entity::EntityCache;
pub use error::CacheError;
pub use key::{CacheEntity, CacheKeys, TtlTable};

use memory::InMemoryCache;

use crate::core::config::{CacheBackendType, CacheConfig};

/// Cache service providing typed access to cache backend
///
/// Wraps the underlying cache backend and provides:
/// - Raw bytes API for flexibility
/// - Typed API using JSON serialization (values stay inspectable on
///   shared Redis deployments)
pub struct CacheService {
    backend: Arc<dyn CacheBackend>,
}

impl std::fmt::Debug for CacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheService")
            .field("backend", &self.backend.backend_name())
            .finish()
    }
}

impl CacheService {
    /// Create a new cache service from configuration
    pub async fn new(config: &CacheConfig) -> Result<Self, CacheError> {
        let backend: Arc<dyn CacheBackend> = match config.backend {
            CacheBackendType::Memory => {
                tracing::debug!(
                    max_entries = config.max_entries,
                    eviction_policy = ?config.eviction_policy,
                    "Initializing in-memory cache"
                );
                Arc::new(InMemoryCache::new(config))
            }
            CacheBackendType::Redis => {
                let url = config.redis_url.as_ref().ok_or_else(|| {
                    CacheError::Config("redis_url required for Redis backend".into())
                })?;
                // Note: RedisCache::new logs sanitized URL internally
                Arc::new(redis::RedisCache::new(url).await?)
            }
        };

        Ok(Self { backend })
    }

    /// Get the backend name
    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    // =========================================================================
    // Raw bytes API
    // =========================================================================

    /// Get raw bytes from cache
    pub async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.backend.get(key).await
    }

    /// Set raw bytes in cache
    pub async fn set_raw(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        self.backend.set(key, value, ttl).await
    }

    // =========================================================================
    // Typed API (serde)
    // =========================================================================

    /// Get a typed value from cache
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.get_raw(key).await? {
            Some(bytes) => {
                let value = serde_json::from_slice(&bytes)
                    .map_err(|e| CacheError::Serialization(e.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Set a typed value in cache
    pub async fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let bytes =
            serde_json::to_vec(value).map_err(|e| CacheError::Serialization(e.to_string()))?;
        self.set_raw(key, bytes, ttl).await
    }

    // =========================================================================
    // Other operations
    // =========================================================================

    /// Delete a key from cache
    pub async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        self.backend.delete(key).await
    }

    /// Delete a key from cache with automatic error logging.
    ///
    /// This is a convenience method for cache invalidation where errors
    /// should be logged but not propagated (cache misses are acceptable).
    pub async fn invalidate_key(&self, key: &str) {
        if let Err(e) = self.backend.delete(key).await {
            tracing::warn!(key = %key, error = %e, "Cache invalidation failed");
        }
    }
}
