//! Cache key layout and per-type TTL policy
//!
//! Every key follows the `{alias}_{discriminator}_{type_name}` layout, where
//! the alias namespaces this deployment on shared backends, the discriminator
//! identifies the entry (an id, a composite id, a view name, or a digest) and
//! the type name tags which entity kind the entry holds.

use std::collections::HashMap;
use std::time::Duration;

use super::error::CacheError;
use crate::core::constants::TTL_DEFAULT_ENTRY;
use crate::utils::crypto::sha256_hex;

/// Marker trait for types that can be cached under a typed key
///
/// `TYPE_NAME` is the stable name used both in cache keys and for TTL
/// lookups, so renaming a Rust struct does not silently shed cached data.
pub trait CacheEntity {
    const TYPE_NAME: &'static str;
}

/// Cache key builder, bound to the configured alias
#[derive(Debug, Clone)]
pub struct CacheKeys {
    alias: String,
}

impl CacheKeys {
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
        }
    }

    fn compose(&self, discriminator: &str, type_name: &str) -> String {
        format!("{}_{}_{}", self.alias, discriminator, type_name)
    }

    /// Key for a single entity by numeric id
    pub fn entity<T: CacheEntity>(&self, id: i64) -> String {
        self.compose(&id.to_string(), T::TYPE_NAME)
    }

    /// Key for an order line, identified by the order and product pair
    pub fn order_line<T: CacheEntity>(&self, order_id: i64, product_id: i64) -> String {
        self.compose(&format!("{order_id}_{product_id}"), T::TYPE_NAME)
    }

    /// Key for the latest-feedback view, optionally filtered by rating
    ///
    /// The unfiltered view uses rating 0, which is outside the valid range
    /// and therefore never collides with a filtered view.
    pub fn latest_feedback<T: CacheEntity>(&self, rating: Option<i32>) -> String {
        let rating = rating.unwrap_or(0);
        self.compose(&format!("GetLatest_Rating_{rating}"), T::TYPE_NAME)
    }

    /// Key for a verified credential pair, addressed by digest
    ///
    /// The plaintext pair never becomes part of the key; only the SHA-256
    /// digest of `{username}_{password}` does.
    pub fn credentials<T: CacheEntity>(&self, username: &str, password: &str) -> String {
        let digest = sha256_hex(&format!("{username}_{password}"));
        self.compose(&digest, T::TYPE_NAME)
    }
}

/// Per-type-name TTL table
///
/// Lookups are case-insensitive on the type name. Types without an explicit
/// entry fall back to the mandatory `default` entry.
#[derive(Debug, Clone)]
pub struct TtlTable {
    entries: HashMap<String, u64>,
    default: Duration,
}

impl TtlTable {
    /// Build a TTL table from the configured expiry map (seconds per type name)
    pub fn new(expiry: &HashMap<String, u64>) -> Result<Self, CacheError> {
        let entries: HashMap<String, u64> = expiry
            .iter()
            .map(|(name, secs)| (name.to_lowercase(), *secs))
            .collect();

        let default = entries
            .get(TTL_DEFAULT_ENTRY)
            .map(|secs| Duration::from_secs(*secs))
            .ok_or_else(|| {
                CacheError::Config(format!(
                    "expiry table requires a '{}' entry",
                    TTL_DEFAULT_ENTRY
                ))
            })?;

        Ok(Self { entries, default })
    }

    /// TTL for the given type name, falling back to the default entry
    pub fn ttl_for(&self, type_name: &str) -> Duration {
        self.entries
            .get(&type_name.to_lowercase())
            .map(|secs| Duration::from_secs(*secs))
            .unwrap_or(self.default)
    }
}
