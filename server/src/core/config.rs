//! Layered application configuration
//!
//! Configuration is merged from (lowest to highest): built-in defaults,
//! the profile config file (~/.rately/rately.json), a local or CLI-specified
//! config file, and CLI arguments (which carry env var fallbacks via clap).

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::cli::CliConfig;
use super::constants::{
    CONFIG_FILE_NAME, DEFAULT_CACHE_ALIAS, DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CACHE_TTL_SECS,
    DEFAULT_HOST, DEFAULT_PORT, ENV_POSTGRES_URL, POSTGRES_DEFAULT_ACQUIRE_TIMEOUT_SECS,
    POSTGRES_DEFAULT_IDLE_TIMEOUT_SECS, POSTGRES_DEFAULT_MAX_CONNECTIONS,
    POSTGRES_DEFAULT_MAX_LIFETIME_SECS, POSTGRES_DEFAULT_MIN_CONNECTIONS,
    POSTGRES_DEFAULT_STATEMENT_TIMEOUT_SECS, TTL_DEFAULT_ENTRY,
};
use crate::utils::file::expand_path;

// =============================================================================
// Database Backend Enum (SQLite or PostgreSQL)
// =============================================================================

/// Relational database backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Sqlite,
    Postgres,
}

impl fmt::Display for DatabaseBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseBackend::Sqlite => write!(f, "sqlite"),
            DatabaseBackend::Postgres => write!(f, "postgres"),
        }
    }
}

// =============================================================================
// Cache Backend Enum
// =============================================================================

/// Cache backend type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendType {
    #[default]
    Memory,
    Redis,
}

impl fmt::Display for CacheBackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheBackendType::Memory => write!(f, "memory"),
            CacheBackendType::Redis => write!(f, "redis"),
        }
    }
}

// =============================================================================
// Eviction Policy Enum
// =============================================================================

/// Cache eviction policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    /// TinyLFU - LRU eviction + LFU admission (near-optimal hit ratio)
    #[default]
    TinyLfu,
    /// Simple LRU (better for recency-biased workloads)
    Lru,
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvictionPolicy::TinyLfu => write!(f, "tinylfu"),
            EvictionPolicy::Lru => write!(f, "lru"),
        }
    }
}

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Authentication configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AuthFileConfig {
    pub enabled: Option<bool>,
}

/// Redis cache configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RedisFileConfig {
    /// Connection URL for Redis-compatible backends
    pub url: Option<String>,
}

/// Memory cache configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct MemoryCacheFileConfig {
    /// Maximum number of cache entries
    pub max_entries: Option<u64>,
    /// Cache eviction policy
    pub eviction_policy: Option<EvictionPolicy>,
}

/// Cache configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CacheFileConfig {
    /// Key namespace prepended to every cache key
    pub alias: Option<String>,
    /// Cache backend: memory (default) or redis
    pub backend: Option<CacheBackendType>,
    /// Per-type-name TTL table in seconds. Must contain a `default` entry.
    pub expiry: Option<HashMap<String, u64>>,
    /// Memory cache configuration
    pub memory: Option<MemoryCacheFileConfig>,
    /// Redis cache configuration
    pub redis: Option<RedisFileConfig>,
}

/// PostgreSQL configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PostgresFileConfig {
    /// PostgreSQL connection URL (or use RATELY_POSTGRES_URL env var)
    pub url: Option<String>,
    /// Maximum number of connections in the pool (default: 20)
    pub max_connections: Option<u32>,
    /// Minimum number of connections to keep warm (default: 2)
    pub min_connections: Option<u32>,
    /// Connection acquire timeout in seconds (default: 30)
    pub acquire_timeout_secs: Option<u64>,
    /// Idle connection timeout in seconds (default: 600)
    pub idle_timeout_secs: Option<u64>,
    /// Max connection lifetime in seconds (default: 1800)
    pub max_lifetime_secs: Option<u64>,
    /// Statement timeout in seconds, 0 to disable (default: 60)
    pub statement_timeout_secs: Option<u64>,
}

/// Database configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DatabaseFileConfig {
    /// Backend: sqlite (default) or postgres
    pub backend: Option<DatabaseBackend>,
    /// PostgreSQL-specific configuration
    pub postgres: Option<PostgresFileConfig>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub auth: Option<AuthFileConfig>,
    pub cache: Option<CacheFileConfig>,
    pub database: Option<DatabaseFileConfig>,
    pub debug: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        // Server
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                tracing::trace!(host = ?server.host, "Merging server.host");
                current.host = server.host;
            }
            if server.port.is_some() {
                tracing::trace!(port = ?server.port, "Merging server.port");
                current.port = server.port;
            }
        }

        // Auth
        if let Some(auth) = other.auth {
            let current = self.auth.get_or_insert_with(AuthFileConfig::default);
            if auth.enabled.is_some() {
                tracing::trace!(enabled = ?auth.enabled, "Merging auth.enabled");
                current.enabled = auth.enabled;
            }
        }

        // Cache (with nested memory and redis)
        if let Some(cache) = other.cache {
            let current = self.cache.get_or_insert_with(CacheFileConfig::default);
            if cache.alias.is_some() {
                tracing::trace!(alias = ?cache.alias, "Merging cache.alias");
                current.alias = cache.alias;
            }
            if cache.backend.is_some() {
                tracing::trace!(backend = ?cache.backend, "Merging cache.backend");
                current.backend = cache.backend;
            }
            // Expiry tables replace wholesale rather than merging per entry,
            // so an overlay fully controls which type names are listed.
            if cache.expiry.is_some() {
                tracing::trace!(expiry = ?cache.expiry, "Merging cache.expiry");
                current.expiry = cache.expiry;
            }
            if let Some(memory) = cache.memory {
                let current_memory = current
                    .memory
                    .get_or_insert_with(MemoryCacheFileConfig::default);
                if memory.max_entries.is_some() {
                    tracing::trace!(max_entries = ?memory.max_entries, "Merging cache.memory.max_entries");
                    current_memory.max_entries = memory.max_entries;
                }
                if memory.eviction_policy.is_some() {
                    tracing::trace!(policy = ?memory.eviction_policy, "Merging cache.memory.eviction_policy");
                    current_memory.eviction_policy = memory.eviction_policy;
                }
            }
            if let Some(redis) = cache.redis {
                let current_redis = current.redis.get_or_insert_with(RedisFileConfig::default);
                if redis.url.is_some() {
                    tracing::trace!("Merging cache.redis.url");
                    current_redis.url = redis.url;
                }
            }
        }

        // Database (with nested postgres)
        if let Some(database) = other.database {
            let current = self.database.get_or_insert_with(DatabaseFileConfig::default);
            if database.backend.is_some() {
                tracing::trace!(backend = ?database.backend, "Merging database.backend");
                current.backend = database.backend;
            }
            if let Some(pg) = database.postgres {
                let current_pg = current
                    .postgres
                    .get_or_insert_with(PostgresFileConfig::default);
                if pg.url.is_some() {
                    tracing::trace!("Merging database.postgres.url");
                    current_pg.url = pg.url;
                }
                if pg.max_connections.is_some() {
                    current_pg.max_connections = pg.max_connections;
                }
                if pg.min_connections.is_some() {
                    current_pg.min_connections = pg.min_connections;
                }
                if pg.acquire_timeout_secs.is_some() {
                    current_pg.acquire_timeout_secs = pg.acquire_timeout_secs;
                }
                if pg.idle_timeout_secs.is_some() {
                    current_pg.idle_timeout_secs = pg.idle_timeout_secs;
                }
                if pg.max_lifetime_secs.is_some() {
                    current_pg.max_lifetime_secs = pg.max_lifetime_secs;
                }
                if pg.statement_timeout_secs.is_some() {
                    current_pg.statement_timeout_secs = pg.statement_timeout_secs;
                }
            }
        }

        // Debug
        if other.debug.is_some() {
            tracing::trace!(debug = ?other.debug, "Merging debug");
            self.debug = other.debug;
        }
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub enabled: bool,
}

/// Redis cache configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Connection URL for Redis-compatible backends
    pub url: String,
}

/// Memory cache configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct MemoryCacheConfig {
    /// Maximum number of cache entries
    pub max_entries: u64,
    /// Cache eviction policy
    pub eviction_policy: EvictionPolicy,
}

/// Cache backend configuration (used internally by CacheService)
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Cache backend type
    pub backend: CacheBackendType,
    /// Maximum entries (memory backend)
    pub max_entries: u64,
    /// Eviction policy (memory backend)
    pub eviction_policy: EvictionPolicy,
    /// Redis URL (redis backend)
    pub redis_url: Option<String>,
}

/// Cache configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// Key namespace prepended to every cache key
    pub alias: String,
    /// Cache backend type
    pub backend: CacheBackendType,
    /// Per-type-name TTL table in seconds, always contains a `default` entry
    pub expiry: HashMap<String, u64>,
    /// Memory cache configuration
    pub memory: MemoryCacheConfig,
    /// Redis cache configuration (only used if backend = redis)
    pub redis: Option<RedisConfig>,
}

impl CacheSettings {
    /// Build a CacheConfig for use by CacheService
    pub fn backend_config(&self) -> CacheConfig {
        CacheConfig {
            backend: self.backend,
            max_entries: self.memory.max_entries,
            eviction_policy: self.memory.eviction_policy,
            redis_url: self.redis.as_ref().map(|r| r.url.clone()),
        }
    }
}

/// PostgreSQL configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// PostgreSQL connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to keep warm
    pub min_connections: u32,
    /// Connection acquire timeout in seconds
    pub acquire_timeout_secs: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_secs: u64,
    /// Max connection lifetime in seconds
    pub max_lifetime_secs: u64,
    /// Statement timeout in seconds (0 = disabled)
    pub statement_timeout_secs: u64,
}

/// Database configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Backend: sqlite (default) or postgres
    pub backend: DatabaseBackend,
    /// PostgreSQL-specific configuration (only used if backend = postgres)
    pub postgres: Option<PostgresConfig>,
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub cache: CacheSettings,
    pub database: DatabaseConfig,
    pub debug: bool,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.rately/rately.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        // 1. Load from profile dir (~/.rately/rately.json) - skip if not exists
        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        // 2. Load from CLI-specified path OR local directory
        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        // 3. Extract file config values with defaults
        let file_server = file_config.server.unwrap_or_default();
        let file_auth = file_config.auth.unwrap_or_default();
        let file_cache = file_config.cache.unwrap_or_default();
        let file_database = file_config.database.unwrap_or_default();

        // 4. Layer configs: defaults -> file config -> CLI/env overrides
        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);

        // auth.enabled: file config sets default, --no-auth CLI flag disables
        let auth_enabled = if cli.no_auth {
            false
        } else {
            file_auth.enabled.unwrap_or(true)
        };

        // debug: CLI/env flag takes precedence, then file config, default false
        let debug = cli.debug || file_config.debug.unwrap_or(false);

        // cache config: CLI/env overrides file config
        let cache_alias = cli
            .cache_alias
            .clone()
            .or(file_cache.alias)
            .unwrap_or_else(|| DEFAULT_CACHE_ALIAS.to_string());

        let cache_backend = cli.cache_backend.or(file_cache.backend).unwrap_or_default();

        // Expiry table: the file table must carry a `default` entry (checked
        // in validate); without a configured table, a default-only one applies.
        let cache_expiry = file_cache.expiry.unwrap_or_else(|| {
            HashMap::from([(TTL_DEFAULT_ENTRY.to_string(), DEFAULT_CACHE_TTL_SECS)])
        });

        let file_memory = file_cache.memory.unwrap_or_default();
        let memory_cache = MemoryCacheConfig {
            max_entries: cli
                .cache_max_entries
                .or(file_memory.max_entries)
                .unwrap_or(DEFAULT_CACHE_MAX_ENTRIES),
            eviction_policy: cli
                .cache_eviction_policy
                .or(file_memory.eviction_policy)
                .unwrap_or_default(),
        };

        // Redis config (only populated if using redis backend)
        let redis_config = if cache_backend == CacheBackendType::Redis {
            let file_redis = file_cache.redis.unwrap_or_default();
            let url = cli
                .cache_redis_url
                .clone()
                .or(file_redis.url)
                .unwrap_or_default();
            Some(RedisConfig { url })
        } else {
            None
        };

        let cache = CacheSettings {
            alias: cache_alias,
            backend: cache_backend,
            expiry: cache_expiry,
            memory: memory_cache,
            redis: redis_config,
        };

        // database config: file config with CLI/env overrides
        let database_backend = cli
            .database_backend
            .or(file_database.backend)
            .unwrap_or_default();

        // PostgreSQL config (only populated if using postgres backend)
        let postgres_config = if database_backend == DatabaseBackend::Postgres {
            let file_pg = file_database.postgres.unwrap_or_default();
            let url = cli
                .postgres_url
                .clone()
                .or_else(|| std::env::var(ENV_POSTGRES_URL).ok())
                .or(file_pg.url)
                .unwrap_or_default();
            Some(PostgresConfig {
                url,
                max_connections: file_pg
                    .max_connections
                    .unwrap_or(POSTGRES_DEFAULT_MAX_CONNECTIONS),
                min_connections: file_pg
                    .min_connections
                    .unwrap_or(POSTGRES_DEFAULT_MIN_CONNECTIONS),
                acquire_timeout_secs: file_pg
                    .acquire_timeout_secs
                    .unwrap_or(POSTGRES_DEFAULT_ACQUIRE_TIMEOUT_SECS),
                idle_timeout_secs: file_pg
                    .idle_timeout_secs
                    .unwrap_or(POSTGRES_DEFAULT_IDLE_TIMEOUT_SECS),
                max_lifetime_secs: file_pg
                    .max_lifetime_secs
                    .unwrap_or(POSTGRES_DEFAULT_MAX_LIFETIME_SECS),
                statement_timeout_secs: file_pg
                    .statement_timeout_secs
                    .unwrap_or(POSTGRES_DEFAULT_STATEMENT_TIMEOUT_SECS),
            })
        } else {
            None
        };

        let database = DatabaseConfig {
            backend: database_backend,
            postgres: postgres_config,
        };

        let config = Self {
            server: ServerConfig { host, port },
            auth: AuthConfig {
                enabled: auth_enabled,
            },
            cache,
            database,
            debug,
        };

        // Validate configuration
        config.validate()?;

        tracing::debug!(
            host = %config.server.host,
            port = config.server.port,
            auth_enabled = config.auth.enabled,
            debug = config.debug,
            cache_backend = %config.cache.backend,
            cache_alias = %config.cache.alias,
            cache_max_entries = config.cache.memory.max_entries,
            database_backend = %config.database.backend,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        // Host must not be empty
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }

        // Port must be non-zero (port 0 would cause bind failure)
        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }

        // The expiry table must carry a `default` entry to fall back on
        let default_ttl = self
            .cache
            .expiry
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(TTL_DEFAULT_ENTRY))
            .map(|(_, secs)| *secs);
        match default_ttl {
            None => anyhow::bail!(
                "Configuration error: cache.expiry must contain a '{}' entry",
                TTL_DEFAULT_ENTRY
            ),
            Some(0) => {
                tracing::warn!(
                    "cache.expiry.default is 0, cached entries expire immediately"
                );
            }
            Some(_) => {}
        }

        // Redis URL required when using Redis cache backend
        if self.cache.backend == CacheBackendType::Redis
            && self.cache.redis.as_ref().is_none_or(|r| r.url.is_empty())
        {
            anyhow::bail!(
                "Configuration error: cache.redis.url is required when cache.backend is 'redis'"
            );
        }

        // Security warning: auth disabled while binding to all interfaces
        if !self.auth.enabled && is_all_interfaces(&self.server.host) {
            tracing::warn!(
                host = %self.server.host,
                "Authentication is disabled while binding to all network interfaces. \
                 This exposes an unauthenticated server to your network."
            );
        }

        // PostgreSQL URL required when using Postgres backend
        if self.database.backend == DatabaseBackend::Postgres {
            if let Some(ref pg) = self.database.postgres {
                if pg.url.is_empty() {
                    anyhow::bail!(
                        "Configuration error: database.postgres.url is required when database.backend is 'postgres'. \
                         Set via {} env var or database.postgres.url in config file.",
                        ENV_POSTGRES_URL
                    );
                }
            } else {
                anyhow::bail!(
                    "Configuration error: PostgreSQL configuration missing when database.backend is 'postgres'"
                );
            }
        }

        Ok(())
    }
}

/// Get the profile config path (~/.rately/rately.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(super::constants::APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Check if host binds to all network interfaces
pub(crate) fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            server: ServerConfig {
                host: DEFAULT_HOST.to_string(),
                port: DEFAULT_PORT,
            },
            auth: AuthConfig { enabled: true },
            cache: CacheSettings {
                alias: DEFAULT_CACHE_ALIAS.to_string(),
                backend: CacheBackendType::Memory,
                expiry: HashMap::from([("default".to_string(), 300)]),
                memory: MemoryCacheConfig {
                    max_entries: DEFAULT_CACHE_MAX_ENTRIES,
                    eviction_policy: EvictionPolicy::TinyLfu,
                },
                redis: None,
            },
            database: DatabaseConfig {
                backend: DatabaseBackend::Sqlite,
                postgres: None,
            },
            debug: false,
        }
    }

    #[test]
    fn test_backend_enum_serde() {
        let backend: DatabaseBackend = serde_json::from_str(r#""postgres""#).unwrap();
        assert_eq!(backend, DatabaseBackend::Postgres);

        let backend: CacheBackendType = serde_json::from_str(r#""redis""#).unwrap();
        assert_eq!(backend, CacheBackendType::Redis);

        let policy: EvictionPolicy = serde_json::from_str(r#""lru""#).unwrap();
        assert_eq!(policy, EvictionPolicy::Lru);
    }

    #[test]
    fn test_backend_enum_display() {
        assert_eq!(DatabaseBackend::Sqlite.to_string(), "sqlite");
        assert_eq!(DatabaseBackend::Postgres.to_string(), "postgres");
        assert_eq!(CacheBackendType::Memory.to_string(), "memory");
        assert_eq!(CacheBackendType::Redis.to_string(), "redis");
    }

    #[test]
    fn test_file_config_parse_full() {
        let json = r#"{
            "server": { "host": "0.0.0.0", "port": 8080 },
            "auth": { "enabled": false },
            "cache": {
                "alias": "groceries",
                "backend": "memory",
                "expiry": { "default": 120, "Order": 600 }
            }
        }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();

        assert_eq!(
            config.server.as_ref().unwrap().host,
            Some("0.0.0.0".to_string())
        );
        assert_eq!(config.server.as_ref().unwrap().port, Some(8080));
        assert_eq!(config.auth.as_ref().unwrap().enabled, Some(false));

        let cache = config.cache.as_ref().unwrap();
        assert_eq!(cache.alias, Some("groceries".to_string()));
        let expiry = cache.expiry.as_ref().unwrap();
        assert_eq!(expiry.get("default"), Some(&120));
        assert_eq!(expiry.get("Order"), Some(&600));
    }

    #[test]
    fn test_file_config_parse_partial() {
        let json = r#"{ "server": { "port": 9000 } }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();

        assert!(config.server.as_ref().unwrap().host.is_none());
        assert_eq!(config.server.as_ref().unwrap().port, Some(9000));
        assert!(config.auth.is_none());
        assert!(config.cache.is_none());
    }

    #[test]
    fn test_file_config_parse_empty() {
        let config: FileConfig = serde_json::from_str("{}").unwrap();

        assert!(config.server.is_none());
        assert!(config.database.is_none());
    }

    #[test]
    fn test_file_config_parse_extra_fields() {
        let json = r#"{ "server": { "host": "localhost" }, "unknown_field": 123 }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();

        assert_eq!(
            config.server.as_ref().unwrap().host,
            Some("localhost".to_string())
        );
        assert_eq!(config.extra.get("unknown_field").unwrap(), 123);
    }

    #[test]
    fn test_file_config_merge_overlay_wins() {
        let mut base: FileConfig = serde_json::from_str(
            r#"{
                "server": { "host": "base.host", "port": 1000 },
                "cache": { "alias": "base", "expiry": { "default": 60 } },
                "debug": false
            }"#,
        )
        .unwrap();

        let overlay: FileConfig = serde_json::from_str(
            r#"{
                "server": { "port": 2000 },
                "cache": { "expiry": { "default": 30, "Product": 90 } },
                "debug": true
            }"#,
        )
        .unwrap();

        base.merge(overlay);

        let server = base.server.as_ref().unwrap();
        assert_eq!(server.host, Some("base.host".to_string()));
        assert_eq!(server.port, Some(2000));

        let cache = base.cache.as_ref().unwrap();
        assert_eq!(cache.alias, Some("base".to_string()));
        // Expiry tables are replaced wholesale
        let expiry = cache.expiry.as_ref().unwrap();
        assert_eq!(expiry.get("default"), Some(&30));
        assert_eq!(expiry.get("Product"), Some(&90));

        assert_eq!(base.debug, Some(true));
    }

    #[test]
    fn test_file_config_merge_nested_postgres() {
        let mut base: FileConfig = serde_json::from_str(
            r#"{ "database": { "backend": "postgres", "postgres": { "url": "postgres://a/db", "max_connections": 10 } } }"#,
        )
        .unwrap();
        let overlay: FileConfig = serde_json::from_str(
            r#"{ "database": { "postgres": { "max_connections": 50 } } }"#,
        )
        .unwrap();

        base.merge(overlay);

        let db = base.database.as_ref().unwrap();
        assert_eq!(db.backend, Some(DatabaseBackend::Postgres));
        let pg = db.postgres.as_ref().unwrap();
        assert_eq!(pg.url, Some("postgres://a/db".to_string()));
        assert_eq!(pg.max_connections, Some(50));
    }

    #[test]
    fn test_validate_ok() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_default_ttl() {
        let mut config = base_config();
        config.cache.expiry = HashMap::from([("Order".to_string(), 60)]);
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("default"));
    }

    #[test]
    fn test_validate_default_ttl_case_insensitive() {
        let mut config = base_config();
        config.cache.expiry = HashMap::from([("Default".to_string(), 60)]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_redis_without_url() {
        let mut config = base_config();
        config.cache.backend = CacheBackendType::Redis;
        config.cache.redis = None;
        assert!(config.validate().is_err());

        config.cache.redis = Some(RedisConfig { url: String::new() });
        assert!(config.validate().is_err());

        config.cache.redis = Some(RedisConfig {
            url: "redis://127.0.0.1:6379/0".to_string(),
        });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_postgres_without_url() {
        let mut config = base_config();
        config.database.backend = DatabaseBackend::Postgres;
        config.database.postgres = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cache_settings_backend_config() {
        let mut config = base_config();
        config.cache.backend = CacheBackendType::Redis;
        config.cache.redis = Some(RedisConfig {
            url: "redis://cache:6379/1".to_string(),
        });

        let backend = config.cache.backend_config();
        assert_eq!(backend.backend, CacheBackendType::Redis);
        assert_eq!(backend.redis_url.as_deref(), Some("redis://cache:6379/1"));
        assert_eq!(backend.max_entries, DEFAULT_CACHE_MAX_ENTRIES);
    }
}
