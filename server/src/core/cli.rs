use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::config::{CacheBackendType, DatabaseBackend, EvictionPolicy};
use super::constants::{
    ENV_CACHE_ALIAS, ENV_CACHE_BACKEND, ENV_CACHE_EVICTION_POLICY, ENV_CACHE_MAX_ENTRIES,
    ENV_CACHE_REDIS_URL, ENV_CONFIG, ENV_DATABASE_BACKEND, ENV_DEBUG, ENV_HOST, ENV_NO_AUTH,
    ENV_PORT, ENV_POSTGRES_URL,
};

#[derive(Parser)]
#[command(name = "rately")]
#[command(version, about = "Order and product feedback service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Disable basic authentication (for development)
    #[arg(long, global = true, env = ENV_NO_AUTH)]
    pub no_auth: bool,

    /// Enable debug mode
    #[arg(long, global = true, env = ENV_DEBUG)]
    pub debug: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    // Cache options
    /// Cache backend (memory or redis)
    #[arg(long, global = true, env = ENV_CACHE_BACKEND, value_parser = parse_cache_backend_type)]
    pub cache_backend: Option<CacheBackendType>,

    /// Maximum number of cache entries
    #[arg(long, global = true, env = ENV_CACHE_MAX_ENTRIES)]
    pub cache_max_entries: Option<u64>,

    /// Cache eviction policy (tinylfu or lru)
    #[arg(long, global = true, env = ENV_CACHE_EVICTION_POLICY, value_parser = parse_eviction_policy)]
    pub cache_eviction_policy: Option<EvictionPolicy>,

    /// Redis-compatible cache URL. Supports Redis, Sentinel, Valkey, Dragonfly.
    /// Formats: redis://host:port/db, redis+sentinel://s1:port,s2:port/master/db
    #[arg(long, global = true, env = ENV_CACHE_REDIS_URL)]
    pub cache_redis_url: Option<String>,

    /// Namespace prepended to every cache key
    #[arg(long, global = true, env = ENV_CACHE_ALIAS)]
    pub cache_alias: Option<String>,

    // Database options
    /// Database backend (sqlite or postgres)
    #[arg(long, global = true, env = ENV_DATABASE_BACKEND, value_parser = parse_database_backend)]
    pub database_backend: Option<DatabaseBackend>,

    /// PostgreSQL connection URL (when using postgres backend)
    #[arg(long, global = true, env = ENV_POSTGRES_URL)]
    pub postgres_url: Option<String>,
}

/// Parse cache backend type from CLI/env string
fn parse_cache_backend_type(s: &str) -> Result<CacheBackendType, String> {
    match s.to_lowercase().as_str() {
        "memory" => Ok(CacheBackendType::Memory),
        "redis" => Ok(CacheBackendType::Redis),
        _ => Err(format!(
            "Invalid cache backend '{}'. Valid options: memory, redis",
            s
        )),
    }
}

/// Parse eviction policy from CLI/env string
fn parse_eviction_policy(s: &str) -> Result<EvictionPolicy, String> {
    match s.to_lowercase().as_str() {
        "tinylfu" => Ok(EvictionPolicy::TinyLfu),
        "lru" => Ok(EvictionPolicy::Lru),
        _ => Err(format!(
            "Invalid eviction policy '{}'. Valid options: tinylfu, lru",
            s
        )),
    }
}

/// Parse database backend from CLI/env string
fn parse_database_backend(s: &str) -> Result<DatabaseBackend, String> {
    match s.to_lowercase().as_str() {
        "sqlite" => Ok(DatabaseBackend::Sqlite),
        "postgres" | "postgresql" => Ok(DatabaseBackend::Postgres),
        _ => Err(format!(
            "Invalid database backend '{}'. Valid options: sqlite, postgres",
            s
        )),
    }
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// System maintenance commands
    System {
        #[command(subcommand)]
        command: SystemCommands,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum SystemCommands {
    /// Delete local data directory (database, caches). Requires confirmation.
    Prune {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub no_auth: bool,
    pub debug: bool,
    pub config: Option<PathBuf>,
    pub cache_backend: Option<CacheBackendType>,
    pub cache_max_entries: Option<u64>,
    pub cache_eviction_policy: Option<EvictionPolicy>,
    pub cache_redis_url: Option<String>,
    pub cache_alias: Option<String>,
    pub database_backend: Option<DatabaseBackend>,
    pub postgres_url: Option<String>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        host: cli.host,
        port: cli.port,
        no_auth: cli.no_auth,
        debug: cli.debug,
        config: cli.config,
        cache_backend: cli.cache_backend,
        cache_max_entries: cli.cache_max_entries,
        cache_eviction_policy: cli.cache_eviction_policy,
        cache_redis_url: cli.cache_redis_url,
        cache_alias: cli.cache_alias,
        database_backend: cli.database_backend,
        postgres_url: cli.postgres_url,
    };
    (config, cli.command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cache_backend_type() {
        assert_eq!(
            parse_cache_backend_type("memory").unwrap(),
            CacheBackendType::Memory
        );
        assert_eq!(
            parse_cache_backend_type("REDIS").unwrap(),
            CacheBackendType::Redis
        );
        assert!(parse_cache_backend_type("memcached").is_err());
    }

    #[test]
    fn test_parse_database_backend() {
        assert_eq!(
            parse_database_backend("sqlite").unwrap(),
            DatabaseBackend::Sqlite
        );
        assert_eq!(
            parse_database_backend("postgresql").unwrap(),
            DatabaseBackend::Postgres
        );
        assert!(parse_database_backend("mysql").is_err());
    }

    #[test]
    fn test_parse_eviction_policy() {
        assert_eq!(
            parse_eviction_policy("tinylfu").unwrap(),
            EvictionPolicy::TinyLfu
        );
        assert_eq!(parse_eviction_policy("LRU").unwrap(), EvictionPolicy::Lru);
        assert!(parse_eviction_policy("fifo").is_err());
    }
}
