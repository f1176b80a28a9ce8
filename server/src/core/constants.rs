// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display and platform directories)
pub const APP_NAME: &str = "Rately";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "rately";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".rately";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "rately.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "RATELY_CONFIG";

// =============================================================================
// Environment Variables - Debug
// =============================================================================

/// Environment variable for debug mode
pub const ENV_DEBUG: &str = "RATELY_DEBUG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "RATELY_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "RATELY_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "RATELY_LOG";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5420;

/// Default body limit for API requests (1 MB)
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

// =============================================================================
// Environment Variables - Storage
// =============================================================================

/// Environment variable to override data directory
pub const ENV_DATA_DIR: &str = "RATELY_DATA_DIR";

// =============================================================================
// SQLite Database
// =============================================================================

/// SQLite database filename
pub const SQLITE_DB_FILENAME: &str = "rately.db";

/// SQLite connection pool max connections
pub const SQLITE_MAX_CONNECTIONS: u32 = 5;

/// SQLite busy timeout in seconds
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 30;

/// SQLite cache size (negative = KB, so -64000 = 64MB)
pub const SQLITE_CACHE_SIZE: &str = "-64000";

/// SQLite WAL auto-checkpoint threshold (pages, ~4MB at 1000)
pub const SQLITE_WAL_AUTOCHECKPOINT: &str = "1000";

/// WAL checkpoint interval in seconds (5 minutes)
pub const SQLITE_CHECKPOINT_INTERVAL_SECS: u64 = 300;

// =============================================================================
// PostgreSQL Database
// =============================================================================

/// Environment variable for transactional database backend (sqlite or postgres)
pub const ENV_DATABASE_BACKEND: &str = "RATELY_DATABASE_BACKEND";

/// Environment variable for PostgreSQL connection URL
pub const ENV_POSTGRES_URL: &str = "RATELY_POSTGRES_URL";

/// Default maximum pool connections
pub const POSTGRES_DEFAULT_MAX_CONNECTIONS: u32 = 20;

/// Default minimum warm pool connections
pub const POSTGRES_DEFAULT_MIN_CONNECTIONS: u32 = 2;

/// Default connection acquire timeout in seconds
pub const POSTGRES_DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Default idle connection timeout in seconds
pub const POSTGRES_DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;

/// Default max connection lifetime in seconds
pub const POSTGRES_DEFAULT_MAX_LIFETIME_SECS: u64 = 1800;

/// Default statement timeout in seconds (0 = disabled)
pub const POSTGRES_DEFAULT_STATEMENT_TIMEOUT_SECS: u64 = 60;

/// Interval between pool health-check probes in seconds
pub const POSTGRES_HEALTH_CHECK_INTERVAL_SECS: u64 = 60;

// =============================================================================
// Cache
// =============================================================================

/// Environment variable for cache backend (memory or redis)
pub const ENV_CACHE_BACKEND: &str = "RATELY_CACHE_BACKEND";

/// Environment variable for maximum in-memory cache entries
pub const ENV_CACHE_MAX_ENTRIES: &str = "RATELY_CACHE_MAX_ENTRIES";

/// Environment variable for in-memory cache eviction policy
pub const ENV_CACHE_EVICTION_POLICY: &str = "RATELY_CACHE_EVICTION_POLICY";

/// Environment variable for Redis connection URL
pub const ENV_CACHE_REDIS_URL: &str = "RATELY_CACHE_REDIS_URL";

/// Environment variable for the cache key namespace
pub const ENV_CACHE_ALIAS: &str = "RATELY_CACHE_ALIAS";

/// Default maximum in-memory cache entries
pub const DEFAULT_CACHE_MAX_ENTRIES: u64 = 100_000;

/// Default Redis connection URL
pub const DEFAULT_CACHE_REDIS_URL: &str = "redis://127.0.0.1:6379/0";

/// Default cache key namespace prepended to every key
pub const DEFAULT_CACHE_ALIAS: &str = "rately";

/// TTL table entry that every expiry table must provide
pub const TTL_DEFAULT_ENTRY: &str = "default";

/// Fallback TTL in seconds when no expiry table is configured
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

// =============================================================================
// Authentication
// =============================================================================

/// Environment variable to disable basic authentication
pub const ENV_NO_AUTH: &str = "RATELY_NO_AUTH";

/// Header carrying the calling customer's id
pub const USER_ID_HEADER: &str = "UserId";

// =============================================================================
// Feedback
// =============================================================================

/// Lowest accepted rating value
pub const RATING_MIN: i32 = 1;

/// Highest accepted rating value
pub const RATING_MAX: i32 = 5;

/// Maximum number of items returned by the latest-feedback view
pub const LATEST_FEEDBACK_LIMIT: i64 = 20;

// =============================================================================
// Shutdown
// =============================================================================

/// Graceful shutdown timeout in seconds
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 30;
