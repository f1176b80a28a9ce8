//! Data storage layer
//!
//! Provides database services for the application:
//! - `sqlite` - Embedded transactional database (default)
//! - `postgres` - PostgreSQL backend for shared deployments
//! - `cache` - In-memory and Redis caching
//! - `types` - Shared data types across all backends
//! - `traits` - Repository traits for multi-database support
//! - `error` - Unified error type for all backends
//!
//! ## Backend Support
//!
//! The data layer supports multiple database backends through traits:
//! - `TransactionalRepository` - Implemented by SQLite and PostgreSQL

pub mod cache;
pub mod error;
pub mod postgres;
pub mod sqlite;
pub mod traits;
pub mod types;

// Re-export backend-specific services
pub use postgres::PostgresService;
pub use sqlite::SqliteService;

// Re-export unified error type
pub use error::DataError;

// Re-export repository trait
pub use traits::TransactionalRepository;

// Re-export shared types for convenient access
pub use types::{
    CustomerRow, FeedbackKind, FeedbackRow, NewFeedback, OrderProductRow, OrderRow, ProductRow,
};

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::core::config::{DatabaseBackend, PostgresConfig};
use crate::core::storage::AppStorage;

/// Transactional database service enum
///
/// Wraps the underlying backend-specific service (SQLite or PostgreSQL).
/// Provides a unified interface for all transactional operations.
/// Services are stored as Arc to enable safe extraction.
pub enum TransactionalService {
    /// SQLite backend (default, embedded)
    Sqlite(Arc<SqliteService>),
    /// PostgreSQL backend (for shared deployments)
    Postgres(Arc<PostgresService>),
}

impl TransactionalService {
    /// Initialize the transactional service based on configuration
    ///
    /// For SQLite backend, uses the storage path.
    /// For PostgreSQL backend, requires a PostgresConfig.
    pub async fn init(
        backend: DatabaseBackend,
        storage: &AppStorage,
        postgres_config: Option<&PostgresConfig>,
    ) -> Result<Self, DataError> {
        match backend {
            DatabaseBackend::Sqlite => {
                let service = SqliteService::init(storage).await?;
                Ok(Self::Sqlite(Arc::new(service)))
            }
            DatabaseBackend::Postgres => {
                let config = postgres_config.ok_or_else(|| {
                    DataError::Config("PostgreSQL configuration required".to_string())
                })?;
                let service = PostgresService::init(config).await?;
                Ok(Self::Postgres(Arc::new(service)))
            }
        }
    }

    /// Run a WAL checkpoint (SQLite) or equivalent maintenance task
    pub async fn checkpoint(&self) -> Result<(), DataError> {
        match self {
            Self::Sqlite(s) => s.checkpoint().await.map_err(Into::into),
            Self::Postgres(_) => {
                // PostgreSQL manages its own maintenance via autovacuum
                Ok(())
            }
        }
    }

    /// Close the database connection gracefully
    pub async fn close(&self) {
        match self {
            Self::Sqlite(s) => s.close().await,
            Self::Postgres(p) => p.close().await,
        }
    }

    /// Start the background checkpoint task (SQLite only)
    /// For PostgreSQL, starts a health check task instead.
    pub fn start_checkpoint_task(&self, shutdown_rx: watch::Receiver<bool>) -> JoinHandle<()> {
        match self {
            Self::Sqlite(s) => Arc::clone(s).start_checkpoint_task(shutdown_rx),
            Self::Postgres(p) => Arc::clone(p).start_health_check_task(shutdown_rx),
        }
    }

    /// Get the backend type
    pub fn backend(&self) -> DatabaseBackend {
        match self {
            Self::Sqlite(_) => DatabaseBackend::Sqlite,
            Self::Postgres(_) => DatabaseBackend::Postgres,
        }
    }

    /// Get the repository trait object for data operations
    ///
    /// This returns a shared trait object, allowing backend-agnostic
    /// data operations through the TransactionalRepository interface.
    pub fn repository(&self) -> Arc<dyn TransactionalRepository> {
        match self {
            Self::Sqlite(s) => Arc::new(Arc::clone(s)),
            Self::Postgres(p) => Arc::new(Arc::clone(p)),
        }
    }
}
