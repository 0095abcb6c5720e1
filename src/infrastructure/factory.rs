//! Repository factory for runtime backend selection.
//!
//! `STORAGE_MODE` picks between the in-memory tables and `PostgreSQL`.
//!
//! ```ignore
//! let config = AppConfig::from_env()?;
//! let repositories = RepositoryFactory::new(config.repository).create().await?;
//! let list = repositories.list_repository.find_by_id(&list_id).await?;
//! ```

use std::str::FromStr;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use super::config::{ConfigError, parse_or};
use super::in_memory::InMemoryDatabase;
use super::postgres::{
    PostgresItemRepository, PostgresListRepository, PostgresSessionRepository,
    PostgresTokenRepository, PostgresUserRepository, ensure_schema,
};
use super::{
    ItemRepository, ListRepository, RepositoryError, SessionRepository, TokenRepository,
    UserRepository,
};

// =============================================================================
// Configuration Types
// =============================================================================

/// Storage backend for all repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// Process-local tables. Data is lost on restart.
    #[default]
    InMemory,
    Postgres,
}

impl FromStr for StorageMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            _ => Err(ConfigError::InvalidStorageMode(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    pub storage_mode: StorageMode,
    /// Required when `storage_mode` is `Postgres`.
    pub database_url: Option<String>,
    pub max_connections: u32,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            storage_mode: StorageMode::default(),
            database_url: None,
            max_connections: 5,
        }
    }
}

impl RepositoryConfig {
    /// Reads `STORAGE_MODE`, `DATABASE_URL` and `DATABASE_MAX_CONNECTIONS`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an unknown storage mode, a bad pool size, or
    /// a missing `DATABASE_URL` in postgres mode.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let storage_mode = lookup("STORAGE_MODE")
            .map(|value| value.parse::<StorageMode>())
            .transpose()?
            .unwrap_or_default();
        let max_connections = parse_or(
            "DATABASE_MAX_CONNECTIONS",
            lookup("DATABASE_MAX_CONNECTIONS"),
            5,
        )?;

        let config = Self {
            storage_mode,
            database_url: lookup("DATABASE_URL"),
            max_connections,
        };
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `ConfigError::MissingDatabaseUrl` in postgres mode without a URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_mode == StorageMode::Postgres && self.database_url.is_none() {
            return Err(ConfigError::MissingDatabaseUrl);
        }
        Ok(())
    }
}

// =============================================================================
// Error Types
// =============================================================================

#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    DatabaseConnection(String),

    #[error("Schema setup error: {0}")]
    Schema(#[from] RepositoryError),
}

// =============================================================================
// Repository Factory
// =============================================================================

/// Every repository the application needs, as shared trait objects.
#[derive(Clone)]
pub struct Repositories {
    pub list_repository: Arc<dyn ListRepository>,
    pub item_repository: Arc<dyn ItemRepository>,
    pub user_repository: Arc<dyn UserRepository>,
    pub token_repository: Arc<dyn TokenRepository>,
    pub session_repository: Arc<dyn SessionRepository>,
}

impl Repositories {
    /// Repositories backed by the given in-memory tables.
    #[must_use]
    pub fn in_memory(database: &InMemoryDatabase) -> Self {
        Self {
            list_repository: Arc::new(database.list_repository()),
            item_repository: Arc::new(database.item_repository()),
            user_repository: Arc::new(database.user_repository()),
            token_repository: Arc::new(database.token_repository()),
            session_repository: Arc::new(database.session_repository()),
        }
    }

    fn postgres(pool: &sqlx::PgPool) -> Self {
        Self {
            list_repository: Arc::new(PostgresListRepository::new(pool.clone())),
            item_repository: Arc::new(PostgresItemRepository::new(pool.clone())),
            user_repository: Arc::new(PostgresUserRepository::new(pool.clone())),
            token_repository: Arc::new(PostgresTokenRepository::new(pool.clone())),
            session_repository: Arc::new(PostgresSessionRepository::new(pool.clone())),
        }
    }
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Repositories")
            .field("list_repository", &"Arc<dyn ListRepository>")
            .field("item_repository", &"Arc<dyn ItemRepository>")
            .field("user_repository", &"Arc<dyn UserRepository>")
            .field("token_repository", &"Arc<dyn TokenRepository>")
            .field("session_repository", &"Arc<dyn SessionRepository>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct RepositoryFactory {
    config: RepositoryConfig,
}

impl RepositoryFactory {
    #[must_use]
    pub const fn new(config: RepositoryConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Creates all repositories for the configured backend.
    ///
    /// In postgres mode this opens the pool and creates missing tables.
    ///
    /// # Errors
    ///
    /// Returns `FactoryError` if the database is unreachable or the schema
    /// cannot be created.
    pub async fn create(&self) -> Result<Repositories, FactoryError> {
        match self.config.storage_mode {
            StorageMode::InMemory => Ok(Repositories::in_memory(&InMemoryDatabase::new())),
            StorageMode::Postgres => {
                let database_url = self
                    .config
                    .database_url
                    .as_ref()
                    .ok_or(ConfigError::MissingDatabaseUrl)?;

                let pool = PgPoolOptions::new()
                    .max_connections(self.config.max_connections)
                    .connect(database_url)
                    .await
                    .map_err(|error| FactoryError::DatabaseConnection(error.to_string()))?;

                ensure_schema(&pool).await?;
                tracing::info!("PostgreSQL schema ready");

                Ok(Repositories::postgres(&pool))
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
