//! Persistence configuration loaded via OrthoConfig.
//!
//! Values come from `USER_STORE_*` environment variables, configuration
//! files and command-line flags in the usual OrthoConfig precedence.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use tracing::debug;

use crate::outbound::persistence::{
    DEFAULT_CONNECTION_TIMEOUT, DEFAULT_MAX_SIZE, DbPool, DeleteMode, DieselUserRepository,
    DieselUserStore, PoolConfig, PoolError,
};

/// Errors raised while turning settings into a live repository.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// No database URL was configured.
    #[error("USER_STORE_DATABASE_URL is not set")]
    MissingDatabaseUrl,
    /// The connection pool could not be built.
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Settings controlling the user store's pool, deadlines and delete mode.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "USER_STORE")]
pub struct PersistenceSettings {
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Upper bound on pooled connections.
    pub max_connections: Option<u32>,
    /// Idle connections the pool keeps open.
    pub min_idle: Option<u32>,
    /// Pool checkout timeout in milliseconds.
    pub connection_timeout_ms: Option<u64>,
    /// Deadline for each repository operation in milliseconds.
    pub operation_timeout_ms: Option<u64>,
    /// Mark rows deleted instead of removing them.
    #[ortho_config(default = false)]
    pub soft_delete: bool,
}

impl PersistenceSettings {
    /// Return the configured pool size, falling back to the default.
    pub fn max_connections(&self) -> u32 {
        self.max_connections.unwrap_or(DEFAULT_MAX_SIZE)
    }

    /// Return the configured checkout timeout, falling back to the default.
    pub fn connection_timeout(&self) -> Duration {
        self.connection_timeout_ms
            .map_or(DEFAULT_CONNECTION_TIMEOUT, Duration::from_millis)
    }

    /// Return the per-operation deadline, if one is configured.
    pub fn operation_timeout(&self) -> Option<Duration> {
        self.operation_timeout_ms.map(Duration::from_millis)
    }

    /// Return the delete mode selected by `soft_delete`.
    pub fn delete_mode(&self) -> DeleteMode {
        if self.soft_delete {
            DeleteMode::Soft
        } else {
            DeleteMode::Hard
        }
    }

    /// Build the pool configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingDatabaseUrl`] when no URL is set.
    pub fn pool_config(&self) -> Result<PoolConfig, SettingsError> {
        let url = self
            .database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)?;

        Ok(PoolConfig::new(url)
            .with_max_size(self.max_connections())
            .with_min_idle(self.min_idle)
            .with_connection_timeout(self.connection_timeout()))
    }

    /// Build the pool, store and repository described by these settings.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingDatabaseUrl`] when no URL is set and
    /// [`SettingsError::Pool`] when the pool cannot be built.
    pub async fn connect(&self) -> Result<DieselUserRepository, SettingsError> {
        let pool = DbPool::new(self.pool_config()?).await?;
        let store = DieselUserStore::new(pool).with_delete_mode(self.delete_mode());
        let repo = DieselUserRepository::new(store).with_operation_timeout(self.operation_timeout());

        debug!(
            delete_mode = ?self.delete_mode(),
            operation_timeout = ?repo.operation_timeout(),
            "user repository configured"
        );
        Ok(repo)
    }
}
