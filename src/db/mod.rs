//! Database module providing connection management, migrations, and queries.

pub mod analyses;
pub mod images;
pub mod soft_delete;
pub mod vehicles;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::migration::Migrator;

pub use soft_delete::SoftDelete;

/// Database connection pool wrapper.
///
/// Cloning is cheap: clones share the underlying SeaORM pool.
#[derive(Clone)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Connect to PostgreSQL using the configured database settings.
    pub async fn new(config: &Config) -> AppResult<Self> {
        let settings = &config.database;

        let mut options = ConnectOptions::new(settings.connection_url());
        options
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        info!(
            "Connecting to database {}:{}/{} (pool {}..{})",
            settings.host,
            settings.port,
            settings.name,
            settings.min_connections,
            settings.max_connections
        );

        Self::connect(options).await
    }

    /// Connect with explicit options (any SeaORM-supported URL).
    pub async fn connect(options: impl Into<ConnectOptions>) -> AppResult<Self> {
        let conn = Database::connect(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to database: {}", e)))?;

        Ok(DbPool { conn })
    }

    /// Get the underlying connection for executing queries.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Apply all pending schema migrations.
    pub async fn run_migrations(&self) -> AppResult<()> {
        Migrator::up(&self.conn, None)
            .await
            .map_err(|e| AppError::Database(format!("Migration failed: {}", e)))
    }
}
