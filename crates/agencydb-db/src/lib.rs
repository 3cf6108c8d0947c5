use std::str::FromStr;
use std::time::Duration;

use agencydb_core::{AppConfig, CrmError};
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;

pub mod brands;
pub mod collaborations;
pub mod creators;
pub mod events;
pub mod payments;
pub mod proposals;
pub mod revenue;
pub mod store;

pub use brands::BrandRow;
pub use collaborations::CollaborationRow;
pub use creators::{CreatorPlatformRow, CreatorRow};
pub use events::{EventRow, ParticipationRow};
pub use payments::PaymentRow;
pub use proposals::ProposalRow;
pub use revenue::RevenueRow;
pub use store::PgStore;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

// Path relative to crates/agencydb-db/Cargo.toml; resolves to <workspace-root>/migrations/
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("DATABASE_URL is not set")]
    MissingDatabaseUrl,
    #[error("record not found")]
    NotFound,
    #[error("column {column} holds unexpected value '{value}'")]
    InvalidColumn { column: &'static str, value: String },
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl DbError {
    /// Lift into the core error, naming the record a `NotFound` refers to.
    #[must_use]
    pub fn into_crm(self, entity: &'static str, id: uuid::Uuid) -> CrmError {
        match self {
            DbError::NotFound => CrmError::not_found(entity, id),
            other => other.into(),
        }
    }

    /// Name of the unique or foreign-key constraint this error tripped, if any.
    #[must_use]
    pub fn violated_constraint(&self) -> Option<&str> {
        let DbError::Sqlx(sqlx::Error::Database(db)) = self else {
            return None;
        };
        if !matches!(
            db.code().as_deref(),
            Some(UNIQUE_VIOLATION | FOREIGN_KEY_VIOLATION)
        ) {
            return None;
        }
        Some(db.constraint().unwrap_or("a table constraint"))
    }
}

impl From<DbError> for CrmError {
    fn from(e: DbError) -> Self {
        if let Some(constraint) = e.violated_constraint() {
            tracing::warn!(constraint, "write rejected by constraint");
            return CrmError::Conflict(format!("write violates {constraint}"));
        }
        if let DbError::InvalidColumn { column, value } = &e {
            tracing::error!(column, value = %value, "row holds a value the domain cannot read");
        }
        CrmError::StoreUnavailable(e.to_string())
    }
}

/// Connect to a Postgres pool using explicit URL and config.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the connection cannot be established.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await
}

/// Connect using the database URL and pool settings of a loaded [`AppConfig`].
///
/// # Errors
///
/// Returns [`DbError::MissingDatabaseUrl`] if the URL is blank, or
/// [`DbError::Sqlx`] if the connection cannot be established.
pub async fn connect_pool_from_config(config: &AppConfig) -> Result<PgPool, DbError> {
    if config.database_url.trim().is_empty() {
        return Err(DbError::MissingDatabaseUrl);
    }
    connect_pool(&config.database_url, PoolConfig::from_app_config(config))
        .await
        .map_err(DbError::from)
}

/// Run all pending migrations against the pool.
///
/// Returns the number of migrations that were applied.
///
/// # Errors
///
/// Returns [`sqlx::migrate::MigrateError`] if any migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<usize, sqlx::migrate::MigrateError> {
    // The _sqlx_migrations table does not exist on a fresh database; count that as zero.
    let applied_before = applied_migrations(pool).await;
    MIGRATOR.run(pool).await?;
    let applied_after = applied_migrations(pool).await;

    let delta = (applied_after - applied_before).max(0);
    Ok(usize::try_from(delta).unwrap_or(0))
}

async fn applied_migrations(pool: &PgPool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = true")
        .fetch_one(pool)
        .await
        .unwrap_or(0)
}

/// Send a `SELECT 1` to verify the pool has a live connection.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}

/// Run a full health check: ping the pool and return a typed error on failure.
///
/// # Errors
///
/// Returns [`DbError`] if the ping fails.
pub async fn health_check(pool: &PgPool) -> Result<(), DbError> {
    ping(pool).await?;
    Ok(())
}

/// Parse a TEXT enum column into its domain type.
pub(crate) fn parse_column<T: FromStr>(column: &'static str, value: &str) -> Result<T, DbError> {
    value.parse().map_err(|_| DbError::InvalidColumn {
        column,
        value: value.to_string(),
    })
}
