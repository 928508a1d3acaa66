use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::auth::password::PasswordError;
use crate::config::DatabaseConfig;
use crate::filter::FilterError;

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    InvalidFilter(#[from] FilterError),

    #[error("Query timed out")]
    Timeout,

    #[error("Database unavailable: {0}")]
    Unavailable(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl DatabaseError {
    /// Safe to retry: the store was slow or unreachable, not wrong.
    pub fn is_transient(&self) -> bool {
        matches!(self, DatabaseError::Timeout | DatabaseError::Unavailable(_))
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => DatabaseError::Unavailable("connection pool timed out".to_string()),
            sqlx::Error::PoolClosed => DatabaseError::Unavailable("connection pool closed".to_string()),
            sqlx::Error::Io(e) => DatabaseError::Unavailable(e.to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => DatabaseError::Conflict(db.message().to_string()),
            other => DatabaseError::Sqlx(other),
        }
    }
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS admins (
        id BLOB PRIMARY KEY NOT NULL,
        email TEXT NOT NULL UNIQUE COLLATE NOCASE,
        username TEXT NOT NULL UNIQUE COLLATE NOCASE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL CHECK (role IN ('standard', 'super-admin')),
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tweets (
        id BLOB PRIMARY KEY NOT NULL,
        author TEXT NOT NULL,
        content TEXT NOT NULL,
        location TEXT,
        source TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_tweets_author ON tweets (author)",
    "CREATE INDEX IF NOT EXISTS idx_tweets_created_at ON tweets (created_at)",
    "CREATE INDEX IF NOT EXISTS idx_tweets_location ON tweets (location)",
    "CREATE INDEX IF NOT EXISTS idx_tweets_source ON tweets (source)",
];

/// Shared storage handle: one pool per process, passed explicitly.
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
    query_timeout: Duration,
}

impl Database {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| DatabaseError::InvalidDatabaseUrl(e.to_string()))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(config.query_timeout_secs));

        // Every connection to an in-memory database is a separate database,
        // so those are pinned to a single long-lived connection.
        let in_memory = Self::is_in_memory(&config.url);
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(config.max_connections)
        };

        let pool = pool_options
            .acquire_timeout(Duration::from_secs(config.query_timeout_secs))
            .connect_with(options)
            .await?;

        info!("Connected to database (in_memory: {})", in_memory);
        Ok(Self {
            pool,
            query_timeout: Duration::from_secs(config.query_timeout_secs),
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates tables and indexes if they are missing. Safe on every start.
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        for statement in SCHEMA {
            self.run(sqlx::query(statement).execute(&self.pool)).await?;
        }
        info!("Database schema ready");
        Ok(())
    }

    /// Runs one store round-trip under the configured timeout.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, DatabaseError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(result) => result.map_err(DatabaseError::from),
            Err(_) => {
                tracing::warn!("Query exceeded {:?}", self.query_timeout);
                Err(DatabaseError::Timeout)
            }
        }
    }

    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        self.run(sqlx::query("SELECT 1").execute(&self.pool)).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }

    fn is_in_memory(url: &str) -> bool {
        url.contains(":memory:") || url.contains("mode=memory")
    }
}
