//! Persisted snapshot store
//!
//! Holds the verbatim upstream payloads together with the time they were
//! fetched. Only the most recent snapshot is semantically relevant; older
//! rows are retained as history.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use std::fmt::{self, Display};
use tracing::info;

/// One persisted copy of the upstream payload plus its fetch time.
///
/// `content` is the upstream JSON body stored byte-for-byte verbatim; the
/// proxy never reinterprets its shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub content: String,
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    /// Whether this snapshot is younger than the freshness window.
    pub fn is_fresh(&self, window: Duration) -> bool {
        Utc::now() - self.fetched_at < window
    }
}

#[derive(Debug)]
pub enum StoreError {
    Database(sqlx::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database(e) => write!(f, "Database error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database(e) => Some(e),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(e)
    }
}

/// Durable store of snapshots.
///
/// An empty store is a normal outcome (`latest` returns `Ok(None)`), not a
/// fault. `insert` must be durable before it returns success.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// The snapshot with the greatest `fetched_at`, or `None` if the store
    /// is empty.
    async fn latest(&self) -> Result<Option<Snapshot>, StoreError>;

    /// Persist a new snapshot with `fetched_at` set to now and return it.
    async fn insert(&self, content: &str) -> Result<Snapshot, StoreError>;
}

/// PostgreSQL-backed snapshot store.
pub struct PgSnapshotStore {
    pool: PgPool,
}

impl PgSnapshotStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SnapshotStore for PgSnapshotStore {
    async fn latest(&self) -> Result<Option<Snapshot>, StoreError> {
        let row: Option<(String, DateTime<Utc>)> = sqlx::query_as(
            "SELECT content, fetched_at FROM snapshots ORDER BY fetched_at DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(content, fetched_at)| Snapshot {
            content,
            fetched_at,
        }))
    }

    async fn insert(&self, content: &str) -> Result<Snapshot, StoreError> {
        let fetched_at = Utc::now();
        sqlx::query("INSERT INTO snapshots (content, fetched_at) VALUES ($1, $2)")
            .bind(content)
            .bind(fetched_at)
            .execute(&self.pool)
            .await?;

        Ok(Snapshot {
            content: content.to_string(),
            fetched_at,
        })
    }
}

/// Run database migrations (versioned, tracked in `_sqlx_migrations` table)
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::Error> {
    info!("Running database migrations...");
    sqlx::migrate!()
        .run(pool)
        .await
        .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
    info!("Database migrations completed");
    Ok(())
}
