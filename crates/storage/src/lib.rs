use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{
    domain::{NewContactSubmission, SubmissionId},
    error::ContactError,
};
use sqlx::{
    migrate::MigrateError,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info};

const MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store is not configured: {0}")]
    Configuration(String),
    #[error("failed to connect to store: {0}")]
    Connection(#[source] sqlx::Error),
    #[error("failed to migrate store: {0}")]
    Migration(#[source] MigrateError),
    #[error("failed to write contact submission: {0}")]
    Persistence(#[source] sqlx::Error),
}

impl From<StoreError> for ContactError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Configuration(_) => ContactError::Configuration(value.to_string()),
            StoreError::Connection(_) | StoreError::Migration(_) => {
                ContactError::Connection(value.to_string())
            }
            StoreError::Persistence(_) => ContactError::Persistence(value.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredSubmission {
    pub id: SubmissionId,
    pub created_at: DateTime<Utc>,
}

/// Durable, append-only home for contact submissions.
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Establishes the connection if it is not already live. Calling it on a
    /// connected store does nothing.
    async fn connect(&self) -> Result<(), StoreError>;

    /// Appends one submission. Every call writes a new record.
    async fn save(&self, submission: &NewContactSubmission)
        -> Result<StoredSubmission, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

/// SQLite-backed store. The pool is opened on first use and then shared by
/// every caller for the life of the value.
pub struct SqliteContactStore {
    database_url: Option<String>,
    pool: OnceCell<Pool<Sqlite>>,
}

impl SqliteContactStore {
    pub fn new(database_url: Option<String>) -> Self {
        Self {
            database_url,
            pool: OnceCell::new(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.pool.initialized()
    }

    pub fn pool(&self) -> Option<&Pool<Sqlite>> {
        self.pool.get()
    }

    async fn live_pool(&self) -> Result<&Pool<Sqlite>, StoreError> {
        self.pool.get_or_try_init(|| self.open_pool()).await
    }

    async fn open_pool(&self) -> Result<Pool<Sqlite>, StoreError> {
        let database_url = self
            .database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| StoreError::Configuration("database url is not set".into()))?;

        let connect_options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| StoreError::Configuration(format!("invalid database url: {e}")))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(connect_options)
            .await
            .map_err(StoreError::Connection)?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(StoreError::Migration)?;

        info!("contact store connected");
        Ok(pool)
    }
}

#[async_trait]
impl ContactStore for SqliteContactStore {
    async fn connect(&self) -> Result<(), StoreError> {
        if self.is_connected() {
            return Ok(());
        }
        self.live_pool().await.map(|_| ())
    }

    #[tracing::instrument(name = "Insert contact submission", skip(self, submission))]
    async fn save(
        &self,
        submission: &NewContactSubmission,
    ) -> Result<StoredSubmission, StoreError> {
        let pool = self.live_pool().await?;
        let created_at = Utc::now();
        let row = sqlx::query(
            "INSERT INTO contact_submissions (first_name, last_name, email, company, message, created_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(submission.first_name())
        .bind(submission.last_name())
        .bind(submission.email())
        .bind(submission.company())
        .bind(submission.message())
        .bind(created_at)
        .fetch_one(pool)
        .await
        .map_err(StoreError::Persistence)?;

        let id = SubmissionId(row.try_get::<i64, _>(0).map_err(StoreError::Persistence)?);
        debug!(submission_id = id.0, "contact submission stored");
        Ok(StoredSubmission { id, created_at })
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        let pool = self.live_pool().await?;
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(pool)
            .await
            .map_err(StoreError::Connection)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
