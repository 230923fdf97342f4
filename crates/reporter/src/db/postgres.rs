use async_trait::async_trait;
use pingboard_common::HostStatus;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use super::models::ContainerStatusRow;
use super::{StatusStore, StoreError};
use crate::config::DatabaseConfig;

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS container_status (
    ip TEXT PRIMARY KEY,
    ping_time INT,
    last_success TIMESTAMP
)
"#;

const UPSERT_SQL: &str = r#"
INSERT INTO container_status (ip, ping_time, last_success)
VALUES ($1, $2, $3)
ON CONFLICT (ip) DO UPDATE SET
    ping_time = EXCLUDED.ping_time,
    last_success = EXCLUDED.last_success
"#;

/// PostgreSQL-backed store. Concurrent upserts for the same host are
/// serialized by the database through `ON CONFLICT`.
#[derive(Clone)]
pub struct PgStatusStore {
    pool: PgPool,
}

impl PgStatusStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens the pool and verifies the database answers before returning.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(config.connect_options())
            .await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        info!(host = %config.host, port = config.port, database = %config.name, "Connected to database.");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl StatusStore for PgStatusStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn upsert_status(&self, status: &HostStatus) -> Result<(), StoreError> {
        sqlx::query(UPSERT_SQL)
            .bind(&status.host)
            .bind(status.latency_millis)
            .bind(status.last_success.naive_utc())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_statuses(&self) -> Result<Vec<HostStatus>, StoreError> {
        let rows = sqlx::query_as::<_, ContainerStatusRow>(
            "SELECT ip, ping_time, last_success FROM container_status",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| HostStatus::try_from(row).map_err(StoreError::Decode))
            .collect()
    }
}
