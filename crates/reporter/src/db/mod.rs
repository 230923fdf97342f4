use async_trait::async_trait;
use pingboard_common::HostStatus;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{ReporterConfig, StoreKind};

pub mod memory;
pub mod models;
pub mod postgres;

pub use memory::MemoryStatusStore;
pub use postgres::PgStatusStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Failed to decode stored row: {0}")]
    Decode(String),
}

/// Storage behind the status API. At most one record is kept per host.
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// Creates the backing schema if it does not exist yet. Safe to call on
    /// every start.
    async fn ensure_schema(&self) -> Result<(), StoreError>;

    /// Inserts the record, or overwrites latency and last-success time of
    /// the existing record with the same host. Atomic per call.
    async fn upsert_status(&self, status: &HostStatus) -> Result<(), StoreError>;

    /// Every stored record, in whatever order the store yields them.
    async fn list_statuses(&self) -> Result<Vec<HostStatus>, StoreError>;
}

/// Opens the configured store and makes sure its schema exists.
pub async fn open_store(config: &ReporterConfig) -> Result<Arc<dyn StatusStore>, StoreError> {
    let store: Arc<dyn StatusStore> = match config.store {
        StoreKind::Postgres => Arc::new(PgStatusStore::connect(&config.database).await?),
        StoreKind::Memory => {
            warn!("Using in-memory status store; statuses are lost on restart.");
            Arc::new(MemoryStatusStore::new())
        }
    };
    store.ensure_schema().await?;
    info!(store = ?config.store, "Status store is ready.");
    Ok(store)
}
