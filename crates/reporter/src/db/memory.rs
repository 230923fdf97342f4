use async_trait::async_trait;
use pingboard_common::HostStatus;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{StatusStore, StoreError};

/// Volatile store keyed by host. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStatusStore {
    statuses: RwLock<HashMap<String, HostStatus>>,
}

impl MemoryStatusStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatusStore for MemoryStatusStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn upsert_status(&self, status: &HostStatus) -> Result<(), StoreError> {
        self.statuses
            .write()
            .await
            .insert(status.host.clone(), status.clone());
        Ok(())
    }

    async fn list_statuses(&self) -> Result<Vec<HostStatus>, StoreError> {
        Ok(self.statuses.read().await.values().cloned().collect())
    }
}
