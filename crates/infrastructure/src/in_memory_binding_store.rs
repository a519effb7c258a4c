use std::collections::BTreeMap;

use async_trait::async_trait;
use rankbind_application::BindingStore;
use rankbind_core::{AppResult, GuildId};
use rankbind_domain::{
    BindingEntry, BindingKey, BindingRecord, GuildConfiguration, PendingKind, PendingRequest,
};
use tokio::sync::RwLock;

/// In-memory binding store for tests and single-process deployments.
#[derive(Default)]
pub struct InMemoryBindingStore {
    records: RwLock<BTreeMap<BindingKey, BindingRecord>>,
}

impl InMemoryBindingStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BindingStore for InMemoryBindingStore {
    async fn find_configuration(
        &self,
        guild_id: &GuildId,
    ) -> AppResult<Option<GuildConfiguration>> {
        let records = self.records.read().await;
        Ok(match records.get(&BindingKey::configuration(guild_id)) {
            Some(BindingRecord::Configuration(configuration)) => Some(configuration.clone()),
            _ => None,
        })
    }

    async fn save_configuration(
        &self,
        guild_id: &GuildId,
        configuration: GuildConfiguration,
    ) -> AppResult<()> {
        let mut records = self.records.write().await;
        records.remove(&BindingKey::pending(PendingKind::Setup, guild_id));
        records.remove(&BindingKey::pending(PendingKind::Transfer, guild_id));
        records.insert(
            BindingKey::configuration(guild_id),
            BindingRecord::Configuration(configuration),
        );
        Ok(())
    }

    async fn delete_configuration(&self, guild_id: &GuildId) -> AppResult<()> {
        self.records
            .write()
            .await
            .remove(&BindingKey::configuration(guild_id));
        Ok(())
    }

    async fn find_pending(
        &self,
        guild_id: &GuildId,
        kind: PendingKind,
    ) -> AppResult<Option<PendingRequest>> {
        let records = self.records.read().await;
        Ok(match records.get(&BindingKey::pending(kind, guild_id)) {
            Some(BindingRecord::PendingSetup(request) | BindingRecord::PendingTransfer(request)) => {
                Some(request.clone())
            }
            _ => None,
        })
    }

    async fn save_pending(
        &self,
        guild_id: &GuildId,
        kind: PendingKind,
        request: PendingRequest,
    ) -> AppResult<()> {
        self.records.write().await.insert(
            BindingKey::pending(kind, guild_id),
            BindingRecord::pending(kind, request),
        );
        Ok(())
    }

    async fn clear_pending(&self, guild_id: &GuildId, kind: PendingKind) -> AppResult<()> {
        self.records
            .write()
            .await
            .remove(&BindingKey::pending(kind, guild_id));
        Ok(())
    }

    async fn list_entries(&self) -> AppResult<Vec<BindingEntry>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .map(|(key, record)| BindingEntry {
                guild_id: key.guild_id().clone(),
                record: record.clone(),
            })
            .collect())
    }
}
