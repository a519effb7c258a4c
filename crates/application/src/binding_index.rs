use std::sync::Arc;

use rankbind_core::{AppResult, GuildId};
use rankbind_domain::{BindingRecord, BindingRecordKind, GroupId, GuildConfiguration, PendingRequest};

use crate::ports::BindingStore;

/// Cross-guild uniqueness lookups over the binding store.
///
/// Every lookup is a full scan of `BindingStore::list_entries`. Guild counts
/// are small; a large fleet would want a secondary index keyed by group.
#[derive(Clone)]
pub struct BindingIndex {
    store: Arc<dyn BindingStore>,
}

impl BindingIndex {
    /// Creates an index over a binding store.
    #[must_use]
    pub fn new(store: Arc<dyn BindingStore>) -> Self {
        Self { store }
    }

    /// Returns the guild whose confirmed configuration is bound to `group_id`.
    pub async fn find_guild_owning_group(&self, group_id: &GroupId) -> AppResult<Option<GuildId>> {
        self.find_guild_with(BindingRecordKind::Configuration, group_id)
            .await
    }

    /// Returns the guild with a pending setup request for `group_id`.
    pub async fn find_guild_with_pending_group(
        &self,
        group_id: &GroupId,
    ) -> AppResult<Option<GuildId>> {
        self.find_guild_with(BindingRecordKind::PendingSetup, group_id)
            .await
    }

    /// Returns the guild with a pending transfer request for `group_id`.
    pub async fn find_guild_with_pending_transfer(
        &self,
        group_id: &GroupId,
    ) -> AppResult<Option<GuildId>> {
        self.find_guild_with(BindingRecordKind::PendingTransfer, group_id)
            .await
    }

    /// Returns whether any guild holds a confirmed configuration for `group_id`.
    pub async fn is_group_configured(&self, group_id: &GroupId) -> AppResult<bool> {
        Ok(self.find_guild_owning_group(group_id).await?.is_some())
    }

    /// Returns the first claim another guild holds on `group_id`.
    ///
    /// Confirmed configurations win over pending requests so a bound group is
    /// reported as bound even while some third guild also has it pending.
    pub async fn find_claim_by_other_guild(
        &self,
        group_id: &GroupId,
        guild_id: &GuildId,
    ) -> AppResult<Option<(GuildId, BindingRecordKind)>> {
        let entries = self.store.list_entries().await?;
        let mut claims: Vec<(BindingRecordKind, GuildId)> = entries
            .into_iter()
            .filter(|entry| &entry.guild_id != guild_id && entry.record.group_id() == group_id)
            .map(|entry| (entry.record.kind(), entry.guild_id))
            .collect();

        claims.sort();
        Ok(claims
            .into_iter()
            .next()
            .map(|(kind, claiming_guild_id)| (claiming_guild_id, kind)))
    }

    /// Lists every confirmed configuration.
    pub async fn list_configurations(&self) -> AppResult<Vec<(GuildId, GuildConfiguration)>> {
        let entries = self.store.list_entries().await?;
        Ok(entries
            .into_iter()
            .filter_map(|entry| match entry.record {
                BindingRecord::Configuration(configuration) => {
                    Some((entry.guild_id, configuration))
                }
                _ => None,
            })
            .collect())
    }

    /// Lists every pending setup request.
    pub async fn list_pending_setups(&self) -> AppResult<Vec<(GuildId, PendingRequest)>> {
        let entries = self.store.list_entries().await?;
        Ok(entries
            .into_iter()
            .filter_map(|entry| match entry.record {
                BindingRecord::PendingSetup(request) => Some((entry.guild_id, request)),
                _ => None,
            })
            .collect())
    }

    async fn find_guild_with(
        &self,
        kind: BindingRecordKind,
        group_id: &GroupId,
    ) -> AppResult<Option<GuildId>> {
        let entries = self.store.list_entries().await?;
        let mut matches: Vec<GuildId> = entries
            .into_iter()
            .filter(|entry| entry.record.kind() == kind && entry.record.group_id() == group_id)
            .map(|entry| entry.guild_id)
            .collect();

        // Enumeration order depends on the backend.
        matches.sort();
        Ok(matches.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rankbind_core::{GuildId, MemberId};
    use rankbind_domain::{
        BindingRecordKind, GroupId, GuildConfiguration, PendingKind, PendingRequest,
    };

    use super::BindingIndex;
    use crate::ports::BindingStore;
    use crate::test_support::FakeBindingStore;

    fn guild(value: &str) -> GuildId {
        GuildId::new(value).unwrap_or_else(|_| unreachable!())
    }

    fn group(value: &str) -> GroupId {
        GroupId::new(value).unwrap_or_else(|_| unreachable!())
    }

    fn pending(group_id: &str) -> PendingRequest {
        PendingRequest::new(
            group(group_id),
            None,
            MemberId::new("500").unwrap_or_else(|_| unreachable!()),
            "900",
        )
    }

    #[tokio::test]
    async fn lookups_distinguish_record_kinds() {
        let store = Arc::new(FakeBindingStore::default());
        let saved = store
            .save_configuration(&guild("1"), GuildConfiguration::new(group("77")))
            .await;
        assert!(saved.is_ok());
        let saved = store
            .save_pending(&guild("2"), PendingKind::Setup, pending("88"))
            .await;
        assert!(saved.is_ok());
        let saved = store
            .save_pending(&guild("1"), PendingKind::Transfer, pending("99"))
            .await;
        assert!(saved.is_ok());

        let index = BindingIndex::new(store);

        assert_eq!(
            index.find_guild_owning_group(&group("77")).await,
            Ok(Some(guild("1")))
        );
        assert_eq!(index.find_guild_owning_group(&group("88")).await, Ok(None));
        assert_eq!(
            index.find_guild_with_pending_group(&group("88")).await,
            Ok(Some(guild("2")))
        );
        assert_eq!(
            index.find_guild_with_pending_transfer(&group("99")).await,
            Ok(Some(guild("1")))
        );
        assert_eq!(index.is_group_configured(&group("99")).await, Ok(false));
        assert_eq!(index.list_configurations().await.map(|all| all.len()), Ok(1));
        assert_eq!(index.list_pending_setups().await.map(|all| all.len()), Ok(1));
    }

    #[tokio::test]
    async fn claims_of_the_asking_guild_are_ignored() {
        let store = Arc::new(FakeBindingStore::default());
        let saved = store
            .save_pending(&guild("1"), PendingKind::Setup, pending("77"))
            .await;
        assert!(saved.is_ok());
        let saved = store
            .save_configuration(&guild("3"), GuildConfiguration::new(group("77")))
            .await;
        assert!(saved.is_ok());
        let saved = store
            .save_pending(&guild("2"), PendingKind::Transfer, pending("77"))
            .await;
        assert!(saved.is_ok());

        let index = BindingIndex::new(store);

        assert_eq!(
            index
                .find_claim_by_other_guild(&group("77"), &guild("3"))
                .await,
            Ok(Some((guild("1"), BindingRecordKind::PendingSetup)))
        );
        assert_eq!(
            index
                .find_claim_by_other_guild(&group("77"), &guild("1"))
                .await,
            Ok(Some((guild("3"), BindingRecordKind::Configuration)))
        );
        assert_eq!(
            index
                .find_claim_by_other_guild(&group("88"), &guild("1"))
                .await,
            Ok(None)
        );
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let store = Arc::new(FakeBindingStore::default());
        store.fail_all().await;
        let index = BindingIndex::new(store);

        assert!(index.find_guild_owning_group(&group("77")).await.is_err());
    }
}
