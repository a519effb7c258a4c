use async_trait::async_trait;
use rankbind_core::{AppResult, GuildId};
use rankbind_domain::{BindingEntry, GuildConfiguration, PendingKind, PendingRequest};

/// Guild-keyed persistence for configurations and pending requests.
///
/// Reads return `None` for records that were never written. Implementations
/// report an unreachable backend as `AppError::Unavailable`.
#[async_trait]
pub trait BindingStore: Send + Sync {
    /// Returns the confirmed configuration of a guild.
    async fn find_configuration(&self, guild_id: &GuildId)
    -> AppResult<Option<GuildConfiguration>>;

    /// Writes the configuration and clears both pending slots of the guild
    /// in one atomic step.
    async fn save_configuration(
        &self,
        guild_id: &GuildId,
        configuration: GuildConfiguration,
    ) -> AppResult<()>;

    /// Removes the configuration of a guild. Removing an absent record is a no-op.
    async fn delete_configuration(&self, guild_id: &GuildId) -> AppResult<()>;

    /// Returns the request occupying one pending slot.
    async fn find_pending(
        &self,
        guild_id: &GuildId,
        kind: PendingKind,
    ) -> AppResult<Option<PendingRequest>>;

    /// Writes one pending slot, replacing any previous request in it.
    async fn save_pending(
        &self,
        guild_id: &GuildId,
        kind: PendingKind,
        request: PendingRequest,
    ) -> AppResult<()>;

    /// Clears one pending slot. Clearing an empty slot is a no-op.
    async fn clear_pending(&self, guild_id: &GuildId, kind: PendingKind) -> AppResult<()>;

    /// Enumerates every record of every guild.
    async fn list_entries(&self) -> AppResult<Vec<BindingEntry>>;
}
