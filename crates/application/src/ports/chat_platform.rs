use std::collections::BTreeSet;

use async_trait::async_trait;
use rankbind_core::{AppResult, GuildId, MemberId};
use rankbind_domain::RoleId;

/// Live view of one guild member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildMemberSnapshot {
    /// Member identifier.
    pub member_id: MemberId,
    /// Roles the member currently holds.
    pub role_ids: BTreeSet<RoleId>,
    /// Guild nickname, if set.
    pub nickname: Option<String>,
}

/// Chat-platform operations used by role synchronization.
///
/// Adding a held role or removing an unheld role must succeed as a no-op.
#[async_trait]
pub trait ChatPlatformClient: Send + Sync {
    /// Returns the member, or `None` when they are not in the guild.
    async fn fetch_member(
        &self,
        guild_id: &GuildId,
        member_id: &MemberId,
    ) -> AppResult<Option<GuildMemberSnapshot>>;

    /// Grants roles, recording `reason` in the guild audit log.
    async fn add_roles(
        &self,
        guild_id: &GuildId,
        member_id: &MemberId,
        role_ids: &[RoleId],
        reason: &str,
    ) -> AppResult<()>;

    /// Revokes roles, recording `reason` in the guild audit log.
    async fn remove_roles(
        &self,
        guild_id: &GuildId,
        member_id: &MemberId,
        role_ids: &[RoleId],
        reason: &str,
    ) -> AppResult<()>;

    /// Sets the member's guild nickname.
    async fn set_nickname(
        &self,
        guild_id: &GuildId,
        member_id: &MemberId,
        nickname: &str,
        reason: &str,
    ) -> AppResult<()>;
}
