use async_trait::async_trait;
use rankbind_core::AppResult;
use rankbind_domain::{ExternalUserId, GroupId, GroupRank, GroupRole, GroupSummary};

/// Read-only client for the external game platform.
#[async_trait]
pub trait GroupPlatformClient: Send + Sync {
    /// Returns group metadata, or `None` when the group does not exist.
    async fn find_group(&self, group_id: &GroupId) -> AppResult<Option<GroupSummary>>;

    /// Resolves a username to its numeric id, or `None` when no such user exists.
    async fn find_user_id(&self, username: &str) -> AppResult<Option<ExternalUserId>>;

    /// Returns the user's current rank in the group; `GroupRank::GUEST` for non-members.
    ///
    /// Never served from a cache.
    async fn rank_in_group(
        &self,
        group_id: &GroupId,
        user_id: ExternalUserId,
    ) -> AppResult<GroupRank>;

    /// Returns the group's role catalog.
    async fn list_group_roles(&self, group_id: &GroupId) -> AppResult<Vec<GroupRole>>;
}
