use async_trait::async_trait;
use rankbind_core::{AppResult, MemberId};

/// A verified association between a chat member and an external username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityLink {
    /// Linked chat-platform member.
    pub member_id: MemberId,
    /// Verified external username.
    pub username: String,
}

/// Read access to links maintained by the identity-linking subsystem.
#[async_trait]
pub trait IdentityLinkRepository: Send + Sync {
    /// Returns the username linked to a member.
    async fn find_linked_username(&self, member_id: &MemberId) -> AppResult<Option<String>>;

    /// Returns the member linked to a username using the store's exact lookup.
    async fn find_member_by_username(&self, username: &str) -> AppResult<Option<MemberId>>;

    /// Lists every link.
    async fn list_links(&self) -> AppResult<Vec<IdentityLink>>;
}
