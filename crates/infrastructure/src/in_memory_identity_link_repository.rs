use std::collections::BTreeMap;

use async_trait::async_trait;
use rankbind_application::{IdentityLink, IdentityLinkRepository};
use rankbind_core::{AppResult, MemberId};
use tokio::sync::RwLock;

/// In-memory identity links for tests and local runs.
///
/// Username lookups match the lowercased username, as the Redis layout does.
#[derive(Default)]
pub struct InMemoryIdentityLinkRepository {
    links: RwLock<BTreeMap<MemberId, String>>,
}

impl InMemoryIdentityLinkRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a verified link, replacing any previous link of the member.
    pub async fn link(&self, member_id: MemberId, username: impl Into<String>) {
        self.links.write().await.insert(member_id, username.into());
    }
}

#[async_trait]
impl IdentityLinkRepository for InMemoryIdentityLinkRepository {
    async fn find_linked_username(&self, member_id: &MemberId) -> AppResult<Option<String>> {
        Ok(self.links.read().await.get(member_id).cloned())
    }

    async fn find_member_by_username(&self, username: &str) -> AppResult<Option<MemberId>> {
        let wanted = username.to_lowercase();
        Ok(self
            .links
            .read()
            .await
            .iter()
            .find(|(_, linked)| linked.to_lowercase() == wanted)
            .map(|(member_id, _)| member_id.clone()))
    }

    async fn list_links(&self) -> AppResult<Vec<IdentityLink>> {
        Ok(self
            .links
            .read()
            .await
            .iter()
            .map(|(member_id, username)| IdentityLink {
                member_id: member_id.clone(),
                username: username.clone(),
            })
            .collect())
    }
}
