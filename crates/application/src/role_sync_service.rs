//! Role synchronization between external group ranks and guild roles.
//!
//! Every run recomputes the desired role set from scratch, so concurrent or
//! repeated runs converge on the same member state.

use std::collections::BTreeSet;
use std::sync::Arc;

use rankbind_core::{InteractionActor, MemberId};
use rankbind_domain::{GroupRank, RoleDiff, RoleDiffInput, RoleId, match_rank};

use crate::errors::SyncError;
use crate::ports::{
    BindingStore, ChatPlatformClient, GroupPlatformClient, IdentityLinkRepository,
    PremiumEntitlementSource,
};

/// Role name reported when the member's rank matches no catalog role.
pub const NO_GROUP_ROLE: &str = "None";

const ADD_ROLES_REASON: &str = "Sync rank & verification roles";
const REMOVE_ROLES_REASON: &str = "Remove outdated roles (group bindings or unverified)";
const NICKNAME_REASON: &str = "Syncing nickname to Roblox username";

/// Whose roles a run synchronizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncTarget {
    /// The invoking member, through their own linked identity.
    Caller,
    /// The member linked to an explicit external username.
    Username(String),
}

impl SyncTarget {
    /// Builds a target from an optional username override.
    #[must_use]
    pub fn from_override(username: Option<String>) -> Self {
        match username.map(|value| value.trim().to_owned()) {
            Some(value) if !value.is_empty() => Self::Username(value),
            _ => Self::Caller,
        }
    }
}

/// Result of one synchronization run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    /// External username the run resolved.
    pub username: String,
    /// Synchronized member.
    pub member_id: MemberId,
    /// Rank of the member in the bound group.
    pub rank: GroupRank,
    /// Matched catalog role name, or [`NO_GROUP_ROLE`].
    pub group_role_name: String,
    /// Roles granted by this run.
    pub added: BTreeSet<RoleId>,
    /// Roles revoked by this run.
    pub removed: BTreeSet<RoleId>,
    /// Whether the nickname was changed.
    pub nickname_updated: bool,
}

/// Applies rank, verification and premium roles to guild members.
#[derive(Clone)]
pub struct RoleSyncService {
    store: Arc<dyn BindingStore>,
    group_platform: Arc<dyn GroupPlatformClient>,
    identity_links: Arc<dyn IdentityLinkRepository>,
    chat_platform: Arc<dyn ChatPlatformClient>,
    premium: Option<(Arc<dyn PremiumEntitlementSource>, RoleId)>,
}

impl RoleSyncService {
    /// Creates a role sync service without premium roles.
    #[must_use]
    pub fn new(
        store: Arc<dyn BindingStore>,
        group_platform: Arc<dyn GroupPlatformClient>,
        identity_links: Arc<dyn IdentityLinkRepository>,
        chat_platform: Arc<dyn ChatPlatformClient>,
    ) -> Self {
        Self {
            store,
            group_platform,
            identity_links,
            chat_platform,
            premium: None,
        }
    }

    /// Grants `premium_role_id` to members the entitlement source lists.
    #[must_use]
    pub fn with_premium_entitlements(
        mut self,
        source: Arc<dyn PremiumEntitlementSource>,
        premium_role_id: RoleId,
    ) -> Self {
        self.premium = Some((source, premium_role_id));
        self
    }

    /// Synchronizes one member of the actor's guild.
    pub async fn synchronize(
        &self,
        actor: &InteractionActor,
        target: SyncTarget,
    ) -> Result<SyncOutcome, SyncError> {
        let guild_id = actor.guild_id();
        let configuration = self
            .store
            .find_configuration(guild_id)
            .await
            .map_err(SyncError::StoreUnavailable)?
            .ok_or(SyncError::NotConfigured)?;

        let (member_id, username) = self.resolve_target(actor, target).await?;

        let user_id = self
            .group_platform
            .find_user_id(&username)
            .await
            .map_err(|error| SyncError::ExternalUserNotFound {
                username: username.clone(),
                reason: error.to_string(),
            })?
            .ok_or_else(|| SyncError::ExternalUserNotFound {
                username: username.clone(),
                reason: "no such user".to_owned(),
            })?;

        let rank = self
            .group_platform
            .rank_in_group(configuration.group_id(), user_id)
            .await
            .map_err(SyncError::RankFetchFailed)?;
        let catalog = self
            .group_platform
            .list_group_roles(configuration.group_id())
            .await
            .map_err(SyncError::RoleCatalogFetchFailed)?;
        let matched_role = match_rank(&catalog, rank);

        let premium_role_id = self.premium_role_for(&member_id).await;

        let member = self
            .chat_platform
            .fetch_member(guild_id, &member_id)
            .await
            .map_err(SyncError::MemberFetchFailed)?
            .ok_or_else(|| SyncError::MemberNotFound {
                member_id: member_id.clone(),
            })?;

        let diff = RoleDiff::compute(RoleDiffInput {
            configuration: &configuration,
            matched_role,
            has_linked_identity: true,
            premium_role_id: premium_role_id.as_ref(),
            held_role_ids: &member.role_ids,
        });

        if !diff.to_add().is_empty() {
            let to_add: Vec<RoleId> = diff.to_add().iter().cloned().collect();
            self.chat_platform
                .add_roles(guild_id, &member_id, &to_add, ADD_ROLES_REASON)
                .await
                .map_err(SyncError::RoleApplyFailed)?;
        }

        if !diff.to_remove().is_empty() {
            let to_remove: Vec<RoleId> = diff.to_remove().iter().cloned().collect();
            self.chat_platform
                .remove_roles(guild_id, &member_id, &to_remove, REMOVE_ROLES_REASON)
                .await
                .map_err(SyncError::RoleApplyFailed)?;
        }

        let nickname_updated = if member.nickname.as_deref() == Some(username.as_str()) {
            false
        } else {
            match self
                .chat_platform
                .set_nickname(guild_id, &member_id, &username, NICKNAME_REASON)
                .await
            {
                Ok(()) => true,
                Err(error) => {
                    tracing::warn!(
                        guild_id = %guild_id,
                        member_id = %member_id,
                        error = %error,
                        "nickname sync failed"
                    );
                    false
                }
            }
        };

        let group_role_name = matched_role
            .map(|role| role.name.clone())
            .unwrap_or_else(|| NO_GROUP_ROLE.to_owned());

        tracing::info!(
            guild_id = %guild_id,
            group_id = %configuration.group_id(),
            member_id = %member_id,
            rank = rank.get(),
            added = diff.to_add().len(),
            removed = diff.to_remove().len(),
            "member roles synchronized"
        );

        Ok(SyncOutcome {
            username,
            member_id,
            rank,
            group_role_name,
            added: diff.to_add().clone(),
            removed: diff.to_remove().clone(),
            nickname_updated,
        })
    }

    async fn resolve_target(
        &self,
        actor: &InteractionActor,
        target: SyncTarget,
    ) -> Result<(MemberId, String), SyncError> {
        match target {
            SyncTarget::Caller => {
                let username = self
                    .identity_links
                    .find_linked_username(actor.member_id())
                    .await
                    .map_err(SyncError::IdentityLookupFailed)?
                    .ok_or(SyncError::CallerNotLinked)?;
                Ok((actor.member_id().clone(), username))
            }
            SyncTarget::Username(username) => {
                if let Some(member_id) = self
                    .identity_links
                    .find_member_by_username(&username)
                    .await
                    .map_err(SyncError::IdentityLookupFailed)?
                {
                    return Ok((member_id, username));
                }

                // Links may be stored with different casing than typed.
                let links = self
                    .identity_links
                    .list_links()
                    .await
                    .map_err(SyncError::IdentityLookupFailed)?;
                links
                    .into_iter()
                    .find(|link| link.username.eq_ignore_ascii_case(&username))
                    .map(|link| (link.member_id, link.username))
                    .ok_or(SyncError::NoLinkedMember { username })
            }
        }
    }

    /// Returns the premium role when the member is entitled to it.
    ///
    /// A failed lookup is logged and treated as not entitled.
    async fn premium_role_for(&self, member_id: &MemberId) -> Option<RoleId> {
        let (source, premium_role_id) = self.premium.as_ref()?;

        match source.is_premium_member(member_id).await {
            Ok(true) => Some(premium_role_id.clone()),
            Ok(false) => None,
            Err(error) => {
                tracing::warn!(
                    member_id = %member_id,
                    error = %error,
                    "premium entitlement lookup failed; treating member as not premium"
                );
                None
            }
        }
    }
}
