use rankbind_core::{GuildId, InteractionActor};
use rankbind_domain::{
    BindingRecordKind, GroupId, GroupSummary, GuildConfiguration, PendingKind, PendingRequest,
};

use crate::errors::SetupError;
use crate::ports::SetupNotification;

use super::{ActivationMode, RequestSetupInput, SetupReceipt, SetupService, store_unavailable};

impl SetupService {
    /// Files a setup request binding the actor's guild to an external group.
    ///
    /// Conflicts are checked before the ownership lookups so a doomed request
    /// never reaches the external platform, and again under the guild and
    /// group leases right before anything is written.
    pub async fn request_setup(
        &self,
        actor: &InteractionActor,
        input: RequestSetupInput,
    ) -> Result<SetupReceipt, SetupError> {
        let guild_id = actor.guild_id();
        let group_id = &input.group_id;
        let activation = input.activation.unwrap_or(self.default_activation);

        self.check_setup_conflicts(guild_id, group_id).await?;
        let group = self.verify_group_ownership(actor, group_id).await?;

        let request = PendingRequest::new(
            group_id.clone(),
            input.premium_key,
            actor.member_id().clone(),
            actor.channel_id(),
        );

        let leases = self
            .acquire_leases(guild_id, group_id, actor.member_id())
            .await?;
        let written = self.write_setup(guild_id, &request, activation).await;
        self.release_leases(leases).await;
        written?;

        tracing::info!(
            guild_id = %guild_id,
            group_id = %group_id,
            member_id = %actor.member_id(),
            activated = activation == ActivationMode::Immediate,
            "setup request filed"
        );

        let notification_delivered = self
            .notify_operators(guild_id, PendingKind::Setup, request)
            .await;

        Ok(SetupReceipt {
            guild_id: guild_id.clone(),
            kind: PendingKind::Setup,
            group_id: group_id.clone(),
            group_name: group.name,
            requester_id: actor.member_id().clone(),
            activated: activation == ActivationMode::Immediate,
            notification_delivered,
        })
    }

    /// Files a request to rebind an already configured guild to another group.
    ///
    /// Transfers always wait for confirmation; the requested activation mode
    /// is ignored.
    pub async fn request_transfer(
        &self,
        actor: &InteractionActor,
        input: RequestSetupInput,
    ) -> Result<SetupReceipt, SetupError> {
        let guild_id = actor.guild_id();
        let group_id = &input.group_id;

        self.check_transfer_conflicts(guild_id, group_id).await?;
        let group = self.verify_group_ownership(actor, group_id).await?;

        let request = PendingRequest::new(
            group_id.clone(),
            input.premium_key,
            actor.member_id().clone(),
            actor.channel_id(),
        );

        let leases = self
            .acquire_leases(guild_id, group_id, actor.member_id())
            .await?;
        let written = match self.check_transfer_conflicts(guild_id, group_id).await {
            Ok(()) => self
                .store
                .save_pending(guild_id, PendingKind::Transfer, request.clone())
                .await
                .map_err(store_unavailable),
            Err(error) => Err(error),
        };
        self.release_leases(leases).await;
        written?;

        tracing::info!(
            guild_id = %guild_id,
            group_id = %group_id,
            member_id = %actor.member_id(),
            "transfer request filed"
        );

        let notification_delivered = self
            .notify_operators(guild_id, PendingKind::Transfer, request)
            .await;

        Ok(SetupReceipt {
            guild_id: guild_id.clone(),
            kind: PendingKind::Transfer,
            group_id: group_id.clone(),
            group_name: group.name,
            requester_id: actor.member_id().clone(),
            activated: false,
            notification_delivered,
        })
    }

    async fn write_setup(
        &self,
        guild_id: &GuildId,
        request: &PendingRequest,
        activation: ActivationMode,
    ) -> Result<(), SetupError> {
        self.check_setup_conflicts(guild_id, request.group_id()).await?;

        self.store
            .save_pending(guild_id, PendingKind::Setup, request.clone())
            .await
            .map_err(store_unavailable)?;

        if activation == ActivationMode::Immediate {
            let configuration = GuildConfiguration::new(request.group_id().clone())
                .with_premium_key(request.premium_key().map(ToOwned::to_owned));
            if let Err(error) = self.store.save_configuration(guild_id, configuration).await {
                self.discard_pending_setup(guild_id).await;
                return Err(store_unavailable(error));
            }
        }

        Ok(())
    }

    /// Clears a pending setup left behind by a failed immediate activation.
    async fn discard_pending_setup(&self, guild_id: &GuildId) {
        if let Err(error) = self.store.clear_pending(guild_id, PendingKind::Setup).await {
            tracing::warn!(
                guild_id = %guild_id,
                error = %error,
                "failed to discard pending setup after configuration write failure"
            );
        }
    }

    /// Rejects requests for groups other guilds claim.
    async fn check_cross_guild_claims(
        &self,
        guild_id: &GuildId,
        group_id: &GroupId,
    ) -> Result<(), SetupError> {
        let claim = self
            .index
            .find_claim_by_other_guild(group_id, guild_id)
            .await
            .map_err(store_unavailable)?;

        match claim {
            Some((_, BindingRecordKind::Configuration)) => Err(SetupError::GroupAlreadyBound {
                group_id: group_id.clone(),
            }),
            Some(_) => Err(SetupError::GroupAlreadyPending {
                group_id: group_id.clone(),
            }),
            None => Ok(()),
        }
    }

    async fn check_setup_conflicts(
        &self,
        guild_id: &GuildId,
        group_id: &GroupId,
    ) -> Result<(), SetupError> {
        self.check_cross_guild_claims(guild_id, group_id).await?;

        if let Some(configuration) = self
            .store
            .find_configuration(guild_id)
            .await
            .map_err(store_unavailable)?
        {
            return Err(SetupError::AlreadyConfigured {
                same_group: configuration.group_id() == group_id,
                current_group_id: configuration.group_id().clone(),
            });
        }

        if let Some(pending) = self
            .store
            .find_pending(guild_id, PendingKind::Setup)
            .await
            .map_err(store_unavailable)?
        {
            return Err(SetupError::SetupAlreadyPending {
                same_group: pending.group_id() == group_id,
                pending_group_id: pending.group_id().clone(),
            });
        }

        Ok(())
    }

    async fn check_transfer_conflicts(
        &self,
        guild_id: &GuildId,
        group_id: &GroupId,
    ) -> Result<(), SetupError> {
        self.check_cross_guild_claims(guild_id, group_id).await?;

        let configuration = self
            .store
            .find_configuration(guild_id)
            .await
            .map_err(store_unavailable)?
            .ok_or(SetupError::NotConfigured)?;

        if configuration.group_id() == group_id {
            return Err(SetupError::AlreadyConfigured {
                current_group_id: group_id.clone(),
                same_group: true,
            });
        }

        if let Some(pending) = self
            .store
            .find_pending(guild_id, PendingKind::Transfer)
            .await
            .map_err(store_unavailable)?
        {
            return Err(SetupError::TransferAlreadyPending {
                same_group: pending.group_id() == group_id,
                pending_group_id: pending.group_id().clone(),
            });
        }

        Ok(())
    }

    /// Confirms the requester owns the group through their linked identity.
    async fn verify_group_ownership(
        &self,
        actor: &InteractionActor,
        group_id: &GroupId,
    ) -> Result<GroupSummary, SetupError> {
        let group = self
            .group_platform
            .find_group(group_id)
            .await
            .map_err(|error| SetupError::ExternalLookupFailed {
                group_id: group_id.clone(),
                reason: error.to_string(),
            })?
            .ok_or_else(|| SetupError::ExternalLookupFailed {
                group_id: group_id.clone(),
                reason: "group not found".to_owned(),
            })?;

        let username = self
            .identity_links
            .find_linked_username(actor.member_id())
            .await
            .map_err(SetupError::IdentityLookupFailed)?
            .ok_or(SetupError::IdentityNotLinked)?;

        let user_id = self
            .group_platform
            .find_user_id(&username)
            .await
            .map_err(|error| SetupError::IdentityResolutionFailed {
                username: username.clone(),
                reason: error.to_string(),
            })?
            .ok_or_else(|| SetupError::IdentityResolutionFailed {
                username: username.clone(),
                reason: "user not found".to_owned(),
            })?;

        if group.owner_id != Some(user_id) {
            tracing::info!(
                guild_id = %actor.guild_id(),
                group_id = %group_id,
                member_id = %actor.member_id(),
                "setup rejected: requester does not own the group"
            );
            return Err(SetupError::NotGroupOwner {
                group_id: group_id.clone(),
            });
        }

        Ok(group)
    }

    /// Posts the review request. Returns whether it was delivered.
    async fn notify_operators(
        &self,
        guild_id: &GuildId,
        kind: PendingKind,
        request: PendingRequest,
    ) -> bool {
        let Some(operator_notifier) = &self.operator_notifier else {
            return false;
        };

        let notification = SetupNotification::new(guild_id.clone(), kind, request);
        match operator_notifier.notify_request_filed(notification).await {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(
                    guild_id = %guild_id,
                    kind = kind.as_str(),
                    error = %error,
                    "failed to notify operators about filed request"
                );
                false
            }
        }
    }
}
