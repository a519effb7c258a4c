use rankbind_core::{GuildId, MemberId};
use rankbind_domain::{BindingRecordKind, GuildConfiguration, PendingKind, PendingRequest};

use crate::errors::SetupError;

use super::{SetupService, store_unavailable};

impl SetupService {
    /// Confirms a pending setup after an operator added the bot to the group.
    ///
    /// Confirming a guild whose configuration is already active succeeds
    /// without writing.
    pub async fn confirm_setup(
        &self,
        guild_id: &GuildId,
        operator_id: &MemberId,
    ) -> Result<GuildConfiguration, SetupError> {
        let Some(request) = self
            .store
            .find_pending(guild_id, PendingKind::Setup)
            .await
            .map_err(store_unavailable)?
        else {
            return self
                .store
                .find_configuration(guild_id)
                .await
                .map_err(store_unavailable)?
                .ok_or(SetupError::NoPendingRequest {
                    kind: PendingKind::Setup,
                });
        };

        let configuration = match self
            .store
            .find_configuration(guild_id)
            .await
            .map_err(store_unavailable)?
        {
            Some(existing) if existing.group_id() == request.group_id() => existing,
            _ => GuildConfiguration::new(request.group_id().clone())
                .with_premium_key(request.premium_key().map(ToOwned::to_owned)),
        };

        self.promote(guild_id, operator_id, &request, configuration.clone())
            .await?;

        tracing::info!(
            guild_id = %guild_id,
            group_id = %request.group_id(),
            operator_id = %operator_id,
            "setup confirmed"
        );

        Ok(configuration)
    }

    /// Rebinds a configured guild to the group of its pending transfer.
    pub async fn confirm_transfer(
        &self,
        guild_id: &GuildId,
        operator_id: &MemberId,
    ) -> Result<GuildConfiguration, SetupError> {
        let request = self
            .store
            .find_pending(guild_id, PendingKind::Transfer)
            .await
            .map_err(store_unavailable)?
            .ok_or(SetupError::NoPendingRequest {
                kind: PendingKind::Transfer,
            })?;

        let current = self
            .store
            .find_configuration(guild_id)
            .await
            .map_err(store_unavailable)?
            .ok_or(SetupError::NotConfigured)?;

        let configuration = current.rebind_to(
            request.group_id().clone(),
            request.premium_key().map(ToOwned::to_owned),
        );

        self.promote(guild_id, operator_id, &request, configuration.clone())
            .await?;

        tracing::info!(
            guild_id = %guild_id,
            previous_group_id = %current.group_id(),
            group_id = %request.group_id(),
            operator_id = %operator_id,
            "transfer confirmed"
        );

        Ok(configuration)
    }

    /// Writes `configuration` under the leases unless another guild bound the
    /// group in the meantime.
    async fn promote(
        &self,
        guild_id: &GuildId,
        operator_id: &MemberId,
        request: &PendingRequest,
        configuration: GuildConfiguration,
    ) -> Result<(), SetupError> {
        let group_id = request.group_id();
        let leases = self
            .acquire_leases(guild_id, group_id, operator_id)
            .await?;

        let written = match self.index.find_claim_by_other_guild(group_id, guild_id).await {
            Ok(Some((_, BindingRecordKind::Configuration))) => {
                Err(SetupError::GroupAlreadyBound {
                    group_id: group_id.clone(),
                })
            }
            Ok(_) => self
                .store
                .save_configuration(guild_id, configuration)
                .await
                .map_err(store_unavailable),
            Err(error) => Err(store_unavailable(error)),
        };

        self.release_leases(leases).await;
        written
    }
}
