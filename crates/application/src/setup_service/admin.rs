use rankbind_core::GuildId;
use rankbind_domain::{BindingState, ConfigurationPatch, GuildConfiguration, PendingKind};

use crate::errors::SetupError;

use super::{BindingOverview, SetupService, store_unavailable};

impl SetupService {
    /// Merges an administrative patch into the guild's configuration.
    ///
    /// The bound group never changes here. Saving supersedes any pending
    /// request of the guild.
    pub async fn update_configuration(
        &self,
        guild_id: &GuildId,
        patch: ConfigurationPatch,
    ) -> Result<GuildConfiguration, SetupError> {
        let current = self
            .store
            .find_configuration(guild_id)
            .await
            .map_err(store_unavailable)?
            .ok_or(SetupError::NotConfigured)?;

        let updated = current
            .apply_patch(patch)
            .map_err(SetupError::InvalidConfiguration)?;

        self.store
            .save_configuration(guild_id, updated.clone())
            .await
            .map_err(store_unavailable)?;

        tracing::info!(
            guild_id = %guild_id,
            group_id = %updated.group_id(),
            role_bindings = updated.role_bindings().len(),
            "configuration updated"
        );

        Ok(updated)
    }

    /// Removes the configuration and both pending requests of a guild.
    ///
    /// Returns whether a configuration existed.
    pub async fn remove_configuration(&self, guild_id: &GuildId) -> Result<bool, SetupError> {
        let existed = self
            .store
            .find_configuration(guild_id)
            .await
            .map_err(store_unavailable)?
            .is_some();

        self.store
            .delete_configuration(guild_id)
            .await
            .map_err(store_unavailable)?;
        for kind in [PendingKind::Setup, PendingKind::Transfer] {
            self.store
                .clear_pending(guild_id, kind)
                .await
                .map_err(store_unavailable)?;
        }

        tracing::info!(guild_id = %guild_id, existed, "configuration removed");
        Ok(existed)
    }

    /// Reports every record the guild holds and its lifecycle state.
    pub async fn binding_state(&self, guild_id: &GuildId) -> Result<BindingOverview, SetupError> {
        let configuration = self
            .store
            .find_configuration(guild_id)
            .await
            .map_err(store_unavailable)?;
        let pending_setup = self
            .store
            .find_pending(guild_id, PendingKind::Setup)
            .await
            .map_err(store_unavailable)?;
        let pending_transfer = self
            .store
            .find_pending(guild_id, PendingKind::Transfer)
            .await
            .map_err(store_unavailable)?;

        Ok(BindingOverview {
            guild_id: guild_id.clone(),
            state: BindingState::derive(
                configuration.as_ref(),
                pending_setup.as_ref(),
                pending_transfer.as_ref(),
            ),
            configuration,
            pending_setup,
            pending_transfer,
        })
    }
}
