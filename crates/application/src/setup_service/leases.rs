use rankbind_core::{GuildId, MemberId};
use rankbind_domain::GroupId;

use crate::errors::SetupError;
use crate::ports::SetupLease;

use super::{SetupService, store_unavailable};

/// Leases held across one check-then-write sequence.
pub(super) struct HeldLeases {
    guild: SetupLease,
    group: SetupLease,
}

pub(super) fn guild_scope(guild_id: &GuildId) -> String {
    format!("setup:guild:{guild_id}")
}

pub(super) fn group_scope(group_id: &GroupId) -> String {
    format!("setup:group:{group_id}")
}

impl SetupService {
    /// Acquires the guild lease, then the group lease.
    ///
    /// Fails with `SetupInProgress` when either scope is held elsewhere. The
    /// guild lease is released again when the group lease cannot be taken.
    pub(super) async fn acquire_leases(
        &self,
        guild_id: &GuildId,
        group_id: &GroupId,
        holder_id: &MemberId,
    ) -> Result<HeldLeases, SetupError> {
        let holder_id = format!("{guild_id}:{holder_id}");

        let guild = self
            .lock_coordinator
            .try_acquire(&guild_scope(guild_id), &holder_id, self.lock_seconds)
            .await
            .map_err(store_unavailable)?
            .ok_or_else(|| SetupError::SetupInProgress {
                group_id: group_id.clone(),
            })?;

        let group = match self
            .lock_coordinator
            .try_acquire(&group_scope(group_id), &holder_id, self.lock_seconds)
            .await
        {
            Ok(Some(lease)) => lease,
            Ok(None) => {
                self.release_lease(&guild).await;
                return Err(SetupError::SetupInProgress {
                    group_id: group_id.clone(),
                });
            }
            Err(error) => {
                self.release_lease(&guild).await;
                return Err(store_unavailable(error));
            }
        };

        Ok(HeldLeases { guild, group })
    }

    pub(super) async fn release_leases(&self, leases: HeldLeases) {
        self.release_lease(&leases.group).await;
        self.release_lease(&leases.guild).await;
    }

    async fn release_lease(&self, lease: &SetupLease) {
        // An unreleased lease expires on its own.
        if let Err(error) = self.lock_coordinator.release(lease).await {
            tracing::warn!(
                scope_key = %lease.scope_key,
                error = %error,
                "failed to release setup lease"
            );
        }
    }
}
