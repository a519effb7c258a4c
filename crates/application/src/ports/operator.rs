use async_trait::async_trait;
use rankbind_core::{AppResult, GuildId};
use rankbind_domain::{PendingKind, PendingRequest};

/// Review request posted to the operators after a setup or transfer is filed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupNotification {
    /// Guild that filed the request.
    pub guild_id: GuildId,
    /// Slot the request occupies.
    pub kind: PendingKind,
    /// The filed request.
    pub request: PendingRequest,
    /// Identifier of the confirmation control operators click.
    pub confirmation_id: String,
}

impl SetupNotification {
    /// Builds the notification for a filed request.
    #[must_use]
    pub fn new(guild_id: GuildId, kind: PendingKind, request: PendingRequest) -> Self {
        let confirmation_id = match kind {
            PendingKind::Setup => format!("confirm_join_{guild_id}"),
            PendingKind::Transfer => format!("confirm_transfer_{guild_id}"),
        };

        Self {
            guild_id,
            kind,
            request,
            confirmation_id,
        }
    }
}

/// Delivery port for the operator-review location.
#[async_trait]
pub trait OperatorNotifier: Send + Sync {
    /// Posts a review request.
    async fn notify_request_filed(&self, notification: SetupNotification) -> AppResult<()>;
}
