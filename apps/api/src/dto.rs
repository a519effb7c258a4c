use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

mod conversions;

/// Readiness of one backing service.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-dependency-status.ts"
)]
pub struct HealthDependencyStatus {
    pub status: &'static str,
    pub detail: Option<String>,
}

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ready: bool,
    pub redis: HealthDependencyStatus,
    pub postgres: HealthDependencyStatus,
}

/// Incoming payload for setup and transfer requests.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/request-setup-request.ts"
)]
pub struct RequestSetupRequest {
    pub requester_id: String,
    pub channel_id: String,
    pub group_id: String,
    #[serde(default)]
    pub premium_key: Option<String>,
    #[serde(default)]
    pub activate_immediately: Option<bool>,
}

/// Incoming payload for operator confirmations.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/confirm-request.ts"
)]
pub struct ConfirmRequest {
    pub operator_id: String,
}

/// API representation of a filed setup or transfer request.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/setup-receipt-response.ts"
)]
pub struct SetupReceiptResponse {
    pub guild_id: String,
    pub kind: String,
    pub group_id: String,
    pub group_name: String,
    pub requester_id: String,
    pub activated: bool,
    pub notification_delivered: bool,
}

/// One group-role to chat-role mapping.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-binding-dto.ts"
)]
pub struct RoleBindingDto {
    pub group_role_id: u64,
    pub role_id: String,
}

/// API representation of a confirmed configuration.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/guild-configuration-response.ts"
)]
pub struct GuildConfigurationResponse {
    pub group_id: String,
    pub premium_key: Option<String>,
    pub role_bindings: Vec<RoleBindingDto>,
    pub verification_role_id: Option<String>,
    pub unverified_role_id: Option<String>,
    pub bypass_role_id: Option<String>,
}

/// API representation of a pending request.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/pending-request-response.ts"
)]
pub struct PendingRequestResponse {
    pub group_id: String,
    pub premium_key: Option<String>,
    pub owner_id: String,
    pub invoking_channel_id: String,
    pub requested_at: String,
}

/// Binding state of one guild.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/binding-overview-response.ts"
)]
pub struct BindingOverviewResponse {
    pub guild_id: String,
    pub state: String,
    pub configuration: Option<GuildConfigurationResponse>,
    pub pending_setup: Option<PendingRequestResponse>,
    pub pending_transfer: Option<PendingRequestResponse>,
}

/// Incoming payload for administrative configuration updates.
///
/// Absent fields keep the stored value; an explicit `null` clears an
/// optional role.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-configuration-request.ts"
)]
pub struct UpdateConfigurationRequest {
    #[serde(default)]
    pub role_bindings: Option<Vec<RoleBindingDto>>,
    #[serde(default, deserialize_with = "present_field")]
    pub verification_role_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "present_field")]
    pub unverified_role_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "present_field")]
    pub bypass_role_id: Option<Option<String>>,
    #[serde(default)]
    pub premium_key: Option<String>,
}

/// Result of an explicit configuration removal.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/remove-configuration-response.ts"
)]
pub struct RemoveConfigurationResponse {
    pub removed: bool,
}

/// Incoming payload for a role sync run.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/sync-request.ts"
)]
pub struct SyncRequest {
    pub requester_id: String,
    pub channel_id: String,
    #[serde(default)]
    pub roblox_username: Option<String>,
}

/// Result of a role sync run.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/sync-outcome-response.ts"
)]
pub struct SyncOutcomeResponse {
    pub username: String,
    pub member_id: String,
    pub rank: u8,
    pub group_role_name: String,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub nickname_updated: bool,
}

// Distinguishes an explicit `null` from an absent field.
fn present_field<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}
