use rankbind_application::{BindingOverview, SetupReceipt, SyncOutcome};
use rankbind_core::AppError;
use rankbind_domain::{
    ConfigurationPatch, GroupRoleId, GuildConfiguration, PendingRequest, RoleBinding, RoleId,
};

use super::{
    BindingOverviewResponse, GuildConfigurationResponse, PendingRequestResponse, RoleBindingDto,
    SetupReceiptResponse, SyncOutcomeResponse, UpdateConfigurationRequest,
};

fn optional_role(role_id: Option<&RoleId>) -> Option<String> {
    role_id.map(|value| value.as_str().to_owned())
}

fn parse_optional_role(value: Option<Option<String>>) -> Result<Option<Option<RoleId>>, AppError> {
    match value {
        None => Ok(None),
        Some(None) => Ok(Some(None)),
        Some(Some(role_id)) if role_id.trim().is_empty() => Ok(Some(None)),
        Some(Some(role_id)) => RoleId::new(role_id).map(|role_id| Some(Some(role_id))),
    }
}

impl From<SetupReceipt> for SetupReceiptResponse {
    fn from(value: SetupReceipt) -> Self {
        Self {
            guild_id: value.guild_id.to_string(),
            kind: value.kind.as_str().to_owned(),
            group_id: value.group_id.to_string(),
            group_name: value.group_name,
            requester_id: value.requester_id.to_string(),
            activated: value.activated,
            notification_delivered: value.notification_delivered,
        }
    }
}

impl From<&RoleBinding> for RoleBindingDto {
    fn from(value: &RoleBinding) -> Self {
        Self {
            group_role_id: value.group_role_id().get(),
            role_id: value.role_id().as_str().to_owned(),
        }
    }
}

impl TryFrom<RoleBindingDto> for RoleBinding {
    type Error = AppError;

    fn try_from(value: RoleBindingDto) -> Result<Self, Self::Error> {
        Ok(RoleBinding::new(
            GroupRoleId::new(value.group_role_id),
            RoleId::new(value.role_id)?,
        ))
    }
}

impl From<&GuildConfiguration> for GuildConfigurationResponse {
    fn from(value: &GuildConfiguration) -> Self {
        Self {
            group_id: value.group_id().to_string(),
            premium_key: value.premium_key().map(str::to_owned),
            role_bindings: value.role_bindings().iter().map(RoleBindingDto::from).collect(),
            verification_role_id: optional_role(value.verification_role_id()),
            unverified_role_id: optional_role(value.unverified_role_id()),
            bypass_role_id: optional_role(value.bypass_role_id()),
        }
    }
}

impl From<&PendingRequest> for PendingRequestResponse {
    fn from(value: &PendingRequest) -> Self {
        Self {
            group_id: value.group_id().to_string(),
            premium_key: value.premium_key().map(str::to_owned),
            owner_id: value.owner_id().to_string(),
            invoking_channel_id: value.invoking_channel_id().to_owned(),
            requested_at: value.requested_at().to_rfc3339(),
        }
    }
}

impl From<BindingOverview> for BindingOverviewResponse {
    fn from(value: BindingOverview) -> Self {
        Self {
            guild_id: value.guild_id.to_string(),
            state: value.state.as_str().to_owned(),
            configuration: value
                .configuration
                .as_ref()
                .map(GuildConfigurationResponse::from),
            pending_setup: value.pending_setup.as_ref().map(PendingRequestResponse::from),
            pending_transfer: value
                .pending_transfer
                .as_ref()
                .map(PendingRequestResponse::from),
        }
    }
}

impl TryFrom<UpdateConfigurationRequest> for ConfigurationPatch {
    type Error = AppError;

    fn try_from(value: UpdateConfigurationRequest) -> Result<Self, Self::Error> {
        let role_bindings = value
            .role_bindings
            .map(|bindings| {
                bindings
                    .into_iter()
                    .map(RoleBinding::try_from)
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        Ok(ConfigurationPatch {
            role_bindings,
            verification_role_id: parse_optional_role(value.verification_role_id)?,
            unverified_role_id: parse_optional_role(value.unverified_role_id)?,
            bypass_role_id: parse_optional_role(value.bypass_role_id)?,
            premium_key: value.premium_key,
        })
    }
}

impl From<SyncOutcome> for SyncOutcomeResponse {
    fn from(value: SyncOutcome) -> Self {
        Self {
            username: value.username,
            member_id: value.member_id.to_string(),
            rank: value.rank.get(),
            group_role_name: value.group_role_name,
            added: value.added.iter().map(ToString::to_string).collect(),
            removed: value.removed.iter().map(ToString::to_string).collect(),
            nickname_updated: value.nickname_updated,
        }
    }
}
