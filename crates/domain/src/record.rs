use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rankbind_core::{AppError, GuildId};
use serde::{Deserialize, Serialize};

use crate::{GroupId, GuildConfiguration, PendingKind, PendingRequest};

/// Kind of record a guild can hold in the binding store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingRecordKind {
    /// Confirmed configuration.
    Configuration,
    /// Pending setup request.
    PendingSetup,
    /// Pending transfer request.
    PendingTransfer,
}

impl BindingRecordKind {
    /// Returns the stable key prefix for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "config",
            Self::PendingSetup => "pending_setup",
            Self::PendingTransfer => "pending_transfer",
        }
    }

    /// Returns the record kind that stores one pending slot.
    #[must_use]
    pub fn for_pending(kind: PendingKind) -> Self {
        match kind {
            PendingKind::Setup => Self::PendingSetup,
            PendingKind::Transfer => Self::PendingTransfer,
        }
    }

    /// Returns all record kinds.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[BindingRecordKind] = &[
            BindingRecordKind::Configuration,
            BindingRecordKind::PendingSetup,
            BindingRecordKind::PendingTransfer,
        ];

        ALL
    }
}

impl FromStr for BindingRecordKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "config" => Ok(Self::Configuration),
            "pending_setup" => Ok(Self::PendingSetup),
            "pending_transfer" => Ok(Self::PendingTransfer),
            _ => Err(AppError::Validation(format!(
                "unknown binding record kind '{value}'"
            ))),
        }
    }
}

/// Storage key of one record: `{kind}:{guild_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingKey {
    kind: BindingRecordKind,
    guild_id: GuildId,
}

impl BindingKey {
    /// Creates a key.
    #[must_use]
    pub fn new(kind: BindingRecordKind, guild_id: GuildId) -> Self {
        Self { kind, guild_id }
    }

    /// Key of the configuration record for a guild.
    #[must_use]
    pub fn configuration(guild_id: &GuildId) -> Self {
        Self::new(BindingRecordKind::Configuration, guild_id.clone())
    }

    /// Key of one pending slot for a guild.
    #[must_use]
    pub fn pending(kind: PendingKind, guild_id: &GuildId) -> Self {
        Self::new(BindingRecordKind::for_pending(kind), guild_id.clone())
    }

    /// Returns the record kind.
    #[must_use]
    pub fn kind(&self) -> BindingRecordKind {
        self.kind
    }

    /// Returns the owning guild.
    #[must_use]
    pub fn guild_id(&self) -> &GuildId {
        &self.guild_id
    }

    /// Parses a rendered key. Returns `None` for keys of other subsystems.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let (kind, guild_id) = value.split_once(':')?;
        let kind = BindingRecordKind::from_str(kind).ok()?;
        let guild_id = GuildId::new(guild_id).ok()?;
        Some(Self { kind, guild_id })
    }
}

impl Display for BindingKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}:{}", self.kind.as_str(), self.guild_id)
    }
}

/// One persisted record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingRecord {
    /// Confirmed configuration.
    Configuration(GuildConfiguration),
    /// Pending setup request.
    PendingSetup(PendingRequest),
    /// Pending transfer request.
    PendingTransfer(PendingRequest),
}

impl BindingRecord {
    /// Returns the record kind.
    #[must_use]
    pub fn kind(&self) -> BindingRecordKind {
        match self {
            Self::Configuration(_) => BindingRecordKind::Configuration,
            Self::PendingSetup(_) => BindingRecordKind::PendingSetup,
            Self::PendingTransfer(_) => BindingRecordKind::PendingTransfer,
        }
    }

    /// Returns the external group the record claims.
    #[must_use]
    pub fn group_id(&self) -> &GroupId {
        match self {
            Self::Configuration(configuration) => configuration.group_id(),
            Self::PendingSetup(request) | Self::PendingTransfer(request) => request.group_id(),
        }
    }

    /// Wraps a pending request in the record variant of its slot.
    #[must_use]
    pub fn pending(kind: PendingKind, request: PendingRequest) -> Self {
        match kind {
            PendingKind::Setup => Self::PendingSetup(request),
            PendingKind::Transfer => Self::PendingTransfer(request),
        }
    }

    /// Serializes the record payload as JSON.
    pub fn to_json(&self) -> Result<String, AppError> {
        let encoded = match self {
            Self::Configuration(configuration) => serde_json::to_string(configuration),
            Self::PendingSetup(request) | Self::PendingTransfer(request) => {
                serde_json::to_string(request)
            }
        };

        encoded.map_err(|error| {
            AppError::Internal(format!(
                "failed to encode {} record: {error}",
                self.kind().as_str()
            ))
        })
    }

    /// Decodes a JSON payload stored under a key of `kind`.
    pub fn from_json(kind: BindingRecordKind, payload: &str) -> Result<Self, AppError> {
        let decoded = match kind {
            BindingRecordKind::Configuration => {
                serde_json::from_str::<GuildConfiguration>(payload).map(Self::Configuration)
            }
            BindingRecordKind::PendingSetup => {
                serde_json::from_str::<PendingRequest>(payload).map(Self::PendingSetup)
            }
            BindingRecordKind::PendingTransfer => {
                serde_json::from_str::<PendingRequest>(payload).map(Self::PendingTransfer)
            }
        };

        decoded.map_err(|error| {
            AppError::Internal(format!(
                "failed to decode {} record: {error}",
                kind.as_str()
            ))
        })
    }
}

/// A record together with the guild that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingEntry {
    /// Owning guild.
    pub guild_id: GuildId,
    /// Stored record.
    pub record: BindingRecord,
}

/// Lifecycle state of a guild's binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingState {
    /// No configuration and no pending setup.
    NoBinding,
    /// A setup request waits for confirmation and no configuration exists.
    PendingSetup,
    /// A configuration exists and nothing is pending.
    Confirmed,
    /// A configuration exists and a transfer request waits for confirmation.
    PendingTransfer,
}

impl BindingState {
    /// Derives the state from the records a guild currently holds.
    #[must_use]
    pub fn derive(
        configuration: Option<&GuildConfiguration>,
        pending_setup: Option<&PendingRequest>,
        pending_transfer: Option<&PendingRequest>,
    ) -> Self {
        match (configuration, pending_setup, pending_transfer) {
            (Some(_), _, Some(_)) => Self::PendingTransfer,
            (Some(_), _, None) => Self::Confirmed,
            (None, Some(_), _) => Self::PendingSetup,
            (None, None, _) => Self::NoBinding,
        }
    }

    /// Returns a stable label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoBinding => "no_binding",
            Self::PendingSetup => "pending_setup",
            Self::Confirmed => "confirmed",
            Self::PendingTransfer => "pending_transfer",
        }
    }
}

#[cfg(test)]
mod tests {
    use rankbind_core::{GuildId, MemberId};

    use super::{BindingKey, BindingRecord, BindingRecordKind, BindingState};
    use crate::{GroupId, GuildConfiguration, PendingRequest};

    fn guild(value: &str) -> GuildId {
        GuildId::new(value).unwrap_or_else(|_| unreachable!())
    }

    fn pending_request() -> PendingRequest {
        PendingRequest::new(
            GroupId::new("77").unwrap_or_else(|_| unreachable!()),
            Some("KEY-1".to_owned()),
            MemberId::new("500").unwrap_or_else(|_| unreachable!()),
            "900",
        )
    }

    #[test]
    fn key_renders_and_parses() {
        let key = BindingKey::configuration(&guild("1234"));
        assert_eq!(key.to_string(), "config:1234");

        let parsed = BindingKey::parse("pending_transfer:1234");
        assert_eq!(
            parsed,
            Some(BindingKey::new(
                BindingRecordKind::PendingTransfer,
                guild("1234")
            ))
        );
    }

    #[test]
    fn foreign_keys_are_ignored() {
        assert!(BindingKey::parse("xp_1234").is_none());
        assert!(BindingKey::parse("level:1234").is_none());
        assert!(BindingKey::parse("config:").is_none());
    }

    #[test]
    fn pending_record_payload_uses_legacy_owner_field() {
        let record = BindingRecord::PendingSetup(pending_request());
        let encoded = record.to_json();
        assert!(encoded.is_ok());
        let encoded = encoded.unwrap_or_default();
        assert!(encoded.contains("\"ownerDiscordId\":\"500\""));

        let decoded = BindingRecord::from_json(BindingRecordKind::PendingSetup, encoded.as_str());
        assert_eq!(decoded.ok(), Some(record));
    }

    #[test]
    fn legacy_pending_record_without_timestamp_decodes() {
        let raw = r#"{"groupId":"77","premiumKey":null,"ownerDiscordId":"500","invokingChannelId":"900"}"#;
        let decoded = BindingRecord::from_json(BindingRecordKind::PendingSetup, raw);
        assert!(decoded.is_ok());
    }

    #[test]
    fn state_prefers_configuration_over_pending_setup() {
        let configuration =
            GuildConfiguration::new(GroupId::new("77").unwrap_or_else(|_| unreachable!()));
        let pending = pending_request();

        assert_eq!(
            BindingState::derive(Some(&configuration), Some(&pending), None),
            BindingState::Confirmed
        );
        assert_eq!(
            BindingState::derive(None, Some(&pending), None),
            BindingState::PendingSetup
        );
        assert_eq!(
            BindingState::derive(Some(&configuration), None, Some(&pending)),
            BindingState::PendingTransfer
        );
        assert_eq!(BindingState::derive(None, None, None), BindingState::NoBinding);
    }
}
