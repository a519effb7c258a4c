use chrono::{DateTime, Utc};
use rankbind_core::MemberId;
use serde::{Deserialize, Serialize};

use crate::GroupId;

/// Which pending slot a request occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingKind {
    /// First binding of an unbound guild.
    Setup,
    /// Rebinding of an already configured guild to another group.
    Transfer,
}

impl PendingKind {
    /// Returns a stable label for logs and storage.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Transfer => "transfer",
        }
    }
}

/// A setup or transfer request waiting for operator confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRequest {
    group_id: GroupId,
    #[serde(default)]
    premium_key: Option<String>,
    #[serde(rename = "ownerDiscordId")]
    owner_id: MemberId,
    invoking_channel_id: String,
    #[serde(default = "Utc::now")]
    requested_at: DateTime<Utc>,
}

impl PendingRequest {
    /// Creates a pending request stamped with the current time.
    #[must_use]
    pub fn new(
        group_id: GroupId,
        premium_key: Option<String>,
        owner_id: MemberId,
        invoking_channel_id: impl Into<String>,
    ) -> Self {
        Self {
            group_id,
            premium_key: premium_key.and_then(|value| {
                let trimmed = value.trim().to_owned();
                (!trimmed.is_empty()).then_some(trimmed)
            }),
            owner_id,
            invoking_channel_id: invoking_channel_id.into(),
            requested_at: Utc::now(),
        }
    }

    /// Returns the requested external group.
    #[must_use]
    pub fn group_id(&self) -> &GroupId {
        &self.group_id
    }

    /// Returns the optional premium key.
    #[must_use]
    pub fn premium_key(&self) -> Option<&str> {
        self.premium_key.as_deref()
    }

    /// Returns the member who filed the request.
    #[must_use]
    pub fn owner_id(&self) -> &MemberId {
        &self.owner_id
    }

    /// Returns the channel the request was filed from.
    #[must_use]
    pub fn invoking_channel_id(&self) -> &str {
        self.invoking_channel_id.as_str()
    }

    /// Returns when the request was filed.
    #[must_use]
    pub fn requested_at(&self) -> DateTime<Utc> {
        self.requested_at
    }
}
