use std::fmt::{Display, Formatter};

use rankbind_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Chat-platform role identifier inside one guild.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleId(String);

impl RoleId {
    /// Creates a validated role identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation("role id must not be empty".to_owned()));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the underlying identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for RoleId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoleId> for String {
    fn from(value: RoleId) -> Self {
        value.0
    }
}

impl Display for RoleId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// External game-platform group identifier.
///
/// Group ids are positive decimal integers. The textual form is canonical
/// (no sign, no leading zeros) so `"077"` and `"77"` name the same group
/// everywhere ids are compared, keyed or sent upstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GroupId {
    value: u64,
    text: String,
}

impl GroupId {
    /// Creates a validated group identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(AppError::Validation("group id must not be empty".to_owned()));
        }

        if !trimmed.chars().all(|character| character.is_ascii_digit()) {
            return Err(AppError::Validation(format!(
                "group id '{trimmed}' must be a decimal number"
            )));
        }

        let parsed = trimmed.parse::<u64>().map_err(|_| {
            AppError::Validation(format!("group id '{trimmed}' is out of range"))
        })?;
        if parsed == 0 {
            return Err(AppError::Validation("group id must be positive".to_owned()));
        }

        Ok(Self {
            value: parsed,
            text: parsed.to_string(),
        })
    }

    /// Returns the canonical textual identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    /// Returns the numeric identifier.
    #[must_use]
    pub fn get(&self) -> u64 {
        self.value
    }
}

impl TryFrom<String> for GroupId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GroupId> for String {
    fn from(value: GroupId) -> Self {
        value.text
    }
}

impl Display for GroupId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.text.as_str())
    }
}

/// Numeric external-platform user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalUserId(u64);

impl ExternalUserId {
    /// Wraps a raw external user id.
    #[must_use]
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw id.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl Display for ExternalUserId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Identifier of one role in an external group's role catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupRoleId(u64);

impl GroupRoleId {
    /// Wraps a raw catalog role id.
    #[must_use]
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw id.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl Display for GroupRoleId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Rank value (0-255) of a member inside an external group. Zero means "not a member".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupRank(u8);

impl GroupRank {
    /// Rank reported for users outside the group.
    pub const GUEST: Self = Self(0);

    /// Wraps a raw rank value.
    #[must_use]
    pub fn new(value: u8) -> Self {
        Self(value)
    }

    /// Returns the raw rank value.
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Display for GroupRank {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{GroupId, RoleId};

    #[test]
    fn group_id_accepts_numeric_ids() {
        let group_id = GroupId::new("  4821937 ");
        assert!(group_id.is_ok());
        assert_eq!(group_id.unwrap_or_else(|_| unreachable!()).as_str(), "4821937");
    }

    #[test]
    fn group_id_rejects_path_characters() {
        assert!(GroupId::new("12/../34").is_err());
        assert!(GroupId::new("12:34").is_err());
        assert!(GroupId::new("").is_err());
        assert!(GroupId::new("-77").is_err());
        assert!(GroupId::new("0").is_err());
    }

    #[test]
    fn group_id_drops_leading_zeros() {
        let padded = GroupId::new("04242").unwrap_or_else(|_| unreachable!());
        let plain = GroupId::new("4242").unwrap_or_else(|_| unreachable!());

        assert_eq!(padded, plain);
        assert_eq!(padded.as_str(), "4242");
        assert_eq!(padded.get(), 4242);
    }

    #[test]
    fn role_id_rejects_blank_values() {
        assert!(RoleId::new("   ").is_err());
    }
}
