//! Confirmed guild configuration and its role bindings.
//!
//! Records serialize with camelCase field names so configurations written by
//! earlier deployments of the bot decode unchanged.

use std::collections::BTreeSet;

use rankbind_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::{GroupId, GroupRoleId, RoleId};

/// Mapping from one external group role to one local chat-platform role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleBinding {
    group_role_id: GroupRoleId,
    #[serde(rename = "discordRoleId")]
    role_id: RoleId,
}

impl RoleBinding {
    /// Creates a role binding.
    #[must_use]
    pub fn new(group_role_id: GroupRoleId, role_id: RoleId) -> Self {
        Self {
            group_role_id,
            role_id,
        }
    }

    /// Returns the external catalog role this binding matches.
    #[must_use]
    pub fn group_role_id(&self) -> GroupRoleId {
        self.group_role_id
    }

    /// Returns the local role granted for the matched catalog role.
    #[must_use]
    pub fn role_id(&self) -> &RoleId {
        &self.role_id
    }
}

/// Confirmed binding of one guild to one external group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StoredConfiguration")]
pub struct GuildConfiguration {
    group_id: GroupId,
    premium_key: Option<String>,
    role_bindings: Vec<RoleBinding>,
    verification_role_id: Option<RoleId>,
    unverified_role_id: Option<RoleId>,
    bypass_role_id: Option<RoleId>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredConfiguration {
    group_id: GroupId,
    #[serde(default)]
    premium_key: Option<String>,
    #[serde(default)]
    role_bindings: Vec<RoleBinding>,
    #[serde(default)]
    verification_role_id: Option<RoleId>,
    #[serde(default)]
    unverified_role_id: Option<RoleId>,
    #[serde(default)]
    bypass_role_id: Option<RoleId>,
}

impl TryFrom<StoredConfiguration> for GuildConfiguration {
    type Error = AppError;

    fn try_from(value: StoredConfiguration) -> Result<Self, Self::Error> {
        let configuration = Self {
            group_id: value.group_id,
            premium_key: normalize_premium_key(value.premium_key),
            role_bindings: Vec::new(),
            verification_role_id: value.verification_role_id,
            unverified_role_id: value.unverified_role_id,
            bypass_role_id: value.bypass_role_id,
        };

        configuration.with_role_bindings(value.role_bindings)
    }
}

impl GuildConfiguration {
    /// Creates a configuration bound to `group_id` with every role field empty.
    #[must_use]
    pub fn new(group_id: GroupId) -> Self {
        Self {
            group_id,
            premium_key: None,
            role_bindings: Vec::new(),
            verification_role_id: None,
            unverified_role_id: None,
            bypass_role_id: None,
        }
    }

    /// Replaces the role bindings.
    ///
    /// Each external role may appear at most once.
    pub fn with_role_bindings(mut self, role_bindings: Vec<RoleBinding>) -> AppResult<Self> {
        let mut seen = BTreeSet::new();
        for binding in &role_bindings {
            if !seen.insert(binding.group_role_id()) {
                return Err(AppError::Validation(format!(
                    "group role '{}' is bound more than once",
                    binding.group_role_id()
                )));
            }
        }

        self.role_bindings = role_bindings;
        Ok(self)
    }

    /// Sets the role granted to every member with a linked identity.
    #[must_use]
    pub fn with_verification_role(mut self, role_id: Option<RoleId>) -> Self {
        self.verification_role_id = role_id;
        self
    }

    /// Sets the role stripped once a member is synchronized.
    #[must_use]
    pub fn with_unverified_role(mut self, role_id: Option<RoleId>) -> Self {
        self.unverified_role_id = role_id;
        self
    }

    /// Sets the reserved bypass role.
    #[must_use]
    pub fn with_bypass_role(mut self, role_id: Option<RoleId>) -> Self {
        self.bypass_role_id = role_id;
        self
    }

    /// Sets the premium key supplied at setup time.
    #[must_use]
    pub fn with_premium_key(mut self, premium_key: Option<String>) -> Self {
        self.premium_key = normalize_premium_key(premium_key);
        self
    }

    /// Returns the bound external group.
    #[must_use]
    pub fn group_id(&self) -> &GroupId {
        &self.group_id
    }

    /// Returns the premium key, if one was supplied.
    #[must_use]
    pub fn premium_key(&self) -> Option<&str> {
        self.premium_key.as_deref()
    }

    /// Returns role bindings in declaration order.
    #[must_use]
    pub fn role_bindings(&self) -> &[RoleBinding] {
        &self.role_bindings
    }

    /// Returns the verification role.
    #[must_use]
    pub fn verification_role_id(&self) -> Option<&RoleId> {
        self.verification_role_id.as_ref()
    }

    /// Returns the unverified role.
    #[must_use]
    pub fn unverified_role_id(&self) -> Option<&RoleId> {
        self.unverified_role_id.as_ref()
    }

    /// Returns the bypass role. Stored for administrators; no synchronization rule reads it.
    #[must_use]
    pub fn bypass_role_id(&self) -> Option<&RoleId> {
        self.bypass_role_id.as_ref()
    }

    /// Returns the binding for one catalog role.
    #[must_use]
    pub fn binding_for(&self, group_role_id: GroupRoleId) -> Option<&RoleBinding> {
        self.role_bindings
            .iter()
            .find(|binding| binding.group_role_id() == group_role_id)
    }

    /// Returns a copy bound to another group.
    ///
    /// Bindings reference the previous group's catalog and are dropped; the
    /// verification, unverified and bypass roles are guild-local and kept.
    #[must_use]
    pub fn rebind_to(&self, group_id: GroupId, premium_key: Option<String>) -> Self {
        Self {
            group_id,
            premium_key: normalize_premium_key(premium_key).or_else(|| self.premium_key.clone()),
            role_bindings: Vec::new(),
            verification_role_id: self.verification_role_id.clone(),
            unverified_role_id: self.unverified_role_id.clone(),
            bypass_role_id: self.bypass_role_id.clone(),
        }
    }

    /// Merges an administrative patch into a copy of this configuration.
    pub fn apply_patch(&self, patch: ConfigurationPatch) -> AppResult<Self> {
        let merged = Self {
            group_id: self.group_id.clone(),
            premium_key: match patch.premium_key {
                Some(premium_key) => normalize_premium_key(Some(premium_key)),
                None => self.premium_key.clone(),
            },
            role_bindings: Vec::new(),
            verification_role_id: patch
                .verification_role_id
                .unwrap_or_else(|| self.verification_role_id.clone()),
            unverified_role_id: patch
                .unverified_role_id
                .unwrap_or_else(|| self.unverified_role_id.clone()),
            bypass_role_id: patch
                .bypass_role_id
                .unwrap_or_else(|| self.bypass_role_id.clone()),
        };

        merged.with_role_bindings(
            patch
                .role_bindings
                .unwrap_or_else(|| self.role_bindings.clone()),
        )
    }
}

/// Administrative update of a configuration.
///
/// `None` keeps the stored value. For the optional role fields,
/// `Some(None)` clears the stored role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationPatch {
    /// Replacement role bindings.
    pub role_bindings: Option<Vec<RoleBinding>>,
    /// Replacement verification role.
    pub verification_role_id: Option<Option<RoleId>>,
    /// Replacement unverified role.
    pub unverified_role_id: Option<Option<RoleId>>,
    /// Replacement bypass role.
    pub bypass_role_id: Option<Option<RoleId>>,
    /// Replacement premium key.
    pub premium_key: Option<String>,
}

fn normalize_premium_key(premium_key: Option<String>) -> Option<String> {
    premium_key.and_then(|value| {
        let trimmed = value.trim().to_owned();
        (!trimmed.is_empty()).then_some(trimmed)
    })
}

#[cfg(test)]
mod tests {
    use super::{ConfigurationPatch, GuildConfiguration, RoleBinding};
    use crate::{GroupId, GroupRoleId, RoleId};

    fn group(value: &str) -> GroupId {
        GroupId::new(value).unwrap_or_else(|_| unreachable!())
    }

    fn role(value: &str) -> RoleId {
        RoleId::new(value).unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn duplicate_group_role_bindings_are_rejected() {
        let configuration = GuildConfiguration::new(group("77")).with_role_bindings(vec![
            RoleBinding::new(GroupRoleId::new(10), role("A")),
            RoleBinding::new(GroupRoleId::new(10), role("B")),
        ]);

        assert!(configuration.is_err());
    }

    #[test]
    fn decodes_legacy_record_shape() {
        let raw = r#"{
            "groupId": "77",
            "premiumKey": null,
            "roleBindings": [{"groupRoleId": 10, "discordRoleId": "A"}],
            "verificationRoleId": "V",
            "unverifiedRoleId": null,
            "bypassRoleId": null
        }"#;

        let decoded = serde_json::from_str::<GuildConfiguration>(raw);
        assert!(decoded.is_ok());
        let decoded = decoded.unwrap_or_else(|_| unreachable!());
        assert_eq!(decoded.group_id().as_str(), "77");
        assert_eq!(decoded.role_bindings().len(), 1);
        assert_eq!(decoded.verification_role_id(), Some(&role("V")));
        assert!(decoded.unverified_role_id().is_none());
    }

    #[test]
    fn decoding_rejects_duplicate_bindings() {
        let raw = r#"{
            "groupId": "77",
            "roleBindings": [
                {"groupRoleId": 10, "discordRoleId": "A"},
                {"groupRoleId": 10, "discordRoleId": "B"}
            ]
        }"#;

        assert!(serde_json::from_str::<GuildConfiguration>(raw).is_err());
    }

    #[test]
    fn patch_keeps_unspecified_fields_and_clears_explicit_none() {
        let configuration = GuildConfiguration::new(group("77"))
            .with_verification_role(Some(role("V")))
            .with_unverified_role(Some(role("U")));

        let patched = configuration.apply_patch(ConfigurationPatch {
            unverified_role_id: Some(None),
            role_bindings: Some(vec![RoleBinding::new(GroupRoleId::new(20), role("B"))]),
            ..ConfigurationPatch::default()
        });

        assert!(patched.is_ok());
        let patched = patched.unwrap_or_else(|_| unreachable!());
        assert_eq!(patched.verification_role_id(), Some(&role("V")));
        assert!(patched.unverified_role_id().is_none());
        assert_eq!(patched.role_bindings().len(), 1);
        assert_eq!(patched.group_id().as_str(), "77");
    }

    #[test]
    fn rebind_drops_bindings_and_keeps_guild_roles() {
        let configuration = GuildConfiguration::new(group("77"))
            .with_verification_role(Some(role("V")))
            .with_role_bindings(vec![RoleBinding::new(GroupRoleId::new(10), role("A"))])
            .unwrap_or_else(|_| unreachable!());

        let rebound = configuration.rebind_to(group("88"), None);

        assert_eq!(rebound.group_id().as_str(), "88");
        assert!(rebound.role_bindings().is_empty());
        assert_eq!(rebound.verification_role_id(), Some(&role("V")));
    }
}
