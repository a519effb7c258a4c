use std::path::PathBuf;

use async_trait::async_trait;
use rankbind_application::PremiumEntitlementSource;
use rankbind_core::{AppError, AppResult, MemberId};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PremiumDocument {
    #[serde(default)]
    premium_users: Vec<String>,
}

/// Premium entitlements read from a JSON document of the form
/// `{"premiumUsers": ["<member id>", ...]}`.
///
/// The file is re-read on every lookup so edits apply without a restart.
#[derive(Debug, Clone)]
pub struct FilePremiumEntitlementSource {
    path: PathBuf,
}

impl FilePremiumEntitlementSource {
    /// Creates a source backed by the given file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PremiumEntitlementSource for FilePremiumEntitlementSource {
    async fn is_premium_member(&self, member_id: &MemberId) -> AppResult<bool> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|error| {
            AppError::Unavailable(format!(
                "failed to read premium entitlements from '{}': {error}",
                self.path.display()
            ))
        })?;

        let document: PremiumDocument = serde_json::from_str(&contents).map_err(|error| {
            AppError::Internal(format!(
                "premium entitlements file '{}' is malformed: {error}",
                self.path.display()
            ))
        })?;

        Ok(document
            .premium_users
            .iter()
            .any(|entry| entry == member_id.as_str()))
    }
}
