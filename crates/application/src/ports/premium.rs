use async_trait::async_trait;
use rankbind_core::{AppResult, MemberId};

/// Source of premium entitlements.
#[async_trait]
pub trait PremiumEntitlementSource: Send + Sync {
    /// Returns whether the member is entitled to the premium role.
    async fn is_premium_member(&self, member_id: &MemberId) -> AppResult<bool>;
}
