use async_trait::async_trait;
use rankbind_core::AppResult;

/// A held lease on one setup scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupLease {
    /// Locked scope, such as `group:{id}`.
    pub scope_key: String,
    /// Ownership token used for compare-and-delete release.
    pub token: String,
    /// Holder that acquired the lease.
    pub holder_id: String,
}

/// Short-lived mutual exclusion around setup check-then-write sequences.
#[async_trait]
pub trait SetupLockCoordinator: Send + Sync {
    /// Attempts to acquire a lease; `None` when another holder owns the scope.
    async fn try_acquire(
        &self,
        scope_key: &str,
        holder_id: &str,
        lease_seconds: u32,
    ) -> AppResult<Option<SetupLease>>;

    /// Releases a lease if its token still owns the scope.
    async fn release(&self, lease: &SetupLease) -> AppResult<()>;
}
