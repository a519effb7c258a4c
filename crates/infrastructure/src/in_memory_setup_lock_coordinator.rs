use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rankbind_application::{SetupLease, SetupLockCoordinator};
use rankbind_core::AppResult;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
struct HeldLease {
    token: String,
    expires_at: Instant,
}

/// Process-local setup lock coordinator.
#[derive(Default)]
pub struct InMemorySetupLockCoordinator {
    leases: Mutex<HashMap<String, HeldLease>>,
}

impl InMemorySetupLockCoordinator {
    /// Creates a coordinator with no held leases.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SetupLockCoordinator for InMemorySetupLockCoordinator {
    async fn try_acquire(
        &self,
        scope_key: &str,
        holder_id: &str,
        lease_seconds: u32,
    ) -> AppResult<Option<SetupLease>> {
        let now = Instant::now();
        let mut leases = self.leases.lock().await;

        if leases
            .get(scope_key)
            .is_some_and(|lease| lease.expires_at > now)
        {
            return Ok(None);
        }

        let token = format!("{holder_id}:{}", uuid::Uuid::new_v4());
        leases.insert(
            scope_key.to_owned(),
            HeldLease {
                token: token.clone(),
                expires_at: now + Duration::from_secs(u64::from(lease_seconds)),
            },
        );

        Ok(Some(SetupLease {
            scope_key: scope_key.to_owned(),
            token,
            holder_id: holder_id.to_owned(),
        }))
    }

    async fn release(&self, lease: &SetupLease) -> AppResult<()> {
        let mut leases = self.leases.lock().await;
        if leases
            .get(&lease.scope_key)
            .is_some_and(|held| held.token == lease.token)
        {
            leases.remove(&lease.scope_key);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rankbind_application::SetupLockCoordinator;

    use super::InMemorySetupLockCoordinator;

    #[tokio::test]
    async fn scope_is_exclusive_until_released() {
        let coordinator = InMemorySetupLockCoordinator::new();

        let first = coordinator.try_acquire("setup:group:77", "a", 30).await;
        assert!(matches!(first, Ok(Some(_))));
        let lease = first.unwrap_or_else(|_| unreachable!()).unwrap_or_else(|| unreachable!());

        let second = coordinator.try_acquire("setup:group:77", "b", 30).await;
        assert_eq!(second, Ok(None));

        assert!(coordinator.release(&lease).await.is_ok());
        let third = coordinator.try_acquire("setup:group:77", "b", 30).await;
        assert!(matches!(third, Ok(Some(_))));
    }

    #[tokio::test]
    async fn stale_token_does_not_release_a_newer_lease() {
        let coordinator = InMemorySetupLockCoordinator::new();

        let expired = coordinator.try_acquire("setup:guild:1", "a", 0).await;
        let expired = expired.unwrap_or_else(|_| unreachable!()).unwrap_or_else(|| unreachable!());
        let current = coordinator.try_acquire("setup:guild:1", "b", 30).await;
        assert!(matches!(current, Ok(Some(_))));

        assert!(coordinator.release(&expired).await.is_ok());
        let blocked = coordinator.try_acquire("setup:guild:1", "c", 30).await;
        assert_eq!(blocked, Ok(None));
    }
}
