//! Redis-backed setup lock coordinator.

use async_trait::async_trait;
use rankbind_application::{SetupLease, SetupLockCoordinator};
use rankbind_core::{AppError, AppResult};
use redis::Script;

const RELEASE_LEASE_SCRIPT: &str = r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
  return redis.call('DEL', KEYS[1])
else
  return 0
end
"#;

/// Redis implementation of setup lease coordination.
///
/// Leases are `SET NX EX` keys holding an ownership token, so a crashed
/// holder's lease expires on its own.
#[derive(Clone)]
pub struct RedisSetupLockCoordinator {
    client: redis::Client,
    key_prefix: String,
}

impl RedisSetupLockCoordinator {
    /// Creates one coordinator adapter.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn key_for(&self, scope_key: &str) -> String {
        format!("{}:lock:{scope_key}", self.key_prefix)
    }
}

#[async_trait]
impl SetupLockCoordinator for RedisSetupLockCoordinator {
    async fn try_acquire(
        &self,
        scope_key: &str,
        holder_id: &str,
        lease_seconds: u32,
    ) -> AppResult<Option<SetupLease>> {
        if scope_key.trim().is_empty() {
            return Err(AppError::Validation(
                "setup lease scope_key must not be empty".to_owned(),
            ));
        }

        if lease_seconds == 0 {
            return Err(AppError::Validation(
                "setup lease_seconds must be greater than zero".to_owned(),
            ));
        }

        let key = self.key_for(scope_key);
        let token = format!("{holder_id}:{}", uuid::Uuid::new_v4());

        let mut connection = self.client.get_multiplexed_async_connection().await.map_err(
            |error| AppError::Unavailable(format!("failed to connect to redis: {error}")),
        )?;

        // SET key token NX EX seconds replies nil when the key exists.
        let acquired: Option<String> = redis::cmd("SET")
            .arg(key.as_str())
            .arg(token.as_str())
            .arg("NX")
            .arg("EX")
            .arg(u64::from(lease_seconds))
            .query_async(&mut connection)
            .await
            .map_err(|error| {
                AppError::Unavailable(format!("failed to acquire setup lease: {error}"))
            })?;

        if acquired.is_none() {
            return Ok(None);
        }

        Ok(Some(SetupLease {
            scope_key: scope_key.to_owned(),
            token,
            holder_id: holder_id.to_owned(),
        }))
    }

    async fn release(&self, lease: &SetupLease) -> AppResult<()> {
        let key = self.key_for(lease.scope_key.as_str());
        let script = Script::new(RELEASE_LEASE_SCRIPT);

        let mut connection = self.client.get_multiplexed_async_connection().await.map_err(
            |error| AppError::Unavailable(format!("failed to connect to redis: {error}")),
        )?;

        script
            .key(key)
            .arg(lease.token.as_str())
            .invoke_async::<i32>(&mut connection)
            .await
            .map_err(|error| {
                AppError::Unavailable(format!("failed to release setup lease: {error}"))
            })?;

        Ok(())
    }
}
