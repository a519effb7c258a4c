//! Read access to identity links written by the linking subsystem.
//!
//! Layout under the shared prefix:
//! `identity_link:member:{member_id}` holds the verified username and
//! `identity_link:username:{lowercased username}` holds the member id.

use async_trait::async_trait;
use rankbind_application::{IdentityLink, IdentityLinkRepository};
use rankbind_core::{AppError, AppResult, MemberId};
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;

const SCAN_BATCH_SIZE: u32 = 200;

/// Redis implementation of the identity link repository port.
#[derive(Clone)]
pub struct RedisIdentityLinkRepository {
    client: redis::Client,
    key_prefix: String,
}

impl RedisIdentityLinkRepository {
    /// Creates a repository with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn member_key(&self, member_id: &MemberId) -> String {
        format!("{}:identity_link:member:{member_id}", self.key_prefix)
    }

    fn username_key(&self, username: &str) -> String {
        format!(
            "{}:identity_link:username:{}",
            self.key_prefix,
            username.trim().to_lowercase()
        )
    }

    fn member_from_key<'a>(&self, key: &'a str) -> Option<&'a str> {
        key.strip_prefix(self.key_prefix.as_str())?
            .strip_prefix(":identity_link:member:")
    }

    async fn connection(&self) -> AppResult<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Unavailable(format!("failed to connect to redis: {error}")))
    }
}

#[async_trait]
impl IdentityLinkRepository for RedisIdentityLinkRepository {
    async fn find_linked_username(&self, member_id: &MemberId) -> AppResult<Option<String>> {
        let mut connection = self.connection().await?;
        connection
            .get(self.member_key(member_id))
            .await
            .map_err(|error| {
                AppError::Unavailable(format!(
                    "failed to read identity link of member '{member_id}': {error}"
                ))
            })
    }

    async fn find_member_by_username(&self, username: &str) -> AppResult<Option<MemberId>> {
        let mut connection = self.connection().await?;
        let member_id: Option<String> = connection
            .get(self.username_key(username))
            .await
            .map_err(|error| {
                AppError::Unavailable(format!(
                    "failed to read identity link of username '{username}': {error}"
                ))
            })?;

        member_id.map(MemberId::new).transpose()
    }

    async fn list_links(&self) -> AppResult<Vec<IdentityLink>> {
        let mut connection = self.connection().await?;
        let pattern = format!("{}:identity_link:member:*", self.key_prefix);
        let mut cursor = 0_u64;
        let mut keys: Vec<String> = Vec::new();

        loop {
            let (next_cursor, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern.as_str())
                .arg("COUNT")
                .arg(SCAN_BATCH_SIZE)
                .query_async(&mut connection)
                .await
                .map_err(|error| {
                    AppError::Unavailable(format!("failed to scan identity links: {error}"))
                })?;

            keys.extend(batch);
            if next_cursor == 0 {
                break;
            }
            cursor = next_cursor;
        }

        keys.sort();
        keys.dedup();
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let usernames: Vec<Option<String>> =
            connection.mget(&keys).await.map_err(|error| {
                AppError::Unavailable(format!("failed to read identity links: {error}"))
            })?;

        let mut links = Vec::with_capacity(keys.len());
        for (key, username) in keys.iter().zip(usernames) {
            let (Some(member_id), Some(username)) = (self.member_from_key(key), username) else {
                continue;
            };

            match MemberId::new(member_id) {
                Ok(member_id) => links.push(IdentityLink {
                    member_id,
                    username,
                }),
                Err(error) => {
                    tracing::warn!(key = %key, error = %error, "skipping malformed identity link");
                }
            }
        }

        Ok(links)
    }
}
