//! Redis-backed binding store.
//!
//! Each record lives under `{prefix}:{kind}:{guild_id}` as a JSON string.

use async_trait::async_trait;
use rankbind_application::BindingStore;
use rankbind_core::{AppError, AppResult, GuildId};
use rankbind_domain::{
    BindingEntry, BindingKey, BindingRecord, GuildConfiguration, PendingKind, PendingRequest,
};
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;

const SCAN_BATCH_SIZE: u32 = 200;

/// Redis implementation of the binding store port.
#[derive(Clone)]
pub struct RedisBindingStore {
    client: redis::Client,
    key_prefix: String,
}

impl RedisBindingStore {
    /// Creates a store with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn key_for(&self, key: &BindingKey) -> String {
        format!("{}:{key}", self.key_prefix)
    }

    fn parse_key(&self, raw: &str) -> Option<BindingKey> {
        let unprefixed = raw
            .strip_prefix(self.key_prefix.as_str())?
            .strip_prefix(':')?;
        BindingKey::parse(unprefixed)
    }

    async fn connection(&self) -> AppResult<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Unavailable(format!("failed to connect to redis: {error}")))
    }

    async fn read_record(&self, key: &BindingKey) -> AppResult<Option<BindingRecord>> {
        let mut connection = self.connection().await?;
        let payload: Option<String> = connection
            .get(self.key_for(key))
            .await
            .map_err(|error| {
                AppError::Unavailable(format!("failed to read binding record '{key}': {error}"))
            })?;

        payload
            .map(|payload| BindingRecord::from_json(key.kind(), payload.as_str()))
            .transpose()
    }

    async fn delete_record(&self, key: &BindingKey) -> AppResult<()> {
        let mut connection = self.connection().await?;
        connection
            .del::<_, ()>(self.key_for(key))
            .await
            .map_err(|error| {
                AppError::Unavailable(format!("failed to delete binding record '{key}': {error}"))
            })
    }

    async fn scan_keys(&self, connection: &mut MultiplexedConnection) -> AppResult<Vec<String>> {
        let pattern = format!("{}:*", self.key_prefix);
        let mut cursor = 0_u64;
        let mut keys = Vec::new();

        loop {
            let (next_cursor, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern.as_str())
                .arg("COUNT")
                .arg(SCAN_BATCH_SIZE)
                .query_async(connection)
                .await
                .map_err(|error| {
                    AppError::Unavailable(format!("failed to scan binding records: {error}"))
                })?;

            keys.extend(batch);
            if next_cursor == 0 {
                break;
            }
            cursor = next_cursor;
        }

        // SCAN may return a key more than once.
        keys.sort();
        keys.dedup();
        Ok(keys)
    }
}

#[async_trait]
impl BindingStore for RedisBindingStore {
    async fn find_configuration(
        &self,
        guild_id: &GuildId,
    ) -> AppResult<Option<GuildConfiguration>> {
        Ok(
            match self.read_record(&BindingKey::configuration(guild_id)).await? {
                Some(BindingRecord::Configuration(configuration)) => Some(configuration),
                _ => None,
            },
        )
    }

    async fn save_configuration(
        &self,
        guild_id: &GuildId,
        configuration: GuildConfiguration,
    ) -> AppResult<()> {
        let payload = BindingRecord::Configuration(configuration).to_json()?;
        let mut connection = self.connection().await?;

        redis::pipe()
            .atomic()
            .set(self.key_for(&BindingKey::configuration(guild_id)), payload)
            .ignore()
            .del(self.key_for(&BindingKey::pending(PendingKind::Setup, guild_id)))
            .ignore()
            .del(self.key_for(&BindingKey::pending(PendingKind::Transfer, guild_id)))
            .ignore()
            .query_async::<()>(&mut connection)
            .await
            .map_err(|error| {
                AppError::Unavailable(format!(
                    "failed to save configuration for guild '{guild_id}': {error}"
                ))
            })
    }

    async fn delete_configuration(&self, guild_id: &GuildId) -> AppResult<()> {
        self.delete_record(&BindingKey::configuration(guild_id))
            .await
    }

    async fn find_pending(
        &self,
        guild_id: &GuildId,
        kind: PendingKind,
    ) -> AppResult<Option<PendingRequest>> {
        Ok(
            match self.read_record(&BindingKey::pending(kind, guild_id)).await? {
                Some(BindingRecord::PendingSetup(request) | BindingRecord::PendingTransfer(request)) => {
                    Some(request)
                }
                _ => None,
            },
        )
    }

    async fn save_pending(
        &self,
        guild_id: &GuildId,
        kind: PendingKind,
        request: PendingRequest,
    ) -> AppResult<()> {
        let key = BindingKey::pending(kind, guild_id);
        let payload = BindingRecord::pending(kind, request).to_json()?;
        let mut connection = self.connection().await?;

        connection
            .set::<_, _, ()>(self.key_for(&key), payload)
            .await
            .map_err(|error| {
                AppError::Unavailable(format!("failed to save binding record '{key}': {error}"))
            })
    }

    async fn clear_pending(&self, guild_id: &GuildId, kind: PendingKind) -> AppResult<()> {
        self.delete_record(&BindingKey::pending(kind, guild_id))
            .await
    }

    async fn list_entries(&self) -> AppResult<Vec<BindingEntry>> {
        let mut connection = self.connection().await?;
        let keys: Vec<(String, BindingKey)> = self
            .scan_keys(&mut connection)
            .await?
            .into_iter()
            .filter_map(|raw| self.parse_key(raw.as_str()).map(|key| (raw, key)))
            .collect();

        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let raw_keys: Vec<&str> = keys.iter().map(|(raw, _)| raw.as_str()).collect();
        let payloads: Vec<Option<String>> = connection
            .mget(raw_keys)
            .await
            .map_err(|error| {
                AppError::Unavailable(format!("failed to read binding records: {error}"))
            })?;

        let mut entries = Vec::with_capacity(keys.len());
        for ((_, key), payload) in keys.into_iter().zip(payloads) {
            // Deleted between SCAN and MGET.
            let Some(payload) = payload else {
                continue;
            };

            match BindingRecord::from_json(key.kind(), payload.as_str()) {
                Ok(record) => entries.push(BindingEntry {
                    guild_id: key.guild_id().clone(),
                    record,
                }),
                Err(error) => {
                    tracing::warn!(key = %key, error = %error, "skipping undecodable binding record");
                }
            }
        }

        Ok(entries)
    }
}
