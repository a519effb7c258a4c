//! PostgreSQL-backed binding store using the `guild_binding_entries` table.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::PgPool;

use rankbind_application::BindingStore;
use rankbind_core::{AppError, AppResult, GuildId};
use rankbind_domain::{
    BindingEntry, BindingKey, BindingRecord, BindingRecordKind, GuildConfiguration, PendingKind,
    PendingRequest,
};

/// PostgreSQL implementation of the binding store port.
#[derive(Clone)]
pub struct PostgresBindingStore {
    pool: PgPool,
}

impl PostgresBindingStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn read_record(&self, key: &BindingKey) -> AppResult<Option<BindingRecord>> {
        let payload: Option<String> = sqlx::query_scalar(
            r#"
            SELECT payload::text
            FROM guild_binding_entries
            WHERE guild_id = $1 AND kind = $2
            "#,
        )
        .bind(key.guild_id().as_str())
        .bind(key.kind().as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Unavailable(format!("failed to read binding record '{key}': {error}"))
        })?;

        payload
            .map(|payload| BindingRecord::from_json(key.kind(), payload.as_str()))
            .transpose()
    }

    async fn delete_record(&self, key: &BindingKey) -> AppResult<()> {
        sqlx::query(
            r#"
            DELETE FROM guild_binding_entries
            WHERE guild_id = $1 AND kind = $2
            "#,
        )
        .bind(key.guild_id().as_str())
        .bind(key.kind().as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Unavailable(format!("failed to delete binding record '{key}': {error}"))
        })?;

        Ok(())
    }
}

const UPSERT_RECORD: &str = r#"
    INSERT INTO guild_binding_entries (guild_id, kind, group_id, payload, updated_at)
    VALUES ($1, $2, $3, $4::jsonb, now())
    ON CONFLICT (guild_id, kind) DO UPDATE
    SET group_id = EXCLUDED.group_id,
        payload = EXCLUDED.payload,
        updated_at = now()
"#;

#[async_trait]
impl BindingStore for PostgresBindingStore {
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
        let group_id = configuration.group_id().clone();
        let payload = BindingRecord::Configuration(configuration).to_json()?;

        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Unavailable(format!(
                "failed to start configuration transaction for guild '{guild_id}': {error}"
            ))
        })?;

        sqlx::query(
            r#"
            DELETE FROM guild_binding_entries
            WHERE guild_id = $1 AND kind IN ('pending_setup', 'pending_transfer')
            "#,
        )
        .bind(guild_id.as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Unavailable(format!(
                "failed to clear pending requests for guild '{guild_id}': {error}"
            ))
        })?;

        sqlx::query(UPSERT_RECORD)
            .bind(guild_id.as_str())
            .bind(BindingRecordKind::Configuration.as_str())
            .bind(group_id.as_str())
            .bind(payload)
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Unavailable(format!(
                    "failed to save configuration for guild '{guild_id}': {error}"
                ))
            })?;

        transaction.commit().await.map_err(|error| {
            AppError::Unavailable(format!(
                "failed to commit configuration for guild '{guild_id}': {error}"
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
        let group_id = request.group_id().clone();
        let payload = BindingRecord::pending(kind, request).to_json()?;

        sqlx::query(UPSERT_RECORD)
            .bind(guild_id.as_str())
            .bind(key.kind().as_str())
            .bind(group_id.as_str())
            .bind(payload)
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Unavailable(format!("failed to save binding record '{key}': {error}"))
            })?;

        Ok(())
    }

    async fn clear_pending(&self, guild_id: &GuildId, kind: PendingKind) -> AppResult<()> {
        self.delete_record(&BindingKey::pending(kind, guild_id))
            .await
    }

    async fn list_entries(&self) -> AppResult<Vec<BindingEntry>> {
        let rows = sqlx::query_as::<_, BindingEntryRow>(
            r#"
            SELECT guild_id, kind, payload::text AS payload
            FROM guild_binding_entries
            ORDER BY guild_id, kind
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Unavailable(format!("failed to list binding records: {error}"))
        })?;

        rows.into_iter().map(BindingEntryRow::into_entry).collect()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BindingEntryRow {
    guild_id: String,
    kind: String,
    payload: String,
}

impl BindingEntryRow {
    fn into_entry(self) -> AppResult<BindingEntry> {
        let kind = BindingRecordKind::from_str(self.kind.as_str())?;
        let guild_id = GuildId::new(self.guild_id)?;
        let record = BindingRecord::from_json(kind, self.payload.as_str())?;
        Ok(BindingEntry { guild_id, record })
    }
}
