use std::sync::Arc;
use std::time::Duration;

use rankbind_application::{ActivationMode, BindingStore, RoleSyncService, SetupService};
use rankbind_core::AppError;
use rankbind_domain::RoleId;
use rankbind_infrastructure::{
    DiscordHttpClient, FilePremiumEntitlementSource, PostgresBindingStore, RedisBindingStore,
    RedisIdentityLinkRepository, RedisSetupLockCoordinator, RobloxHttpClient,
};
use sqlx::PgPool;

use crate::api_config::{ApiConfig, BindingStoreBackend};
use crate::state::AppState;

use super::redis::build_redis_client;

pub fn build_app_state(
    config: &ApiConfig,
    postgres_pool: Option<PgPool>,
) -> Result<AppState, AppError> {
    let redis_client = build_redis_client(&config.redis_url)?;
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_seconds))
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build http client: {error}")))?;

    let binding_store: Arc<dyn BindingStore> = match (config.binding_store, postgres_pool.clone()) {
        (BindingStoreBackend::Postgres, Some(pool)) => Arc::new(PostgresBindingStore::new(pool)),
        (BindingStoreBackend::Postgres, None) => {
            return Err(AppError::Internal(
                "postgres binding store selected without a database pool".to_owned(),
            ));
        }
        (BindingStoreBackend::Redis, _) => Arc::new(RedisBindingStore::new(
            redis_client.clone(),
            config.redis_key_prefix.clone(),
        )),
    };

    let identity_links = Arc::new(RedisIdentityLinkRepository::new(
        redis_client.clone(),
        config.redis_key_prefix.clone(),
    ));
    let lock_coordinator = Arc::new(RedisSetupLockCoordinator::new(
        redis_client.clone(),
        config.redis_key_prefix.clone(),
    ));

    let mut roblox = RobloxHttpClient::new(
        http_client.clone(),
        config.roblox.groups_api_base_url.clone(),
        config.roblox.users_api_base_url.clone(),
    );
    if let Some(cookie) = config.roblox.cookie.as_deref() {
        roblox = roblox.with_cookie(cookie);
    }
    let group_platform = Arc::new(roblox);

    let discord = Arc::new(
        DiscordHttpClient::new(
            http_client,
            config.discord.api_base_url.clone(),
            config.discord.bot_token.clone(),
        )
        .with_review_channel(config.discord.review_channel_id.clone()),
    );

    let setup_service = SetupService::new(
        binding_store.clone(),
        group_platform.clone(),
        identity_links.clone(),
        lock_coordinator,
    )
    .with_operator_notifier(discord.clone())
    .with_default_activation(ActivationMode::from_flag(config.activate_immediately))
    .with_lock_seconds(config.setup_lock_seconds);

    let mut role_sync_service =
        RoleSyncService::new(binding_store, group_platform, identity_links, discord);
    if let Some(premium_role_id) = config.discord.premium_role_id.as_deref() {
        role_sync_service = role_sync_service.with_premium_entitlements(
            Arc::new(FilePremiumEntitlementSource::new(
                config.premium_users_file.as_str(),
            )),
            RoleId::new(premium_role_id)?,
        );
    }

    Ok(AppState {
        setup_service,
        role_sync_service,
        redis_client,
        postgres_pool,
        shared_secret: Arc::from(config.shared_secret.as_str()),
    })
}
