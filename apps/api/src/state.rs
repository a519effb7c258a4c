use std::sync::Arc;

use rankbind_application::{RoleSyncService, SetupService};
use sqlx::PgPool;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub setup_service: SetupService,
    pub role_sync_service: RoleSyncService,
    pub redis_client: redis::Client,
    pub postgres_pool: Option<PgPool>,
    pub shared_secret: Arc<str>,
}
