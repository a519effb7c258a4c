use axum::Json;
use axum::extract::{Path, State};

use rankbind_application::SyncTarget;

use crate::dto::{SyncOutcomeResponse, SyncRequest};
use crate::error::ApiResult;
use crate::state::AppState;

use super::interaction_actor;

pub async fn sync_member_handler(
    State(state): State<AppState>,
    Path(guild_id): Path<String>,
    Json(payload): Json<SyncRequest>,
) -> ApiResult<Json<SyncOutcomeResponse>> {
    let target = SyncTarget::from_override(payload.roblox_username);
    let actor = interaction_actor(guild_id, payload.requester_id, payload.channel_id)?;

    let outcome = state.role_sync_service.synchronize(&actor, target).await?;

    Ok(Json(SyncOutcomeResponse::from(outcome)))
}
