use axum::Json;
use axum::extract::{Path, State};

use rankbind_core::GuildId;
use rankbind_domain::ConfigurationPatch;

use crate::dto::{
    BindingOverviewResponse, GuildConfigurationResponse, RemoveConfigurationResponse,
    UpdateConfigurationRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn binding_state_handler(
    State(state): State<AppState>,
    Path(guild_id): Path<String>,
) -> ApiResult<Json<BindingOverviewResponse>> {
    let guild_id = GuildId::new(guild_id)?;
    let overview = state.setup_service.binding_state(&guild_id).await?;

    Ok(Json(BindingOverviewResponse::from(overview)))
}

pub async fn update_configuration_handler(
    State(state): State<AppState>,
    Path(guild_id): Path<String>,
    Json(payload): Json<UpdateConfigurationRequest>,
) -> ApiResult<Json<GuildConfigurationResponse>> {
    let guild_id = GuildId::new(guild_id)?;
    let patch = ConfigurationPatch::try_from(payload)?;

    let configuration = state
        .setup_service
        .update_configuration(&guild_id, patch)
        .await?;

    Ok(Json(GuildConfigurationResponse::from(&configuration)))
}

pub async fn remove_configuration_handler(
    State(state): State<AppState>,
    Path(guild_id): Path<String>,
) -> ApiResult<Json<RemoveConfigurationResponse>> {
    let guild_id = GuildId::new(guild_id)?;
    let removed = state.setup_service.remove_configuration(&guild_id).await?;

    Ok(Json(RemoveConfigurationResponse { removed }))
}
