use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use rankbind_application::{ActivationMode, RequestSetupInput};
use rankbind_core::{GuildId, MemberId};
use rankbind_domain::GroupId;

use crate::dto::{
    ConfirmRequest, GuildConfigurationResponse, RequestSetupRequest, SetupReceiptResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

use super::interaction_actor;

fn setup_input(payload: &RequestSetupRequest) -> ApiResult<RequestSetupInput> {
    Ok(RequestSetupInput {
        group_id: GroupId::new(payload.group_id.as_str())?,
        premium_key: payload.premium_key.clone(),
        activation: payload.activate_immediately.map(ActivationMode::from_flag),
    })
}

pub async fn request_setup_handler(
    State(state): State<AppState>,
    Path(guild_id): Path<String>,
    Json(payload): Json<RequestSetupRequest>,
) -> ApiResult<(StatusCode, Json<SetupReceiptResponse>)> {
    let input = setup_input(&payload)?;
    let actor = interaction_actor(guild_id, payload.requester_id, payload.channel_id)?;

    let receipt = state.setup_service.request_setup(&actor, input).await?;

    Ok((StatusCode::CREATED, Json(SetupReceiptResponse::from(receipt))))
}

pub async fn confirm_setup_handler(
    State(state): State<AppState>,
    Path(guild_id): Path<String>,
    Json(payload): Json<ConfirmRequest>,
) -> ApiResult<Json<GuildConfigurationResponse>> {
    let guild_id = GuildId::new(guild_id)?;
    let operator_id = MemberId::new(payload.operator_id)?;

    let configuration = state
        .setup_service
        .confirm_setup(&guild_id, &operator_id)
        .await?;

    Ok(Json(GuildConfigurationResponse::from(&configuration)))
}

pub async fn request_transfer_handler(
    State(state): State<AppState>,
    Path(guild_id): Path<String>,
    Json(payload): Json<RequestSetupRequest>,
) -> ApiResult<(StatusCode, Json<SetupReceiptResponse>)> {
    let input = setup_input(&payload)?;
    let actor = interaction_actor(guild_id, payload.requester_id, payload.channel_id)?;

    let receipt = state.setup_service.request_transfer(&actor, input).await?;

    Ok((StatusCode::CREATED, Json(SetupReceiptResponse::from(receipt))))
}

pub async fn confirm_transfer_handler(
    State(state): State<AppState>,
    Path(guild_id): Path<String>,
    Json(payload): Json<ConfirmRequest>,
) -> ApiResult<Json<GuildConfigurationResponse>> {
    let guild_id = GuildId::new(guild_id)?;
    let operator_id = MemberId::new(payload.operator_id)?;

    let configuration = state
        .setup_service
        .confirm_transfer(&guild_id, &operator_id)
        .await?;

    Ok(Json(GuildConfigurationResponse::from(&configuration)))
}
