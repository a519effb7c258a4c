use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, patch, post};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

pub fn build_router(app_state: AppState) -> Router {
    let guild_routes = Router::new()
        .route(
            "/api/guilds/{guild_id}/setup",
            post(handlers::setup::request_setup_handler),
        )
        .route(
            "/api/guilds/{guild_id}/setup/confirm",
            post(handlers::setup::confirm_setup_handler),
        )
        .route(
            "/api/guilds/{guild_id}/transfer",
            post(handlers::setup::request_transfer_handler),
        )
        .route(
            "/api/guilds/{guild_id}/transfer/confirm",
            post(handlers::setup::confirm_transfer_handler),
        )
        .route(
            "/api/guilds/{guild_id}/binding",
            get(handlers::binding::binding_state_handler),
        )
        .route(
            "/api/guilds/{guild_id}/configuration",
            patch(handlers::binding::update_configuration_handler)
                .delete(handlers::binding::remove_configuration_handler),
        )
        .route(
            "/api/guilds/{guild_id}/sync",
            post(handlers::sync::sync_member_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_bearer_token,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(guild_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
