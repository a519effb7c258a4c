use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::{HealthDependencyStatus, HealthResponse};
use crate::state::AppState;

mod checks;

use checks::{check_postgres, check_redis};

pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let redis = check_redis(state.redis_client.clone()).await;
    let postgres = check_postgres(state.postgres_pool.clone()).await;

    let ready = is_healthy(redis.status) && postgres.status != "error";
    let status = if ready { "ok" } else { "degraded" };
    let http_status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        http_status,
        Json(HealthResponse {
            status,
            ready,
            redis,
            postgres,
        }),
    )
}

fn is_healthy(status: &str) -> bool {
    status == "ok"
}
