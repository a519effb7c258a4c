use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rankbind_application::{ErrorCategory, SetupError, SyncError};
use rankbind_core::AppError;

mod types;

pub use types::ErrorResponse;

/// HTTP API error wrapper around application and workflow errors.
#[derive(Debug)]
pub enum ApiError {
    App(AppError),
    Setup(SetupError),
    Sync(SyncError),
}

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self::App(value)
    }
}

impl From<SetupError> for ApiError {
    fn from(value: SetupError) -> Self {
        Self::Setup(value)
    }
}

impl From<SyncError> for ApiError {
    fn from(value: SyncError) -> Self {
        Self::Sync(value)
    }
}

fn status_for_category(category: ErrorCategory) -> StatusCode {
    match category {
        ErrorCategory::ValidationConflict => StatusCode::CONFLICT,
        ErrorCategory::Transient => StatusCode::BAD_GATEWAY,
        ErrorCategory::Precondition => StatusCode::PRECONDITION_FAILED,
        ErrorCategory::Authorization => StatusCode::FORBIDDEN,
        ErrorCategory::Platform => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCategory::Infrastructure => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn app_error_parts(error: &AppError) -> (StatusCode, &'static str, &'static str) {
    match error {
        AppError::Validation(_) => (StatusCode::BAD_REQUEST, "invalid_request", "request"),
        AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", "request"),
        AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict", "request"),
        AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized", "request"),
        AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden", "request"),
        AppError::Unavailable(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "unavailable",
            ErrorCategory::Infrastructure.as_str(),
        ),
        AppError::Internal(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal",
            ErrorCategory::Infrastructure.as_str(),
        ),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, payload) = match &self {
            Self::App(error) => {
                let (status, code, category) = app_error_parts(error);
                let retryable = matches!(error, AppError::Unavailable(_));
                (
                    status,
                    ErrorResponse::new(code, category, error.to_string(), retryable),
                )
            }
            Self::Setup(error) => (
                status_for_category(error.category()),
                ErrorResponse::new(
                    error.code(),
                    error.category().as_str(),
                    error.to_string(),
                    error.is_retryable(),
                ),
            ),
            Self::Sync(error) => (
                status_for_category(error.category()),
                ErrorResponse::new(
                    error.code(),
                    error.category().as_str(),
                    error.to_string(),
                    error.is_retryable(),
                ),
            ),
        };

        if status.is_server_error() {
            tracing::warn!(status = %status, error = ?self, "request failed");
        }

        (status, Json(payload)).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use rankbind_application::{SetupError, SyncError};
    use rankbind_core::AppError;
    use rankbind_domain::GroupId;

    use super::ApiError;

    #[test]
    fn workflow_categories_pick_status_codes() {
        let group_id = GroupId::new("77").unwrap_or_else(|_| unreachable!());

        let cases = [
            (
                ApiError::from(SetupError::GroupAlreadyBound {
                    group_id: group_id.clone(),
                }),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::from(SetupError::NotGroupOwner {
                    group_id: group_id.clone(),
                }),
                StatusCode::FORBIDDEN,
            ),
            (
                ApiError::from(SetupError::ExternalLookupFailed {
                    group_id,
                    reason: "timeout".to_owned(),
                }),
                StatusCode::BAD_GATEWAY,
            ),
            (ApiError::from(SyncError::CallerNotLinked), StatusCode::PRECONDITION_FAILED),
            (
                ApiError::from(SyncError::RoleApplyFailed(AppError::Forbidden(
                    "missing permissions".to_owned(),
                ))),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ApiError::from(SyncError::StoreUnavailable(AppError::Unavailable(
                    "redis down".to_owned(),
                ))),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ApiError::from(AppError::Validation("bad id".to_owned())),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
