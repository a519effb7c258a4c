use serde::Serialize;
use ts_rs::TS;

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    code: String,
    category: String,
    message: String,
    retryable: bool,
}

impl ErrorResponse {
    pub(super) fn new(
        code: &str,
        category: &str,
        message: String,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.to_owned(),
            category: category.to_owned(),
            message,
            retryable,
        }
    }
}
