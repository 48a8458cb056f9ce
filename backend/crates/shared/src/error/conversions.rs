//! Error conversions - From implementations for common error types
//!
//! Provides automatic conversion from common error types to [`AppError`],
//! and the HTTP rendering of [`AppError`] behind the `axum` feature.

use super::app_error::AppError;

// ============================================================================
// serde_json conversions
// ============================================================================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() || err.is_data() {
            AppError::bad_request("malformed JSON payload").with_source(err)
        } else {
            AppError::internal("JSON serialization error").with_source(err)
        }
    }
}

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

/// 5xx のときにクライアントへ返す固定メッセージ
pub const GENERIC_SERVER_MESSAGE: &str = "internal server error";

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // 5xx はドライバのメッセージ等を漏らさない
        let message = if self.is_server_error() {
            GENERIC_SERVER_MESSAGE
        } else {
            self.message()
        };

        let body = serde_json::json!({
            "status": self.status_code(),
            "tag": self.tag(),
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}
