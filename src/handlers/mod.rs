pub mod synthetic;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

// ─── Unified error type ──────────────────────────────────────────

/// A handler failure. Converted into a 500 response at the router
/// boundary — the process keeps serving. Handlers that return this have
/// already recorded their error metrics.
#[derive(Debug)]
pub enum AppError {
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let Self::Internal(message) = self;
        let status = StatusCode::INTERNAL_SERVER_ERROR;

        let body = serde_json::json!({
            "error":  message,
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}
