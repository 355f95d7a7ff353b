use axum::extract::{MatchedPath, State};
use axum::http::Method;
use std::sync::Arc;

use super::AppError;
use crate::AppState;

// ─── GET / ───────────────────────────────────────────────────────

/// Immediate success; the instrumentation wrapper does all the counting.
pub async fn root() -> &'static str {
    "Welcome to the Observability App"
}

// ─── GET /slow ───────────────────────────────────────────────────

/// Suspends for a uniformly random 3–9 delay units, then succeeds.
/// 1 in 100 invocations instead fails immediately, with no delay.
pub async fn slow(
    State(state): State<Arc<AppState>>,
    method: Method,
    path: MatchedPath,
) -> Result<&'static str, AppError> {
    if state.chance.one_in(100) {
        // Error metrics are recorded before the failure is signalled, so
        // they survive even if finalization downstream is skipped.
        state.http.record_error(method.as_str(), path.as_str());
        return Err(AppError::Internal("Internal Error".into()));
    }

    let units = state.chance.pick(3..=9);
    tokio::time::sleep(state.slow_delay_unit * units as u32).await;

    Ok("Slow url accessed !!")
}

// ─── GET /error ──────────────────────────────────────────────────

/// Unconditional failure; always a 500.
pub async fn error(
    State(state): State<Arc<AppState>>,
    method: Method,
    path: MatchedPath,
) -> Result<&'static str, AppError> {
    state.http.record_error(method.as_str(), path.as_str());
    Err(AppError::Internal("Internal Error".into()))
}
