use axum::{middleware as axum_mw, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::handlers::synthetic;
use crate::metrics::exposition;
use crate::middleware::instrument;
use crate::AppState;

/// Builds the full Axum `Router` with all routes and middleware.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // ── Synthetic traffic endpoints ─────────────────────────
        .route("/", get(synthetic::root))
        .route("/slow", get(synthetic::slow))
        .route("/error", get(synthetic::error))
        // ── Exposition ──────────────────────────────────────────
        .route("/metrics", get(exposition::serve_metrics))
        // ── Provide shared state to all routes above ────────────
        .with_state(state.clone())
        // ── Global middleware (applied bottom-up) ───────────────
        // The instrumentation wrapper sits outside the routes, so
        // every request — the /metrics scrape included — gets one
        // timer observation and one total-counter increment.
        .layer(axum_mw::from_fn_with_state(state, instrument::instrument))
        .layer(CorsLayer::permissive())
}
