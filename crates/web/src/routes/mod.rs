//! HTTP route handlers for the console.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                 - Console page
//! GET  /health           - Health check
//!
//! # Console actions (redirect back to /)
//! POST /generate         - Resolve a prompt into the pending query
//! POST /execute          - Execute the pending query
//! POST /reset            - Discard the workspace and start over
//! GET  /export.csv       - Download the last result
//!
//! # JSON API
//! POST /api/resolve      - Resolve a prompt, no execution
//! POST /api/query        - Resolve and execute a prompt
//! POST /api/execute      - Execute raw SQL
//! GET  /api/history      - Executed queries, newest first (?limit=n)
//! GET  /api/stats        - Table row counts
//! ```

pub mod api;
pub mod console;

use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::middleware::{create_session_layer, request_id_middleware};
use crate::state::AppState;

/// Create the console routes router.
pub fn console_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(console::index))
        .route("/generate", post(console::generate))
        .route("/execute", post(console::execute))
        .route("/reset", post(console::reset))
        .route("/export.csv", get(console::export_csv))
}

/// Create the JSON API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/resolve", post(api::resolve_prompt))
        .route("/query", post(api::query))
        .route("/execute", post(api::execute_sql))
        .route("/history", get(api::history))
        .route("/stats", get(api::stats))
}

/// Build the full application router with sessions, tracing and request ids.
///
/// Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(console_routes())
        .nest("/api", api_routes())
        .nest_service(
            "/static",
            ServeDir::new(concat!(env!("CARGO_MANIFEST_DIR"), "/static")),
        )
        .layer(session_layer)
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Span for one request; `request_id` is filled in by the request id middleware.
fn make_request_span(request: &axum::http::Request<axum::body::Body>) -> tracing::Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = tracing::field::Empty,
    )
}
