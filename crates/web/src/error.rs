//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`.

use std::sync::Arc;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::StoreError;
use crate::services::executor::ExecutionError;
use crate::services::export::ExportError;

/// Application-level error type for the console.
#[derive(Debug, Error)]
pub enum AppError {
    /// A workspace's store could not be opened or read.
    #[error("Store error: {0}")]
    Store(#[from] Arc<StoreError>),

    /// The session layer failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// A CSV export failed.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// The database rejected a query.
    #[error("Query Error: {0}")]
    Execution(#[from] ExecutionError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::Store(Arc::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(
            self,
            Self::Store(_) | Self::Session(_) | Self::Export(_) | Self::Internal(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        match self {
            // Query diagnostics are user-facing and go back verbatim.
            Self::Execution(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": err.message })),
            )
                .into_response(),
            Self::Store(_) | Self::Session(_) | Self::Export(_) | Self::Internal(_) => {
                // Don't expose internal error details to clients
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
            Self::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()).into_response(),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()).into_response(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
