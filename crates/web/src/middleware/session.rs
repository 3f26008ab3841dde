//! Session middleware configuration and the workspace extractor.
//!
//! Sessions live in a `tower-sessions` memory store and carry a single value:
//! the id of the visitor's workspace in the [`WorkspaceRegistry`].
//!
//! [`WorkspaceRegistry`]: crate::services::workspace::WorkspaceRegistry

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};
use uuid::Uuid;

use crate::config::WhispererConfig;
use crate::error::AppError;
use crate::services::workspace::SharedWorkspace;
use crate::state::AppState;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "sw_session";

/// Session keys.
pub mod keys {
    /// Id of the session's workspace.
    pub const WORKSPACE_ID: &str = "workspace_id";
}

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &WhispererConfig) -> SessionManagerLayer<MemoryStore> {
    let idle_secs = i64::try_from(config.session_idle.as_secs()).unwrap_or(i64::MAX);

    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(idle_secs),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// The calling session's workspace, opened on first use.
///
/// Use this as an extractor in any handler that reads or changes session
/// state.
pub struct CurrentWorkspace {
    pub id: Uuid,
    pub workspace: SharedWorkspace,
}

impl FromRequestParts<AppState> for CurrentWorkspace {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = session_from_parts(parts)?;
        let id = workspace_id(&session).await?;
        let workspace = state.workspaces().get_or_open(id).await?;

        Ok(Self { id, workspace })
    }
}

fn session_from_parts(parts: &Parts) -> Result<Session, AppError> {
    parts
        .extensions
        .get::<Session>()
        .cloned()
        .ok_or_else(|| AppError::Internal("Session layer is not installed".to_string()))
}

/// The session's workspace id, assigning a new one if it has none.
async fn workspace_id(session: &Session) -> Result<Uuid, AppError> {
    if let Some(id) = session.get::<Uuid>(keys::WORKSPACE_ID).await? {
        return Ok(id);
    }

    let id = Uuid::new_v4();
    session.insert(keys::WORKSPACE_ID, id).await?;
    tracing::debug!(workspace = %id, "Assigned workspace to session");
    Ok(id)
}
