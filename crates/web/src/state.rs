//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::WhispererConfig;
use crate::services::workspace::WorkspaceRegistry;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds the configuration and the registry of
/// per-session workspaces; there is no shared database.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WhispererConfig,
    workspaces: WorkspaceRegistry,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: WhispererConfig) -> Self {
        let workspaces = WorkspaceRegistry::new(config.max_workspaces, config.session_idle);

        Self {
            inner: Arc::new(AppStateInner { config, workspaces }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &WhispererConfig {
        &self.inner.config
    }

    /// Get a reference to the workspace registry.
    #[must_use]
    pub fn workspaces(&self) -> &WorkspaceRegistry {
        &self.inner.workspaces
    }
}
