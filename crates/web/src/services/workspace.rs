//! Per-session workspaces.
//!
//! A [`Workspace`] bundles everything one visitor owns: a private seeded
//! store, the query awaiting execution, the last result and the history.
//! The [`WorkspaceRegistry`] maps session workspace ids to workspaces and
//! tears down any workspace left idle for longer than the session lifetime.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use moka::notification::ListenerFuture;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use sql_whisperer_core::{QueryHistory, QueryRecord, ResolvedQuery, RowSet, resolve};

use crate::db::{SampleStore, StoreError};
use crate::services::executor::{self, ExecutionError};

/// Shown when the console is asked to generate from a blank prompt.
pub const EMPTY_PROMPT_WARNING: &str = "Please enter a query first!";

/// Errors from running the pending query.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("no query has been generated yet")]
    NoPendingQuery,

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

/// A one-shot message for the next console render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Warning,
    Error,
}

impl NoticeLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// A generated query and the prompt it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuery {
    pub prompt: String,
    pub query: ResolvedQuery,
}

/// One visitor's isolated state.
#[derive(Debug)]
pub struct Workspace {
    store: SampleStore,
    history: QueryHistory,
    pending: Option<PendingQuery>,
    last_result: Option<RowSet>,
    notice: Option<Notice>,
}

impl Workspace {
    /// Open a workspace over a freshly seeded store.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be created or seeded.
    pub async fn open() -> Result<Self, StoreError> {
        Ok(Self::with_store(SampleStore::open().await?))
    }

    #[must_use]
    pub const fn with_store(store: SampleStore) -> Self {
        Self {
            store,
            history: QueryHistory::new(),
            pending: None,
            last_result: None,
            notice: None,
        }
    }

    /// Resolve `prompt` and hold the query until it is executed.
    ///
    /// A blank prompt leaves the pending query untouched and queues a
    /// warning instead.
    pub fn generate(&mut self, prompt: &str) -> Option<&PendingQuery> {
        if prompt.trim().is_empty() {
            self.warn(EMPTY_PROMPT_WARNING);
            return None;
        }
        Some(self.pending.insert(PendingQuery {
            prompt: prompt.to_owned(),
            query: resolve(prompt),
        }))
    }

    /// Execute the pending query.
    ///
    /// Success replaces the last result and appends to the history. Failure
    /// leaves both untouched and queues the diagnostic as an error notice.
    ///
    /// # Errors
    ///
    /// Returns `NoPendingQuery` if nothing was generated, or the database's
    /// diagnostic if execution fails.
    #[instrument(skip(self))]
    pub async fn execute_pending(&mut self) -> Result<&RowSet, WorkspaceError> {
        let pending = self.pending.as_ref().ok_or(WorkspaceError::NoPendingQuery)?;

        match executor::run(&self.store, &pending.query).await {
            Ok(rows) => {
                self.history.push(QueryRecord::new(
                    pending.prompt.clone(),
                    pending.query.display_sql(),
                ));
                Ok(self.last_result.insert(rows))
            }
            Err(err) => {
                self.notice = Some(Notice {
                    level: NoticeLevel::Error,
                    message: format!("Query Error: {err}"),
                });
                Err(err.into())
            }
        }
    }

    /// Resolve and execute in one step.
    ///
    /// On success the query becomes the pending query, its rows the last
    /// result, and the pair is appended to the history.
    ///
    /// # Errors
    ///
    /// Returns the database's diagnostic if execution fails.
    pub async fn ask(&mut self, prompt: &str) -> Result<(ResolvedQuery, &RowSet), ExecutionError> {
        let query = resolve(prompt);
        let rows = executor::run(&self.store, &query).await?;

        self.history
            .push(QueryRecord::new(prompt, query.display_sql()));
        self.pending = Some(PendingQuery {
            prompt: prompt.to_owned(),
            query: query.clone(),
        });
        Ok((query, self.last_result.insert(rows)))
    }

    /// Run hand-written SQL against this workspace's store.
    ///
    /// Ad-hoc queries are not recorded in the history.
    ///
    /// # Errors
    ///
    /// Returns the database's diagnostic if execution fails.
    pub async fn execute_sql(&self, sql: &str) -> Result<RowSet, ExecutionError> {
        executor::execute(&self.store, sql).await
    }

    fn warn(&mut self, message: &str) {
        self.notice = Some(Notice {
            level: NoticeLevel::Warning,
            message: message.to_owned(),
        });
    }

    /// Take the queued notice, if any.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    #[must_use]
    pub const fn store(&self) -> &SampleStore {
        &self.store
    }

    #[must_use]
    pub const fn history(&self) -> &QueryHistory {
        &self.history
    }

    #[must_use]
    pub const fn pending(&self) -> Option<&PendingQuery> {
        self.pending.as_ref()
    }

    #[must_use]
    pub const fn last_result(&self) -> Option<&RowSet> {
        self.last_result.as_ref()
    }
}

/// A workspace shared between the requests of one session.
pub type SharedWorkspace = Arc<Mutex<Workspace>>;

/// Session workspace id to workspace, with idle expiry.
#[derive(Clone)]
pub struct WorkspaceRegistry {
    cache: Cache<Uuid, SharedWorkspace>,
}

impl WorkspaceRegistry {
    /// Create a registry holding at most `max_workspaces` workspaces, each
    /// dropped after `idle` without use.
    #[must_use]
    pub fn new(max_workspaces: u64, idle: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_workspaces)
            .time_to_idle(idle)
            .async_eviction_listener(|id, workspace: SharedWorkspace, cause| -> ListenerFuture {
                Box::pin(async move {
                    workspace.lock().await.store().close().await;
                    debug!(workspace = %id, ?cause, "Workspace torn down");
                })
            })
            .build();

        Self { cache }
    }

    /// The workspace for `id`, opening a fresh one on first use.
    ///
    /// Concurrent first requests for the same id share one open.
    ///
    /// # Errors
    ///
    /// Returns the store error if a new workspace cannot be opened.
    pub async fn get_or_open(&self, id: Uuid) -> Result<SharedWorkspace, Arc<StoreError>> {
        self.cache
            .try_get_with(id, async {
                let workspace = Workspace::open().await?;
                info!(workspace = %id, "Workspace opened");
                Ok::<_, StoreError>(Arc::new(Mutex::new(workspace)))
            })
            .await
    }

    /// The workspace for `id` if it is still alive.
    pub async fn get(&self, id: Uuid) -> Option<SharedWorkspace> {
        self.cache.get(&id).await
    }

    /// Drop the workspace for `id` and close its store; the next request
    /// starts from a fresh seed.
    pub async fn discard(&self, id: Uuid) -> bool {
        match self.cache.remove(&id).await {
            Some(workspace) => {
                workspace.lock().await.store().close().await;
                true
            }
            None => false,
        }
    }

    /// Approximate number of live workspaces.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.cache.entry_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for WorkspaceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceRegistry")
            .field("entries", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}
