//! JSON API handlers.
//!
//! The API shares the caller's session workspace with the browser console,
//! so a query run here shows up in the console's history and vice versa.

use axum::{
    Json,
    extract::Query,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use sql_whisperer_core::{
    ChartSuggestion, Intent, QueryRecord, ResolvedQuery, ResultSummary, RowSet, resolve,
};

use crate::db::TableCounts;
use crate::error::Result;
use crate::middleware::CurrentWorkspace;

#[derive(Debug, Deserialize)]
pub struct PromptRequest {
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct SqlRequest {
    pub sql: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

/// A resolved query as returned to API clients.
#[derive(Debug, Serialize)]
pub struct ResolvedQueryResponse {
    pub intent: Intent,
    pub label: &'static str,
    pub sql: &'static str,
    pub params: Vec<String>,
    pub display_sql: String,
}

impl From<ResolvedQuery> for ResolvedQueryResponse {
    fn from(query: ResolvedQuery) -> Self {
        Self {
            intent: query.intent,
            label: query.intent.label(),
            display_sql: query.display_sql(),
            sql: query.sql,
            params: query.params,
        }
    }
}

/// Rows plus the numbers the console shows beside them.
#[derive(Debug, Serialize)]
pub struct ResultResponse {
    pub result: RowSet,
    pub summary: ResultSummary,
    pub chart: Option<ChartSuggestion>,
}

impl From<RowSet> for ResultResponse {
    fn from(result: RowSet) -> Self {
        Self {
            summary: ResultSummary::of(&result),
            chart: ChartSuggestion::for_rowset(&result),
            result,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub query: ResolvedQueryResponse,
    #[serde(flatten)]
    pub result: ResultResponse,
}

/// Resolve a prompt without executing it.
#[instrument(skip(request))]
pub async fn resolve_prompt(Json(request): Json<PromptRequest>) -> Json<ResolvedQueryResponse> {
    Json(resolve(&request.prompt).into())
}

/// Resolve and execute a prompt in the caller's workspace.
#[instrument(skip(current, request), fields(workspace = %current.id))]
pub async fn query(
    current: CurrentWorkspace,
    Json(request): Json<PromptRequest>,
) -> Result<Json<QueryResponse>> {
    let mut workspace = current.workspace.lock().await;
    let (query, rows) = workspace.ask(&request.prompt).await?;
    info!(intent = ?query.intent, rows = rows.len(), "Query executed");

    Ok(Json(QueryResponse {
        query: query.into(),
        result: rows.clone().into(),
    }))
}

/// Execute hand-written SQL in the caller's workspace.
#[instrument(skip(current, request), fields(workspace = %current.id))]
pub async fn execute_sql(
    current: CurrentWorkspace,
    Json(request): Json<SqlRequest>,
) -> Result<Json<ResultResponse>> {
    let workspace = current.workspace.lock().await;
    let rows = workspace.execute_sql(&request.sql).await?;
    Ok(Json(rows.into()))
}

/// The caller's history, newest first.
#[instrument(skip(current), fields(workspace = %current.id))]
pub async fn history(
    current: CurrentWorkspace,
    Query(params): Query<HistoryQuery>,
) -> Json<Vec<QueryRecord>> {
    let workspace = current.workspace.lock().await;
    let history = workspace.history();
    let limit = params.limit.unwrap_or(history.len());
    Json(history.recent(limit).cloned().collect())
}

/// Row counts of the caller's tables.
#[instrument(skip(current), fields(workspace = %current.id))]
pub async fn stats(current: CurrentWorkspace) -> Result<Json<TableCounts>> {
    let workspace = current.workspace.lock().await;
    Ok(Json(workspace.store().counts().await?))
}
