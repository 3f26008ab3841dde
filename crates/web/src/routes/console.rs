//! Browser console route handlers.
//!
//! The console follows post/redirect/get: every form posts to an action
//! that updates the session workspace and redirects back to `/`, which
//! renders the current state.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::header,
    response::{IntoResponse, Redirect},
};
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use sql_whisperer_core::{CellValue, ChartSuggestion, QueryRecord, ResultSummary, RowSet};

use crate::db::TableCounts;
use crate::error::{AppError, Result};
use crate::middleware::CurrentWorkspace;
use crate::middleware::session::keys;
use crate::services::export;
use crate::services::workspace::{Notice, PendingQuery, WorkspaceError};
use crate::state::AppState;

/// Prompts offered in the sample picker.
pub const SAMPLE_PROMPTS: &[&str] = &[
    "Show top 10 products by revenue",
    "List all customers from New York",
    "Find recent orders in the last month",
    "Show customer distribution by city",
    "Display highest priced products",
];

/// Hints shown beside the prompt form.
pub const QUERY_TIPS: &[&str] = &[
    "Be specific with your requirements",
    "Use terms like 'top', 'highest', 'recent'",
    "Mention specific columns or filters",
    "Ask for aggregations like 'total', 'count'",
    "Include date ranges when needed",
];

/// Generate form. A non-empty `sample` takes precedence over `prompt`.
#[derive(Debug, Deserialize)]
pub struct GenerateForm {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub sample: String,
}

impl GenerateForm {
    fn into_prompt(self) -> String {
        if self.sample.trim().is_empty() {
            self.prompt
        } else {
            self.sample
        }
    }
}

/// The query waiting to be executed.
pub struct PendingView {
    pub prompt: String,
    pub label: &'static str,
    pub sql: String,
}

impl From<&PendingQuery> for PendingView {
    fn from(pending: &PendingQuery) -> Self {
        Self {
            prompt: pending.prompt.clone(),
            label: pending.query.intent.label(),
            sql: pending.query.display_sql(),
        }
    }
}

/// The last result, pre-formatted for the table.
pub struct ResultView {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub summary: ResultSummary,
    pub chart: Option<ChartView>,
}

impl From<&RowSet> for ResultView {
    fn from(rows: &RowSet) -> Self {
        Self {
            columns: rows.columns().to_vec(),
            rows: rows
                .rows()
                .map(|row| row.cells().iter().map(ToString::to_string).collect())
                .collect(),
            summary: ResultSummary::of(rows),
            chart: ChartSuggestion::for_rowset(rows).map(ChartView::from),
        }
    }
}

/// A suggested bar chart.
pub struct ChartView {
    pub title: String,
    pub bars: Vec<BarView>,
}

pub struct BarView {
    pub label: String,
    pub value: String,
    pub percent: u32,
}

impl From<ChartSuggestion> for ChartView {
    fn from(chart: ChartSuggestion) -> Self {
        let bars = chart
            .points
            .iter()
            .map(|point| BarView {
                label: point.label.clone(),
                value: CellValue::Real(point.value).to_string(),
                percent: chart.bar_percent(point.value),
            })
            .collect();

        Self {
            title: chart.title,
            bars,
        }
    }
}

/// Console page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/console.html")]
pub struct ConsoleTemplate {
    pub sample_prompts: &'static [&'static str],
    pub tips: &'static [&'static str],
    /// Row counts, or `None` when the tables can no longer be counted.
    pub counts: Option<TableCounts>,
    pub notice: Option<Notice>,
    pub pending: Option<PendingView>,
    pub result: Option<ResultView>,
    pub history: Vec<QueryRecord>,
}

/// Render the console for the caller's workspace.
#[instrument(skip(current), fields(workspace = %current.id))]
pub async fn index(current: CurrentWorkspace) -> ConsoleTemplate {
    let mut workspace = current.workspace.lock().await;
    let notice = workspace.take_notice();
    let counts = match workspace.store().counts().await {
        Ok(counts) => Some(counts),
        Err(err) => {
            warn!(error = %err, "Table counts unavailable");
            None
        }
    };

    ConsoleTemplate {
        sample_prompts: SAMPLE_PROMPTS,
        tips: QUERY_TIPS,
        counts,
        notice,
        pending: workspace.pending().map(PendingView::from),
        result: workspace.last_result().map(ResultView::from),
        history: workspace.history().for_display().cloned().collect(),
    }
}

/// Resolve the submitted prompt into the pending query.
#[instrument(skip(current, form), fields(workspace = %current.id))]
pub async fn generate(current: CurrentWorkspace, Form(form): Form<GenerateForm>) -> Redirect {
    let prompt = form.into_prompt();
    let mut workspace = current.workspace.lock().await;

    if let Some(pending) = workspace.generate(&prompt) {
        info!(intent = ?pending.query.intent, "Query generated");
    }

    Redirect::to("/")
}

/// Execute the pending query.
#[instrument(skip(current), fields(workspace = %current.id))]
pub async fn execute(current: CurrentWorkspace) -> Result<Redirect> {
    let mut workspace = current.workspace.lock().await;

    match workspace.execute_pending().await {
        Ok(rows) => info!(rows = rows.len(), "Query executed"),
        // Shown to the user on the next render; not a server fault.
        Err(WorkspaceError::Execution(err)) => info!(error = %err, "Query rejected"),
        Err(WorkspaceError::NoPendingQuery) => {
            return Err(AppError::BadRequest(
                "Generate a query before executing it".to_string(),
            ));
        }
    }

    Ok(Redirect::to("/"))
}

/// Download the last result as CSV.
#[instrument(skip(current), fields(workspace = %current.id))]
pub async fn export_csv(current: CurrentWorkspace) -> Result<impl IntoResponse> {
    let workspace = current.workspace.lock().await;
    let rows = workspace
        .last_result()
        .ok_or_else(|| AppError::NotFound("No query result to export".to_string()))?;

    let body = export::to_csv(rows)?;
    let filename = export::filename(Utc::now());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    ))
}

/// Discard the caller's workspace. The next page load starts from a fresh
/// seed with an empty history.
#[instrument(skip(state, session))]
pub async fn reset(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    if let Some(id) = session.get::<Uuid>(keys::WORKSPACE_ID).await? {
        let discarded = state.workspaces().discard(id).await;
        info!(workspace = %id, discarded, "Workspace reset");
    }
    Ok(Redirect::to("/"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_overrides_prompt() {
        let form = GenerateForm {
            prompt: "typed".to_string(),
            sample: "Display highest priced products".to_string(),
        };
        assert_eq!(form.into_prompt(), "Display highest priced products");

        let form = GenerateForm {
            prompt: "typed".to_string(),
            sample: String::new(),
        };
        assert_eq!(form.into_prompt(), "typed");
    }

    #[test]
    fn test_result_view_formats_cells() {
        let mut rows = RowSet::new(vec!["product_name".into(), "total_revenue".into()]);
        rows.push_row(vec![CellValue::Text("Laptop".into()), CellValue::Real(2199.98)]).unwrap();
        rows.push_row(vec![CellValue::Text("Mouse".into()), CellValue::Real(59.98)]).unwrap();

        let view = ResultView::from(&rows);
        assert_eq!(view.rows[0], ["Laptop", "2199.98"]);
        assert_eq!(view.summary.rows, 2);

        let chart = view.chart.unwrap();
        assert_eq!(chart.title, "total_revenue by product_name");
        assert_eq!(chart.bars[0].percent, 100);
        assert_eq!(chart.bars[1].percent, 3);
    }
}
