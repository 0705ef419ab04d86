use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use shared::{
    export::{self, ExportFormat},
    report::{self, DashboardSummary, ReportData},
    View,
};

use crate::{auth::AuthUser, error::AppError, state::AppState};

/// GET /dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<DashboardSummary>, AppError> {
    auth.require(View::Dashboard)?;
    let report = state.repo.report().await;
    let schedules = state.repo.all_schedules().await;
    Ok(Json(report::dashboard(report, schedules)))
}

/// GET /reports
pub async fn report(State(state): State<AppState>, auth: AuthUser) -> Result<Json<ReportData>, AppError> {
    auth.require(View::Reports)?;
    Ok(Json(state.repo.report().await))
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(default = "default_format")]
    pub format: ExportFormat,
}

fn default_format() -> ExportFormat {
    ExportFormat::Csv
}

/// Download every schedule as a file
/// GET /reports/export?format=csv
pub async fn export(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ExportQuery>,
) -> Result<Response, AppError> {
    auth.require(View::Reports)?;

    let schedules = state.repo.all_schedules().await;
    let content = export::export(query.format, &schedules)?;
    let file_name = export::file_name(query.format, Utc::now().date_naive());
    tracing::info!("Exported {} schedules to {}", schedules.len(), file_name);

    Ok((
        [
            (header::CONTENT_TYPE, query.format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        content,
    )
        .into_response())
}
