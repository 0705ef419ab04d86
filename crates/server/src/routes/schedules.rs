use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use shared::{NewSchedule, ScheduleDetails, ScheduleList, ScheduleQuery, View};

use crate::{auth::AuthUser, error::AppError, state::AppState};

/// GET /schedules?search=&status=
pub async fn list_schedules(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<ScheduleList>, AppError> {
    auth.require(View::Schedules)?;

    let total = state.repo.schedule_records().await.len();
    let schedules = state.repo.list_schedules(&query).await;
    Ok(Json(ScheduleList { schedules, total }))
}

/// POST /schedules
pub async fn create_schedule(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<NewSchedule>,
) -> Result<(StatusCode, Json<ScheduleDetails>), AppError> {
    auth.require(View::Schedules)?;

    let details = state.repo.insert_schedule(req, &auth.user.id).await?;
    Ok((StatusCode::CREATED, Json(details)))
}
