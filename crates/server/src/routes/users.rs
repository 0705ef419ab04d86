use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use shared::{report::UserStats, NewUser, User, UserList, UserQuery, ValidationError, View};

use crate::{
    auth::{hash_password, AuthUser},
    error::AppError,
    state::AppState,
};

/// GET /users?search=&role=
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<UserQuery>,
) -> Result<Json<UserList>, AppError> {
    auth.require(View::Users)?;

    let stats = UserStats::from_users(&state.repo.all_users().await);
    let users = state.repo.list_users(&query).await;
    Ok(Json(UserList { users, stats }))
}

/// POST /users
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<NewUser>,
) -> Result<(StatusCode, Json<User>), AppError> {
    auth.require(View::Users)?;
    req.validate()?;

    // Check before paying for the hash; the insert checks again under the lock
    if state.repo.email_taken(&req.email).await {
        return Err(ValidationError::DuplicateEmail.into());
    }

    let password = req.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let user = state.repo.insert_user(req, password_hash).await?;
    tracing::info!("User {} created by {}", user.id, auth.user.email);
    Ok((StatusCode::CREATED, Json(user)))
}
