use axum::{extract::State, Json};
use chrono::Duration;
use serde_json::{json, Value};
use shared::{LoginRequest, LoginResponse, User};

use crate::{
    auth::{generate_token, verify_credentials, AuthUser, INVALID_CREDENTIALS},
    error::AppError,
    state::AppState,
};

/// Verify credentials and open a session
/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    req.validate()?;

    let roster = state.repo.roster().await;
    let email = req.email.clone();
    // argon2 verification is CPU-bound; keep it off the async workers
    let user = tokio::task::spawn_blocking(move || verify_credentials(&roster, &req.email, &req.password))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| {
            tracing::info!("Failed login attempt for {}", email);
            AppError::AuthError(INVALID_CREDENTIALS.to_string())
        })?;

    let lifetime = Duration::hours(state.config.auth.token_expiry_hours as i64);
    let session = state.sessions.create_session(&user.id, lifetime);
    let token = generate_token(&user.id, session.session_id, &state.config.auth)?;

    tracing::info!("User {} logged in", user.email);
    Ok(Json(LoginResponse { token, user }))
}

/// End the caller's session
/// POST /auth/logout
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> Json<Value> {
    if let Some(session) = state.sessions.get_session(&auth.session_id) {
        tracing::debug!("Closing session opened at {}", session.created_at);
    }
    state.sessions.revoke(&auth.session_id);
    tracing::info!("User {} logged out", auth.user.email);
    Json(json!({ "success": true }))
}

/// Current principal
/// GET /auth/me
pub async fn me(auth: AuthUser) -> Json<User> {
    Json(auth.user)
}
