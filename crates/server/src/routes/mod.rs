use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::{error::AppError, state::AppState};

mod auth;
mod catalog;
mod health;
mod reports;
mod schedules;
mod users;

#[cfg(test)]
mod testing;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth routes
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        // User management (admin only)
        .route("/users", get(users::list_users).post(users::create_user))
        // Schedules
        .route("/schedules", get(schedules::list_schedules).post(schedules::create_schedule))
        // Form catalogs
        .route("/customers", get(catalog::list_customers))
        .route("/equipment", get(catalog::list_equipment))
        .route("/technicians", get(catalog::list_technicians))
        // Summaries
        .route("/dashboard", get(reports::dashboard))
        .route("/reports", get(reports::report))
        .route("/reports/export", get(reports::export))
        .fallback(not_found)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}
