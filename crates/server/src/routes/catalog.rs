//! Read-only lists feeding the schedule form.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use shared::{Customer, Equipment, EquipmentStatus, User};

use crate::{auth::AuthUser, state::AppState};

#[derive(Debug, Deserialize)]
pub struct EquipmentQuery {
    pub status: Option<EquipmentStatus>,
}

/// GET /customers
pub async fn list_customers(State(state): State<AppState>, _auth: AuthUser) -> Json<Vec<Customer>> {
    Json(state.repo.customers().await)
}

/// GET /equipment?status=
pub async fn list_equipment(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<EquipmentQuery>,
) -> Json<Vec<Equipment>> {
    Json(state.repo.equipment(query.status).await)
}

/// GET /technicians
pub async fn list_technicians(State(state): State<AppState>, _auth: AuthUser) -> Json<Vec<User>> {
    Json(state.repo.technicians().await)
}
