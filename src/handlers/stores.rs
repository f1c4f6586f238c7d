// src/handlers/stores.rs

use axum::{extract::State, response::IntoResponse, Json};

use crate::{common::error::AppError, config::AppState, models::store::StoreListResponse};

// GET /api/stores
#[utoipa::path(
    get,
    path = "/api/stores",
    tag = "Público",
    responses(
        (status = 200, description = "Lojas cadastradas (id e nome)", body = StoreListResponse)
    )
)]
pub async fn list_stores(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let stores = app_state.store_service.list_stores().await?;
    Ok(Json(StoreListResponse { success: true, stores }))
}
