//! Administration endpoints

use axum::{extract::State, Json};

use crate::error::AppResult;

use super::ApiResponse;

/// Drop and recreate all tables. Mounted only when `admin.allow_reset` is set.
#[utoipa::path(
    post,
    path = "/admin/reset",
    tag = "admin",
    responses(
        (status = 200, description = "Database reset, all tables empty"),
        (status = 404, description = "Reset is disabled in configuration")
    )
)]
pub async fn reset_database(
    State(state): State<crate::AppState>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.services.admin.reset_database().await?;
    Ok(ApiResponse::message("Database reset"))
}
