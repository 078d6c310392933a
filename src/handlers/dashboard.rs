use axum::{extract::State, Json};

use crate::dto::dashboard::Dashboard;
use crate::{ApiResponse, ApiResult, AppState};

#[utoipa::path(
    get,
    path = "/api/home",
    summary = "Dashboard",
    description = "Order, warehouse, inventory, quality and production aggregates for the home screen.",
    responses(
        (status = 200, description = "Aggregates", body = ApiResponse<Dashboard>),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "Dashboard"
)]
pub async fn dashboard(State(state): State<AppState>) -> ApiResult<Dashboard> {
    let summary = state.services.dashboard.summary().await?;
    Ok(Json(ApiResponse::success(summary)))
}
