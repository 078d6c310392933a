use axum::{extract::State, response::IntoResponse, Json};
use tracing::info;

use crate::auth::AuthUser;
use crate::dto::warehouses::{
    CreatePositionRequest, CreateWarehouseRequest, PositionListQuery, UpdateWarehouseRequest,
    VacantPositionsQuery, WarehouseDetail, WarehouseListQuery,
};
use crate::entities::{warehouse, warehouse_position};
use crate::errors::ServiceError;
use crate::{ApiResponse, ApiResult, AppState};

use super::common::{created, LenientJson, ValidPath, ValidQuery, ValidatedJson};

#[utoipa::path(
    post,
    path = "/api/warehouses",
    summary = "Create warehouse",
    request_body = CreateWarehouseRequest,
    responses(
        (status = 201, description = "Warehouse created", body = ApiResponse<warehouse::Model>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse),
        (status = 409, description = "Warehouse id already exists", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Warehouses"
)]
pub async fn create_warehouse(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateWarehouseRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let row = state.services.warehouses.create_warehouse(request).await?;
    info!(warehouse_id = %row.warehouse_id, user = %user.username, "Warehouse created");
    Ok(created(row, "Warehouse created"))
}

#[utoipa::path(
    get,
    path = "/api/warehouses",
    summary = "List warehouses",
    params(WarehouseListQuery),
    responses(
        (status = 200, description = "Warehouses ordered by name", body = ApiResponse<Vec<warehouse::Model>>),
    ),
    security(("Bearer" = [])),
    tag = "Warehouses"
)]
pub async fn list_warehouses(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<WarehouseListQuery>,
) -> ApiResult<Vec<warehouse::Model>> {
    let page = state.pagination(query.page.as_deref(), query.limit.as_deref());
    let (rows, total) = state.services.warehouses.list_warehouses(&query, page).await?;
    Ok(Json(ApiResponse::paginated(rows, page.meta(total))))
}

#[utoipa::path(
    get,
    path = "/api/warehouses/{warehouseId}",
    summary = "Get warehouse with its stock",
    params(("warehouseId" = String, Path, description = "Warehouse id")),
    responses(
        (status = 200, description = "Warehouse and inventory by position", body = ApiResponse<WarehouseDetail>),
        (status = 404, description = "Warehouse not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Warehouses"
)]
pub async fn get_warehouse(
    State(state): State<AppState>,
    ValidPath(warehouse_id): ValidPath<String>,
) -> ApiResult<WarehouseDetail> {
    let detail = state.services.warehouses.get_warehouse(&warehouse_id).await?;
    Ok(Json(ApiResponse::success(detail)))
}

#[utoipa::path(
    put,
    path = "/api/warehouses/{warehouseId}",
    summary = "Update warehouse",
    params(("warehouseId" = String, Path, description = "Warehouse id")),
    request_body = UpdateWarehouseRequest,
    responses(
        (status = 200, description = "Updated warehouse", body = ApiResponse<warehouse::Model>),
        (status = 400, description = "Nothing to update", body = crate::errors::ErrorResponse),
        (status = 404, description = "Warehouse not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Warehouses"
)]
pub async fn update_warehouse(
    State(state): State<AppState>,
    ValidPath(warehouse_id): ValidPath<String>,
    LenientJson(request): LenientJson<UpdateWarehouseRequest>,
) -> ApiResult<warehouse::Model> {
    let row = state
        .services
        .warehouses
        .update_warehouse(&warehouse_id, request)
        .await?;
    Ok(Json(ApiResponse::success(row).with_message("Warehouse updated")))
}

#[utoipa::path(
    delete,
    path = "/api/warehouses/{warehouseId}",
    summary = "Deactivate warehouse",
    description = "Warehouses are never removed; they are marked inactive once empty.",
    params(("warehouseId" = String, Path, description = "Warehouse id")),
    responses(
        (status = 200, description = "Warehouse deactivated", body = ApiResponse<warehouse::Model>),
        (status = 400, description = "Warehouse still holds stock", body = crate::errors::ErrorResponse),
        (status = 404, description = "Warehouse not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Warehouses"
)]
pub async fn deactivate_warehouse(
    State(state): State<AppState>,
    user: AuthUser,
    ValidPath(warehouse_id): ValidPath<String>,
) -> ApiResult<warehouse::Model> {
    let row = state
        .services
        .warehouses
        .deactivate_warehouse(&warehouse_id)
        .await?;
    info!(warehouse_id = %row.warehouse_id, user = %user.username, "Warehouse deactivated");
    Ok(Json(ApiResponse::success(row).with_message("Warehouse deactivated")))
}

#[utoipa::path(
    get,
    path = "/api/warehouse-positions",
    summary = "List positions",
    params(PositionListQuery),
    responses(
        (status = 200, description = "Positions", body = ApiResponse<Vec<warehouse_position::Model>>),
    ),
    security(("Bearer" = [])),
    tag = "Warehouses"
)]
pub async fn list_positions(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<PositionListQuery>,
) -> ApiResult<Vec<warehouse_position::Model>> {
    let page = state.pagination(query.page.as_deref(), query.limit.as_deref());
    let (rows, total) = state
        .services
        .warehouses
        .list_positions(query.warehouse_id, page)
        .await?;
    Ok(Json(ApiResponse::paginated(rows, page.meta(total))))
}

#[utoipa::path(
    post,
    path = "/api/warehouse-positions",
    summary = "Create position",
    request_body = CreatePositionRequest,
    responses(
        (status = 201, description = "Position created", body = ApiResponse<warehouse_position::Model>),
        (status = 404, description = "Unknown warehouse", body = crate::errors::ErrorResponse),
        (status = 409, description = "Position name taken in that warehouse", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Warehouses"
)]
pub async fn create_position(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreatePositionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let row = state.services.warehouses.create_position(request).await?;
    Ok(created(row, "Position created"))
}

#[utoipa::path(
    get,
    path = "/api/warehouse-positions/vacant",
    summary = "Vacant positions",
    description = "Active positions that hold no stock.",
    params(VacantPositionsQuery),
    responses(
        (status = 200, description = "Vacant positions", body = ApiResponse<Vec<warehouse_position::Model>>),
    ),
    security(("Bearer" = [])),
    tag = "Warehouses"
)]
pub async fn vacant_positions(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<VacantPositionsQuery>,
) -> ApiResult<Vec<warehouse_position::Model>> {
    let rows = state
        .services
        .warehouses
        .vacant_positions(query.warehouse_id)
        .await?;
    Ok(Json(ApiResponse::success(rows)))
}
