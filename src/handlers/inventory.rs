use axum::{extract::State, Json};

use crate::dto::inventory::{ConsumeStockRequest, InventoryQuery, InventoryView, MoveStockRequest, StockLevel};
use crate::entities::movement;
use crate::{ApiResponse, ApiResult, AppState};

use super::common::{ValidPath, ValidQuery, ValidatedJson};

#[utoipa::path(
    post,
    path = "/api/inventory/move",
    summary = "Put stock on a position",
    description = "Adds the quantity to the inventory row of (barcode, warehouse, position), creating it when needed.",
    request_body = MoveStockRequest,
    responses(
        (status = 200, description = "Stock level after the move", body = ApiResponse<StockLevel>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown barcode", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Inventory"
)]
pub async fn move_stock(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<MoveStockRequest>,
) -> ApiResult<StockLevel> {
    let level = state.services.inventory.move_stock(request).await?;
    Ok(Json(ApiResponse::success(level).with_message("Material moved")))
}

#[utoipa::path(
    post,
    path = "/api/consume",
    summary = "Consume stock from a position",
    request_body = ConsumeStockRequest,
    responses(
        (status = 200, description = "Stock level after consumption", body = ApiResponse<StockLevel>),
        (status = 400, description = "Not enough stock or invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Nothing stored at that position", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Inventory"
)]
pub async fn consume_stock(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ConsumeStockRequest>,
) -> ApiResult<StockLevel> {
    let level = state.services.inventory.consume_stock(request).await?;
    Ok(Json(ApiResponse::success(level).with_message("Material consumed")))
}

#[utoipa::path(
    get,
    path = "/api/movements/{barcode}",
    summary = "Movement history of a barcode",
    params(("barcode" = String, Path, description = "Item barcode")),
    responses(
        (status = 200, description = "Movements, newest first", body = ApiResponse<Vec<movement::Model>>),
    ),
    security(("Bearer" = [])),
    tag = "Inventory"
)]
pub async fn list_movements(
    State(state): State<AppState>,
    ValidPath(barcode): ValidPath<String>,
) -> ApiResult<Vec<movement::Model>> {
    let rows = state.services.inventory.movements(barcode.trim()).await?;
    Ok(Json(ApiResponse::success(rows)))
}

#[utoipa::path(
    get,
    path = "/api/inventory",
    summary = "List inventory",
    params(InventoryQuery),
    responses(
        (status = 200, description = "Inventory rows with item details", body = ApiResponse<Vec<InventoryView>>),
    ),
    security(("Bearer" = [])),
    tag = "Inventory"
)]
pub async fn list_inventory(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<InventoryQuery>,
) -> ApiResult<Vec<InventoryView>> {
    let page = state.pagination(query.page.as_deref(), query.limit.as_deref());
    let (rows, total) = state.services.inventory.list_inventory(&query, page).await?;
    Ok(Json(ApiResponse::paginated(rows, page.meta(total))))
}
