use axum::{extract::State, response::IntoResponse, Json};
use tracing::info;

use crate::auth::AuthUser;
use crate::dto::orders::{
    BarcodeLabel, CreateOrderRequest, CreatedOrder, GenerateBarcodesRequest, OrderDetail,
    OrderListQuery, OrderSummary,
};
use crate::errors::ServiceError;
use crate::{ApiResponse, ApiResult, AppState};

use super::common::{created, ValidPath, ValidQuery, ValidatedJson};

#[utoipa::path(
    post,
    path = "/api/orders/create",
    summary = "Create order",
    description = "Create a purchase order with its items. Every item gets a generated barcode.",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = ApiResponse<CreatedOrder>),
        (status = 400, description = "Invalid order payload", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 409, description = "SAP number already exists", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.orders.create_order(request).await?;
    info!(order_id = order.order_id, user = %user.username, "Order created via API");
    Ok(created(order, "Order created"))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    summary = "List orders",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Orders, newest first", body = ApiResponse<Vec<OrderSummary>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<OrderListQuery>,
) -> ApiResult<Vec<OrderSummary>> {
    let page = state.pagination(query.page.as_deref(), query.limit.as_deref());
    let (orders, total) = state.services.orders.list_orders(&query, page).await?;
    Ok(Json(ApiResponse::paginated(orders, page.meta(total))))
}

#[utoipa::path(
    get,
    path = "/api/orders/{orderId}",
    summary = "Get order",
    params(("orderId" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order with items", body = ApiResponse<OrderDetail>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    ValidPath(order_id): ValidPath<i32>,
) -> ApiResult<OrderDetail> {
    let order = state.services.orders.get_order(order_id).await?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    get,
    path = "/api/orders/qr/{orderQR}",
    summary = "Get order by QR code",
    params(("orderQR" = String, Path, description = "Order QR code, e.g. ORD-4500012345-241209")),
    responses(
        (status = 200, description = "Order with items", body = ApiResponse<OrderDetail>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Orders"
)]
pub async fn get_order_by_qr(
    State(state): State<AppState>,
    ValidPath(order_qr): ValidPath<String>,
) -> ApiResult<OrderDetail> {
    let order = state.services.orders.get_order_by_qr(order_qr.trim()).await?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    post,
    path = "/api/orders/generate-barcodes",
    summary = "Barcode labels for an order",
    description = "Also served at /api/generate/barcodes.",
    request_body = GenerateBarcodesRequest,
    responses(
        (status = 200, description = "One label per item", body = ApiResponse<Vec<BarcodeLabel>>),
        (status = 404, description = "Order has no items", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Orders"
)]
pub async fn generate_barcodes(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<GenerateBarcodesRequest>,
) -> ApiResult<Vec<BarcodeLabel>> {
    let labels = state.services.orders.generate_barcodes(request.order_id).await?;
    Ok(Json(ApiResponse::success(labels)))
}
