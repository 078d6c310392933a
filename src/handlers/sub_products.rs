use axum::{extract::State, response::IntoResponse, Json};

use crate::dto::sub_products::{
    CreateSubProductRequest, MoveSubProductRequest, SubProductListQuery, SubProductMoved,
    SubProductView,
};
use crate::entities::sub_product;
use crate::errors::ServiceError;
use crate::{ApiResponse, ApiResult, AppState};

use super::common::{created, LenientJson, ValidPath, ValidQuery, ValidatedJson};

#[utoipa::path(
    get,
    path = "/api/subproducts",
    summary = "List sub-products",
    params(SubProductListQuery),
    responses(
        (status = 200, description = "Sub-products, most recently updated first", body = ApiResponse<Vec<SubProductView>>),
    ),
    security(("Bearer" = [])),
    tag = "Sub-products"
)]
pub async fn list_sub_products(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<SubProductListQuery>,
) -> ApiResult<Vec<SubProductView>> {
    let page = state.pagination(query.page.as_deref(), query.limit.as_deref());
    let (rows, total) = state
        .services
        .sub_products
        .list_sub_products(&query, page)
        .await?;
    Ok(Json(ApiResponse::paginated(rows, page.meta(total))))
}

#[utoipa::path(
    post,
    path = "/api/subproducts",
    summary = "Register a sub-product",
    request_body = CreateSubProductRequest,
    responses(
        (status = 201, description = "Sub-product created", body = ApiResponse<sub_product::Model>),
        (status = 400, description = "Missing work order or component code", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown work order", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Sub-products"
)]
pub async fn create_sub_product(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateSubProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let row = state.services.sub_products.create_sub_product(request).await?;
    Ok(created(row, "Sub-product created"))
}

#[utoipa::path(
    get,
    path = "/api/subproducts/{subProductId}",
    summary = "Get sub-product",
    params(("subProductId" = i32, Path, description = "Sub-product id")),
    responses(
        (status = 200, description = "Sub-product with warehouse and stage names", body = ApiResponse<SubProductView>),
        (status = 404, description = "Sub-product not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Sub-products"
)]
pub async fn get_sub_product(
    State(state): State<AppState>,
    ValidPath(sub_product_id): ValidPath<i32>,
) -> ApiResult<SubProductView> {
    let row = state.services.sub_products.get_sub_product(sub_product_id).await?;
    Ok(Json(ApiResponse::success(row)))
}

#[utoipa::path(
    post,
    path = "/api/subproducts/{subProductId}/move",
    summary = "Move a sub-product",
    description = "Changes location, current stage or status; at least one must be given.",
    params(("subProductId" = i32, Path, description = "Sub-product id")),
    request_body = MoveSubProductRequest,
    responses(
        (status = 200, description = "New location and status", body = ApiResponse<SubProductMoved>),
        (status = 400, description = "Nothing to move", body = crate::errors::ErrorResponse),
        (status = 404, description = "Sub-product not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Sub-products"
)]
pub async fn move_sub_product(
    State(state): State<AppState>,
    ValidPath(sub_product_id): ValidPath<i32>,
    LenientJson(request): LenientJson<MoveSubProductRequest>,
) -> ApiResult<SubProductMoved> {
    let moved = state
        .services
        .sub_products
        .move_sub_product(sub_product_id, request)
        .await?;
    Ok(Json(ApiResponse::success(moved).with_message("Sub-product moved")))
}

#[utoipa::path(
    get,
    path = "/api/subproducts/work-order/{workOrderId}",
    summary = "Sub-products of a work order",
    params(("workOrderId" = i32, Path, description = "Work order id")),
    responses(
        (status = 200, description = "Sub-products in creation order", body = ApiResponse<Vec<SubProductView>>),
        (status = 404, description = "Work order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Sub-products"
)]
pub async fn sub_products_by_work_order(
    State(state): State<AppState>,
    ValidPath(work_order_id): ValidPath<i32>,
) -> ApiResult<Vec<SubProductView>> {
    let rows = state.services.sub_products.by_work_order(work_order_id).await?;
    Ok(Json(ApiResponse::success(rows)))
}
