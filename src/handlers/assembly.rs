use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::info;

use crate::auth::AuthUser;
use crate::dto::assembly::{
    AddComponentRequest, AssemblyActionRequest, AssemblyCompleted, AssemblyNode,
    AssemblyReportView, AssemblyStarted, CreateAssemblyRequest,
};
use crate::dto::orders::CreatedOrder;
use crate::entities::order_component;
use crate::errors::ServiceError;
use crate::{ApiResponse, ApiResult, AppState};

use super::common::{actor, created, LenientJson, ValidPath, ValidatedJson};

#[utoipa::path(
    post,
    path = "/api/assembly",
    summary = "Create an assembly order",
    description = "Creates a zakazka or podmontaz order. With `parentOrderId` the new order is attached to the parent as a component.",
    request_body = CreateAssemblyRequest,
    responses(
        (status = 201, description = "Assembly order created", body = ApiResponse<CreatedOrder>),
        (status = 404, description = "Parent order not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "SAP number already exists", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Assembly"
)]
pub async fn create_assembly(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateAssemblyRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.assembly.create_assembly(request).await?;
    Ok(created(order, "Assembly order created"))
}

#[utoipa::path(
    post,
    path = "/api/assembly/{orderId}/components",
    summary = "Add a component",
    params(("orderId" = i32, Path, description = "Assembly order id")),
    request_body = AddComponentRequest,
    responses(
        (status = 201, description = "Component added", body = ApiResponse<order_component::Model>),
        (status = 400, description = "Unknown type or missing reference", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Assembly"
)]
pub async fn add_component(
    State(state): State<AppState>,
    ValidPath(order_id): ValidPath<i32>,
    ValidatedJson(request): ValidatedJson<AddComponentRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let component = state.services.assembly.add_component(order_id, request).await?;
    Ok(created(component, "Component added"))
}

#[utoipa::path(
    delete,
    path = "/api/assembly/components/{componentId}",
    summary = "Remove a component",
    params(("componentId" = i32, Path, description = "Component id")),
    responses(
        (status = 204, description = "Component removed"),
        (status = 404, description = "Component not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Assembly"
)]
pub async fn remove_component(
    State(state): State<AppState>,
    ValidPath(component_id): ValidPath<i32>,
) -> Result<StatusCode, ServiceError> {
    state.services.assembly.remove_component(component_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/assembly/{orderId}/tree",
    summary = "Assembly tree",
    description = "Nested orders and items, children ordered by sort order. Trees deeper than 10 levels are rejected.",
    params(("orderId" = i32, Path, description = "Root order id")),
    responses(
        (status = 200, description = "Resolved tree", body = ApiResponse<AssemblyNode>),
        (status = 400, description = "Tree too deep", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Assembly"
)]
pub async fn assembly_tree(
    State(state): State<AppState>,
    ValidPath(order_id): ValidPath<i32>,
) -> ApiResult<AssemblyNode> {
    let tree = state.services.assembly.tree(order_id).await?;
    Ok(Json(ApiResponse::success(tree)))
}

#[utoipa::path(
    post,
    path = "/api/assembly/{orderId}/start",
    summary = "Start assembly",
    params(("orderId" = i32, Path, description = "Assembly order id")),
    request_body(content = AssemblyActionRequest, description = "Optional; an empty body is accepted"),
    responses(
        (status = 200, description = "Assembly in progress", body = ApiResponse<AssemblyStarted>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Assembly"
)]
pub async fn start_assembly(
    State(state): State<AppState>,
    user: AuthUser,
    ValidPath(order_id): ValidPath<i32>,
    LenientJson(request): LenientJson<AssemblyActionRequest>,
) -> ApiResult<AssemblyStarted> {
    let started = state
        .services
        .assembly
        .start(order_id, request, actor(&user))
        .await?;
    Ok(Json(ApiResponse::success(started).with_message("Assembly started")))
}

#[utoipa::path(
    post,
    path = "/api/assembly/{orderId}/complete",
    summary = "Complete assembly",
    params(("orderId" = i32, Path, description = "Assembly order id")),
    request_body(content = AssemblyActionRequest, description = "Optional; an empty body is accepted"),
    responses(
        (status = 200, description = "Assembly completed with its duration", body = ApiResponse<AssemblyCompleted>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Assembly"
)]
pub async fn complete_assembly(
    State(state): State<AppState>,
    user: AuthUser,
    ValidPath(order_id): ValidPath<i32>,
    LenientJson(request): LenientJson<AssemblyActionRequest>,
) -> ApiResult<AssemblyCompleted> {
    let completed = state
        .services
        .assembly
        .complete(order_id, request, actor(&user))
        .await?;
    info!(
        order_id,
        minutes = ?completed.work_duration_minutes,
        user = %user.username,
        "Assembly completed"
    );
    Ok(Json(ApiResponse::success(completed).with_message("Assembly completed")))
}

#[utoipa::path(
    get,
    path = "/api/assembly/{orderId}/report",
    summary = "Assembly report",
    description = "Order, timing, components, status reports, inspections and audit trail.",
    params(("orderId" = i32, Path, description = "Assembly order id")),
    responses(
        (status = 200, description = "Full report", body = ApiResponse<AssemblyReportView>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Assembly"
)]
pub async fn assembly_report(
    State(state): State<AppState>,
    ValidPath(order_id): ValidPath<i32>,
) -> ApiResult<AssemblyReportView> {
    let report = state.services.assembly.report(order_id).await?;
    Ok(Json(ApiResponse::success(report)))
}
