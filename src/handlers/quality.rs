use axum::{extract::State, response::IntoResponse, Json};
use tracing::info;

use crate::auth::AuthUser;
use crate::dto::quality::{
    AssemblyQualityOutcome, AssemblyQualityRequest, CreateQualityCheckRequest,
    QualityCheckListQuery, QualityCheckView, QualityReport, UpdateQualityCheckRequest,
};
use crate::entities::{assembly_quality_check, quality_check};
use crate::errors::ServiceError;
use crate::{ApiResponse, ApiResult, AppState};

use super::common::{actor, created, LenientJson, ValidPath, ValidQuery, ValidatedJson};

#[utoipa::path(
    post,
    path = "/api/quality-checks",
    summary = "Record a stage quality check",
    request_body = CreateQualityCheckRequest,
    responses(
        (status = 201, description = "Check recorded and stage counters updated", body = ApiResponse<quality_check::Model>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Stage not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Quality"
)]
pub async fn create_check(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateQualityCheckRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let check = state
        .services
        .quality
        .create_check(request, actor(&user))
        .await?;
    Ok(created(check, "Quality check recorded"))
}

#[utoipa::path(
    get,
    path = "/api/quality-checks",
    summary = "List quality checks",
    params(QualityCheckListQuery),
    responses(
        (status = 200, description = "Checks, newest first", body = ApiResponse<Vec<QualityCheckView>>),
    ),
    security(("Bearer" = [])),
    tag = "Quality"
)]
pub async fn list_checks(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<QualityCheckListQuery>,
) -> ApiResult<Vec<QualityCheckView>> {
    let page = state.pagination(query.page.as_deref(), query.limit.as_deref());
    let (rows, total) = state.services.quality.list_checks(&query, page).await?;
    Ok(Json(ApiResponse::paginated(rows, page.meta(total))))
}

#[utoipa::path(
    get,
    path = "/api/quality-checks/stage/{stageId}",
    summary = "Quality checks of a stage",
    params(("stageId" = i32, Path, description = "Stage id")),
    responses(
        (status = 200, description = "Checks, newest first", body = ApiResponse<Vec<QualityCheckView>>),
    ),
    security(("Bearer" = [])),
    tag = "Quality"
)]
pub async fn checks_by_stage(
    State(state): State<AppState>,
    ValidPath(stage_id): ValidPath<i32>,
) -> ApiResult<Vec<QualityCheckView>> {
    let rows = state.services.quality.by_stage(stage_id).await?;
    Ok(Json(ApiResponse::success(rows)))
}

#[utoipa::path(
    put,
    path = "/api/quality-checks/{checkId}",
    summary = "Amend a quality check",
    params(("checkId" = i32, Path, description = "Check id")),
    request_body = UpdateQualityCheckRequest,
    responses(
        (status = 200, description = "Updated check", body = ApiResponse<quality_check::Model>),
        (status = 400, description = "Nothing to update", body = crate::errors::ErrorResponse),
        (status = 404, description = "Check not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Quality"
)]
pub async fn update_check(
    State(state): State<AppState>,
    ValidPath(check_id): ValidPath<i32>,
    LenientJson(request): LenientJson<UpdateQualityCheckRequest>,
) -> ApiResult<quality_check::Model> {
    let check = state.services.quality.update_check(check_id, request).await?;
    Ok(Json(ApiResponse::success(check).with_message("Quality check updated")))
}

#[utoipa::path(
    get,
    path = "/api/quality-checks/report",
    summary = "Quality report",
    description = "Result counts per stage name and per product code.",
    responses(
        (status = 200, description = "Aggregated results", body = ApiResponse<QualityReport>),
    ),
    security(("Bearer" = [])),
    tag = "Quality"
)]
pub async fn quality_report(State(state): State<AppState>) -> ApiResult<QualityReport> {
    let report = state.services.quality.report().await?;
    Ok(Json(ApiResponse::success(report)))
}

#[utoipa::path(
    post,
    path = "/api/quality/{orderId}",
    summary = "Final inspection of an assembly order",
    description = "`OK` approves the assembly, `NOK` rejects it. The change is written to the assembly report and the audit log.",
    params(("orderId" = i32, Path, description = "Order id")),
    request_body = AssemblyQualityRequest,
    responses(
        (status = 200, description = "New assembly status", body = ApiResponse<AssemblyQualityOutcome>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Quality"
)]
pub async fn inspect_assembly(
    State(state): State<AppState>,
    user: AuthUser,
    ValidPath(order_id): ValidPath<i32>,
    ValidatedJson(request): ValidatedJson<AssemblyQualityRequest>,
) -> ApiResult<AssemblyQualityOutcome> {
    let outcome = state
        .services
        .quality
        .inspect_assembly(order_id, request, actor(&user))
        .await?;
    info!(order_id, result = %outcome.result, user = %user.username, "Assembly inspected");
    Ok(Json(
        ApiResponse::success(outcome).with_message("Quality check completed"),
    ))
}

#[utoipa::path(
    get,
    path = "/api/quality/{orderId}/history",
    summary = "Inspection history of an order",
    params(("orderId" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Inspections, newest first", body = ApiResponse<Vec<assembly_quality_check::Model>>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Quality"
)]
pub async fn assembly_history(
    State(state): State<AppState>,
    ValidPath(order_id): ValidPath<i32>,
) -> ApiResult<Vec<assembly_quality_check::Model>> {
    let rows = state.services.quality.assembly_history(order_id).await?;
    Ok(Json(ApiResponse::success(rows)))
}
