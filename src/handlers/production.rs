use axum::{extract::State, response::IntoResponse, Json};
use tracing::info;

use crate::auth::AuthUser;
use crate::domain::StageAction;
use crate::dto::production::{
    ProductionDetail, ProductionListQuery, ProductionSummary, ProductionWithStages,
    StageActionRequest, StageDetail, StartProductionRequest, UpdateProductionRequest,
};
use crate::dto::sub_products::SubProductView;
use crate::entities::{production, production_stage, production_stage_log};
use crate::errors::ServiceError;
use crate::{ApiResponse, ApiResult, AppState};

use super::common::{actor, created, LenientJson, ValidPath, ValidQuery, ValidatedJson};

#[utoipa::path(
    post,
    path = "/api/production/start",
    summary = "Start a work order",
    description = "Creates the work order and its stages. Stage sequence defaults to the list position and input quantity to `quantityIn`.",
    request_body = StartProductionRequest,
    responses(
        (status = 201, description = "Work order started", body = ApiResponse<ProductionWithStages>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 403, description = "Operator role required", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Production"
)]
pub async fn start_production(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(request): ValidatedJson<StartProductionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let started = state
        .services
        .production
        .start_production(request, actor(&user))
        .await?;
    Ok(created(started, "Production started"))
}

#[utoipa::path(
    get,
    path = "/api/production",
    summary = "List work orders",
    params(ProductionListQuery),
    responses(
        (status = 200, description = "Work orders, latest start first", body = ApiResponse<Vec<ProductionSummary>>),
        (status = 400, description = "Unparseable date bound", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Production"
)]
pub async fn list_production(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<ProductionListQuery>,
) -> ApiResult<Vec<ProductionSummary>> {
    let page = state.pagination(query.page.as_deref(), query.limit.as_deref());
    let (rows, total) = state.services.production.list_production(&query, page).await?;
    Ok(Json(ApiResponse::paginated(rows, page.meta(total))))
}

#[utoipa::path(
    get,
    path = "/api/production/{workOrderId}",
    summary = "Work order detail",
    params(("workOrderId" = i32, Path, description = "Work order id")),
    responses(
        (status = 200, description = "Work order with stages, logs, sub-products and quality", body = ApiResponse<ProductionDetail>),
        (status = 404, description = "Work order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Production"
)]
pub async fn get_production(
    State(state): State<AppState>,
    ValidPath(work_order_id): ValidPath<i32>,
) -> ApiResult<ProductionDetail> {
    let detail = state.services.production.get_production(work_order_id).await?;
    Ok(Json(ApiResponse::success(detail)))
}

#[utoipa::path(
    put,
    path = "/api/production/{workOrderId}",
    summary = "Update a work order",
    params(("workOrderId" = i32, Path, description = "Work order id")),
    request_body = UpdateProductionRequest,
    responses(
        (status = 200, description = "Updated work order", body = ApiResponse<production::Model>),
        (status = 400, description = "Nothing to update", body = crate::errors::ErrorResponse),
        (status = 404, description = "Work order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Production"
)]
pub async fn update_production(
    State(state): State<AppState>,
    ValidPath(work_order_id): ValidPath<i32>,
    LenientJson(request): LenientJson<UpdateProductionRequest>,
) -> ApiResult<production::Model> {
    let row = state
        .services
        .production
        .update_production(work_order_id, request)
        .await?;
    Ok(Json(ApiResponse::success(row).with_message("Production updated")))
}

#[utoipa::path(
    get,
    path = "/api/production/{workOrderId}/subproducts",
    summary = "Sub-products of a work order",
    params(("workOrderId" = i32, Path, description = "Work order id")),
    responses(
        (status = 200, description = "Sub-products in creation order", body = ApiResponse<Vec<SubProductView>>),
        (status = 404, description = "Work order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Production"
)]
pub async fn production_sub_products(
    State(state): State<AppState>,
    ValidPath(work_order_id): ValidPath<i32>,
) -> ApiResult<Vec<SubProductView>> {
    let rows = state.services.sub_products.by_work_order(work_order_id).await?;
    Ok(Json(ApiResponse::success(rows)))
}

async fn run_stage_action(
    state: AppState,
    user: AuthUser,
    stage_id: i32,
    action: StageAction,
    request: StageActionRequest,
) -> ApiResult<production_stage::Model> {
    let stage = state
        .services
        .stages
        .apply(stage_id, action, request, actor(&user))
        .await?;
    info!(stage_id, action = %action, user = %user.username, "Stage action applied");
    Ok(Json(
        ApiResponse::success(stage).with_message(format!("Stage {}", action.log_event())),
    ))
}

#[utoipa::path(
    post,
    path = "/api/production/stage/{stageId}/start",
    summary = "Start a stage",
    params(("stageId" = i32, Path, description = "Stage id")),
    request_body(content = StageActionRequest, description = "Optional; an empty body is accepted"),
    responses(
        (status = 200, description = "Stage started", body = ApiResponse<production_stage::Model>),
        (status = 400, description = "Transition not allowed from the current status", body = crate::errors::ErrorResponse),
        (status = 404, description = "Stage not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Production"
)]
pub async fn start_stage(
    State(state): State<AppState>,
    user: AuthUser,
    ValidPath(stage_id): ValidPath<i32>,
    LenientJson(request): LenientJson<StageActionRequest>,
) -> ApiResult<production_stage::Model> {
    run_stage_action(state, user, stage_id, StageAction::Start, request).await
}

#[utoipa::path(
    post,
    path = "/api/production/stage/{stageId}/pause",
    summary = "Pause a stage",
    params(("stageId" = i32, Path, description = "Stage id")),
    request_body(content = StageActionRequest, description = "Optional; an empty body is accepted"),
    responses(
        (status = 200, description = "Stage paused", body = ApiResponse<production_stage::Model>),
        (status = 400, description = "Transition not allowed from the current status", body = crate::errors::ErrorResponse),
        (status = 404, description = "Stage not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Production"
)]
pub async fn pause_stage(
    State(state): State<AppState>,
    user: AuthUser,
    ValidPath(stage_id): ValidPath<i32>,
    LenientJson(request): LenientJson<StageActionRequest>,
) -> ApiResult<production_stage::Model> {
    run_stage_action(state, user, stage_id, StageAction::Pause, request).await
}

#[utoipa::path(
    post,
    path = "/api/production/stage/{stageId}/resume",
    summary = "Resume a stage",
    params(("stageId" = i32, Path, description = "Stage id")),
    request_body(content = StageActionRequest, description = "Optional; an empty body is accepted"),
    responses(
        (status = 200, description = "Stage resumed", body = ApiResponse<production_stage::Model>),
        (status = 400, description = "Transition not allowed from the current status", body = crate::errors::ErrorResponse),
        (status = 404, description = "Stage not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Production"
)]
pub async fn resume_stage(
    State(state): State<AppState>,
    user: AuthUser,
    ValidPath(stage_id): ValidPath<i32>,
    LenientJson(request): LenientJson<StageActionRequest>,
) -> ApiResult<production_stage::Model> {
    run_stage_action(state, user, stage_id, StageAction::Resume, request).await
}

#[utoipa::path(
    post,
    path = "/api/production/stage/{stageId}/complete",
    summary = "Complete a stage",
    description = "Records output, scrap and rework. Completing the last open stage completes the work order.",
    params(("stageId" = i32, Path, description = "Stage id")),
    request_body(content = StageActionRequest, description = "Optional; an empty body is accepted"),
    responses(
        (status = 200, description = "Stage completed", body = ApiResponse<production_stage::Model>),
        (status = 400, description = "Transition not allowed from the current status", body = crate::errors::ErrorResponse),
        (status = 404, description = "Stage not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Production"
)]
pub async fn complete_stage(
    State(state): State<AppState>,
    user: AuthUser,
    ValidPath(stage_id): ValidPath<i32>,
    LenientJson(request): LenientJson<StageActionRequest>,
) -> ApiResult<production_stage::Model> {
    run_stage_action(state, user, stage_id, StageAction::Complete, request).await
}

#[utoipa::path(
    get,
    path = "/api/production/stage/{stageId}",
    summary = "Stage detail",
    params(("stageId" = i32, Path, description = "Stage id")),
    responses(
        (status = 200, description = "Stage with logs and quality checks", body = ApiResponse<StageDetail>),
        (status = 404, description = "Stage not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Production"
)]
pub async fn get_stage(
    State(state): State<AppState>,
    ValidPath(stage_id): ValidPath<i32>,
) -> ApiResult<StageDetail> {
    let detail = state.services.stages.get_stage(stage_id).await?;
    Ok(Json(ApiResponse::success(detail)))
}

#[utoipa::path(
    get,
    path = "/api/production/stage/{stageId}/logs",
    summary = "Stage event log",
    params(("stageId" = i32, Path, description = "Stage id")),
    responses(
        (status = 200, description = "Log entries, newest first", body = ApiResponse<Vec<production_stage_log::Model>>),
        (status = 404, description = "Stage not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Production"
)]
pub async fn stage_logs(
    State(state): State<AppState>,
    ValidPath(stage_id): ValidPath<i32>,
) -> ApiResult<Vec<production_stage_log::Model>> {
    let logs = state.services.stages.stage_logs(stage_id).await?;
    Ok(Json(ApiResponse::success(logs)))
}
