use axum::{extract::State, response::Response};

use crate::dto::transfer::CustomExportRequest;
use crate::errors::ServiceError;
use crate::AppState;

use super::common::{csv_attachment, ValidatedJson};

#[utoipa::path(
    get,
    path = "/api/export/inventory",
    summary = "Inventory export",
    responses(
        (status = 200, description = "Semicolon-separated CSV attachment", content_type = "text/csv", body = String),
    ),
    security(("Bearer" = [])),
    tag = "Import & Export"
)]
pub async fn export_inventory(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let export = state.services.export.inventory().await?;
    Ok(csv_attachment(export))
}

#[utoipa::path(
    get,
    path = "/api/export/production-report",
    summary = "Production report export",
    responses(
        (status = 200, description = "Semicolon-separated CSV attachment", content_type = "text/csv", body = String),
    ),
    security(("Bearer" = [])),
    tag = "Import & Export"
)]
pub async fn export_production_report(
    State(state): State<AppState>,
) -> Result<Response, ServiceError> {
    let export = state.services.export.production_report().await?;
    Ok(csv_attachment(export))
}

#[utoipa::path(
    get,
    path = "/api/export/traceability",
    summary = "Traceability export",
    description = "Work orders with their stages and sub-products, one row per combination.",
    responses(
        (status = 200, description = "Semicolon-separated CSV attachment", content_type = "text/csv", body = String),
    ),
    security(("Bearer" = [])),
    tag = "Import & Export"
)]
pub async fn export_traceability(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let export = state.services.export.traceability().await?;
    Ok(csv_attachment(export))
}

#[utoipa::path(
    post,
    path = "/api/export/custom",
    summary = "Custom export",
    description = "Exports `production`, `subProducts` or `quality`, optionally filtered by status or result.",
    request_body = CustomExportRequest,
    responses(
        (status = 200, description = "Semicolon-separated CSV attachment", content_type = "text/csv", body = String),
        (status = 400, description = "Unknown resource", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Import & Export"
)]
pub async fn export_custom(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CustomExportRequest>,
) -> Result<Response, ServiceError> {
    let export = state.services.export.custom(&request).await?;
    Ok(csv_attachment(export))
}
