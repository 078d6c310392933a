use axum::{extract::State, response::IntoResponse};
use tracing::info;

use crate::auth::AuthUser;
use crate::dto::orders::CreatedOrder;
use crate::dto::transfer::ImportCsvRequest;
use crate::errors::ServiceError;
use crate::{ApiResponse, AppState};

use super::common::{created, ValidatedJson};

#[utoipa::path(
    post,
    path = "/api/import/csv",
    summary = "Import an order from CSV",
    description = "The CSV needs a header with itemName, quantity, dimension, material and position. Comma, semicolon and tab separators are detected from the header line.",
    request_body = ImportCsvRequest,
    responses(
        (status = 201, description = "Order created from the CSV rows", body = ApiResponse<CreatedOrder>),
        (status = 400, description = "Malformed CSV or missing columns", body = crate::errors::ErrorResponse),
        (status = 409, description = "SAP number already exists", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Import & Export"
)]
pub async fn import_csv(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(request): ValidatedJson<ImportCsvRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.import.import_csv(request).await?;
    info!(order_id = order.order_id, user = %user.username, "Order imported from CSV");
    Ok(created(order, "CSV imported"))
}
