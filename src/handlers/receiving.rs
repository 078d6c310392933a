use axum::{extract::State, Json};

use crate::dto::receiving::{ReceiveRequest, ReceivedItem};
use crate::services::receiving::ReceiveMode;
use crate::{ApiResponse, ApiResult, AppState};

use super::common::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/receive",
    summary = "Receive an item in full",
    description = "Sets the received quantity of the item to `quantityReceived` and refreshes the order status.",
    request_body = ReceiveRequest,
    responses(
        (status = 200, description = "Item received", body = ApiResponse<ReceivedItem>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown barcode", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Receiving"
)]
pub async fn receive_full(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ReceiveRequest>,
) -> ApiResult<ReceivedItem> {
    let item = state.services.receiving.receive(request, ReceiveMode::Full).await?;
    Ok(Json(ApiResponse::success(item).with_message("Item received")))
}

#[utoipa::path(
    post,
    path = "/api/receive/partial",
    summary = "Receive part of an item",
    description = "Adds `quantityReceived` to what was received before.",
    request_body = ReceiveRequest,
    responses(
        (status = 200, description = "Partial receipt recorded", body = ApiResponse<ReceivedItem>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown barcode", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Receiving"
)]
pub async fn receive_partial(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ReceiveRequest>,
) -> ApiResult<ReceivedItem> {
    let item = state
        .services
        .receiving
        .receive(request, ReceiveMode::Partial)
        .await?;
    Ok(Json(ApiResponse::success(item).with_message("Partial receipt recorded")))
}
