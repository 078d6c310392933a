use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::not_blank;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveRequest {
    #[validate(length(min = 1, max = 50), custom = "not_blank")]
    #[schema(example = "MAT-240307-001")]
    pub barcode: String,
    #[validate(range(min = 1, message = "quantityReceived must be at least 1"))]
    pub quantity_received: i32,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Item state after a receipt.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedItem {
    pub barcode: String,
    pub item_name: String,
    pub qty_received: i32,
    pub status: String,
    /// Only reported for partial receipts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qty_remaining: Option<i32>,
}
