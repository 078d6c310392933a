use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::entities::inventory;

use super::not_blank;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveStockRequest {
    #[validate(length(min = 1, max = 50), custom = "not_blank")]
    pub barcode: String,
    #[validate(length(min = 1, max = 50), custom = "not_blank")]
    #[schema(example = "WH-MAIN")]
    pub warehouse_id: String,
    #[validate(length(min = 1, max = 50), custom = "not_blank")]
    #[schema(example = "A-01-03")]
    pub position: String,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsumeStockRequest {
    #[validate(length(min = 1, max = 50), custom = "not_blank")]
    pub barcode: String,
    #[validate(length(min = 1, max = 50), custom = "not_blank")]
    pub warehouse_id: String,
    #[validate(length(min = 1, max = 50), custom = "not_blank")]
    pub position: String,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Stock level at one position after a move or consume.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockLevel {
    pub barcode: String,
    pub warehouse_id: String,
    pub position: String,
    pub qty_available: i32,
}

impl From<inventory::Model> for StockLevel {
    fn from(row: inventory::Model) -> Self {
        Self {
            barcode: row.barcode,
            warehouse_id: row.warehouse_id,
            position: row.position,
            qty_available: row.qty_available,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InventoryQuery {
    /// Warehouse id
    pub warehouse: Option<String>,
    pub barcode: Option<String>,
    /// Matches item name or dimension
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Inventory row joined with its order item.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryView {
    pub inventory_id: i32,
    pub barcode: String,
    pub warehouse_id: String,
    pub position: String,
    pub qty_available: i32,
    pub date_added: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
    pub item_name: Option<String>,
    pub dimension: Option<String>,
    pub material: Option<String>,
}
