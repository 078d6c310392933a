use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActiveAssembly {
    pub order_id: i32,
    pub sap_number: String,
    pub supplier: String,
    pub order_type: String,
    pub assembly_status: String,
    pub date_started: Option<DateTime<Utc>>,
    pub operator: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub by_type: Vec<StatusCount>,
    /// Top-level orders only
    pub by_assembly_status: Vec<StatusCount>,
    pub active: Vec<ActiveAssembly>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseStats {
    pub total_warehouses: u64,
    pub active_warehouses: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStats {
    /// Distinct barcodes in stock records
    pub total_items: u64,
    pub total_quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentMovement {
    pub movement_type: String,
    pub barcode: String,
    pub item_name: Option<String>,
    pub quantity: i32,
    pub date_created: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub orders: OrderStats,
    pub warehouses: WarehouseStats,
    pub inventory: InventoryStats,
    pub recent_movements: Vec<RecentMovement>,
    /// Quality check results of the last seven days
    pub quality: Vec<super::quality::ResultCount>,
    pub production: Vec<StatusCount>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseHealth {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// `ok` or `error`
    pub status: String,
    pub timestamp: DateTime<Utc>,
    /// Seconds since the process started
    pub uptime: u64,
    pub environment: String,
    pub version: String,
    pub database: DatabaseHealth,
    /// Milliseconds spent producing this report
    pub response_time: u64,
}
