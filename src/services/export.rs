use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use csv::{Terminator, WriterBuilder};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};

use crate::dto::clean;
use crate::dto::transfer::{CsvExport, CustomExportRequest};
use crate::entities::{
    inventory, movement, order_item, production, production_stage, quality_check, sub_product,
    warehouse,
};
use crate::errors::ServiceError;

pub const CSV_DELIMITER: u8 = b';';
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn csv_error(e: impl std::fmt::Display) -> ServiceError {
    ServiceError::InternalError(format!("CSV serialization failed: {}", e))
}

/// Renders serializable rows as delimited text, one column per header.
pub fn build_delimited<T: Serialize>(rows: &[T], headers: &[&str]) -> Result<String, ServiceError> {
    let mut writer = WriterBuilder::new()
        .delimiter(CSV_DELIMITER)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(headers).map_err(csv_error)?;

    for row in rows {
        let value = serde_json::to_value(row).map_err(csv_error)?;
        let fields = headers
            .iter()
            .map(|header| value_to_string(value.get(*header).unwrap_or(&Value::Null)));
        writer.write_record(fields).map_err(csv_error)?;
    }

    let bytes = writer.into_inner().map_err(|e| csv_error(e.error()))?;
    String::from_utf8(bytes).map_err(csv_error)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InventoryRow {
    warehouse: Option<String>,
    barcode: String,
    item_name: Option<String>,
    position: String,
    qty_available: i32,
    date_updated: DateTime<Utc>,
}

const INVENTORY_HEADERS: &[&str] = &[
    "warehouse",
    "barcode",
    "itemName",
    "position",
    "qtyAvailable",
    "dateUpdated",
];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductionRow {
    work_order_id: i32,
    product_code: String,
    batch_number: Option<String>,
    status: String,
    quantity_in: i32,
    quantity_out: i32,
    quantity_scrap: i32,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    stages: usize,
    stage_output: Option<i64>,
}

const PRODUCTION_HEADERS: &[&str] = &[
    "workOrderId",
    "productCode",
    "batchNumber",
    "status",
    "quantityIn",
    "quantityOut",
    "quantityScrap",
    "startTime",
    "endTime",
    "stages",
    "stageOutput",
];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TraceRow {
    barcode: Option<String>,
    item_name: Option<String>,
    product_code: String,
    batch_number: Option<String>,
    movement_type: Option<String>,
    from_warehouse: Option<String>,
    to_warehouse: Option<String>,
    quantity: Option<i32>,
    date_created: Option<DateTime<Utc>>,
}

const TRACE_HEADERS: &[&str] = &[
    "barcode",
    "itemName",
    "productCode",
    "batchNumber",
    "movementType",
    "fromWarehouse",
    "toWarehouse",
    "quantity",
    "dateCreated",
];

const CUSTOM_PRODUCTION_HEADERS: &[&str] = &["workOrderId", "productCode", "status", "startTime", "endTime"];
const CUSTOM_SUB_PRODUCT_HEADERS: &[&str] = &["subProductId", "componentCode", "status", "quantity", "warehouseId"];
const CUSTOM_QUALITY_HEADERS: &[&str] = &["checkId", "stageId", "result", "checkedAt"];

/// Resources accepted by the custom export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportResource {
    Production,
    SubProducts,
    Quality,
}

impl ExportResource {
    pub fn parse(name: &str) -> Result<Self, ServiceError> {
        match name {
            "production" => Ok(Self::Production),
            "subProducts" => Ok(Self::SubProducts),
            "quality" => Ok(Self::Quality),
            other => Err(ServiceError::BadRequest(format!("Unknown export resource {}", other))),
        }
    }

    pub fn filename(self) -> &'static str {
        match self {
            Self::Production => "production-export.csv",
            Self::SubProducts => "subProducts-export.csv",
            Self::Quality => "quality-export.csv",
        }
    }
}

/// Service producing `;`-separated CSV reports
#[derive(Clone)]
pub struct ExportService {
    db: Arc<DatabaseConnection>,
}

impl ExportService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Stock per position with warehouse and item names.
    #[instrument(skip(self))]
    pub async fn inventory(&self) -> Result<CsvExport, ServiceError> {
        let db = &*self.db;
        let stock = inventory::Entity::find().all(db).await?;
        let warehouses: HashMap<String, String> = warehouse::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|w| (w.warehouse_id, w.warehouse_name))
            .collect();
        let items = super::inventory::items_by_barcode(db, stock.iter().map(|s| s.barcode.clone()).collect()).await?;

        let mut rows: Vec<InventoryRow> = stock
            .into_iter()
            .map(|s| InventoryRow {
                warehouse: warehouses.get(&s.warehouse_id).cloned(),
                item_name: items.get(&s.barcode).map(|i| i.item_name.clone()),
                barcode: s.barcode,
                position: s.position,
                qty_available: s.qty_available,
                date_updated: s.date_updated,
            })
            .collect();
        rows.sort_by(|a, b| (&a.warehouse, &a.position).cmp(&(&b.warehouse, &b.position)));

        info!(rows = rows.len(), "Inventory export generated");
        Ok(CsvExport {
            filename: "inventory-export.csv".to_string(),
            body: build_delimited(&rows, INVENTORY_HEADERS)?,
        })
    }

    /// Work orders with their stage count and summed stage output.
    #[instrument(skip(self))]
    pub async fn production_report(&self) -> Result<CsvExport, ServiceError> {
        let db = &*self.db;
        let orders = production::Entity::find()
            .order_by_asc(production::Column::WorkOrderId)
            .all(db)
            .await?;
        let mut stages: HashMap<i32, (usize, i64)> = HashMap::new();
        for stage in production_stage::Entity::find().all(db).await? {
            let entry = stages.entry(stage.work_order_id).or_default();
            entry.0 += 1;
            entry.1 += i64::from(stage.output_quantity);
        }

        let rows: Vec<ProductionRow> = orders
            .into_iter()
            .map(|p| {
                let (count, output) = stages.get(&p.work_order_id).copied().unwrap_or_default();
                ProductionRow {
                    work_order_id: p.work_order_id,
                    product_code: p.product_code,
                    batch_number: p.batch_number,
                    status: p.status,
                    quantity_in: p.quantity_in,
                    quantity_out: p.quantity_out,
                    quantity_scrap: p.quantity_scrap,
                    start_time: p.start_time,
                    end_time: p.end_time,
                    stages: count,
                    stage_output: (count > 0).then_some(output),
                }
            })
            .collect();

        info!(rows = rows.len(), "Production report exported");
        Ok(CsvExport {
            filename: "production-report.csv".to_string(),
            body: build_delimited(&rows, PRODUCTION_HEADERS)?,
        })
    }

    /// Movements of every item that went into a work order's source order.
    #[instrument(skip(self))]
    pub async fn traceability(&self) -> Result<CsvExport, ServiceError> {
        let db = &*self.db;
        let orders = production::Entity::find()
            .order_by_asc(production::Column::WorkOrderId)
            .all(db)
            .await?;

        let order_ids: Vec<i32> = orders.iter().filter_map(|p| p.order_id).collect();
        let items = if order_ids.is_empty() {
            Vec::new()
        } else {
            order_item::Entity::find()
                .filter(order_item::Column::OrderId.is_in(order_ids))
                .order_by_asc(order_item::Column::ItemId)
                .all(db)
                .await?
        };
        let barcodes: Vec<String> = items.iter().map(|i| i.barcode.clone()).collect();
        let mut movements: HashMap<String, Vec<movement::Model>> = HashMap::new();
        if !barcodes.is_empty() {
            for m in movement::Entity::find()
                .filter(movement::Column::Barcode.is_in(barcodes))
                .order_by_asc(movement::Column::DateCreated)
                .order_by_asc(movement::Column::MovementId)
                .all(db)
                .await?
            {
                movements.entry(m.barcode.clone()).or_default().push(m);
            }
        }

        let mut rows = Vec::new();
        for p in &orders {
            let order_items: Vec<&order_item::Model> = match p.order_id {
                Some(order_id) => items.iter().filter(|i| i.order_id == order_id).collect(),
                None => Vec::new(),
            };
            if order_items.is_empty() {
                rows.push(TraceRow {
                    barcode: None,
                    item_name: None,
                    product_code: p.product_code.clone(),
                    batch_number: p.batch_number.clone(),
                    movement_type: None,
                    from_warehouse: None,
                    to_warehouse: None,
                    quantity: None,
                    date_created: None,
                });
                continue;
            }
            for item in order_items {
                let item_movements = movements.get(&item.barcode).map(Vec::as_slice).unwrap_or_default();
                if item_movements.is_empty() {
                    rows.push(TraceRow {
                        barcode: Some(item.barcode.clone()),
                        item_name: Some(item.item_name.clone()),
                        product_code: p.product_code.clone(),
                        batch_number: p.batch_number.clone(),
                        movement_type: None,
                        from_warehouse: None,
                        to_warehouse: None,
                        quantity: None,
                        date_created: None,
                    });
                }
                for m in item_movements {
                    rows.push(TraceRow {
                        barcode: Some(item.barcode.clone()),
                        item_name: Some(item.item_name.clone()),
                        product_code: p.product_code.clone(),
                        batch_number: p.batch_number.clone(),
                        movement_type: Some(m.movement_type.clone()),
                        from_warehouse: m.from_warehouse.clone(),
                        to_warehouse: m.to_warehouse.clone(),
                        quantity: Some(m.quantity),
                        date_created: Some(m.date_created),
                    });
                }
            }
        }
        rows.sort_by(|a, b| (&a.barcode, a.date_created).cmp(&(&b.barcode, b.date_created)));

        info!(rows = rows.len(), "Traceability export generated");
        Ok(CsvExport {
            filename: "traceability.csv".to_string(),
            body: build_delimited(&rows, TRACE_HEADERS)?,
        })
    }

    /// Flat export of one resource, optionally filtered by status or result.
    #[instrument(skip(self))]
    pub async fn custom(&self, request: &CustomExportRequest) -> Result<CsvExport, ServiceError> {
        let resource = ExportResource::parse(request.resource.trim())?;
        let filters = request.filters.clone().unwrap_or_default();
        let db = &*self.db;

        let body = match resource {
            ExportResource::Production => {
                let mut select = production::Entity::find();
                if let Some(status) = clean(filters.status) {
                    select = select.filter(production::Column::Status.eq(status));
                }
                let rows = select.order_by_asc(production::Column::WorkOrderId).all(db).await?;
                build_delimited(&rows, CUSTOM_PRODUCTION_HEADERS)?
            }
            ExportResource::SubProducts => {
                let mut select = sub_product::Entity::find();
                if let Some(status) = clean(filters.status) {
                    select = select.filter(sub_product::Column::Status.eq(status));
                }
                let rows = select.order_by_asc(sub_product::Column::SubProductId).all(db).await?;
                build_delimited(&rows, CUSTOM_SUB_PRODUCT_HEADERS)?
            }
            ExportResource::Quality => {
                let mut select = quality_check::Entity::find();
                if let Some(result) = clean(filters.result) {
                    select = select.filter(quality_check::Column::Result.eq(result));
                }
                let rows = select.order_by_asc(quality_check::Column::CheckId).all(db).await?;
                build_delimited(&rows, CUSTOM_QUALITY_HEADERS)?
            }
        };

        info!(resource = %request.resource, "Custom export generated");
        Ok(CsvExport {
            filename: resource.filename().to_string(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Sample {
        item_name: String,
        qty: Option<i32>,
    }

    #[test]
    fn renders_header_and_rows() {
        let rows = vec![
            Sample { item_name: "Plate".into(), qty: Some(4) },
            Sample { item_name: "Bolt".into(), qty: None },
        ];
        let csv = build_delimited(&rows, &["itemName", "qty"]).unwrap();
        assert_eq!(csv, "itemName;qty\nPlate;4\nBolt;\n");
    }

    #[test]
    fn empty_export_keeps_header() {
        let rows: Vec<Sample> = Vec::new();
        assert_eq!(build_delimited(&rows, &["itemName", "qty"]).unwrap(), "itemName;qty\n");
    }

    #[test]
    fn quotes_fields_with_separators() {
        let rows = vec![
            Sample { item_name: "a;b".into(), qty: Some(1) },
            Sample { item_name: "say \"hi\"".into(), qty: None },
        ];
        let csv = build_delimited(&rows, &["itemName", "qty"]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[1], "\"a;b\";1");
        assert_eq!(lines[2], "\"say \"\"hi\"\"\";");
    }

    #[test]
    fn unknown_resource_is_rejected() {
        assert_matches!(ExportResource::parse("users"), Err(ServiceError::BadRequest(_)));
        assert_eq!(ExportResource::parse("subProducts").unwrap().filename(), "subProducts-export.csv");
    }
}
