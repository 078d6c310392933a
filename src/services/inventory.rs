use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    sea_query::{Condition, Expr, OnConflict},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, instrument, warn};

use crate::domain::{MovementType, Pagination};
use crate::dto::clean;
use crate::dto::inventory::{
    ConsumeStockRequest, InventoryQuery, InventoryView, MoveStockRequest, StockLevel,
};
use crate::entities::{inventory, movement, order_item};
use crate::errors::ServiceError;

/// Order items keyed by barcode, for joining names onto stock rows.
pub(crate) async fn items_by_barcode<C: ConnectionTrait>(
    conn: &C,
    barcodes: Vec<String>,
) -> Result<HashMap<String, order_item::Model>, ServiceError> {
    if barcodes.is_empty() {
        return Ok(HashMap::new());
    }
    let items = order_item::Entity::find()
        .filter(order_item::Column::Barcode.is_in(barcodes))
        .all(conn)
        .await?;
    Ok(items.into_iter().map(|i| (i.barcode.clone(), i)).collect())
}

/// Service for stock positions and the movements that change them
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DatabaseConnection>,
}

impl InventoryService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Puts stock of a known barcode away at a warehouse position.
    #[instrument(skip(self))]
    pub async fn move_stock(&self, request: MoveStockRequest) -> Result<StockLevel, ServiceError> {
        let db = &*self.db;
        let txn = db.begin().await?;
        let barcode = request.barcode.trim().to_string();
        let warehouse_id = request.warehouse_id.trim().to_string();
        let position = request.position.trim().to_string();

        let known = order_item::Entity::find()
            .filter(order_item::Column::Barcode.eq(barcode.as_str()))
            .count(&txn)
            .await?
            > 0;
        if !known {
            return Err(ServiceError::NotFound(format!("Item with barcode {} not found", barcode)));
        }

        // Single upsert so concurrent first moves to a position add up
        // instead of racing on the unique (barcode, warehouse, position) index.
        let now = Utc::now();
        inventory::Entity::insert(inventory::ActiveModel {
            barcode: Set(barcode.clone()),
            warehouse_id: Set(warehouse_id.clone()),
            position: Set(position.clone()),
            qty_available: Set(request.quantity),
            date_added: Set(now),
            date_updated: Set(now),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::columns([
                inventory::Column::Barcode,
                inventory::Column::WarehouseId,
                inventory::Column::Position,
            ])
            .value(
                inventory::Column::QtyAvailable,
                Expr::col((inventory::Entity, inventory::Column::QtyAvailable)).add(request.quantity),
            )
            .update_column(inventory::Column::DateUpdated)
            .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

        let stock = inventory::Entity::find()
            .filter(inventory::Column::Barcode.eq(barcode.as_str()))
            .filter(inventory::Column::WarehouseId.eq(warehouse_id.as_str()))
            .filter(inventory::Column::Position.eq(position.as_str()))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::InternalError(format!("Stock row for {} vanished after upsert", barcode))
            })?;

        movement::ActiveModel {
            barcode: Set(barcode.clone()),
            movement_type: Set(MovementType::Move.to_string()),
            from_warehouse: Set(None),
            from_position: Set(None),
            to_warehouse: Set(Some(warehouse_id.clone())),
            to_position: Set(Some(position.clone())),
            quantity: Set(request.quantity),
            notes: Set(clean(request.notes)),
            date_created: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        info!(barcode = %barcode, warehouse_id = %warehouse_id, position = %position, qty = stock.qty_available, "Stock moved");
        Ok(stock.into())
    }

    /// Takes stock out of a position. Never drives the quantity below zero.
    #[instrument(skip(self))]
    pub async fn consume_stock(&self, request: ConsumeStockRequest) -> Result<StockLevel, ServiceError> {
        let db = &*self.db;
        let txn = db.begin().await?;
        let barcode = request.barcode.trim().to_string();
        let warehouse_id = request.warehouse_id.trim().to_string();
        let position = request.position.trim().to_string();

        let row = inventory::Entity::find()
            .filter(inventory::Column::Barcode.eq(barcode.as_str()))
            .filter(inventory::Column::WarehouseId.eq(warehouse_id.as_str()))
            .filter(inventory::Column::Position.eq(position.as_str()))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "No stock of {} at {}/{}",
                    barcode, warehouse_id, position
                ))
            })?;

        if row.qty_available < request.quantity {
            warn!(barcode = %barcode, available = row.qty_available, requested = request.quantity, "Consume rejected");
            return Err(ServiceError::InsufficientStock(format!(
                "Insufficient quantity: available {}, requested {}",
                row.qty_available, request.quantity
            )));
        }

        let now = Utc::now();
        let remaining = row.qty_available - request.quantity;
        let mut active: inventory::ActiveModel = row.into();
        active.qty_available = Set(remaining);
        active.date_updated = Set(now);
        let stock = active.update(&txn).await?;

        movement::ActiveModel {
            barcode: Set(barcode.clone()),
            movement_type: Set(MovementType::Consume.to_string()),
            from_warehouse: Set(Some(warehouse_id.clone())),
            from_position: Set(Some(position.clone())),
            to_warehouse: Set(None),
            to_position: Set(None),
            quantity: Set(request.quantity),
            notes: Set(clean(request.notes)),
            date_created: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        info!(barcode = %barcode, warehouse_id = %warehouse_id, remaining, "Stock consumed");
        Ok(stock.into())
    }

    /// Movement history of a barcode, newest first.
    #[instrument(skip(self))]
    pub async fn movements(&self, barcode: &str) -> Result<Vec<movement::Model>, ServiceError> {
        let rows = movement::Entity::find()
            .filter(movement::Column::Barcode.eq(barcode))
            .order_by_desc(movement::Column::DateCreated)
            .order_by_desc(movement::Column::MovementId)
            .all(&*self.db)
            .await?;
        Ok(rows)
    }

    #[instrument(skip(self))]
    pub async fn list_inventory(
        &self,
        query: &InventoryQuery,
        page: Pagination,
    ) -> Result<(Vec<InventoryView>, u64), ServiceError> {
        let db = &*self.db;
        let mut select = inventory::Entity::find();
        if let Some(warehouse) = clean(query.warehouse.clone()) {
            select = select.filter(inventory::Column::WarehouseId.eq(warehouse));
        }
        if let Some(barcode) = clean(query.barcode.clone()) {
            select = select.filter(inventory::Column::Barcode.eq(barcode));
        }
        if let Some(search) = clean(query.search.clone()) {
            let matching: Vec<String> = order_item::Entity::find()
                .select_only()
                .column(order_item::Column::Barcode)
                .filter(
                    Condition::any()
                        .add(order_item::Column::ItemName.contains(&search))
                        .add(order_item::Column::Dimension.contains(&search)),
                )
                .into_tuple::<String>()
                .all(db)
                .await?;
            select = select.filter(inventory::Column::Barcode.is_in(matching));
        }

        let total = select.clone().count(db).await?;
        let rows = select
            .order_by_desc(inventory::Column::DateUpdated)
            .order_by_desc(inventory::Column::InventoryId)
            .offset(page.offset())
            .limit(page.limit)
            .all(db)
            .await?;

        let items = items_by_barcode(db, rows.iter().map(|r| r.barcode.clone()).collect()).await?;
        let views = rows
            .into_iter()
            .map(|row| {
                let item = items.get(&row.barcode);
                InventoryView {
                    item_name: item.map(|i| i.item_name.clone()),
                    dimension: item.and_then(|i| i.dimension.clone()),
                    material: item.and_then(|i| i.material.clone()),
                    inventory_id: row.inventory_id,
                    barcode: row.barcode,
                    warehouse_id: row.warehouse_id,
                    position: row.position,
                    qty_available: row.qty_available,
                    date_added: row.date_added,
                    date_updated: row.date_updated,
                }
            })
            .collect();
        Ok((views, total))
    }
}
