use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, instrument};

use crate::domain::Pagination;
use crate::dto::clean;
use crate::dto::warehouses::{
    CreatePositionRequest, CreateWarehouseRequest, UpdateWarehouseRequest, WarehouseDetail,
    WarehouseListQuery, WarehouseStock,
};
use crate::entities::{inventory, warehouse, warehouse_position};
use crate::errors::ServiceError;

use super::inventory::items_by_barcode;
use super::map_unique_violation;

/// Service for warehouses and their named storage positions
#[derive(Clone)]
pub struct WarehouseService {
    db: Arc<DatabaseConnection>,
}

impl WarehouseService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn find(&self, warehouse_id: &str) -> Result<warehouse::Model, ServiceError> {
        warehouse::Entity::find_by_id(warehouse_id.to_string())
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Warehouse {} not found", warehouse_id)))
    }

    #[instrument(skip(self))]
    pub async fn create_warehouse(
        &self,
        request: CreateWarehouseRequest,
    ) -> Result<warehouse::Model, ServiceError> {
        let db = &*self.db;
        let warehouse_id = request.warehouse_id.trim().to_string();

        if warehouse::Entity::find_by_id(warehouse_id.clone()).one(db).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Warehouse {} already exists",
                warehouse_id
            )));
        }

        let created = warehouse::ActiveModel {
            warehouse_id: Set(warehouse_id.clone()),
            warehouse_name: Set(request.warehouse_name.trim().to_string()),
            warehouse_type: Set(clean(request.warehouse_type)),
            location: Set(clean(request.location)),
            capacity: Set(request.capacity),
            is_active: Set(true),
            notes: Set(clean(request.notes)),
            date_created: Set(Utc::now()),
        }
        .insert(db)
        .await
        .map_err(|e| map_unique_violation(e, || format!("Warehouse {} already exists", warehouse_id)))?;

        info!(warehouse_id = %created.warehouse_id, "Warehouse created");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn list_warehouses(
        &self,
        query: &WarehouseListQuery,
        page: Pagination,
    ) -> Result<(Vec<warehouse::Model>, u64), ServiceError> {
        let db = &*self.db;
        let mut select = warehouse::Entity::find();
        if let Some(active) = query.active_filter() {
            select = select.filter(warehouse::Column::IsActive.eq(active));
        }
        let total = select.clone().count(db).await?;
        let rows = select
            .order_by_asc(warehouse::Column::WarehouseName)
            .order_by_asc(warehouse::Column::WarehouseId)
            .offset(page.offset())
            .limit(page.limit)
            .all(db)
            .await?;
        Ok((rows, total))
    }

    /// A warehouse with its stock, ordered by position.
    #[instrument(skip(self))]
    pub async fn get_warehouse(&self, warehouse_id: &str) -> Result<WarehouseDetail, ServiceError> {
        let found = self.find(warehouse_id).await?;
        let db = &*self.db;
        let rows = inventory::Entity::find()
            .filter(inventory::Column::WarehouseId.eq(warehouse_id))
            .order_by_asc(inventory::Column::Position)
            .order_by_asc(inventory::Column::Barcode)
            .all(db)
            .await?;
        let items = items_by_barcode(db, rows.iter().map(|r| r.barcode.clone()).collect()).await?;
        let inventory = rows
            .into_iter()
            .map(|row| WarehouseStock {
                item_name: items.get(&row.barcode).map(|i| i.item_name.clone()),
                barcode: row.barcode,
                position: row.position,
                qty_available: row.qty_available,
                date_updated: row.date_updated,
            })
            .collect();
        Ok(WarehouseDetail {
            warehouse: found,
            inventory,
        })
    }

    #[instrument(skip(self))]
    pub async fn update_warehouse(
        &self,
        warehouse_id: &str,
        request: UpdateWarehouseRequest,
    ) -> Result<warehouse::Model, ServiceError> {
        if request.is_empty() {
            return Err(ServiceError::BadRequest("Nothing to update".to_string()));
        }

        let txn = self.db.begin().await?;
        let found = warehouse::Entity::find_by_id(warehouse_id.to_string())
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Warehouse {} not found", warehouse_id)))?;

        let mut active: warehouse::ActiveModel = found.into();
        if let Some(name) = request.warehouse_name {
            active.warehouse_name = Set(name.trim().to_string());
        }
        if let Some(kind) = request.warehouse_type {
            active.warehouse_type = Set(clean(Some(kind)));
        }
        if let Some(location) = request.location {
            active.location = Set(clean(Some(location)));
        }
        if let Some(capacity) = request.capacity {
            active.capacity = Set(Some(capacity));
        }
        if let Some(notes) = request.notes {
            active.notes = Set(clean(Some(notes)));
        }
        if let Some(is_active) = request.is_active {
            active.is_active = Set(is_active);
        }
        let updated = active.update(&txn).await?;
        txn.commit().await?;

        info!(warehouse_id = %warehouse_id, "Warehouse updated");
        Ok(updated)
    }

    /// Marks a warehouse inactive. Refused while it still holds stock.
    #[instrument(skip(self))]
    pub async fn deactivate_warehouse(&self, warehouse_id: &str) -> Result<warehouse::Model, ServiceError> {
        let txn = self.db.begin().await?;
        let found = warehouse::Entity::find_by_id(warehouse_id.to_string())
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Warehouse {} not found", warehouse_id)))?;

        let stock: Option<i64> = inventory::Entity::find()
            .select_only()
            .column_as(Expr::col(inventory::Column::QtyAvailable).sum(), "total")
            .filter(inventory::Column::WarehouseId.eq(warehouse_id))
            .into_tuple::<Option<i64>>()
            .one(&txn)
            .await?
            .flatten();
        if stock.unwrap_or(0) > 0 {
            return Err(ServiceError::BadRequest(format!(
                "Warehouse {} still holds stock",
                warehouse_id
            )));
        }

        let mut active: warehouse::ActiveModel = found.into();
        active.is_active = Set(false);
        let updated = active.update(&txn).await?;
        txn.commit().await?;

        info!(warehouse_id = %warehouse_id, "Warehouse deactivated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn list_positions(
        &self,
        warehouse_id: Option<String>,
        page: Pagination,
    ) -> Result<(Vec<warehouse_position::Model>, u64), ServiceError> {
        let db = &*self.db;
        let mut select = warehouse_position::Entity::find();
        if let Some(warehouse_id) = clean(warehouse_id) {
            select = select.filter(warehouse_position::Column::WarehouseId.eq(warehouse_id));
        }
        let total = select.clone().count(db).await?;
        let rows = select
            .order_by_asc(warehouse_position::Column::WarehouseId)
            .order_by_asc(warehouse_position::Column::PositionName)
            .offset(page.offset())
            .limit(page.limit)
            .all(db)
            .await?;
        Ok((rows, total))
    }

    #[instrument(skip(self))]
    pub async fn create_position(
        &self,
        request: CreatePositionRequest,
    ) -> Result<warehouse_position::Model, ServiceError> {
        let warehouse_id = request.warehouse_id.trim().to_string();
        let position_name = request.position_name.trim().to_string();
        self.find(&warehouse_id).await?;

        let db = &*self.db;
        let duplicate = warehouse_position::Entity::find()
            .filter(warehouse_position::Column::WarehouseId.eq(warehouse_id.as_str()))
            .filter(warehouse_position::Column::PositionName.eq(position_name.as_str()))
            .count(db)
            .await?
            > 0;
        let conflict = || format!("Position {} already exists in warehouse {}", position_name, warehouse_id);
        if duplicate {
            return Err(ServiceError::Conflict(conflict()));
        }

        let created = warehouse_position::ActiveModel {
            warehouse_id: Set(warehouse_id.clone()),
            position_name: Set(position_name.clone()),
            description: Set(clean(request.description)),
            max_capacity: Set(request.max_capacity),
            is_active: Set(true),
            date_created: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| map_unique_violation(e, conflict))?;

        info!(warehouse_id = %warehouse_id, position = %position_name, "Position created");
        Ok(created)
    }

    /// Active positions that hold no stock.
    #[instrument(skip(self))]
    pub async fn vacant_positions(
        &self,
        warehouse_id: Option<String>,
    ) -> Result<Vec<warehouse_position::Model>, ServiceError> {
        let db = &*self.db;
        let warehouse_id = clean(warehouse_id);

        let mut positions = warehouse_position::Entity::find()
            .filter(warehouse_position::Column::IsActive.eq(true));
        let mut occupied = inventory::Entity::find()
            .select_only()
            .column(inventory::Column::WarehouseId)
            .column(inventory::Column::Position)
            .filter(inventory::Column::QtyAvailable.gt(0));
        if let Some(id) = &warehouse_id {
            positions = positions.filter(warehouse_position::Column::WarehouseId.eq(id.as_str()));
            occupied = occupied.filter(inventory::Column::WarehouseId.eq(id.as_str()));
        }

        let occupied: HashSet<(String, String)> = occupied
            .into_tuple::<(String, String)>()
            .all(db)
            .await?
            .into_iter()
            .collect();

        let vacant = positions
            .order_by_asc(warehouse_position::Column::WarehouseId)
            .order_by_asc(warehouse_position::Column::PositionName)
            .all(db)
            .await?
            .into_iter()
            .filter(|p| !occupied.contains(&(p.warehouse_id.clone(), p.position_name.clone())))
            .collect();
        Ok(vacant)
    }
}
