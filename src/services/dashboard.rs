use std::sync::Arc;

use chrono::{Duration, Utc};
use sea_orm::{
    sea_query::Expr, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use tracing::{debug, instrument};

use crate::domain::{AssemblyStatus, OrderType};
use crate::dto::dashboard::{
    ActiveAssembly, Dashboard, InventoryStats, OrderStats, RecentMovement, StatusCount,
    WarehouseStats,
};
use crate::dto::quality::ResultCount;
use crate::entities::{inventory, movement, order, production, quality_check, warehouse};
use crate::errors::ServiceError;

use super::inventory::items_by_barcode;

const ACTIVE_ASSEMBLIES: u64 = 10;
const RECENT_MOVEMENTS: u64 = 5;
const QUALITY_WINDOW_DAYS: i64 = 7;

fn into_counts(rows: Vec<(String, i64)>) -> Vec<StatusCount> {
    rows.into_iter()
        .map(|(status, count)| StatusCount { status, count })
        .collect()
}

/// Read-only aggregates for the home screen
#[derive(Clone)]
pub struct DashboardService {
    db: Arc<DatabaseConnection>,
}

impl DashboardService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn summary(&self) -> Result<Dashboard, ServiceError> {
        let db = &*self.db;

        let by_type: Vec<(String, i64)> = order::Entity::find()
            .select_only()
            .column(order::Column::OrderType)
            .column_as(Expr::col(order::Column::OrderId).count(), "count")
            .group_by(order::Column::OrderType)
            .order_by_asc(order::Column::OrderType)
            .into_tuple()
            .all(db)
            .await?;

        let by_assembly_status: Vec<(String, i64)> = order::Entity::find()
            .select_only()
            .column(order::Column::AssemblyStatus)
            .column_as(Expr::col(order::Column::OrderId).count(), "count")
            .filter(order::Column::OrderType.eq(OrderType::Zakazka.as_ref()))
            .group_by(order::Column::AssemblyStatus)
            .order_by_asc(order::Column::AssemblyStatus)
            .into_tuple()
            .all(db)
            .await?;

        let active = order::Entity::find()
            .filter(order::Column::AssemblyStatus.eq(AssemblyStatus::InProgress.as_ref()))
            .order_by_desc(order::Column::DateStarted)
            .limit(ACTIVE_ASSEMBLIES)
            .all(db)
            .await?
            .into_iter()
            .map(|o| ActiveAssembly {
                order_id: o.order_id,
                sap_number: o.sap_number,
                supplier: o.supplier,
                order_type: o.order_type,
                assembly_status: o.assembly_status,
                date_started: o.date_started,
                operator: o.operator,
            })
            .collect();

        let total_warehouses = warehouse::Entity::find().count(db).await?;
        let active_warehouses = warehouse::Entity::find()
            .filter(warehouse::Column::IsActive.eq(true))
            .count(db)
            .await?;

        let total_items = inventory::Entity::find()
            .select_only()
            .column(inventory::Column::Barcode)
            .distinct()
            .count(db)
            .await?;
        let total_quantity: Option<i64> = inventory::Entity::find()
            .select_only()
            .column_as(Expr::col(inventory::Column::QtyAvailable).sum(), "total")
            .into_tuple::<Option<i64>>()
            .one(db)
            .await?
            .flatten();

        let movements = movement::Entity::find()
            .order_by_desc(movement::Column::DateCreated)
            .order_by_desc(movement::Column::MovementId)
            .limit(RECENT_MOVEMENTS)
            .all(db)
            .await?;
        let items = items_by_barcode(db, movements.iter().map(|m| m.barcode.clone()).collect()).await?;
        let recent_movements = movements
            .into_iter()
            .map(|m| RecentMovement {
                item_name: items.get(&m.barcode).map(|i| i.item_name.clone()),
                movement_type: m.movement_type,
                barcode: m.barcode,
                quantity: m.quantity,
                date_created: m.date_created,
            })
            .collect();

        let since = Utc::now() - Duration::days(QUALITY_WINDOW_DAYS);
        let quality: Vec<(String, i64)> = quality_check::Entity::find()
            .select_only()
            .column(quality_check::Column::Result)
            .column_as(Expr::col(quality_check::Column::CheckId).count(), "count")
            .filter(quality_check::Column::CheckedAt.gte(since))
            .group_by(quality_check::Column::Result)
            .order_by_asc(quality_check::Column::Result)
            .into_tuple()
            .all(db)
            .await?;

        let production: Vec<(String, i64)> = production::Entity::find()
            .select_only()
            .column(production::Column::Status)
            .column_as(Expr::col(production::Column::WorkOrderId).count(), "count")
            .group_by(production::Column::Status)
            .order_by_asc(production::Column::Status)
            .into_tuple()
            .all(db)
            .await?;

        debug!(total_warehouses, total_items, "Dashboard aggregated");
        Ok(Dashboard {
            orders: OrderStats {
                by_type: into_counts(by_type),
                by_assembly_status: into_counts(by_assembly_status),
                active,
            },
            warehouses: WarehouseStats {
                total_warehouses,
                active_warehouses,
            },
            inventory: InventoryStats {
                total_items,
                total_quantity: total_quantity.unwrap_or(0),
            },
            recent_movements,
            quality: quality
                .into_iter()
                .map(|(result, count)| ResultCount { result, count })
                .collect(),
            production: into_counts(production),
            timestamp: Utc::now(),
        })
    }
}
