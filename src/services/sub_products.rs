use std::collections::HashMap;
use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, instrument};

use crate::domain::payloads::NewSubProduct;
use crate::domain::Pagination;
use crate::dto::clean;
use crate::dto::sub_products::{
    CreateSubProductRequest, MoveSubProductRequest, SubProductListQuery, SubProductMoved,
    SubProductView,
};
use crate::entities::{production, production_stage, sub_product, warehouse};
use crate::errors::ServiceError;

/// Attaches warehouse and current stage names to sub-product rows.
async fn with_names<C: ConnectionTrait>(
    conn: &C,
    rows: Vec<sub_product::Model>,
) -> Result<Vec<SubProductView>, ServiceError> {
    let warehouse_ids: Vec<String> = rows.iter().filter_map(|r| r.warehouse_id.clone()).collect();
    let stage_ids: Vec<i32> = rows.iter().filter_map(|r| r.current_stage_id).collect();

    let warehouses: HashMap<String, String> = if warehouse_ids.is_empty() {
        HashMap::new()
    } else {
        warehouse::Entity::find()
            .filter(warehouse::Column::WarehouseId.is_in(warehouse_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|w| (w.warehouse_id, w.warehouse_name))
            .collect()
    };
    let stages: HashMap<i32, String> = if stage_ids.is_empty() {
        HashMap::new()
    } else {
        production_stage::Entity::find()
            .filter(production_stage::Column::StageId.is_in(stage_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|s| (s.stage_id, s.stage_name))
            .collect()
    };

    Ok(rows
        .into_iter()
        .map(|sub_product| SubProductView {
            warehouse_name: sub_product
                .warehouse_id
                .as_ref()
                .and_then(|id| warehouses.get(id).cloned()),
            stage_name: sub_product
                .current_stage_id
                .and_then(|id| stages.get(&id).cloned()),
            sub_product,
        })
        .collect())
}

async fn ensure_work_order<C: ConnectionTrait>(conn: &C, work_order_id: i32) -> Result<(), ServiceError> {
    match production::Entity::find_by_id(work_order_id).one(conn).await? {
        Some(_) => Ok(()),
        None => Err(ServiceError::NotFound(format!("Work order {} not found", work_order_id))),
    }
}

/// Service for intermediate components produced by work orders
#[derive(Clone)]
pub struct SubProductService {
    db: Arc<DatabaseConnection>,
}

impl SubProductService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_sub_products(
        &self,
        query: &SubProductListQuery,
        page: Pagination,
    ) -> Result<(Vec<SubProductView>, u64), ServiceError> {
        let db = &*self.db;
        let mut select = sub_product::Entity::find();
        if let Some(status) = clean(query.status.clone()) {
            select = select.filter(sub_product::Column::Status.eq(status));
        }
        if let Some(warehouse_id) = clean(query.warehouse_id.clone()) {
            select = select.filter(sub_product::Column::WarehouseId.eq(warehouse_id));
        }
        if let Some(stage_id) = query.stage_id {
            select = select.filter(sub_product::Column::CurrentStageId.eq(stage_id));
        }

        let total = select.clone().count(db).await?;
        let rows = select
            .order_by_desc(sub_product::Column::UpdatedAt)
            .order_by_desc(sub_product::Column::SubProductId)
            .offset(page.offset())
            .limit(page.limit)
            .all(db)
            .await?;
        Ok((with_names(db, rows).await?, total))
    }

    #[instrument(skip(self, request))]
    pub async fn create_sub_product(
        &self,
        request: CreateSubProductRequest,
    ) -> Result<sub_product::Model, ServiceError> {
        let new = NewSubProduct::build(&request)?;
        let db = &*self.db;
        ensure_work_order(db, new.parent_work_order_id).await?;

        let created = sub_product::ActiveModel {
            parent_work_order_id: Set(new.parent_work_order_id),
            parent_stage_id: Set(new.parent_stage_id),
            component_code: Set(new.component_code),
            component_name: Set(new.component_name),
            quantity: Set(new.quantity),
            unit: Set(new.unit),
            current_stage_id: Set(new.current_stage_id),
            warehouse_id: Set(new.warehouse_id),
            position: Set(new.position),
            status: Set(new.status.to_string()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!(
            sub_product_id = created.sub_product_id,
            work_order_id = created.parent_work_order_id,
            component_code = %created.component_code,
            "Sub-product created"
        );
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_sub_product(&self, sub_product_id: i32) -> Result<SubProductView, ServiceError> {
        let db = &*self.db;
        let found = sub_product::Entity::find_by_id(sub_product_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Sub-product {} not found", sub_product_id)))?;
        let mut views = with_names(db, vec![found]).await?;
        views
            .pop()
            .ok_or_else(|| ServiceError::NotFound(format!("Sub-product {} not found", sub_product_id)))
    }

    /// Relocates a sub-product or advances it to another stage.
    #[instrument(skip(self))]
    pub async fn move_sub_product(
        &self,
        sub_product_id: i32,
        request: MoveSubProductRequest,
    ) -> Result<SubProductMoved, ServiceError> {
        if request.is_empty() {
            return Err(ServiceError::BadRequest("Nothing to move".to_string()));
        }

        let txn = self.db.begin().await?;
        let found = sub_product::Entity::find_by_id(sub_product_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Sub-product {} not found", sub_product_id)))?;

        let mut active: sub_product::ActiveModel = found.into();
        if let Some(warehouse_id) = request.warehouse_id {
            active.warehouse_id = Set(clean(Some(warehouse_id)));
        }
        if let Some(position) = request.position {
            active.position = Set(clean(Some(position)));
        }
        if let Some(stage_id) = request.current_stage_id {
            active.current_stage_id = Set(Some(stage_id));
        }
        if let Some(status) = request.status {
            active.status = Set(status.to_string());
        }
        let updated = active.update(&txn).await?;
        txn.commit().await?;

        info!(
            sub_product_id,
            warehouse_id = ?updated.warehouse_id,
            status = %updated.status,
            "Sub-product moved"
        );
        Ok(updated.into())
    }

    /// Sub-products of one work order in creation order.
    #[instrument(skip(self))]
    pub async fn by_work_order(&self, work_order_id: i32) -> Result<Vec<SubProductView>, ServiceError> {
        let db = &*self.db;
        ensure_work_order(db, work_order_id).await?;
        let rows = sub_product::Entity::find()
            .filter(sub_product::Column::ParentWorkOrderId.eq(work_order_id))
            .order_by_asc(sub_product::Column::CreatedAt)
            .order_by_asc(sub_product::Column::SubProductId)
            .all(db)
            .await?;
        with_names(db, rows).await
    }
}
