use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, instrument};

use crate::domain::payloads::NewProduction;
use crate::domain::{Pagination, ProductionStatus};
use crate::dto::clean;
use crate::dto::production::{
    ProductionDetail, ProductionListQuery, ProductionSummary, ProductionWithStages,
    StageOverview, StartProductionRequest, UpdateProductionRequest,
};
use crate::dto::quality::ResultCount;
use crate::entities::{production, production_stage, production_stage_log, quality_check, sub_product};
use crate::errors::ServiceError;

/// Service for production work orders
#[derive(Clone)]
pub struct ProductionService {
    db: Arc<DatabaseConnection>,
}

impl ProductionService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Starts a work order with its routing stages.
    #[instrument(skip(self, request), fields(product_code = %request.product_code))]
    pub async fn start_production(
        &self,
        request: StartProductionRequest,
        operator: Option<&str>,
    ) -> Result<ProductionWithStages, ServiceError> {
        let new = NewProduction::build(&request, operator, Utc::now())?;

        let txn = self.db.begin().await?;
        let created = production::ActiveModel {
            product_code: Set(new.product_code),
            batch_number: Set(new.batch_number),
            order_id: Set(new.order_id),
            quantity_in: Set(new.quantity_in),
            quantity_out: Set(0),
            quantity_scrap: Set(0),
            status: Set(new.status.to_string()),
            operator_id: Set(new.operator_id),
            machine_id: Set(new.machine_id),
            notes: Set(new.notes),
            start_time: Set(Some(new.start_time)),
            end_time: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut stages = Vec::with_capacity(new.stages.len());
        for stage in new.stages {
            let inserted = production_stage::ActiveModel {
                work_order_id: Set(created.work_order_id),
                stage_sequence: Set(stage.stage_sequence),
                stage_name: Set(stage.stage_name),
                stage_description: Set(stage.stage_description),
                machine_id: Set(stage.machine_id),
                machine_type: Set(stage.machine_type),
                input_quantity: Set(stage.input_quantity),
                output_quantity: Set(0),
                scrap_quantity: Set(0),
                rework_quantity: Set(0),
                planned_duration_minutes: Set(stage.planned_duration_minutes),
                operator_id: Set(stage.operator_id),
                quality_ok: Set(0),
                quality_nok: Set(0),
                status: Set(stage.status.to_string()),
                next_stage_id: Set(stage.next_stage_id),
                notes: Set(stage.notes),
                start_time: Set(None),
                end_time: Set(None),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            stages.push(inserted);
        }
        txn.commit().await?;

        info!(work_order_id = created.work_order_id, stages = stages.len(), "Production started");
        Ok(ProductionWithStages {
            production: created,
            stages,
        })
    }

    /// Lists work orders, latest start first, with stage output and scrap totals.
    #[instrument(skip(self))]
    pub async fn list_production(
        &self,
        query: &ProductionListQuery,
        page: Pagination,
    ) -> Result<(Vec<ProductionSummary>, u64), ServiceError> {
        let db = &*self.db;
        let (from, to) = query.time_range()?;

        let mut select = production::Entity::find();
        if let Some(status) = clean(query.status.clone()) {
            select = select.filter(production::Column::Status.eq(status));
        }
        if let Some(code) = clean(query.product_code.clone()) {
            select = select.filter(production::Column::ProductCode.contains(&code));
        }
        if let Some(batch) = clean(query.batch_number.clone()) {
            select = select.filter(production::Column::BatchNumber.eq(batch));
        }
        if let Some(from) = from {
            select = select.filter(production::Column::StartTime.gte(from));
        }
        if let Some(to) = to {
            select = select.filter(production::Column::StartTime.lte(to));
        }

        let total = select.clone().count(db).await?;
        let rows = select
            .order_by_desc(production::Column::StartTime)
            .order_by_desc(production::Column::WorkOrderId)
            .offset(page.offset())
            .limit(page.limit)
            .all(db)
            .await?;

        let ids: Vec<i32> = rows.iter().map(|p| p.work_order_id).collect();
        let mut totals: HashMap<i32, (i64, i64)> = HashMap::new();
        if !ids.is_empty() {
            let stages = production_stage::Entity::find()
                .filter(production_stage::Column::WorkOrderId.is_in(ids))
                .all(db)
                .await?;
            for stage in stages {
                let entry = totals.entry(stage.work_order_id).or_default();
                entry.0 += i64::from(stage.output_quantity);
                entry.1 += i64::from(stage.scrap_quantity);
            }
        }

        let summaries = rows
            .into_iter()
            .map(|p| {
                let (total_output, total_scrap) = totals.get(&p.work_order_id).copied().unwrap_or_default();
                ProductionSummary {
                    production: p,
                    total_output,
                    total_scrap,
                }
            })
            .collect();
        Ok((summaries, total))
    }

    /// Work order with stages, stage logs, sub-products and quality tallies.
    #[instrument(skip(self))]
    pub async fn get_production(&self, work_order_id: i32) -> Result<ProductionDetail, ServiceError> {
        let db = &*self.db;
        let found = production::Entity::find_by_id(work_order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Work order {} not found", work_order_id)))?;

        let stages = production_stage::Entity::find()
            .filter(production_stage::Column::WorkOrderId.eq(work_order_id))
            .order_by_asc(production_stage::Column::StageSequence)
            .order_by_asc(production_stage::Column::StageId)
            .all(db)
            .await?;
        let stage_ids: Vec<i32> = stages.iter().map(|s| s.stage_id).collect();

        let checks = quality_check::Entity::find()
            .filter(quality_check::Column::StageId.is_in(stage_ids.clone()))
            .all(db)
            .await?;
        let mut per_stage: HashMap<i32, u64> = HashMap::new();
        let mut per_result: BTreeMap<String, i64> = BTreeMap::new();
        for check in &checks {
            *per_stage.entry(check.stage_id).or_default() += 1;
            *per_result.entry(check.result.clone()).or_default() += 1;
        }

        let stage_logs = production_stage_log::Entity::find()
            .filter(production_stage_log::Column::StageId.is_in(stage_ids))
            .order_by_asc(production_stage_log::Column::Timestamp)
            .order_by_asc(production_stage_log::Column::LogId)
            .all(db)
            .await?;

        let sub_products = sub_product::Entity::find()
            .filter(sub_product::Column::ParentWorkOrderId.eq(work_order_id))
            .order_by_asc(sub_product::Column::CreatedAt)
            .order_by_asc(sub_product::Column::SubProductId)
            .all(db)
            .await?;

        Ok(ProductionDetail {
            production: found,
            stages: stages
                .into_iter()
                .map(|stage| StageOverview {
                    quality_checks: per_stage.get(&stage.stage_id).copied().unwrap_or(0),
                    stage,
                })
                .collect(),
            stage_logs,
            sub_products,
            quality: per_result
                .into_iter()
                .map(|(result, count)| ResultCount { result, count })
                .collect(),
        })
    }

    #[instrument(skip(self))]
    pub async fn update_production(
        &self,
        work_order_id: i32,
        request: UpdateProductionRequest,
    ) -> Result<production::Model, ServiceError> {
        if request.is_empty() {
            return Err(ServiceError::BadRequest("Nothing to update".to_string()));
        }

        let txn = self.db.begin().await?;
        let found = production::Entity::find_by_id(work_order_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Work order {} not found", work_order_id)))?;

        let had_end_time = found.end_time.is_some();
        let mut active: production::ActiveModel = found.into();
        if let Some(status) = request.status {
            active.status = Set(status.to_string());
        }
        if let Some(out) = request.quantity_out {
            active.quantity_out = Set(out);
        }
        if let Some(scrap) = request.quantity_scrap {
            active.quantity_scrap = Set(scrap);
        }
        if let Some(machine) = request.machine_id {
            active.machine_id = Set(clean(Some(machine)));
        }
        if let Some(notes) = request.notes {
            active.notes = Set(clean(Some(notes)));
        }
        match request.end_time {
            Some(end) => active.end_time = Set(Some(end)),
            None if request.status == Some(ProductionStatus::Completed) && !had_end_time => {
                active.end_time = Set(Some(Utc::now()));
            }
            None => {}
        }
        let updated = active.update(&txn).await?;
        txn.commit().await?;

        info!(work_order_id, status = %updated.status, "Production updated");
        Ok(updated)
    }
}
