use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde_json::json;
use tracing::{info, instrument};

use crate::domain::quality::QualityCounters;
use crate::domain::{AssemblyStatus, Pagination, QualityResult};
use crate::dto::clean;
use crate::dto::quality::{
    AssemblyQualityOutcome, AssemblyQualityRequest, CreateQualityCheckRequest,
    ProductResultCount, QualityCheckListQuery, QualityCheckView, QualityReport,
    StageResultCount, UpdateQualityCheckRequest,
};
use crate::entities::{
    assembly_quality_check, assembly_report, audit_log, order, production, production_stage,
    quality_check, sub_product,
};
use crate::errors::ServiceError;

use super::production_stages::write_stage_log;

/// Report type written when an assembly is inspected.
const QUALITY_REPORT: &str = "quality";
const STATUS_CHANGE: &str = "STATUS_CHANGE";

/// Assembly status that follows a final inspection.
pub fn assembly_status_for(result: QualityResult) -> AssemblyStatus {
    match result {
        QualityResult::Ok => AssemblyStatus::Approved,
        QualityResult::Nok | QualityResult::Rework => AssemblyStatus::Rejected,
    }
}

/// Service for stage quality checks and the final inspection of assemblies
#[derive(Clone)]
pub struct QualityCheckService {
    db: Arc<DatabaseConnection>,
}

impl QualityCheckService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Records a check, bumps the stage OK/NOK counters and logs it on the stage.
    #[instrument(skip(self, request), fields(stage_id = request.stage_id))]
    pub async fn create_check(
        &self,
        request: CreateQualityCheckRequest,
        user: Option<&str>,
    ) -> Result<quality_check::Model, ServiceError> {
        let txn = self.db.begin().await?;
        let stage = production_stage::Entity::find_by_id(request.stage_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Stage {} not found", request.stage_id)))?;

        let result = request.result.unwrap_or_default();
        let notes = clean(request.notes);
        let checked_by = user.map(str::to_string);

        let check = quality_check::ActiveModel {
            stage_id: Set(stage.stage_id),
            sub_product_id: Set(request.sub_product_id),
            check_type: Set(clean(request.check_type)),
            result: Set(result.to_string()),
            parameter: Set(clean(request.parameter)),
            spec_min: Set(request.spec_min),
            spec_max: Set(request.spec_max),
            measured: Set(request.measured),
            notes: Set(notes.clone()),
            checked_by: Set(checked_by.clone()),
            checked_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let counters = QualityCounters::new(stage.quality_ok, stage.quality_nok).apply(result);
        let stage_id = stage.stage_id;
        let mut active: production_stage::ActiveModel = stage.into();
        active.quality_ok = Set(counters.ok);
        active.quality_nok = Set(counters.nok);
        active.update(&txn).await?;

        write_stage_log(&txn, stage_id, "quality_check", checked_by, None, None, notes).await?;
        txn.commit().await?;

        info!(check_id = check.check_id, stage_id, result = %result, "Quality check stored");
        Ok(check)
    }

    #[instrument(skip(self))]
    pub async fn list_checks(
        &self,
        query: &QualityCheckListQuery,
        page: Pagination,
    ) -> Result<(Vec<QualityCheckView>, u64), ServiceError> {
        let db = &*self.db;
        let mut select = quality_check::Entity::find();
        if let Some(result) = clean(query.result.clone()) {
            select = select.filter(quality_check::Column::Result.eq(result));
        }
        if let Some(stage_id) = query.stage_id {
            select = select.filter(quality_check::Column::StageId.eq(stage_id));
        }
        if let Some(sub_product_id) = query.sub_product_id {
            select = select.filter(quality_check::Column::SubProductId.eq(sub_product_id));
        }

        let total = select.clone().count(db).await?;
        let rows = select
            .order_by_desc(quality_check::Column::CheckedAt)
            .order_by_desc(quality_check::Column::CheckId)
            .offset(page.offset())
            .limit(page.limit)
            .all(db)
            .await?;
        Ok((self.with_names(rows).await?, total))
    }

    /// Checks of one stage, newest first.
    #[instrument(skip(self))]
    pub async fn by_stage(&self, stage_id: i32) -> Result<Vec<QualityCheckView>, ServiceError> {
        let rows = quality_check::Entity::find()
            .filter(quality_check::Column::StageId.eq(stage_id))
            .order_by_desc(quality_check::Column::CheckedAt)
            .order_by_desc(quality_check::Column::CheckId)
            .all(&*self.db)
            .await?;
        self.with_names(rows).await
    }

    async fn with_names(&self, rows: Vec<quality_check::Model>) -> Result<Vec<QualityCheckView>, ServiceError> {
        let db = &*self.db;
        let stage_ids: Vec<i32> = rows.iter().map(|r| r.stage_id).collect();
        let sub_product_ids: Vec<i32> = rows.iter().filter_map(|r| r.sub_product_id).collect();

        let stages: HashMap<i32, String> = if stage_ids.is_empty() {
            HashMap::new()
        } else {
            production_stage::Entity::find()
                .filter(production_stage::Column::StageId.is_in(stage_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|s| (s.stage_id, s.stage_name))
                .collect()
        };
        let components: HashMap<i32, String> = if sub_product_ids.is_empty() {
            HashMap::new()
        } else {
            sub_product::Entity::find()
                .filter(sub_product::Column::SubProductId.is_in(sub_product_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|s| (s.sub_product_id, s.component_name))
                .collect()
        };

        Ok(rows
            .into_iter()
            .map(|check| QualityCheckView {
                stage_name: stages.get(&check.stage_id).cloned(),
                component_name: check.sub_product_id.and_then(|id| components.get(&id).cloned()),
                check,
            })
            .collect())
    }

    /// Corrects a recorded check. Stage counters are left as they were.
    #[instrument(skip(self))]
    pub async fn update_check(
        &self,
        check_id: i32,
        request: UpdateQualityCheckRequest,
    ) -> Result<quality_check::Model, ServiceError> {
        if request.is_empty() {
            return Err(ServiceError::BadRequest("Nothing to update".to_string()));
        }

        let txn = self.db.begin().await?;
        let found = quality_check::Entity::find_by_id(check_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Quality check {} not found", check_id)))?;

        let mut active: quality_check::ActiveModel = found.into();
        if let Some(result) = request.result {
            active.result = Set(result.to_string());
        }
        if let Some(notes) = request.notes {
            active.notes = Set(clean(Some(notes)));
        }
        if let Some(measured) = request.measured {
            active.measured = Set(Some(measured));
        }
        active.checked_at = Set(Utc::now());
        let updated = active.update(&txn).await?;
        txn.commit().await?;

        info!(check_id, result = %updated.result, "Quality check updated");
        Ok(updated)
    }

    /// Check counts by stage name and by product code.
    #[instrument(skip(self))]
    pub async fn report(&self) -> Result<QualityReport, ServiceError> {
        let db = &*self.db;
        let grouped: Vec<(i32, String, i64)> = quality_check::Entity::find()
            .select_only()
            .column(quality_check::Column::StageId)
            .column(quality_check::Column::Result)
            .column_as(Expr::col(quality_check::Column::CheckId).count(), "count")
            .group_by(quality_check::Column::StageId)
            .group_by(quality_check::Column::Result)
            .into_tuple()
            .all(db)
            .await?;

        let stage_ids: Vec<i32> = grouped.iter().map(|(id, _, _)| *id).collect();
        let stages: HashMap<i32, production_stage::Model> = if stage_ids.is_empty() {
            HashMap::new()
        } else {
            production_stage::Entity::find()
                .filter(production_stage::Column::StageId.is_in(stage_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|s| (s.stage_id, s))
                .collect()
        };
        let work_order_ids: Vec<i32> = stages.values().map(|s| s.work_order_id).collect();
        let products: HashMap<i32, String> = if work_order_ids.is_empty() {
            HashMap::new()
        } else {
            production::Entity::find()
                .filter(production::Column::WorkOrderId.is_in(work_order_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|p| (p.work_order_id, p.product_code))
                .collect()
        };

        let mut by_stage: BTreeMap<(String, String), i64> = BTreeMap::new();
        let mut by_product: BTreeMap<(String, String), i64> = BTreeMap::new();
        for (stage_id, result, count) in grouped {
            let stage = stages.get(&stage_id);
            let stage_name = stage.map(|s| s.stage_name.clone()).unwrap_or_default();
            *by_stage.entry((stage_name, result.clone())).or_default() += count;

            if let Some(code) = stage.and_then(|s| products.get(&s.work_order_id)) {
                *by_product.entry((code.clone(), result)).or_default() += count;
            }
        }

        Ok(QualityReport {
            summary: by_stage
                .into_iter()
                .map(|((stage_name, result), count)| StageResultCount {
                    stage_name,
                    result,
                    count,
                })
                .collect(),
            by_product: by_product
                .into_iter()
                .map(|((product_code, result), count)| ProductResultCount {
                    product_code,
                    result,
                    count,
                })
                .collect(),
        })
    }

    /// Final inspection of an assembly order: approves or rejects it and
    /// leaves a report row and an audit entry behind.
    #[instrument(skip(self, request))]
    pub async fn inspect_assembly(
        &self,
        order_id: i32,
        request: AssemblyQualityRequest,
        user: Option<&str>,
    ) -> Result<AssemblyQualityOutcome, ServiceError> {
        let txn = self.db.begin().await?;
        let found = order::Entity::find_by_id(order_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let now = Utc::now();
        let inspector = clean(request.inspector).or_else(|| user.map(str::to_string));
        let notes = clean(request.notes);
        let parameters = request
            .parameters
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ServiceError::InvalidInput(format!("Invalid parameters: {}", e)))?;

        assembly_quality_check::ActiveModel {
            order_id: Set(order_id),
            result: Set(request.result.to_string()),
            inspector: Set(inspector.clone()),
            notes: Set(notes.clone()),
            parameters: Set(parameters),
            date_checked: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let previous = found.assembly_status.clone();
        let next = assembly_status_for(request.result);
        let mut active: order::ActiveModel = found.into();
        active.assembly_status = Set(next.to_string());
        active.update(&txn).await?;

        assembly_report::ActiveModel {
            order_id: Set(order_id),
            report_type: Set(QUALITY_REPORT.to_string()),
            operator: Set(inspector.clone()),
            previous_status: Set(Some(previous.clone())),
            new_status: Set(Some(next.to_string())),
            work_duration_minutes: Set(None),
            notes: Set(notes),
            date_created: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        audit_log::ActiveModel {
            table_name: Set("orders".to_string()),
            record_id: Set(order_id.to_string()),
            action: Set(STATUS_CHANGE.to_string()),
            user_id: Set(inspector),
            old_value: Set(Some(json!({ "assemblyStatus": previous }).to_string())),
            new_value: Set(Some(
                json!({ "assemblyStatus": next, "qualityResult": request.result }).to_string(),
            )),
            date_created: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        info!(order_id, result = %request.result, assembly_status = %next, "Assembly inspected");
        Ok(AssemblyQualityOutcome { result: next })
    }

    /// Final inspections of an order, newest first.
    #[instrument(skip(self))]
    pub async fn assembly_history(
        &self,
        order_id: i32,
    ) -> Result<Vec<assembly_quality_check::Model>, ServiceError> {
        let db = &*self.db;
        if order::Entity::find_by_id(order_id).one(db).await?.is_none() {
            return Err(ServiceError::NotFound(format!("Order {} not found", order_id)));
        }
        let rows = assembly_quality_check::Entity::find()
            .filter(assembly_quality_check::Column::OrderId.eq(order_id))
            .order_by_desc(assembly_quality_check::Column::DateChecked)
            .order_by_desc(assembly_quality_check::Column::CheckId)
            .all(db)
            .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inspection_outcome() {
        assert_eq!(assembly_status_for(QualityResult::Ok), AssemblyStatus::Approved);
        assert_eq!(assembly_status_for(QualityResult::Nok), AssemblyStatus::Rejected);
    }
}
