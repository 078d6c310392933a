use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, instrument, warn};

use crate::domain::stage::production_status_after;
use crate::domain::{ProductionStatus, StageAction, StageStatus};
use crate::dto::clean;
use crate::dto::production::{StageActionRequest, StageDetail};
use crate::entities::{production, production_stage, production_stage_log, quality_check};
use crate::errors::ServiceError;

fn stage_not_found(stage_id: i32) -> ServiceError {
    ServiceError::NotFound(format!("Stage {} not found", stage_id))
}

/// Appends one event to a stage's log.
pub(crate) async fn write_stage_log<C: ConnectionTrait>(
    conn: &C,
    stage_id: i32,
    event_type: &str,
    operator_id: Option<String>,
    quantity: Option<i32>,
    duration_minutes: Option<i32>,
    notes: Option<String>,
) -> Result<production_stage_log::Model, ServiceError> {
    let log = production_stage_log::ActiveModel {
        stage_id: Set(stage_id),
        event_type: Set(event_type.to_string()),
        operator_id: Set(operator_id),
        quantity: Set(quantity),
        duration_minutes: Set(duration_minutes),
        notes: Set(notes),
        timestamp: Set(Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(log)
}

/// Moves the work order along once one of its stages started or completed.
async fn sync_production_status<C: ConnectionTrait>(
    conn: &C,
    work_order_id: i32,
) -> Result<Option<ProductionStatus>, ServiceError> {
    let Some(found) = production::Entity::find_by_id(work_order_id)
        .lock_exclusive()
        .one(conn)
        .await?
    else {
        warn!(work_order_id, "Stage belongs to a missing work order");
        return Ok(None);
    };

    let statuses: Vec<String> = production_stage::Entity::find()
        .select_only()
        .column(production_stage::Column::Status)
        .filter(production_stage::Column::WorkOrderId.eq(work_order_id))
        .into_tuple::<String>()
        .all(conn)
        .await?;
    let completed = statuses
        .iter()
        .filter(|s| s.as_str() == StageStatus::Completed.as_ref())
        .count();

    let current = match ProductionStatus::from_str(&found.status) {
        Ok(status) => status,
        Err(_) => {
            warn!(work_order_id, status = %found.status, "Unknown production status");
            return Ok(None);
        }
    };
    let Some(next) = production_status_after(current, statuses.len(), completed) else {
        return Ok(None);
    };
    if next == current {
        return Ok(None);
    }

    let had_end_time = found.end_time.is_some();
    let mut active: production::ActiveModel = found.into();
    active.status = Set(next.to_string());
    if next == ProductionStatus::Completed && !had_end_time {
        active.end_time = Set(Some(Utc::now()));
    }
    active.update(conn).await?;
    Ok(Some(next))
}

/// Service driving production stages through their state machine
#[derive(Clone)]
pub struct StageService {
    db: Arc<DatabaseConnection>,
}

impl StageService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Applies `action` to a stage, logs it and updates the owning work order.
    #[instrument(skip(self, request))]
    pub async fn apply(
        &self,
        stage_id: i32,
        action: StageAction,
        request: StageActionRequest,
        user: Option<&str>,
    ) -> Result<production_stage::Model, ServiceError> {
        let txn = self.db.begin().await?;
        let stage = production_stage::Entity::find_by_id(stage_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| stage_not_found(stage_id))?;

        let current = StageStatus::from_str(&stage.status).map_err(|_| {
            ServiceError::InternalError(format!("Stage {} has unknown status {}", stage_id, stage.status))
        })?;
        let next = current.apply(action)?;

        let now = Utc::now();
        let work_order_id = stage.work_order_id;
        let actor = clean(request.operator_id.clone()).or_else(|| user.map(str::to_string));

        let mut active: production_stage::ActiveModel = stage.clone().into();
        active.status = Set(next.to_string());
        match action {
            StageAction::Start => {
                active.start_time = Set(stage.start_time.or(Some(now)));
                let operator = clean(request.operator_id.clone())
                    .or(stage.operator_id.clone())
                    .or_else(|| user.map(str::to_string));
                active.operator_id = Set(operator);
            }
            StageAction::Resume => {
                active.start_time = Set(stage.start_time.or(Some(now)));
            }
            StageAction::Complete => {
                active.end_time = Set(Some(now));
                active.output_quantity = Set(request.quantity.unwrap_or(stage.output_quantity));
                active.scrap_quantity = Set(request.scrap_quantity.unwrap_or(stage.scrap_quantity));
                active.rework_quantity = Set(request.rework_quantity.unwrap_or(stage.rework_quantity));
            }
            StageAction::Pause => {}
        }
        if let Some(notes) = clean(request.notes.clone()) {
            active.notes = Set(Some(notes));
        }
        let updated = active.update(&txn).await?;

        write_stage_log(
            &txn,
            stage_id,
            action.log_event(),
            actor,
            request.quantity,
            request.duration,
            clean(request.notes),
        )
        .await?;

        let production_status = match action {
            StageAction::Start | StageAction::Complete => {
                sync_production_status(&txn, work_order_id).await?
            }
            StageAction::Pause | StageAction::Resume => None,
        };
        txn.commit().await?;

        info!(
            stage_id,
            work_order_id,
            action = %action,
            status = %next,
            production_status = ?production_status,
            "Stage updated"
        );
        Ok(updated)
    }

    /// A stage with its log (oldest first) and quality checks (newest first).
    #[instrument(skip(self))]
    pub async fn get_stage(&self, stage_id: i32) -> Result<StageDetail, ServiceError> {
        let db = &*self.db;
        let stage = production_stage::Entity::find_by_id(stage_id)
            .one(db)
            .await?
            .ok_or_else(|| stage_not_found(stage_id))?;

        let logs = production_stage_log::Entity::find()
            .filter(production_stage_log::Column::StageId.eq(stage_id))
            .order_by_asc(production_stage_log::Column::Timestamp)
            .order_by_asc(production_stage_log::Column::LogId)
            .all(db)
            .await?;
        let quality_checks = quality_check::Entity::find()
            .filter(quality_check::Column::StageId.eq(stage_id))
            .order_by_desc(quality_check::Column::CheckedAt)
            .order_by_desc(quality_check::Column::CheckId)
            .all(db)
            .await?;

        Ok(StageDetail {
            stage,
            logs,
            quality_checks,
        })
    }

    /// Stage log, newest first.
    #[instrument(skip(self))]
    pub async fn stage_logs(&self, stage_id: i32) -> Result<Vec<production_stage_log::Model>, ServiceError> {
        let db = &*self.db;
        if production_stage::Entity::find_by_id(stage_id).one(db).await?.is_none() {
            return Err(stage_not_found(stage_id));
        }
        let logs = production_stage_log::Entity::find()
            .filter(production_stage_log::Column::StageId.eq(stage_id))
            .order_by_desc(production_stage_log::Column::Timestamp)
            .order_by_desc(production_stage_log::Column::LogId)
            .all(db)
            .await?;
        Ok(logs)
    }
}
