use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use async_recursion::async_recursion;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, instrument, warn};

use crate::domain::{AssemblyStatus, ComponentType};
use crate::dto::assembly::{
    AddComponentRequest, AssemblyActionRequest, AssemblyCompleted, AssemblyNode,
    AssemblyReportView, AssemblyStarted, AssemblyTiming, ComponentNode, ComponentView,
    CreateAssemblyRequest,
};
use crate::dto::clean;
use crate::dto::orders::CreatedOrder;
use crate::entities::{
    assembly_quality_check, assembly_report, audit_log, order, order_component, order_item,
};
use crate::errors::ServiceError;

use super::orders::{ensure_sap_number_free, insert_order, OrderHeader};

/// Deepest nesting level returned by [`AssemblyService::tree`].
pub const MAX_TREE_DEPTH: usize = 10;

fn order_not_found(order_id: i32) -> ServiceError {
    ServiceError::NotFound(format!("Order {} not found", order_id))
}

async fn insert_component<C: ConnectionTrait>(
    conn: &C,
    order_id: i32,
    kind: ComponentType,
    component_order_id: Option<i32>,
    component_item_id: Option<i32>,
    quantity_required: i32,
    sort_order: i32,
) -> Result<order_component::Model, ServiceError> {
    let component = order_component::ActiveModel {
        order_id: Set(order_id),
        component_type: Set(kind.to_string()),
        component_order_id: Set(component_order_id),
        component_item_id: Set(component_item_id),
        quantity_required: Set(quantity_required),
        quantity_used: Set(0),
        sort_order: Set(sort_order),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(component)
}

#[allow(clippy::too_many_arguments)]
async fn write_report<C: ConnectionTrait>(
    conn: &C,
    order_id: i32,
    report_type: &str,
    operator: Option<String>,
    previous: &str,
    next: AssemblyStatus,
    work_duration_minutes: Option<i64>,
    notes: Option<String>,
) -> Result<(), ServiceError> {
    assembly_report::ActiveModel {
        order_id: Set(order_id),
        report_type: Set(report_type.to_string()),
        operator: Set(operator),
        previous_status: Set(Some(previous.to_string())),
        new_status: Set(Some(next.to_string())),
        work_duration_minutes: Set(work_duration_minutes),
        notes: Set(notes),
        date_created: Set(Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(())
}

/// Loads the subtree rooted at `order_id`. Components pointing at rows that
/// no longer exist are left out.
#[async_recursion]
async fn build_tree(
    db: &DatabaseConnection,
    order_id: i32,
    depth: usize,
) -> Result<Option<AssemblyNode>, ServiceError> {
    if depth > MAX_TREE_DEPTH {
        return Err(ServiceError::BadRequest(format!(
            "Assembly tree is deeper than {} levels",
            MAX_TREE_DEPTH
        )));
    }

    let Some(found) = order::Entity::find_by_id(order_id).one(db).await? else {
        return Ok(None);
    };

    let components = order_component::Entity::find()
        .filter(order_component::Column::OrderId.eq(order_id))
        .order_by_asc(order_component::Column::SortOrder)
        .order_by_asc(order_component::Column::ComponentId)
        .all(db)
        .await?;

    let mut children = Vec::with_capacity(components.len());
    for component in components {
        match ComponentType::from_str(&component.component_type) {
            Ok(ComponentType::Order) => {
                let Some(child_id) = component.component_order_id else {
                    continue;
                };
                if let Some(child) = build_tree(db, child_id, depth + 1).await? {
                    children.push(ComponentNode {
                        component_id: component.component_id,
                        kind: "assembly".to_string(),
                        quantity_required: component.quantity_required,
                        quantity_used: component.quantity_used,
                        assembly: Some(Box::new(child)),
                        item: None,
                    });
                }
            }
            Ok(ComponentType::Item) => {
                let Some(item_id) = component.component_item_id else {
                    continue;
                };
                if let Some(item) = order_item::Entity::find_by_id(item_id).one(db).await? {
                    children.push(ComponentNode {
                        component_id: component.component_id,
                        kind: ComponentType::Item.to_string(),
                        quantity_required: component.quantity_required,
                        quantity_used: component.quantity_used,
                        assembly: None,
                        item: Some(item),
                    });
                }
            }
            Err(_) => {
                warn!(component_id = component.component_id, kind = %component.component_type, "Skipping unknown component type");
            }
        }
    }

    Ok(Some(AssemblyNode {
        order: found,
        components: children,
    }))
}

/// Service for hierarchical assembly orders
#[derive(Clone)]
pub struct AssemblyService {
    db: Arc<DatabaseConnection>,
}

impl AssemblyService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Creates an assembly order and hooks it under its parent when one is given.
    #[instrument(skip(self, request), fields(sap_number = %request.sap_number))]
    pub async fn create_assembly(
        &self,
        request: CreateAssemblyRequest,
    ) -> Result<CreatedOrder, ServiceError> {
        let txn = self.db.begin().await?;
        let sap_number = request.sap_number.trim().to_string();
        ensure_sap_number_free(&txn, &sap_number).await?;

        if let Some(parent_id) = request.parent_order_id {
            if order::Entity::find_by_id(parent_id).one(&txn).await?.is_none() {
                return Err(ServiceError::NotFound(format!("Parent order {} not found", parent_id)));
            }
        }

        let created = insert_order(
            &txn,
            OrderHeader {
                sap_number,
                supplier: request.supplier,
                notes: request.notes,
                order_type: request.order_type.unwrap_or_default(),
                parent_order_id: request.parent_order_id,
                operator: request.operator,
            },
            Utc::now(),
        )
        .await?;

        if let Some(parent_id) = request.parent_order_id {
            insert_component(&txn, parent_id, ComponentType::Order, Some(created.order_id), None, 1, 0)
                .await?;
        }
        txn.commit().await?;

        info!(
            order_id = created.order_id,
            order_type = %created.order_type,
            parent_order_id = ?created.parent_order_id,
            "Assembly created"
        );
        Ok(CreatedOrder {
            order_id: created.order_id,
            order_qr: created.order_qr,
        })
    }

    #[instrument(skip(self))]
    pub async fn add_component(
        &self,
        order_id: i32,
        request: AddComponentRequest,
    ) -> Result<order_component::Model, ServiceError> {
        let db = &*self.db;
        if order::Entity::find_by_id(order_id).one(db).await?.is_none() {
            return Err(order_not_found(order_id));
        }

        let kind = ComponentType::from_str(request.component_type.trim()).map_err(|_| {
            ServiceError::field("componentType", format!("Unknown component type {}", request.component_type))
        })?;
        let (component_order_id, component_item_id) = match kind {
            ComponentType::Order => {
                let child = request
                    .component_order_id
                    .ok_or_else(|| ServiceError::field("componentOrderId", "componentOrderId is required"))?;
                if child == order_id {
                    return Err(ServiceError::BadRequest(
                        "An order cannot contain itself".to_string(),
                    ));
                }
                (Some(child), None)
            }
            ComponentType::Item => {
                let item = request
                    .component_item_id
                    .ok_or_else(|| ServiceError::field("componentItemId", "componentItemId is required"))?;
                (None, Some(item))
            }
        };

        let component = insert_component(
            db,
            order_id,
            kind,
            component_order_id,
            component_item_id,
            request.quantity_required.unwrap_or(1),
            request.sort_order.unwrap_or(0),
        )
        .await?;

        info!(order_id, component_id = component.component_id, kind = %kind, "Component added");
        Ok(component)
    }

    #[instrument(skip(self))]
    pub async fn remove_component(&self, component_id: i32) -> Result<(), ServiceError> {
        let deleted = order_component::Entity::delete_by_id(component_id)
            .exec(&*self.db)
            .await?;
        if deleted.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Component {} not found", component_id)));
        }
        info!(component_id, "Component removed");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn tree(&self, order_id: i32) -> Result<AssemblyNode, ServiceError> {
        build_tree(&self.db, order_id, 0)
            .await?
            .ok_or_else(|| order_not_found(order_id))
    }

    /// Puts an assembly in progress. The first start time is kept on restarts.
    #[instrument(skip(self, request))]
    pub async fn start(
        &self,
        order_id: i32,
        request: AssemblyActionRequest,
        user: Option<&str>,
    ) -> Result<AssemblyStarted, ServiceError> {
        let txn = self.db.begin().await?;
        let found = order::Entity::find_by_id(order_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| order_not_found(order_id))?;

        let operator = clean(request.operator);
        let previous = found.assembly_status.clone();
        let date_started = found.date_started.unwrap_or_else(Utc::now);
        let mut active: order::ActiveModel = found.into();
        active.assembly_status = Set(AssemblyStatus::InProgress.to_string());
        active.date_started = Set(Some(date_started));
        if operator.is_some() {
            active.operator = Set(operator.clone());
        }
        active.update(&txn).await?;

        write_report(
            &txn,
            order_id,
            "start",
            operator.or_else(|| user.map(str::to_string)),
            &previous,
            AssemblyStatus::InProgress,
            None,
            clean(request.notes),
        )
        .await?;
        txn.commit().await?;

        info!(order_id, previous_status = %previous, "Assembly started");
        Ok(AssemblyStarted {
            order_id,
            assembly_status: AssemblyStatus::InProgress,
            date_started: Some(date_started),
        })
    }

    /// Completes an assembly and records the work time since its start.
    #[instrument(skip(self, request))]
    pub async fn complete(
        &self,
        order_id: i32,
        request: AssemblyActionRequest,
        user: Option<&str>,
    ) -> Result<AssemblyCompleted, ServiceError> {
        let txn = self.db.begin().await?;
        let found = order::Entity::find_by_id(order_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| order_not_found(order_id))?;

        let now = Utc::now();
        let operator = clean(request.operator);
        let previous = found.assembly_status.clone();
        let work_duration_minutes = AssemblyTiming::new(found.date_started, Some(now)).work_duration_minutes;

        let mut active: order::ActiveModel = found.into();
        active.assembly_status = Set(AssemblyStatus::Completed.to_string());
        active.date_completed = Set(Some(now));
        if operator.is_some() {
            active.operator = Set(operator.clone());
        }
        active.update(&txn).await?;

        write_report(
            &txn,
            order_id,
            "complete",
            operator.or_else(|| user.map(str::to_string)),
            &previous,
            AssemblyStatus::Completed,
            work_duration_minutes,
            clean(request.notes),
        )
        .await?;
        txn.commit().await?;

        info!(order_id, work_duration_minutes = ?work_duration_minutes, "Assembly completed");
        Ok(AssemblyCompleted {
            order_id,
            assembly_status: AssemblyStatus::Completed,
            work_duration_minutes,
        })
    }

    /// Everything recorded about one assembly order.
    #[instrument(skip(self))]
    pub async fn report(&self, order_id: i32) -> Result<AssemblyReportView, ServiceError> {
        let db = &*self.db;
        let found = order::Entity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| order_not_found(order_id))?;

        let components = order_component::Entity::find()
            .filter(order_component::Column::OrderId.eq(order_id))
            .order_by_asc(order_component::Column::SortOrder)
            .order_by_asc(order_component::Column::ComponentId)
            .all(db)
            .await?;

        let child_orders: Vec<i32> = components.iter().filter_map(|c| c.component_order_id).collect();
        let child_items: Vec<i32> = components.iter().filter_map(|c| c.component_item_id).collect();
        let sap_numbers: HashMap<i32, String> = if child_orders.is_empty() {
            HashMap::new()
        } else {
            order::Entity::find()
                .select_only()
                .column(order::Column::OrderId)
                .column(order::Column::SapNumber)
                .filter(order::Column::OrderId.is_in(child_orders))
                .into_tuple::<(i32, String)>()
                .all(db)
                .await?
                .into_iter()
                .collect()
        };
        let item_names: HashMap<i32, String> = if child_items.is_empty() {
            HashMap::new()
        } else {
            order_item::Entity::find()
                .select_only()
                .column(order_item::Column::ItemId)
                .column(order_item::Column::ItemName)
                .filter(order_item::Column::ItemId.is_in(child_items))
                .into_tuple::<(i32, String)>()
                .all(db)
                .await?
                .into_iter()
                .collect()
        };

        let reports = assembly_report::Entity::find()
            .filter(assembly_report::Column::OrderId.eq(order_id))
            .order_by_desc(assembly_report::Column::DateCreated)
            .order_by_desc(assembly_report::Column::ReportId)
            .all(db)
            .await?;
        let quality = assembly_quality_check::Entity::find()
            .filter(assembly_quality_check::Column::OrderId.eq(order_id))
            .order_by_desc(assembly_quality_check::Column::DateChecked)
            .order_by_desc(assembly_quality_check::Column::CheckId)
            .all(db)
            .await?;
        let audit = audit_log::Entity::find()
            .filter(audit_log::Column::TableName.eq("orders"))
            .filter(audit_log::Column::RecordId.eq(order_id.to_string()))
            .order_by_desc(audit_log::Column::DateCreated)
            .order_by_desc(audit_log::Column::AuditId)
            .all(db)
            .await?;

        Ok(AssemblyReportView {
            timing: AssemblyTiming::new(found.date_started, found.date_completed),
            order: found,
            components: components
                .into_iter()
                .map(|component| ComponentView {
                    component_order_sap_number: component
                        .component_order_id
                        .and_then(|id| sap_numbers.get(&id).cloned()),
                    component_item_name: component
                        .component_item_id
                        .and_then(|id| item_names.get(&id).cloned()),
                    component,
                })
                .collect(),
            reports,
            quality,
            audit_log: audit,
        })
    }
}
