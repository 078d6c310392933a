use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{AssemblyStatus, OrderType};
use crate::entities::{
    assembly_quality_check, assembly_report, audit_log, order, order_component, order_item,
};

use super::{not_blank, orders::validate_sap_number};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssemblyRequest {
    #[validate(custom = "validate_sap_number")]
    pub sap_number: String,
    #[validate(length(min = 1, max = 255), custom = "not_blank")]
    pub supplier: String,
    /// Defaults to `zakazka`
    pub order_type: Option<OrderType>,
    /// Attaches the new order as a component of this one
    pub parent_order_id: Option<i32>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[validate(length(max = 100))]
    pub operator: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddComponentRequest {
    /// `order` or `item`
    #[schema(example = "item")]
    pub component_type: String,
    pub component_order_id: Option<i32>,
    pub component_item_id: Option<i32>,
    /// Defaults to 1
    #[validate(range(min = 1))]
    pub quantity_required: Option<i32>,
    /// Defaults to 0
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyActionRequest {
    #[validate(length(max = 100))]
    pub operator: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// One order in an assembly tree with its components resolved.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyNode {
    #[serde(flatten)]
    pub order: order::Model,
    pub components: Vec<ComponentNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComponentNode {
    pub component_id: i32,
    /// `assembly` for nested orders, `item` for raw material
    #[serde(rename = "type")]
    pub kind: String,
    pub quantity_required: i32,
    pub quantity_used: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(no_recursion)]
    pub assembly: Option<Box<AssemblyNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<order_item::Model>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyStarted {
    pub order_id: i32,
    pub assembly_status: AssemblyStatus,
    pub date_started: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyCompleted {
    pub order_id: i32,
    pub assembly_status: AssemblyStatus,
    /// Whole minutes since the start; `null` when the order was never started
    pub work_duration_minutes: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyTiming {
    pub date_started: Option<DateTime<Utc>>,
    pub date_completed: Option<DateTime<Utc>>,
    pub work_duration_minutes: Option<i64>,
    pub work_duration_hours: Option<f64>,
}

impl AssemblyTiming {
    pub fn new(date_started: Option<DateTime<Utc>>, date_completed: Option<DateTime<Utc>>) -> Self {
        let minutes = match (date_started, date_completed) {
            (Some(start), Some(end)) => Some((end - start).num_minutes()),
            _ => None,
        };
        Self {
            date_started,
            date_completed,
            work_duration_minutes: minutes,
            work_duration_hours: minutes.map(|m| (m as f64 / 60.0 * 100.0).round() / 100.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComponentView {
    #[serde(flatten)]
    pub component: order_component::Model,
    pub component_order_sap_number: Option<String>,
    pub component_item_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyReportView {
    pub order: order::Model,
    pub timing: AssemblyTiming,
    pub components: Vec<ComponentView>,
    pub reports: Vec<assembly_report::Model>,
    pub quality: Vec<assembly_quality_check::Model>,
    pub audit_log: Vec<audit_log::Model>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn timing_rounds_hours_to_two_decimals() {
        let start = Utc::now();
        let timing = AssemblyTiming::new(Some(start), Some(start + Duration::minutes(100)));
        assert_eq!(timing.work_duration_minutes, Some(100));
        assert_eq!(timing.work_duration_hours, Some(1.67));
    }

    #[test]
    fn timing_needs_both_dates() {
        let timing = AssemblyTiming::new(Some(Utc::now()), None);
        assert_eq!(timing.work_duration_minutes, None);
        assert_eq!(timing.work_duration_hours, None);
    }

    #[test]
    fn component_node_serializes_type_tag() {
        let node = ComponentNode {
            component_id: 1,
            kind: "item".into(),
            quantity_required: 2,
            quantity_used: 0,
            assembly: None,
            item: None,
        };
        let json = serde_json::to_value(node).unwrap();
        assert_eq!(json["type"], "item");
        assert!(json.get("assembly").is_none());
    }
}
