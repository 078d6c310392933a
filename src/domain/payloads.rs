//! Normalized records built from request payloads before they are inserted.

use chrono::{DateTime, Utc};

use crate::dto::production::StartProductionRequest;
use crate::dto::sub_products::CreateSubProductRequest;
use crate::dto::clean;
use crate::errors::ServiceError;

use super::{ProductionStatus, StageStatus, SubProductStatus};

pub const DEFAULT_UNIT: &str = "ks";

#[derive(Debug, Clone, PartialEq)]
pub struct NewStage {
    pub stage_sequence: i32,
    pub stage_name: String,
    pub stage_description: Option<String>,
    pub machine_id: Option<String>,
    pub machine_type: Option<String>,
    pub input_quantity: i32,
    pub planned_duration_minutes: Option<i32>,
    pub operator_id: Option<String>,
    pub next_stage_id: Option<i32>,
    pub notes: Option<String>,
    pub status: StageStatus,
}

/// A work order ready to insert, stages included.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduction {
    pub product_code: String,
    pub batch_number: Option<String>,
    pub order_id: Option<i32>,
    pub quantity_in: i32,
    pub status: ProductionStatus,
    pub operator_id: Option<String>,
    pub machine_id: Option<String>,
    pub notes: Option<String>,
    pub start_time: DateTime<Utc>,
    pub stages: Vec<NewStage>,
}

impl NewProduction {
    /// `operator` is the authenticated user and wins over the payload's operator.
    pub fn build(
        payload: &StartProductionRequest,
        operator: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self, ServiceError> {
        let product_code = payload.product_code.trim();
        if product_code.is_empty() {
            return Err(ServiceError::field("productCode", "productCode is required"));
        }
        if payload.quantity_in <= 0 {
            return Err(ServiceError::field("quantityIn", "quantityIn must be at least 1"));
        }

        let operator_id = operator
            .map(str::to_string)
            .or_else(|| clean(payload.operator_id.clone()));

        let stages = payload
            .stages
            .iter()
            .enumerate()
            .map(|(index, stage)| NewStage {
                stage_sequence: stage.stage_sequence.unwrap_or(index as i32 + 1),
                stage_name: stage.stage_name.trim().to_string(),
                stage_description: clean(stage.stage_description.clone()),
                machine_id: clean(stage.machine_id.clone()),
                machine_type: clean(stage.machine_type.clone()),
                input_quantity: stage.input_quantity.unwrap_or(payload.quantity_in),
                planned_duration_minutes: stage.planned_duration_minutes,
                operator_id: clean(stage.operator_id.clone()).or_else(|| operator_id.clone()),
                next_stage_id: stage.next_stage_id,
                notes: clean(stage.notes.clone()),
                status: StageStatus::Pending,
            })
            .collect();

        Ok(Self {
            product_code: product_code.to_string(),
            batch_number: clean(payload.batch_number.clone()),
            order_id: payload.order_id,
            quantity_in: payload.quantity_in,
            status: ProductionStatus::Started,
            operator_id,
            machine_id: clean(payload.machine_id.clone()),
            notes: clean(payload.notes.clone()),
            start_time: now,
            stages,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSubProduct {
    pub parent_work_order_id: i32,
    pub parent_stage_id: Option<i32>,
    pub component_code: String,
    pub component_name: String,
    pub quantity: i32,
    pub unit: String,
    pub current_stage_id: Option<i32>,
    pub warehouse_id: Option<String>,
    pub position: Option<String>,
    pub status: SubProductStatus,
}

impl NewSubProduct {
    pub fn build(payload: &CreateSubProductRequest) -> Result<Self, ServiceError> {
        let parent_work_order_id = payload
            .parent_work_order_id
            .ok_or_else(|| ServiceError::field("parentWorkOrderId", "parentWorkOrderId is required"))?;
        let component_code = clean(payload.component_code.clone())
            .ok_or_else(|| ServiceError::field("componentCode", "componentCode is required"))?;

        Ok(Self {
            parent_work_order_id,
            parent_stage_id: payload.parent_stage_id,
            component_name: clean(payload.component_name.clone())
                .unwrap_or_else(|| component_code.clone()),
            component_code,
            quantity: payload.quantity.unwrap_or(0),
            unit: clean(payload.unit.clone()).unwrap_or_else(|| DEFAULT_UNIT.to_string()),
            current_stage_id: payload.current_stage_id,
            warehouse_id: clean(payload.warehouse_id.clone()),
            position: clean(payload.position.clone()),
            status: payload.status.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::production::StageInput;
    use assert_matches::assert_matches;

    fn start_request() -> StartProductionRequest {
        StartProductionRequest {
            product_code: " FRAME-200 ".into(),
            quantity_in: 40,
            operator_id: Some("payload-op".into()),
            stages: vec![
                StageInput {
                    stage_name: "Cutting".into(),
                    ..Default::default()
                },
                StageInput {
                    stage_name: "Welding".into(),
                    stage_sequence: Some(5),
                    input_quantity: Some(38),
                    operator_id: Some("welder".into()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn production_defaults() {
        let now = Utc::now();
        let built = NewProduction::build(&start_request(), None, now).unwrap();
        assert_eq!(built.product_code, "FRAME-200");
        assert_eq!(built.status, ProductionStatus::Started);
        assert_eq!(built.start_time, now);
        assert_eq!(built.operator_id.as_deref(), Some("payload-op"));

        let first = &built.stages[0];
        assert_eq!(first.stage_sequence, 1);
        assert_eq!(first.input_quantity, 40);
        assert_eq!(first.status, StageStatus::Pending);
        assert_eq!(first.operator_id.as_deref(), Some("payload-op"));

        let second = &built.stages[1];
        assert_eq!(second.stage_sequence, 5);
        assert_eq!(second.input_quantity, 38);
        assert_eq!(second.operator_id.as_deref(), Some("welder"));
    }

    #[test]
    fn authenticated_operator_wins() {
        let built = NewProduction::build(&start_request(), Some("jnovak"), Utc::now()).unwrap();
        assert_eq!(built.operator_id.as_deref(), Some("jnovak"));
        assert_eq!(built.stages[0].operator_id.as_deref(), Some("jnovak"));
    }

    #[test]
    fn production_requires_code_and_quantity() {
        let mut req = start_request();
        req.product_code = "   ".into();
        assert_matches!(
            NewProduction::build(&req, None, Utc::now()),
            Err(ServiceError::ValidationFailed(_))
        );

        let mut req = start_request();
        req.quantity_in = 0;
        assert_matches!(
            NewProduction::build(&req, None, Utc::now()),
            Err(ServiceError::ValidationFailed(_))
        );
    }

    #[test]
    fn sub_product_defaults() {
        let req = CreateSubProductRequest {
            parent_work_order_id: Some(3),
            component_code: Some("LEG-L".into()),
            ..Default::default()
        };
        let built = NewSubProduct::build(&req).unwrap();
        assert_eq!(built.component_name, "LEG-L");
        assert_eq!(built.quantity, 0);
        assert_eq!(built.unit, "ks");
        assert_eq!(built.status, SubProductStatus::Created);
    }

    #[test]
    fn sub_product_requires_parent_and_code() {
        let req = CreateSubProductRequest {
            component_code: Some("LEG-L".into()),
            ..Default::default()
        };
        assert_matches!(NewSubProduct::build(&req), Err(ServiceError::ValidationFailed(_)));

        let req = CreateSubProductRequest {
            parent_work_order_id: Some(3),
            component_code: Some("  ".into()),
            ..Default::default()
        };
        assert_matches!(NewSubProduct::build(&req), Err(ServiceError::ValidationFailed(_)));
    }
}
