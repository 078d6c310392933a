use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::SubProductStatus;
use crate::entities::sub_product;

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubProductRequest {
    pub parent_work_order_id: Option<i32>,
    pub parent_stage_id: Option<i32>,
    #[validate(length(max = 100))]
    #[schema(example = "FRAME-200-L")]
    pub component_code: Option<String>,
    /// Defaults to the component code
    #[validate(length(max = 255))]
    pub component_name: Option<String>,
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
    /// Defaults to `ks`
    #[validate(length(max = 20))]
    pub unit: Option<String>,
    pub current_stage_id: Option<i32>,
    #[validate(length(max = 50))]
    pub warehouse_id: Option<String>,
    #[validate(length(max = 50))]
    pub position: Option<String>,
    pub status: Option<SubProductStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveSubProductRequest {
    #[validate(length(min = 1, max = 50))]
    pub warehouse_id: Option<String>,
    #[validate(length(max = 50))]
    pub position: Option<String>,
    pub current_stage_id: Option<i32>,
    pub status: Option<SubProductStatus>,
}

impl MoveSubProductRequest {
    pub fn is_empty(&self) -> bool {
        self.warehouse_id.is_none()
            && self.position.is_none()
            && self.current_stage_id.is_none()
            && self.status.is_none()
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct SubProductListQuery {
    pub status: Option<String>,
    pub warehouse_id: Option<String>,
    /// Current stage id
    pub stage_id: Option<i32>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Sub-product joined with the names of its warehouse and current stage.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubProductView {
    #[serde(flatten)]
    pub sub_product: sub_product::Model,
    pub warehouse_name: Option<String>,
    pub stage_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubProductMoved {
    pub sub_product_id: i32,
    pub warehouse_id: Option<String>,
    pub position: Option<String>,
    pub current_stage_id: Option<i32>,
    pub status: String,
    pub updated_at: DateTime<Utc>,
}

impl From<sub_product::Model> for SubProductMoved {
    fn from(model: sub_product::Model) -> Self {
        Self {
            sub_product_id: model.sub_product_id,
            warehouse_id: model.warehouse_id,
            position: model.position,
            current_stage_id: model.current_stage_id,
            status: model.status,
            updated_at: model.updated_at,
        }
    }
}
