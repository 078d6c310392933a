use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::domain::status::WAREHOUSE_TYPES;
use crate::entities::warehouse;

use super::not_blank;

fn validate_warehouse_type(value: &str) -> Result<(), ValidationError> {
    if WAREHOUSE_TYPES.contains(&value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("warehouse_type");
        err.message = Some(format!("warehouseType must be one of {}", WAREHOUSE_TYPES.join(", ")).into());
        Err(err)
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWarehouseRequest {
    #[validate(length(min = 1, max = 50), custom = "not_blank")]
    #[schema(example = "WH-MAIN")]
    pub warehouse_id: String,
    #[validate(length(min = 1, max = 255), custom = "not_blank")]
    #[schema(example = "Main warehouse")]
    pub warehouse_name: String,
    /// `Main`, `Buffer`, `WIP` or `Finished`
    #[validate(custom = "validate_warehouse_type")]
    pub warehouse_type: Option<String>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    #[validate(range(min = 0))]
    pub capacity: Option<i32>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWarehouseRequest {
    #[validate(length(min = 1, max = 255))]
    pub warehouse_name: Option<String>,
    #[validate(custom = "validate_warehouse_type")]
    pub warehouse_type: Option<String>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    #[validate(range(min = 0))]
    pub capacity: Option<i32>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}

impl UpdateWarehouseRequest {
    pub fn is_empty(&self) -> bool {
        self.warehouse_name.is_none()
            && self.warehouse_type.is_none()
            && self.location.is_none()
            && self.capacity.is_none()
            && self.notes.is_none()
            && self.is_active.is_none()
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WarehouseListQuery {
    /// `true` or `false`; anything else lists every warehouse
    pub active: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl WarehouseListQuery {
    pub fn active_filter(&self) -> Option<bool> {
        match self.active.as_deref().map(str::trim) {
            Some("true") | Some("1") => Some(true),
            Some("false") | Some("0") => Some(false),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseStock {
    pub barcode: String,
    pub item_name: Option<String>,
    pub position: String,
    pub qty_available: i32,
    pub date_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseDetail {
    pub warehouse: warehouse::Model,
    pub inventory: Vec<WarehouseStock>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct PositionListQuery {
    pub warehouse_id: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct VacantPositionsQuery {
    pub warehouse_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePositionRequest {
    #[validate(length(min = 1, max = 50), custom = "not_blank")]
    pub warehouse_id: String,
    #[validate(length(min = 1, max = 50), custom = "not_blank")]
    #[schema(example = "A-01-03")]
    pub position_name: String,
    #[validate(length(max = 255))]
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub max_capacity: Option<i32>,
}
