use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::domain::{AssemblyStatus, QualityResult};
use crate::entities::quality_check;

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateQualityCheckRequest {
    #[validate(range(min = 1, message = "stageId must be a positive integer"))]
    pub stage_id: i32,
    pub sub_product_id: Option<i32>,
    #[validate(length(max = 100))]
    #[schema(example = "dimensional")]
    pub check_type: Option<String>,
    /// Defaults to `OK`
    pub result: Option<QualityResult>,
    #[validate(length(max = 100))]
    #[schema(example = "length")]
    pub parameter: Option<String>,
    pub spec_min: Option<f64>,
    pub spec_max: Option<f64>,
    pub measured: Option<f64>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQualityCheckRequest {
    pub result: Option<QualityResult>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    pub measured: Option<f64>,
}

impl UpdateQualityCheckRequest {
    pub fn is_empty(&self) -> bool {
        self.result.is_none() && self.notes.is_none() && self.measured.is_none()
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct QualityCheckListQuery {
    pub result: Option<String>,
    pub stage_id: Option<i32>,
    pub sub_product_id: Option<i32>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QualityCheckView {
    #[serde(flatten)]
    pub check: quality_check::Model,
    pub stage_name: Option<String>,
    pub component_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResultCount {
    pub result: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageResultCount {
    pub stage_name: String,
    pub result: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResultCount {
    pub product_code: String,
    pub result: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    pub summary: Vec<StageResultCount>,
    pub by_product: Vec<ProductResultCount>,
}

fn validate_final_result(result: &QualityResult) -> Result<(), ValidationError> {
    match result {
        QualityResult::Ok | QualityResult::Nok => Ok(()),
        QualityResult::Rework => {
            let mut err = ValidationError::new("result");
            err.message = Some("result must be OK or NOK".into());
            Err(err)
        }
    }
}

/// Final inspection of an assembly order.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyQualityRequest {
    /// `OK` or `NOK`
    #[validate(custom = "validate_final_result")]
    pub result: QualityResult,
    #[validate(length(max = 100))]
    pub inspector: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    /// Measured values, stored verbatim as JSON
    #[schema(value_type = Option<Object>)]
    pub parameters: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyQualityOutcome {
    /// Assembly status after the inspection
    pub result: AssemblyStatus,
}
