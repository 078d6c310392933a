use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::ProductionStatus;
use crate::entities::{production, production_stage, production_stage_log, quality_check, sub_product};
use crate::errors::ServiceError;

use super::{not_blank, quality::ResultCount};

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageInput {
    #[validate(length(min = 1, max = 100), custom = "not_blank")]
    #[schema(example = "Cutting")]
    pub stage_name: String,
    /// Defaults to the position in the list, starting at 1
    #[validate(range(min = 1))]
    pub stage_sequence: Option<i32>,
    #[validate(length(max = 255))]
    pub stage_description: Option<String>,
    #[validate(length(max = 50))]
    pub machine_id: Option<String>,
    #[validate(length(max = 50))]
    pub machine_type: Option<String>,
    /// Defaults to the work order's `quantityIn`
    #[validate(range(min = 0))]
    pub input_quantity: Option<i32>,
    #[validate(range(min = 0))]
    pub planned_duration_minutes: Option<i32>,
    #[validate(length(max = 50))]
    pub operator_id: Option<String>,
    pub next_stage_id: Option<i32>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "productCode": "FRAME-200",
    "quantityIn": 50,
    "batchNumber": "B-2024-11",
    "stages": [{"stageName": "Cutting"}, {"stageName": "Welding"}]
}))]
pub struct StartProductionRequest {
    #[validate(length(min = 1, max = 100), custom = "not_blank")]
    pub product_code: String,
    #[validate(range(min = 1, message = "quantityIn must be at least 1"))]
    pub quantity_in: i32,
    #[validate(length(max = 50))]
    pub batch_number: Option<String>,
    pub order_id: Option<i32>,
    #[validate(length(max = 50))]
    pub machine_id: Option<String>,
    #[validate(length(max = 50))]
    pub operator_id: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[validate]
    #[serde(default)]
    pub stages: Vec<StageInput>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ProductionListQuery {
    pub status: Option<String>,
    pub product_code: Option<String>,
    pub batch_number: Option<String>,
    /// Start time lower bound, `YYYY-MM-DD` or RFC 3339
    pub from: Option<String>,
    /// Start time upper bound (inclusive), `YYYY-MM-DD` or RFC 3339
    pub to: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ProductionListQuery {
    /// Parses `from`/`to`. A bare date for `to` covers the whole day.
    pub fn time_range(&self) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>), ServiceError> {
        let from = self
            .from
            .as_deref()
            .map(|raw| parse_bound(raw, "from", NaiveTime::MIN))
            .transpose()?;
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
        let to = self
            .to
            .as_deref()
            .map(|raw| parse_bound(raw, "to", end_of_day))
            .transpose()?;
        Ok((from, to))
    }
}

fn parse_bound(raw: &str, field: &str, time: NaiveTime) -> Result<DateTime<Utc>, ServiceError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| date.and_time(time).and_utc())
        .map_err(|_| ServiceError::field(field, format!("{} must be a date (YYYY-MM-DD)", field)))
}

/// Row of the production list with totals summed over its stages.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductionSummary {
    #[serde(flatten)]
    pub production: production::Model,
    pub total_output: i64,
    pub total_scrap: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductionWithStages {
    #[serde(flatten)]
    pub production: production::Model,
    pub stages: Vec<production_stage::Model>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageOverview {
    #[serde(flatten)]
    pub stage: production_stage::Model,
    /// Number of quality checks recorded on the stage
    pub quality_checks: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductionDetail {
    pub production: production::Model,
    pub stages: Vec<StageOverview>,
    pub stage_logs: Vec<production_stage_log::Model>,
    pub sub_products: Vec<sub_product::Model>,
    pub quality: Vec<ResultCount>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductionRequest {
    pub status: Option<ProductionStatus>,
    #[validate(range(min = 0))]
    pub quantity_out: Option<i32>,
    #[validate(range(min = 0))]
    pub quantity_scrap: Option<i32>,
    #[validate(length(max = 50))]
    pub machine_id: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    pub end_time: Option<DateTime<Utc>>,
}

impl UpdateProductionRequest {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.quantity_out.is_none()
            && self.quantity_scrap.is_none()
            && self.machine_id.is_none()
            && self.notes.is_none()
            && self.end_time.is_none()
    }
}

/// Body of the stage start/pause/resume/complete endpoints. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageActionRequest {
    #[validate(length(max = 50))]
    pub operator_id: Option<String>,
    /// Output quantity on completion, logged quantity otherwise
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
    #[validate(range(min = 0))]
    pub scrap_quantity: Option<i32>,
    #[validate(range(min = 0))]
    pub rework_quantity: Option<i32>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    /// Minutes spent, recorded on the log row
    #[validate(range(min = 0))]
    pub duration: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageDetail {
    pub stage: production_stage::Model,
    pub logs: Vec<production_stage_log::Model>,
    pub quality_checks: Vec<quality_check::Model>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn date_bounds_cover_whole_days() {
        let query = ProductionListQuery {
            from: Some("2024-03-01".into()),
            to: Some("2024-03-02".into()),
            ..Default::default()
        };
        let (from, to) = query.time_range().unwrap();
        let from = from.unwrap();
        let to = to.unwrap();
        assert_eq!((from.day(), from.hour()), (1, 0));
        assert_eq!((to.day(), to.hour(), to.minute()), (2, 23, 59));
    }

    #[test]
    fn rfc3339_bounds_are_accepted() {
        let query = ProductionListQuery {
            from: Some("2024-03-01T10:30:00+01:00".into()),
            ..Default::default()
        };
        let (from, to) = query.time_range().unwrap();
        assert_eq!(from.unwrap().hour(), 9);
        assert!(to.is_none());
    }

    #[test]
    fn garbage_bound_is_a_validation_error() {
        let query = ProductionListQuery {
            to: Some("yesterday".into()),
            ..Default::default()
        };
        assert!(matches!(query.time_range(), Err(ServiceError::ValidationFailed(_))));
    }

    #[test]
    fn nested_stage_names_are_validated() {
        let req = StartProductionRequest {
            product_code: "P".into(),
            quantity_in: 1,
            stages: vec![StageInput::default()],
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn update_without_fields_is_empty() {
        assert!(UpdateProductionRequest::default().is_empty());
        let update = UpdateProductionRequest {
            status: Some(ProductionStatus::Completed),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
