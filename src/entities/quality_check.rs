use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Quality check recorded against a production stage.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "quality_checks")]
#[serde(rename_all = "camelCase")]
#[schema(as = QualityCheck)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub check_id: i32,
    pub stage_id: i32,
    pub sub_product_id: Option<i32>,
    pub check_type: Option<String>,
    /// `OK`, `NOK` or `rework`
    pub result: String,
    pub parameter: Option<String>,
    pub spec_min: Option<f64>,
    pub spec_max: Option<f64>,
    pub measured: Option<f64>,
    pub notes: Option<String>,
    pub checked_by: Option<String>,
    pub checked_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::production_stage::Entity",
        from = "Column::StageId",
        to = "super::production_stage::Column::StageId"
    )]
    Stage,
}

impl Related<super::production_stage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stage.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
