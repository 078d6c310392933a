use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "production_stage_logs")]
#[serde(rename_all = "camelCase")]
#[schema(as = ProductionStageLog)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub log_id: i32,
    pub stage_id: i32,
    pub event_type: String,
    pub operator_id: Option<String>,
    pub quantity: Option<i32>,
    pub duration_minutes: Option<i32>,
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
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
