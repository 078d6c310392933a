use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One routing step of a work order.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "production_stages")]
#[serde(rename_all = "camelCase")]
#[schema(as = ProductionStage)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub stage_id: i32,
    pub work_order_id: i32,
    pub stage_sequence: i32,
    pub stage_name: String,
    pub stage_description: Option<String>,
    pub machine_id: Option<String>,
    pub machine_type: Option<String>,
    pub input_quantity: i32,
    pub output_quantity: i32,
    pub scrap_quantity: i32,
    pub rework_quantity: i32,
    pub planned_duration_minutes: Option<i32>,
    pub operator_id: Option<String>,
    pub quality_ok: i32,
    pub quality_nok: i32,
    pub status: String,
    pub next_stage_id: Option<i32>,
    pub notes: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::production::Entity",
        from = "Column::WorkOrderId",
        to = "super::production::Column::WorkOrderId"
    )]
    Production,
    #[sea_orm(has_many = "super::production_stage_log::Entity")]
    Logs,
    #[sea_orm(has_many = "super::quality_check::Entity")]
    QualityChecks,
}

impl Related<super::production::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Production.def()
    }
}

impl Related<super::production_stage_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Logs.def()
    }
}

impl Related<super::quality_check::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QualityChecks.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();

        if insert {
            if let ActiveValue::NotSet = active_model.created_at {
                active_model.created_at = Set(now);
            }
        }
        active_model.updated_at = Set(now);

        Ok(active_model)
    }
}
