use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "assembly_reports")]
#[serde(rename_all = "camelCase")]
#[schema(as = AssemblyReport)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub report_id: i32,
    pub order_id: i32,
    /// `start`, `complete` or `quality`
    pub report_type: String,
    pub operator: Option<String>,
    pub previous_status: Option<String>,
    pub new_status: Option<String>,
    pub work_duration_minutes: Option<i64>,
    pub notes: Option<String>,
    pub date_created: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
