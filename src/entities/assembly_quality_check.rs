use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Final inspection of an assembly order.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "assembly_quality_checks")]
#[serde(rename_all = "camelCase")]
#[schema(as = AssemblyQualityCheck)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub check_id: i32,
    pub order_id: i32,
    pub result: String,
    pub inspector: Option<String>,
    pub notes: Option<String>,
    /// Free-form measurement map, stored as JSON text
    #[sea_orm(column_type = "Text", nullable)]
    pub parameters: Option<String>,
    pub date_checked: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
