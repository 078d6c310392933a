use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "movements")]
#[serde(rename_all = "camelCase")]
#[schema(as = Movement)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub movement_id: i32,
    pub barcode: String,
    /// `receive`, `move` or `consume`
    pub movement_type: String,
    pub from_warehouse: Option<String>,
    pub from_position: Option<String>,
    pub to_warehouse: Option<String>,
    pub to_position: Option<String>,
    pub quantity: i32,
    pub notes: Option<String>,
    pub date_created: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
