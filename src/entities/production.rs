use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Production work order.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "production")]
#[serde(rename_all = "camelCase")]
#[schema(as = Production)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub work_order_id: i32,
    pub product_code: String,
    pub batch_number: Option<String>,
    pub order_id: Option<i32>,
    pub quantity_in: i32,
    pub quantity_out: i32,
    pub quantity_scrap: i32,
    pub status: String,
    pub operator_id: Option<String>,
    pub machine_id: Option<String>,
    pub notes: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::production_stage::Entity")]
    Stages,
    #[sea_orm(has_many = "super::sub_product::Entity")]
    SubProducts,
}

impl Related<super::production_stage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stages.def()
    }
}

impl Related<super::sub_product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubProducts.def()
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
