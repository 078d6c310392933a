use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Edge of an assembly tree: either a nested order or a raw order item.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "order_components")]
#[serde(rename_all = "camelCase")]
#[schema(as = OrderComponent)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub component_id: i32,
    pub order_id: i32,
    pub component_type: String,
    pub component_order_id: Option<i32>,
    pub component_item_id: Option<i32>,
    pub quantity_required: i32,
    pub quantity_used: i32,
    pub sort_order: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::OrderId"
    )]
    Order,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
