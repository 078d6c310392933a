use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
    TransactionTrait,
};
use tracing::{info, instrument};

use crate::domain::{ItemStatus, MovementType};
use crate::dto::clean;
use crate::dto::receiving::{ReceiveRequest, ReceivedItem};
use crate::entities::{movement, order_item};
use crate::errors::ServiceError;

use super::orders::refresh_order_status;

/// Whether a receipt replaces or adds to the received quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveMode {
    /// The item has now been received in the given total quantity
    Full,
    /// The given quantity arrived on top of what was received before
    Partial,
}

impl ReceiveMode {
    fn received_after(self, previous: i32, quantity: i32) -> i32 {
        match self {
            ReceiveMode::Full => quantity,
            ReceiveMode::Partial => previous.saturating_add(quantity),
        }
    }
}

/// Service for receiving material against order items
#[derive(Clone)]
pub struct ReceivingService {
    db: Arc<DatabaseConnection>,
}

impl ReceivingService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Records a receipt, writes a `receive` movement and refreshes the order status.
    #[instrument(skip(self))]
    pub async fn receive(
        &self,
        request: ReceiveRequest,
        mode: ReceiveMode,
    ) -> Result<ReceivedItem, ServiceError> {
        let db = &*self.db;
        let txn = db.begin().await?;
        let barcode = request.barcode.trim().to_string();

        let item = order_item::Entity::find()
            .filter(order_item::Column::Barcode.eq(barcode.as_str()))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Item with barcode {} not found", barcode)))?;

        let now = Utc::now();
        let received = mode.received_after(item.qty_received, request.quantity_received);
        let status = ItemStatus::for_received(received, item.quantity);
        let order_id = item.order_id;
        let required = item.quantity;
        let item_name = item.item_name.clone();

        let mut active: order_item::ActiveModel = item.into();
        active.qty_received = Set(received);
        active.status = Set(status.to_string());
        active.date_received = Set(Some(now));
        active.update(&txn).await?;

        movement::ActiveModel {
            barcode: Set(barcode.clone()),
            movement_type: Set(MovementType::Receive.to_string()),
            from_warehouse: Set(None),
            from_position: Set(None),
            to_warehouse: Set(None),
            to_position: Set(None),
            quantity: Set(request.quantity_received),
            notes: Set(clean(request.notes)),
            date_created: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let order_status = refresh_order_status(&txn, order_id).await?;
        txn.commit().await?;

        info!(
            barcode = %barcode,
            order_id,
            qty_received = received,
            order_status = %order_status,
            "Item received"
        );

        Ok(ReceivedItem {
            barcode,
            item_name,
            qty_received: received,
            status: status.to_string(),
            qty_remaining: match mode {
                ReceiveMode::Partial => Some((required - received).max(0)),
                ReceiveMode::Full => None,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_receipt_replaces_quantity() {
        assert_eq!(ReceiveMode::Full.received_after(7, 3), 3);
    }

    #[test]
    fn partial_receipt_accumulates() {
        assert_eq!(ReceiveMode::Partial.received_after(7, 3), 10);
        assert_eq!(ReceiveMode::Partial.received_after(i32::MAX, 1), i32::MAX);
    }
}
