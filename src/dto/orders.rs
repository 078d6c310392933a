use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::entities::{order, order_item};

use super::not_blank;

/// SAP numbers are 1-10 ASCII digits.
pub(crate) fn validate_sap_number(value: &str) -> Result<(), ValidationError> {
    let ok = !value.is_empty() && value.len() <= 10 && value.bytes().all(|b| b.is_ascii_digit());
    if ok {
        Ok(())
    } else {
        let mut err = ValidationError::new("sap_number");
        err.message = Some("sapNumber must be 1-10 digits".into());
        Err(err)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "itemName": "Steel plate",
    "quantity": 4,
    "dimension": "1000x500x8",
    "material": "S235",
    "position": "A-01"
}))]
pub struct OrderItemInput {
    #[validate(length(min = 1, max = 255, message = "itemName is required (max 255 characters)"))]
    pub item_name: String,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
    #[validate(length(max = 255))]
    pub dimension: Option<String>,
    #[validate(length(max = 255))]
    pub material: Option<String>,
    #[validate(length(max = 50))]
    pub position: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// ERP order number, digits only
    #[validate(custom = "validate_sap_number")]
    #[schema(example = "4500012345")]
    pub sap_number: String,
    #[validate(length(min = 1, max = 255), custom = "not_blank")]
    #[schema(example = "Ferona a.s.")]
    pub supplier: String,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[validate]
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderListQuery {
    /// `pending`, `partial` or `complete`
    pub status: Option<String>,
    /// Substring match on the supplier name
    pub supplier: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedOrder {
    pub order_id: i32,
    #[serde(rename = "orderQR")]
    pub order_qr: String,
}

/// Row of the order list.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub order_id: i32,
    pub sap_number: String,
    #[serde(rename = "orderQR")]
    pub order_qr: String,
    pub supplier: String,
    pub date_created: DateTime<Utc>,
    pub status: String,
    pub items_count: u64,
    /// Items with any quantity received
    pub items_received: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: order::Model,
    pub items: Vec<order_item::Model>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBarcodesRequest {
    #[validate(range(min = 1, message = "orderId must be a positive integer"))]
    pub order_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BarcodeLabel {
    pub barcode: String,
    pub item_name: String,
    pub quantity: i32,
}

impl From<order_item::Model> for BarcodeLabel {
    fn from(item: order_item::Model) -> Self {
        Self {
            barcode: item.barcode,
            item_name: item.item_name,
            quantity: item.quantity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(sap: &str) -> CreateOrderRequest {
        CreateOrderRequest {
            sap_number: sap.into(),
            supplier: "Ferona".into(),
            notes: None,
            items: vec![OrderItemInput {
                item_name: "Plate".into(),
                quantity: 2,
                dimension: None,
                material: None,
                position: None,
            }],
        }
    }

    #[test]
    fn sap_number_must_be_digits() {
        assert!(request("4500012345").validate().is_ok());
        assert!(request("45A").validate().is_err());
        assert!(request("").validate().is_err());
        assert!(request("12345678901").validate().is_err());
    }

    #[test]
    fn item_quantity_is_checked() {
        let mut req = request("1");
        req.items[0].quantity = 0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn order_detail_flattens_the_order() {
        let detail = OrderDetail {
            order: order::Model {
                order_id: 3,
                sap_number: "77".into(),
                order_qr: "ORD-77-240101".into(),
                supplier: "S".into(),
                notes: None,
                status: "pending".into(),
                order_type: "zakazka".into(),
                assembly_status: "pending".into(),
                parent_order_id: None,
                operator: None,
                date_created: Utc::now(),
                date_started: None,
                date_completed: None,
            },
            items: vec![],
        };
        let json = serde_json::to_value(detail).unwrap();
        assert_eq!(json["orderId"], 3);
        assert_eq!(json["orderQR"], "ORD-77-240101");
        assert!(json["items"].as_array().unwrap().is_empty());
    }
}
