use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Receipt status of an order, derived from its items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Partial,
    Complete,
}

impl OrderStatus {
    /// Derives the order status from `(qty_received, quantity)` pairs.
    ///
    /// An order with no items, or where nothing was received yet, is pending.
    /// It is complete once every item received at least its quantity.
    pub fn derive<I>(items: I) -> Self
    where
        I: IntoIterator<Item = (i32, i32)>,
    {
        let mut any = false;
        let mut all_zero = true;
        let mut all_complete = true;

        for (received, required) in items {
            any = true;
            if received > 0 {
                all_zero = false;
            }
            if received < required {
                all_complete = false;
            }
        }

        if !any || all_zero {
            OrderStatus::Pending
        } else if all_complete {
            OrderStatus::Complete
        } else {
            OrderStatus::Partial
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ItemStatus {
    Pending,
    Partial,
    Complete,
}

impl ItemStatus {
    pub fn for_received(received: i32, required: i32) -> Self {
        if received >= required {
            ItemStatus::Complete
        } else if received > 0 {
            ItemStatus::Partial
        } else {
            ItemStatus::Pending
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MovementType {
    Receive,
    Move,
    Consume,
}

/// Top-level order (zakázka) or nested sub-assembly (podmontáž).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderType {
    #[default]
    Zakazka,
    Podmontaz,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AssemblyStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProductionStatus {
    Pending,
    Started,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SubProductStatus {
    #[default]
    Created,
    InStock,
    InProgress,
    Consumed,
}

/// Outcome of a quality check. `OK`/`NOK` keep their legacy upper-case spelling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString, ToSchema)]
pub enum QualityResult {
    #[default]
    #[serde(rename = "OK")]
    #[strum(serialize = "OK")]
    Ok,
    #[serde(rename = "NOK")]
    #[strum(serialize = "NOK")]
    Nok,
    #[serde(rename = "rework")]
    #[strum(serialize = "rework")]
    Rework,
}

/// What an assembly component points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ComponentType {
    Order,
    Item,
}

/// Warehouse categories accepted on create/update.
pub const WAREHOUSE_TYPES: &[&str] = &["Main", "Buffer", "WIP", "Finished"];

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[rstest]
    #[case(vec![], OrderStatus::Pending)]
    #[case(vec![(0, 5), (0, 1)], OrderStatus::Pending)]
    #[case(vec![(5, 5), (1, 1)], OrderStatus::Complete)]
    #[case(vec![(7, 5)], OrderStatus::Complete)]
    #[case(vec![(5, 5), (0, 3)], OrderStatus::Partial)]
    #[case(vec![(2, 5)], OrderStatus::Partial)]
    fn order_status_derivation(#[case] items: Vec<(i32, i32)>, #[case] expected: OrderStatus) {
        assert_eq!(OrderStatus::derive(items), expected);
    }

    #[rstest]
    #[case(0, 10, ItemStatus::Pending)]
    #[case(3, 10, ItemStatus::Partial)]
    #[case(10, 10, ItemStatus::Complete)]
    #[case(12, 10, ItemStatus::Complete)]
    fn item_status_for_received(#[case] received: i32, #[case] required: i32, #[case] expected: ItemStatus) {
        assert_eq!(ItemStatus::for_received(received, required), expected);
    }

    #[test]
    fn statuses_use_snake_case_strings() {
        assert_eq!(AssemblyStatus::InProgress.to_string(), "in_progress");
        assert_eq!(SubProductStatus::InStock.as_ref(), "in_stock");
        assert_eq!(OrderType::default().to_string(), "zakazka");
    }

    #[test]
    fn quality_results_keep_legacy_spelling() {
        assert_eq!(QualityResult::Ok.to_string(), "OK");
        assert_eq!(QualityResult::from_str("NOK").unwrap(), QualityResult::Nok);
        assert_eq!(QualityResult::from_str("rework").unwrap(), QualityResult::Rework);
        assert!(QualityResult::from_str("ok").is_err());
        assert_eq!(ComponentType::from_str("item").unwrap(), ComponentType::Item);
        assert!(ComponentType::from_str("bolt").is_err());
        assert_eq!(serde_json::to_string(&QualityResult::Nok).unwrap(), "\"NOK\"");
    }
}
