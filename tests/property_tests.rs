//! Property-based tests for the warehouse domain rules.
//!
//! These use proptest to check invariants over generated inputs that the
//! example-based unit tests only sample.

use chrono::NaiveDate;
use proptest::prelude::*;
use warehouse_api::domain::barcode::{item_barcode, order_qr, random_barcode};
use warehouse_api::domain::csv::parse_order_items;
use warehouse_api::domain::quality::QualityCounters;
use warehouse_api::domain::stage::production_status_after;
use warehouse_api::domain::{
    ItemStatus, OrderStatus, Pagination, PaginationMeta, ProductionStatus, QualityResult,
    StageAction, StageStatus,
};

fn item_strategy() -> impl Strategy<Value = (i32, i32)> {
    (1i32..1_000).prop_flat_map(|required| (0i32..=required * 2, Just(required)))
}

fn stage_status_strategy() -> impl Strategy<Value = StageStatus> {
    prop_oneof![
        Just(StageStatus::Pending),
        Just(StageStatus::Started),
        Just(StageStatus::InProgress),
        Just(StageStatus::Paused),
        Just(StageStatus::Completed),
        Just(StageStatus::Cancelled),
    ]
}

fn stage_action_strategy() -> impl Strategy<Value = StageAction> {
    prop_oneof![
        Just(StageAction::Start),
        Just(StageAction::Pause),
        Just(StageAction::Resume),
        Just(StageAction::Complete),
    ]
}

fn quality_result_strategy() -> impl Strategy<Value = QualityResult> {
    prop_oneof![
        Just(QualityResult::Ok),
        Just(QualityResult::Nok),
        Just(QualityResult::Rework),
    ]
}

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2099, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

// Order status follows its items
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn order_status_matches_item_receipts(items in prop::collection::vec(item_strategy(), 0..20)) {
        let status = OrderStatus::derive(items.iter().copied());

        let nothing_received = items.iter().all(|(received, _)| *received == 0);
        let everything_received = items.iter().all(|(received, required)| received >= required);

        if items.is_empty() || nothing_received {
            prop_assert_eq!(status, OrderStatus::Pending);
        } else if everything_received {
            prop_assert_eq!(status, OrderStatus::Complete);
        } else {
            prop_assert_eq!(status, OrderStatus::Partial);
        }
    }

    #[test]
    fn complete_items_make_a_complete_order((received, required) in item_strategy()) {
        let item = ItemStatus::for_received(received, required);
        let order = OrderStatus::derive([(received, required)]);
        match item {
            ItemStatus::Complete => prop_assert_eq!(order, OrderStatus::Complete),
            ItemStatus::Partial => prop_assert_eq!(order, OrderStatus::Partial),
            ItemStatus::Pending => prop_assert_eq!(order, OrderStatus::Pending),
        }
    }
}

// Pagination is always usable
proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn pagination_is_clamped(page in any::<Option<i64>>(), limit in any::<Option<i64>>(), max in 1u64..500) {
        let p = Pagination::with_bounds(page, limit, 20, max);
        prop_assert!(p.page >= 1);
        prop_assert!(p.limit >= 1 && p.limit <= max);
        prop_assert!(p.offset() <= i64::MAX as u64);
    }

    #[test]
    fn meta_pages_cover_the_total(page in 1u64..1_000, limit in 1u64..200, total in 0u64..100_000) {
        let meta = PaginationMeta::new(page, limit, total);
        prop_assert!(meta.total_pages >= 1);
        prop_assert!(meta.total_pages * meta.limit >= meta.total);
        prop_assert!((meta.total_pages - 1) * meta.limit < meta.total.max(1));
        prop_assert_eq!(meta.has_next_page, page < meta.total_pages);
        prop_assert_eq!(meta.has_prev_page, page > 1);
    }

    #[test]
    fn garbage_query_strings_fall_back(page in "[^0-9]*", limit in "[^0-9]*") {
        let p = Pagination::from_query(Some(&page), Some(&limit), 20, 100);
        prop_assert_eq!((p.page, p.limit), (1, 20));
    }
}

// Stage state machine
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn accepted_actions_land_on_their_target(status in stage_status_strategy(), action in stage_action_strategy()) {
        match status.apply(action) {
            Ok(next) => {
                prop_assert!(status.allowed_actions().contains(&action));
                prop_assert_eq!(next, action.target());
            }
            Err(_) => prop_assert!(!status.allowed_actions().contains(&action)),
        }
    }

    #[test]
    fn terminal_stages_reject_everything(action in stage_action_strategy()) {
        prop_assert!(StageStatus::Completed.apply(action).is_err());
        prop_assert!(StageStatus::Cancelled.apply(action).is_err());
    }

    #[test]
    fn action_sequences_never_leave_completed(actions in prop::collection::vec(stage_action_strategy(), 0..30)) {
        let mut status = StageStatus::Pending;
        let mut completed = false;
        for action in actions {
            if let Ok(next) = status.apply(action) {
                prop_assert!(!completed, "moved out of completed");
                status = next;
                completed = status == StageStatus::Completed;
            }
        }
    }

    #[test]
    fn work_order_completes_only_with_every_stage(total in 0usize..20, done in 0usize..20) {
        let done = done.min(total);
        let next = production_status_after(ProductionStatus::InProgress, total, done);
        if total > 0 && done == total {
            prop_assert_eq!(next, Some(ProductionStatus::Completed));
        } else {
            prop_assert_eq!(next, None);
        }
    }
}

// Quality counters and codes
proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn counters_track_ok_and_nok(results in prop::collection::vec(quality_result_strategy(), 0..50)) {
        let counters = results
            .iter()
            .fold(QualityCounters::default(), |acc, r| acc.apply(*r));
        let ok = results.iter().filter(|r| **r == QualityResult::Ok).count() as i32;
        let nok = results.iter().filter(|r| **r == QualityResult::Nok).count() as i32;
        prop_assert_eq!(counters, QualityCounters::new(ok, nok));
    }

    #[test]
    fn generated_codes_embed_the_date(date in date_strategy(), sap in "[0-9]{1,10}", index in 0usize..999) {
        let stamp = date.format("%y%m%d").to_string();
        prop_assert_eq!(order_qr(&sap, date), format!("ORD-{}-{}", sap, stamp));

        let sequential = item_barcode(date, index);
        prop_assert_eq!(sequential, format!("MAT-{}-{:03}", stamp, index + 1));

        let random = random_barcode(date);
        let prefix = format!("MAT-{}-", stamp);
        prop_assert!(random.starts_with(&prefix));
        prop_assert_eq!(random.len(), prefix.len() + 4);
    }

    #[test]
    fn csv_rows_keep_names_and_quantities(
        rows in prop::collection::vec(("[A-Za-z][A-Za-z ]{0,15}[A-Za-z]", 1i32..10_000), 1..10),
        delimiter in prop_oneof![Just(';'), Just(',')],
    ) {
        let d = delimiter.to_string();
        let mut text = ["itemName", "quantity", "dimension", "material", "position"].join(&d);
        for (name, qty) in &rows {
            text.push('\n');
            text.push_str(&[name.as_str(), &qty.to_string(), "", "", ""].join(&d));
        }

        let items = parse_order_items(&text).unwrap();
        prop_assert_eq!(items.len(), rows.len());
        for (item, (name, qty)) in items.iter().zip(&rows) {
            prop_assert_eq!(&item.item_name, name);
            prop_assert_eq!(item.quantity, *qty);
            prop_assert!(item.dimension.is_none());
        }
    }
}
