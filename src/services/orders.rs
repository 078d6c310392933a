use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use tracing::{info, instrument, warn};

use crate::domain::{barcode, AssemblyStatus, ItemStatus, OrderStatus, OrderType, Pagination};
use crate::dto::orders::{
    BarcodeLabel, CreateOrderRequest, CreatedOrder, OrderDetail, OrderItemInput, OrderListQuery,
    OrderSummary,
};
use crate::dto::clean;
use crate::entities::{order, order_item};
use crate::errors::ServiceError;

use super::map_unique_violation;

/// Random barcode attempts per item once the sequential code is taken.
const BARCODE_RETRIES: usize = 5;

/// Header fields shared by purchase orders and assembly orders.
#[derive(Debug, Clone)]
pub(crate) struct OrderHeader {
    pub sap_number: String,
    pub supplier: String,
    pub notes: Option<String>,
    pub order_type: OrderType,
    pub parent_order_id: Option<i32>,
    pub operator: Option<String>,
}

/// Fails with 409 when the SAP number is already taken.
pub(crate) async fn ensure_sap_number_free<C: ConnectionTrait>(
    conn: &C,
    sap_number: &str,
) -> Result<(), ServiceError> {
    let existing = order::Entity::find()
        .filter(order::Column::SapNumber.eq(sap_number))
        .one(conn)
        .await?;
    match existing {
        Some(found) => Err(ServiceError::DuplicateOrder {
            sap_number: sap_number.to_string(),
            existing_order_id: found.order_id,
        }),
        None => Ok(()),
    }
}

pub(crate) async fn insert_order<C: ConnectionTrait>(
    conn: &C,
    header: OrderHeader,
    now: DateTime<Utc>,
) -> Result<order::Model, ServiceError> {
    let sap_number = header.sap_number.clone();
    let model = order::ActiveModel {
        order_qr: Set(barcode::order_qr(&header.sap_number, now.date_naive())),
        sap_number: Set(header.sap_number),
        supplier: Set(header.supplier.trim().to_string()),
        notes: Set(clean(header.notes)),
        status: Set(OrderStatus::Pending.to_string()),
        order_type: Set(header.order_type.to_string()),
        assembly_status: Set(AssemblyStatus::Pending.to_string()),
        parent_order_id: Set(header.parent_order_id),
        operator: Set(clean(header.operator)),
        date_created: Set(now),
        date_started: Set(None),
        date_completed: Set(None),
        ..Default::default()
    };
    model.insert(conn).await.map_err(|e| {
        map_unique_violation(e, || format!("Order with SAP number {} already exists", sap_number))
    })
}

/// Sequential barcodes for the day, replacing taken ones with random codes.
async fn allocate_barcodes<C: ConnectionTrait>(
    conn: &C,
    date: NaiveDate,
    count: usize,
) -> Result<Vec<String>, ServiceError> {
    let candidates: Vec<String> = (0..count).map(|i| barcode::item_barcode(date, i)).collect();
    let mut taken: HashSet<String> = order_item::Entity::find()
        .select_only()
        .column(order_item::Column::Barcode)
        .filter(order_item::Column::Barcode.is_in(candidates.clone()))
        .into_tuple::<String>()
        .all(conn)
        .await?
        .into_iter()
        .collect();

    let mut allocated = Vec::with_capacity(count);
    for candidate in candidates {
        if !taken.contains(&candidate) {
            taken.insert(candidate.clone());
            allocated.push(candidate);
            continue;
        }

        let mut chosen = None;
        for _ in 0..BARCODE_RETRIES {
            let code = barcode::random_barcode(date);
            if taken.contains(&code) {
                continue;
            }
            let exists = order_item::Entity::find()
                .filter(order_item::Column::Barcode.eq(code.as_str()))
                .count(conn)
                .await?
                > 0;
            if !exists {
                chosen = Some(code);
                break;
            }
        }
        let code = chosen.ok_or_else(|| {
            ServiceError::InternalError(format!("Could not allocate a free barcode for {}", date))
        })?;
        warn!(sequential = %candidate, barcode = %code, "Sequential barcode taken, using random code");
        taken.insert(code.clone());
        allocated.push(code);
    }
    Ok(allocated)
}

/// Recomputes and stores the receipt status of an order from its items.
pub(crate) async fn refresh_order_status<C: ConnectionTrait>(
    conn: &C,
    order_id: i32,
) -> Result<OrderStatus, ServiceError> {
    let items = order_item::Entity::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .all(conn)
        .await?;
    let status = OrderStatus::derive(items.iter().map(|i| (i.qty_received, i.quantity)));

    order::Entity::update_many()
        .col_expr(order::Column::Status, Expr::value(status.to_string()))
        .filter(order::Column::OrderId.eq(order_id))
        .exec(conn)
        .await?;
    Ok(status)
}

/// Service for purchase orders and their items
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Creates an order and its items in one transaction.
    #[instrument(skip(self, request), fields(sap_number = %request.sap_number))]
    pub async fn create_order(&self, request: CreateOrderRequest) -> Result<CreatedOrder, ServiceError> {
        if request.items.is_empty() {
            return Err(ServiceError::field("items", "At least one item is required"));
        }

        let db = &*self.db;
        let txn = db.begin().await?;
        let now = Utc::now();

        ensure_sap_number_free(&txn, &request.sap_number).await?;
        let created = insert_order(
            &txn,
            OrderHeader {
                sap_number: request.sap_number.trim().to_string(),
                supplier: request.supplier,
                notes: request.notes,
                order_type: OrderType::default(),
                parent_order_id: None,
                operator: None,
            },
            now,
        )
        .await?;

        let barcodes = allocate_barcodes(&txn, now.date_naive(), request.items.len()).await?;
        let rows = request
            .items
            .into_iter()
            .zip(barcodes)
            .map(|(item, code)| item_active_model(created.order_id, item, code));
        order_item::Entity::insert_many(rows)
            .exec(&txn)
            .await
            .map_err(|e| map_unique_violation(e, || "Item barcode already exists".to_string()))?;

        txn.commit().await?;

        info!(order_id = created.order_id, order_qr = %created.order_qr, "Order created");
        Ok(CreatedOrder {
            order_id: created.order_id,
            order_qr: created.order_qr,
        })
    }

    /// Lists orders newest first with per-order item counters.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        query: &OrderListQuery,
        page: Pagination,
    ) -> Result<(Vec<OrderSummary>, u64), ServiceError> {
        let db = &*self.db;
        let mut select = order::Entity::find();
        if let Some(status) = clean(query.status.clone()) {
            select = select.filter(order::Column::Status.eq(status));
        }
        if let Some(supplier) = clean(query.supplier.clone()) {
            select = select.filter(order::Column::Supplier.eq(supplier));
        }

        let total = select.clone().count(db).await?;
        let orders = select
            .order_by_desc(order::Column::DateCreated)
            .order_by_desc(order::Column::OrderId)
            .offset(page.offset())
            .limit(page.limit)
            .all(db)
            .await?;

        let ids: Vec<i32> = orders.iter().map(|o| o.order_id).collect();
        let mut counters: HashMap<i32, (u64, u64)> = HashMap::new();
        if !ids.is_empty() {
            let items = order_item::Entity::find()
                .filter(order_item::Column::OrderId.is_in(ids))
                .all(db)
                .await?;
            for item in items {
                let entry = counters.entry(item.order_id).or_default();
                entry.0 += 1;
                if item.qty_received > 0 {
                    entry.1 += 1;
                }
            }
        }

        let rows = orders
            .into_iter()
            .map(|o| {
                let (items_count, items_received) =
                    counters.get(&o.order_id).copied().unwrap_or_default();
                OrderSummary {
                    order_id: o.order_id,
                    sap_number: o.sap_number,
                    order_qr: o.order_qr,
                    supplier: o.supplier,
                    date_created: o.date_created,
                    status: o.status,
                    items_count,
                    items_received,
                }
            })
            .collect();
        Ok((rows, total))
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: i32) -> Result<OrderDetail, ServiceError> {
        let db = &*self.db;
        let found = order::Entity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;
        self.with_items(found).await
    }

    #[instrument(skip(self))]
    pub async fn get_order_by_qr(&self, order_qr: &str) -> Result<OrderDetail, ServiceError> {
        let db = &*self.db;
        let found = order::Entity::find()
            .filter(order::Column::OrderQr.eq(order_qr))
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_qr)))?;
        self.with_items(found).await
    }

    async fn with_items(&self, found: order::Model) -> Result<OrderDetail, ServiceError> {
        let items = found
            .find_related(order_item::Entity)
            .order_by_asc(order_item::Column::ItemId)
            .all(&*self.db)
            .await?;
        Ok(OrderDetail { order: found, items })
    }

    /// Barcode labels for every item of an order.
    #[instrument(skip(self))]
    pub async fn generate_barcodes(&self, order_id: i32) -> Result<Vec<BarcodeLabel>, ServiceError> {
        let items = order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .order_by_asc(order_item::Column::ItemId)
            .all(&*self.db)
            .await?;
        if items.is_empty() {
            return Err(ServiceError::NotFound(format!(
                "No items found for order {}",
                order_id
            )));
        }
        Ok(items.into_iter().map(BarcodeLabel::from).collect())
    }
}

fn item_active_model(order_id: i32, item: OrderItemInput, code: String) -> order_item::ActiveModel {
    order_item::ActiveModel {
        order_id: Set(order_id),
        barcode: Set(code),
        item_name: Set(item.item_name.trim().to_string()),
        quantity: Set(item.quantity),
        dimension: Set(clean(item.dimension)),
        material: Set(clean(item.material)),
        position: Set(clean(item.position)),
        qty_received: Set(0),
        status: Set(ItemStatus::Pending.to_string()),
        date_received: Set(None),
        ..Default::default()
    }
}
