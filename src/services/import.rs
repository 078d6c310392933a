use tracing::{info, instrument};

use crate::domain::csv::parse_order_items;
use crate::dto::orders::{CreateOrderRequest, CreatedOrder};
use crate::dto::transfer::ImportCsvRequest;
use crate::errors::ServiceError;

use super::orders::OrderService;

/// Creates orders from pasted CSV item lists
#[derive(Clone)]
pub struct ImportService {
    orders: OrderService,
}

impl ImportService {
    pub fn new(orders: OrderService) -> Self {
        Self { orders }
    }

    #[instrument(skip(self, request), fields(sap_number = %request.sap_number))]
    pub async fn import_csv(&self, request: ImportCsvRequest) -> Result<CreatedOrder, ServiceError> {
        let items = parse_order_items(&request.csv_data)?;
        let count = items.len();
        let created = self
            .orders
            .create_order(CreateOrderRequest {
                sap_number: request.sap_number,
                supplier: request.supplier,
                notes: request.notes,
                items,
            })
            .await?;
        info!(order_id = created.order_id, items = count, "CSV imported");
        Ok(created)
    }
}
