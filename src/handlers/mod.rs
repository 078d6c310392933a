pub mod assembly;
pub mod common;
pub mod dashboard;
pub mod export;
pub mod health;
pub mod import;
pub mod inventory;
pub mod orders;
pub mod production;
pub mod quality;
pub mod receiving;
pub mod sub_products;
pub mod warehouses;

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::services::{
    assembly::AssemblyService, dashboard::DashboardService, export::ExportService,
    import::ImportService, inventory::InventoryService, orders::OrderService,
    production::ProductionService, production_stages::StageService,
    quality_checks::QualityCheckService, receiving::ReceivingService,
    sub_products::SubProductService, warehouses::WarehouseService,
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub orders: Arc<OrderService>,
    pub receiving: Arc<ReceivingService>,
    pub inventory: Arc<InventoryService>,
    pub warehouses: Arc<WarehouseService>,
    pub production: Arc<ProductionService>,
    pub stages: Arc<StageService>,
    pub sub_products: Arc<SubProductService>,
    pub quality: Arc<QualityCheckService>,
    pub assembly: Arc<AssemblyService>,
    pub dashboard: Arc<DashboardService>,
    pub export: Arc<ExportService>,
    pub import: Arc<ImportService>,
}

impl AppServices {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        let orders = OrderService::new(db.clone());
        Self {
            import: Arc::new(ImportService::new(orders.clone())),
            orders: Arc::new(orders),
            receiving: Arc::new(ReceivingService::new(db.clone())),
            inventory: Arc::new(InventoryService::new(db.clone())),
            warehouses: Arc::new(WarehouseService::new(db.clone())),
            production: Arc::new(ProductionService::new(db.clone())),
            stages: Arc::new(StageService::new(db.clone())),
            sub_products: Arc::new(SubProductService::new(db.clone())),
            quality: Arc::new(QualityCheckService::new(db.clone())),
            assembly: Arc::new(AssemblyService::new(db.clone())),
            dashboard: Arc::new(DashboardService::new(db.clone())),
            export: Arc::new(ExportService::new(db)),
        }
    }
}
