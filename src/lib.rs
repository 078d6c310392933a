//! Warehouse API
//!
//! Backend for a manufacturing warehouse: supplier orders and receiving,
//! inventory movements, production work orders with stages, sub-products,
//! quality checks and nested assembly orders.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod dto;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::{sync::Arc, time::Instant};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
};
use utoipa::ToSchema;

use crate::auth::roles::{ADMIN_ONLY, ANY_ROLE, OPERATORS, STOCK_WRITERS};
use crate::auth::{AuthConfig, AuthError, AuthRouterExt, AuthService};
use crate::domain::{Pagination, PaginationMeta};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
    pub auth: Arc<AuthService>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Result<Self, AuthError> {
        let auth_config = AuthConfig::from_app_config(&config)?;
        let auth = Arc::new(AuthService::new(auth_config, db.clone()));
        Ok(Self {
            services: handlers::AppServices::new(db.clone()),
            db,
            config,
            auth,
            started_at: Instant::now(),
        })
    }

    /// Page request from raw `page`/`limit` query values, bounded by the configured sizes.
    pub fn pagination(&self, page: Option<&str>, limit: Option<&str>) -> Pagination {
        Pagination::from_query(
            page,
            limit,
            self.config.api_default_page_size,
            self.config.api_max_page_size,
        )
    }
}

// Common response wrapper
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    /// Success without a payload.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            pagination: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn paginated(items: Vec<T>, pagination: PaginationMeta) -> Self {
        Self {
            pagination: Some(pagination),
            ..Self::success(items)
        }
    }
}


/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Every `/api` route with its role gate.
pub fn api_routes() -> Router<AppState> {
    use handlers::{
        assembly, dashboard, export, health, import, inventory, orders, production, quality,
        receiving, sub_products, warehouses,
    };

    let reads = Router::new()
        .route("/orders", get(orders::list_orders))
        .route("/orders/:orderId", get(orders::get_order))
        .route("/orders/qr/:orderQR", get(orders::get_order_by_qr))
        .route("/inventory", get(inventory::list_inventory))
        .route("/movements/:barcode", get(inventory::list_movements))
        .route("/warehouses", get(warehouses::list_warehouses))
        .route("/warehouses/:warehouseId", get(warehouses::get_warehouse))
        .route("/warehouse-positions", get(warehouses::list_positions))
        .route(
            "/warehouse-positions/vacant",
            get(warehouses::vacant_positions),
        )
        .route("/production", get(production::list_production))
        .route("/production/:workOrderId", get(production::get_production))
        .route(
            "/production/:workOrderId/subproducts",
            get(production::production_sub_products),
        )
        .route("/production/stage/:stageId", get(production::get_stage))
        .route("/production/stage/:stageId/logs", get(production::stage_logs))
        .route("/subproducts", get(sub_products::list_sub_products))
        .route(
            "/subproducts/:subProductId",
            get(sub_products::get_sub_product),
        )
        .route(
            "/subproducts/work-order/:workOrderId",
            get(sub_products::sub_products_by_work_order),
        )
        .route("/quality-checks", get(quality::list_checks))
        .route("/quality-checks/report", get(quality::quality_report))
        .route("/quality-checks/stage/:stageId", get(quality::checks_by_stage))
        .route("/quality/:orderId/history", get(quality::assembly_history))
        .route("/assembly/:orderId/tree", get(assembly::assembly_tree))
        .route("/assembly/:orderId/report", get(assembly::assembly_report))
        .route("/export/inventory", get(export::export_inventory))
        .route(
            "/export/production-report",
            get(export::export_production_report),
        )
        .route("/export/traceability", get(export::export_traceability))
        .with_roles(ANY_ROLE);

    let stock_writes = Router::new()
        .route("/orders/create", post(orders::create_order))
        .route("/orders/generate-barcodes", post(orders::generate_barcodes))
        .route("/generate/barcodes", post(orders::generate_barcodes))
        .route("/receive", post(receiving::receive_full))
        .route("/receive/partial", post(receiving::receive_partial))
        .route("/inventory/move", post(inventory::move_stock))
        .route("/consume", post(inventory::consume_stock))
        .route("/import/csv", post(import::import_csv))
        .route("/assembly", post(assembly::create_assembly))
        .route("/assembly/:orderId/components", post(assembly::add_component))
        .route(
            "/assembly/components/:componentId",
            delete(assembly::remove_component),
        )
        .route("/assembly/:orderId/start", post(assembly::start_assembly))
        .route("/assembly/:orderId/complete", post(assembly::complete_assembly))
        .with_roles(STOCK_WRITERS);

    let operator_writes = Router::new()
        .route("/production/start", post(production::start_production))
        .route("/production/:workOrderId", put(production::update_production))
        .route("/production/stage/:stageId/start", post(production::start_stage))
        .route("/production/stage/:stageId/pause", post(production::pause_stage))
        .route("/production/stage/:stageId/resume", post(production::resume_stage))
        .route(
            "/production/stage/:stageId/complete",
            post(production::complete_stage),
        )
        .route("/subproducts", post(sub_products::create_sub_product))
        .route(
            "/subproducts/:subProductId/move",
            post(sub_products::move_sub_product),
        )
        .route("/quality-checks", post(quality::create_check))
        .route("/quality-checks/:checkId", put(quality::update_check))
        .route("/quality/:orderId", post(quality::inspect_assembly))
        .route("/warehouse-positions", post(warehouses::create_position))
        .route("/export/custom", post(export::export_custom))
        .with_roles(OPERATORS);

    let admin_writes = Router::new()
        .route("/warehouses", post(warehouses::create_warehouse))
        .route(
            "/warehouses/:warehouseId",
            put(warehouses::update_warehouse).delete(warehouses::deactivate_warehouse),
        )
        .with_roles(ADMIN_ONLY);

    let public = Router::new()
        .route("/home", get(dashboard::dashboard))
        .route("/health", get(health::health_check));

    Router::new()
        .merge(public)
        .merge(reads)
        .merge(stock_writes)
        .merge(operator_writes)
        .merge(admin_writes)
        .nest("/auth", auth::auth_routes())
}

async fn endpoint_not_found() -> errors::ServiceError {
    errors::ServiceError::NotFound("Endpoint not found".to_string())
}

/// CORS from explicit origins, falling back to permissive where the configuration allows it.
pub fn cors_layer(cfg: &config::AppConfig) -> Result<CorsLayer, config::AppConfigError> {
    let configured_origins: Option<Vec<HeaderValue>> = cfg
        .cors_allowed_origins
        .as_ref()
        .map(|raw| {
            raw.split(',')
                .filter_map(|origin| {
                    let trimmed = origin.trim();
                    if trimmed.is_empty() {
                        None
                    } else {
                        HeaderValue::from_str(trimmed).ok()
                    }
                })
                .collect::<Vec<_>>()
        })
        .filter(|origins| !origins.is_empty());

    if let Some(origins) = configured_origins {
        Ok(CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
            .allow_credentials(cfg.cors_allow_credentials))
    } else if cfg.should_allow_permissive_cors() {
        ::tracing::info!(
            "Using permissive CORS because explicit origins were not configured ({})",
            if cfg.is_development() {
                "development environment"
            } else {
                "explicit override enabled"
            }
        );
        Ok(CorsLayer::permissive())
    } else {
        Err(config::AppConfigError::MissingCors)
    }
}

/// Full application: `/api` routes, Swagger UI and the shared middleware stack.
pub fn build_router(state: AppState) -> Result<Router, config::AppConfigError> {
    let cors = cors_layer(&state.config)?;
    let auth_service = state.auth.clone();
    let body_limit = state.config.max_body_size;

    let router = Router::<AppState>::new()
        .nest("/api", api_routes())
        .merge(openapi::swagger_ui())
        .fallback(endpoint_not_found)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(tracing::configure_http_tracing())
        .layer(CompressionLayer::new())
        .layer(cors)
        // Inject AuthService into request extensions for auth middleware
        .layer(axum::middleware::from_fn_with_state(
            auth_service,
            |axum::extract::State(auth): axum::extract::State<Arc<AuthService>>,
             mut req: axum::http::Request<axum::body::Body>,
             next: axum::middleware::Next| async move {
                req.extensions_mut().insert(auth);
                next.run(req).await
            },
        ))
        // Every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state);

    Ok(router)
}
