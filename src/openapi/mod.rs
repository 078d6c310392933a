use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Warehouse API",
        version = "1.0.0",
        description = r#"
# Warehouse & Production API

Supplier orders and receiving, warehouse inventory, production work orders
with stages, sub-products, quality checks and nested assembly orders.

## Authentication

Everything except `/api/auth/login`, `/api/auth/refresh`, `/api/home` and
`/api/health` needs an access token from `/api/auth/login`:

```
Authorization: Bearer <access-token>
```

Roles: `viewer` reads, `operator_limited` handles stock, `operator` runs
production and quality, `admin` manages warehouses and users.

## Responses

Success bodies are `{"success": true, "data": ..., "message"?, "pagination"?}`.
Errors are `{"success": false, "error", "message", "errors"?, "requestId", "timestamp"}`.

## Pagination

List endpoints accept `page` (default 1) and `limit` (default 20, max 100).
        "#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Orders", description = "Supplier orders and barcodes"),
        (name = "Receiving", description = "Goods receipt against order items"),
        (name = "Inventory", description = "Stock levels, moves and consumption"),
        (name = "Warehouses", description = "Warehouses and storage positions"),
        (name = "Production", description = "Work orders and production stages"),
        (name = "Sub-products", description = "Intermediate components of a work order"),
        (name = "Quality", description = "Stage and assembly quality checks"),
        (name = "Assembly", description = "Nested assembly orders"),
        (name = "Import & Export", description = "CSV import and exports"),
        (name = "Auth", description = "Accounts and tokens"),
        (name = "Dashboard", description = "Home screen aggregates"),
        (name = "Health", description = "Health check endpoints")
    ),
    paths(
        // Orders & receiving
        crate::handlers::orders::create_order,
        crate::handlers::orders::list_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::get_order_by_qr,
        crate::handlers::orders::generate_barcodes,
        crate::handlers::receiving::receive_full,
        crate::handlers::receiving::receive_partial,

        // Inventory
        crate::handlers::inventory::move_stock,
        crate::handlers::inventory::consume_stock,
        crate::handlers::inventory::list_movements,
        crate::handlers::inventory::list_inventory,

        // Warehouses
        crate::handlers::warehouses::create_warehouse,
        crate::handlers::warehouses::list_warehouses,
        crate::handlers::warehouses::get_warehouse,
        crate::handlers::warehouses::update_warehouse,
        crate::handlers::warehouses::deactivate_warehouse,
        crate::handlers::warehouses::list_positions,
        crate::handlers::warehouses::create_position,
        crate::handlers::warehouses::vacant_positions,

        // Production
        crate::handlers::production::start_production,
        crate::handlers::production::list_production,
        crate::handlers::production::get_production,
        crate::handlers::production::update_production,
        crate::handlers::production::production_sub_products,
        crate::handlers::production::start_stage,
        crate::handlers::production::pause_stage,
        crate::handlers::production::resume_stage,
        crate::handlers::production::complete_stage,
        crate::handlers::production::get_stage,
        crate::handlers::production::stage_logs,

        // Sub-products
        crate::handlers::sub_products::list_sub_products,
        crate::handlers::sub_products::create_sub_product,
        crate::handlers::sub_products::get_sub_product,
        crate::handlers::sub_products::move_sub_product,
        crate::handlers::sub_products::sub_products_by_work_order,

        // Quality
        crate::handlers::quality::create_check,
        crate::handlers::quality::list_checks,
        crate::handlers::quality::checks_by_stage,
        crate::handlers::quality::update_check,
        crate::handlers::quality::quality_report,
        crate::handlers::quality::inspect_assembly,
        crate::handlers::quality::assembly_history,

        // Assembly
        crate::handlers::assembly::create_assembly,
        crate::handlers::assembly::add_component,
        crate::handlers::assembly::remove_component,
        crate::handlers::assembly::assembly_tree,
        crate::handlers::assembly::start_assembly,
        crate::handlers::assembly::complete_assembly,
        crate::handlers::assembly::assembly_report,

        // Import & export
        crate::handlers::import::import_csv,
        crate::handlers::export::export_inventory,
        crate::handlers::export::export_production_report,
        crate::handlers::export::export_traceability,
        crate::handlers::export::export_custom,

        // Auth
        crate::auth::handlers::register,
        crate::auth::handlers::login,
        crate::auth::handlers::refresh,
        crate::auth::handlers::logout,
        crate::auth::handlers::me,
        crate::auth::handlers::change_password,

        crate::handlers::dashboard::dashboard,
        crate::handlers::health::health_check,
    ),
    components(
        schemas(
            crate::domain::PaginationMeta,
            crate::domain::OrderStatus,
            crate::domain::ItemStatus,
            crate::domain::OrderType,
            crate::domain::AssemblyStatus,
            crate::domain::ProductionStatus,
            crate::domain::SubProductStatus,
            crate::domain::QualityResult,
            crate::domain::StageStatus,
            crate::auth::Role,
            crate::errors::FieldError,
            crate::errors::ErrorResponse
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Registers the `Bearer` JWT scheme referenced by protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "Bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
