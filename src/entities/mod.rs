//! Database entities, one module per table.

pub mod assembly_quality_check;
pub mod assembly_report;
pub mod audit_log;
pub mod inventory;
pub mod movement;
pub mod order;
pub mod order_component;
pub mod order_item;
pub mod production;
pub mod production_stage;
pub mod production_stage_log;
pub mod quality_check;
pub mod sub_product;
pub mod warehouse;
pub mod warehouse_position;
