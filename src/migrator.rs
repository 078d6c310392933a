use anyhow::Result;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::prelude::*;
use std::time::Duration;
use tracing::{error, info};

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_order_tables::Migration),
            Box::new(m20240301_000002_create_warehouse_tables::Migration),
            Box::new(m20240301_000003_create_production_tables::Migration),
            Box::new(m20240301_000004_create_assembly_tables::Migration),
            Box::new(m20240301_000005_create_auth_tables::Migration),
        ]
    }
}

mod m20240301_000001_create_order_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_order_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Orders::OrderId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Orders::SapNumber)
                                .string_len(10)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Orders::OrderQr).string_len(50).not_null())
                        .col(ColumnDef::new(Orders::Supplier).string_len(255).not_null())
                        .col(ColumnDef::new(Orders::Notes).text().null())
                        .col(
                            ColumnDef::new(Orders::Status)
                                .string_len(20)
                                .not_null()
                                .default("pending"),
                        )
                        .col(
                            ColumnDef::new(Orders::OrderType)
                                .string_len(20)
                                .not_null()
                                .default("zakazka"),
                        )
                        .col(
                            ColumnDef::new(Orders::AssemblyStatus)
                                .string_len(20)
                                .not_null()
                                .default("pending"),
                        )
                        .col(ColumnDef::new(Orders::ParentOrderId).integer().null())
                        .col(ColumnDef::new(Orders::Operator).string_len(100).null())
                        .col(
                            ColumnDef::new(Orders::DateCreated)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::DateStarted)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Orders::DateCompleted)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_order_qr")
                        .table(Orders::Table)
                        .col(Orders::OrderQr)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderItems::ItemId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(OrderItems::OrderId).integer().not_null())
                        .col(
                            ColumnDef::new(OrderItems::Barcode)
                                .string_len(50)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(OrderItems::ItemName).string_len(255).not_null())
                        .col(ColumnDef::new(OrderItems::Quantity).integer().not_null())
                        .col(ColumnDef::new(OrderItems::Dimension).string_len(255).null())
                        .col(ColumnDef::new(OrderItems::Material).string_len(255).null())
                        .col(ColumnDef::new(OrderItems::Position).string_len(50).null())
                        .col(
                            ColumnDef::new(OrderItems::QtyReceived)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(OrderItems::Status)
                                .string_len(20)
                                .not_null()
                                .default("pending"),
                        )
                        .col(
                            ColumnDef::new(OrderItems::DateReceived)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_order_id")
                                .from(OrderItems::Table, OrderItems::OrderId)
                                .to(Orders::Table, Orders::OrderId)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_items_order_id")
                        .table(OrderItems::Table)
                        .col(OrderItems::OrderId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderComponents::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderComponents::ComponentId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(OrderComponents::OrderId).integer().not_null())
                        .col(
                            ColumnDef::new(OrderComponents::ComponentType)
                                .string_len(10)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderComponents::ComponentOrderId)
                                .integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(OrderComponents::ComponentItemId)
                                .integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(OrderComponents::QuantityRequired)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(OrderComponents::QuantityUsed)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(OrderComponents::SortOrder)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_components_order_id")
                                .from(OrderComponents::Table, OrderComponents::OrderId)
                                .to(Orders::Table, Orders::OrderId)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_components_order_id")
                        .table(OrderComponents::Table)
                        .col(OrderComponents::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderComponents::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        OrderId,
        SapNumber,
        OrderQr,
        Supplier,
        Notes,
        Status,
        OrderType,
        AssemblyStatus,
        ParentOrderId,
        Operator,
        DateCreated,
        DateStarted,
        DateCompleted,
    }

    #[derive(DeriveIden)]
    enum OrderItems {
        Table,
        ItemId,
        OrderId,
        Barcode,
        ItemName,
        Quantity,
        Dimension,
        Material,
        Position,
        QtyReceived,
        Status,
        DateReceived,
    }

    #[derive(DeriveIden)]
    enum OrderComponents {
        Table,
        ComponentId,
        OrderId,
        ComponentType,
        ComponentOrderId,
        ComponentItemId,
        QuantityRequired,
        QuantityUsed,
        SortOrder,
    }
}

mod m20240301_000002_create_warehouse_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_warehouse_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Warehouses::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Warehouses::WarehouseId)
                                .string_len(50)
                                .not_null()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Warehouses::WarehouseName)
                                .string_len(255)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Warehouses::WarehouseType).string_len(20).null())
                        .col(ColumnDef::new(Warehouses::Location).string_len(255).null())
                        .col(ColumnDef::new(Warehouses::Capacity).integer().null())
                        .col(
                            ColumnDef::new(Warehouses::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Warehouses::Notes).text().null())
                        .col(
                            ColumnDef::new(Warehouses::DateCreated)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(WarehousePositions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(WarehousePositions::PositionId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(WarehousePositions::WarehouseId)
                                .string_len(50)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WarehousePositions::PositionName)
                                .string_len(50)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WarehousePositions::Description)
                                .string_len(255)
                                .null(),
                        )
                        .col(ColumnDef::new(WarehousePositions::MaxCapacity).integer().null())
                        .col(
                            ColumnDef::new(WarehousePositions::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(WarehousePositions::DateCreated)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_warehouse_positions_warehouse_id")
                                .from(WarehousePositions::Table, WarehousePositions::WarehouseId)
                                .to(Warehouses::Table, Warehouses::WarehouseId),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uq_warehouse_positions_name")
                        .table(WarehousePositions::Table)
                        .col(WarehousePositions::WarehouseId)
                        .col(WarehousePositions::PositionName)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Inventory::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Inventory::InventoryId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Inventory::Barcode).string_len(50).not_null())
                        .col(ColumnDef::new(Inventory::WarehouseId).string_len(50).not_null())
                        .col(ColumnDef::new(Inventory::Position).string_len(50).not_null())
                        .col(
                            ColumnDef::new(Inventory::QtyAvailable)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Inventory::DateAdded)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Inventory::DateUpdated)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uq_inventory_location")
                        .table(Inventory::Table)
                        .col(Inventory::Barcode)
                        .col(Inventory::WarehouseId)
                        .col(Inventory::Position)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Movements::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Movements::MovementId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Movements::Barcode).string_len(50).not_null())
                        .col(ColumnDef::new(Movements::MovementType).string_len(20).not_null())
                        .col(ColumnDef::new(Movements::FromWarehouse).string_len(50).null())
                        .col(ColumnDef::new(Movements::FromPosition).string_len(50).null())
                        .col(ColumnDef::new(Movements::ToWarehouse).string_len(50).null())
                        .col(ColumnDef::new(Movements::ToPosition).string_len(50).null())
                        .col(ColumnDef::new(Movements::Quantity).integer().not_null())
                        .col(ColumnDef::new(Movements::Notes).text().null())
                        .col(
                            ColumnDef::new(Movements::DateCreated)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_movements_barcode")
                        .table(Movements::Table)
                        .col(Movements::Barcode)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Movements::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Inventory::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(WarehousePositions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Warehouses::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Warehouses {
        Table,
        WarehouseId,
        WarehouseName,
        WarehouseType,
        Location,
        Capacity,
        IsActive,
        Notes,
        DateCreated,
    }

    #[derive(DeriveIden)]
    enum WarehousePositions {
        Table,
        PositionId,
        WarehouseId,
        PositionName,
        Description,
        MaxCapacity,
        IsActive,
        DateCreated,
    }

    #[derive(DeriveIden)]
    enum Inventory {
        Table,
        InventoryId,
        Barcode,
        WarehouseId,
        Position,
        QtyAvailable,
        DateAdded,
        DateUpdated,
    }

    #[derive(DeriveIden)]
    enum Movements {
        Table,
        MovementId,
        Barcode,
        MovementType,
        FromWarehouse,
        FromPosition,
        ToWarehouse,
        ToPosition,
        Quantity,
        Notes,
        DateCreated,
    }
}

mod m20240301_000003_create_production_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_production_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Production::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Production::WorkOrderId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Production::ProductCode).string_len(100).not_null())
                        .col(ColumnDef::new(Production::BatchNumber).string_len(50).null())
                        .col(ColumnDef::new(Production::OrderId).integer().null())
                        .col(ColumnDef::new(Production::QuantityIn).integer().not_null())
                        .col(
                            ColumnDef::new(Production::QuantityOut)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Production::QuantityScrap)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Production::Status).string_len(20).not_null())
                        .col(ColumnDef::new(Production::OperatorId).string_len(100).null())
                        .col(ColumnDef::new(Production::MachineId).string_len(50).null())
                        .col(ColumnDef::new(Production::Notes).text().null())
                        .col(
                            ColumnDef::new(Production::StartTime)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Production::EndTime)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Production::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Production::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_production_status")
                        .table(Production::Table)
                        .col(Production::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ProductionStages::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductionStages::StageId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(ProductionStages::WorkOrderId).integer().not_null())
                        .col(
                            ColumnDef::new(ProductionStages::StageSequence)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionStages::StageName)
                                .string_len(100)
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductionStages::StageDescription).text().null())
                        .col(ColumnDef::new(ProductionStages::MachineId).string_len(50).null())
                        .col(ColumnDef::new(ProductionStages::MachineType).string_len(50).null())
                        .col(
                            ColumnDef::new(ProductionStages::InputQuantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ProductionStages::OutputQuantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ProductionStages::ScrapQuantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ProductionStages::ReworkQuantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ProductionStages::PlannedDurationMinutes)
                                .integer()
                                .null(),
                        )
                        .col(ColumnDef::new(ProductionStages::OperatorId).string_len(100).null())
                        .col(
                            ColumnDef::new(ProductionStages::QualityOk)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ProductionStages::QualityNok)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(ProductionStages::Status).string_len(20).not_null())
                        .col(ColumnDef::new(ProductionStages::NextStageId).integer().null())
                        .col(ColumnDef::new(ProductionStages::Notes).text().null())
                        .col(
                            ColumnDef::new(ProductionStages::StartTime)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ProductionStages::EndTime)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ProductionStages::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionStages::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_production_stages_work_order_id")
                                .from(ProductionStages::Table, ProductionStages::WorkOrderId)
                                .to(Production::Table, Production::WorkOrderId)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_production_stages_work_order_id")
                        .table(ProductionStages::Table)
                        .col(ProductionStages::WorkOrderId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ProductionStageLogs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductionStageLogs::LogId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(ProductionStageLogs::StageId).integer().not_null())
                        .col(
                            ColumnDef::new(ProductionStageLogs::EventType)
                                .string_len(30)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionStageLogs::OperatorId)
                                .string_len(100)
                                .null(),
                        )
                        .col(ColumnDef::new(ProductionStageLogs::Quantity).integer().null())
                        .col(
                            ColumnDef::new(ProductionStageLogs::DurationMinutes)
                                .integer()
                                .null(),
                        )
                        .col(ColumnDef::new(ProductionStageLogs::Notes).text().null())
                        .col(
                            ColumnDef::new(ProductionStageLogs::Timestamp)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_production_stage_logs_stage_id")
                                .from(ProductionStageLogs::Table, ProductionStageLogs::StageId)
                                .to(ProductionStages::Table, ProductionStages::StageId)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SubProducts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SubProducts::SubProductId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(SubProducts::ParentWorkOrderId)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SubProducts::ParentStageId).integer().null())
                        .col(
                            ColumnDef::new(SubProducts::ComponentCode)
                                .string_len(100)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SubProducts::ComponentName)
                                .string_len(255)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SubProducts::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(SubProducts::Unit)
                                .string_len(20)
                                .not_null()
                                .default("ks"),
                        )
                        .col(ColumnDef::new(SubProducts::CurrentStageId).integer().null())
                        .col(ColumnDef::new(SubProducts::WarehouseId).string_len(50).null())
                        .col(ColumnDef::new(SubProducts::Position).string_len(50).null())
                        .col(ColumnDef::new(SubProducts::Status).string_len(20).not_null())
                        .col(
                            ColumnDef::new(SubProducts::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SubProducts::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_sub_products_work_order_id")
                                .from(SubProducts::Table, SubProducts::ParentWorkOrderId)
                                .to(Production::Table, Production::WorkOrderId)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(QualityChecks::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(QualityChecks::CheckId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(QualityChecks::StageId).integer().not_null())
                        .col(ColumnDef::new(QualityChecks::SubProductId).integer().null())
                        .col(ColumnDef::new(QualityChecks::CheckType).string_len(100).null())
                        .col(
                            ColumnDef::new(QualityChecks::Result)
                                .string_len(10)
                                .not_null()
                                .default("OK"),
                        )
                        .col(ColumnDef::new(QualityChecks::Parameter).string_len(100).null())
                        .col(ColumnDef::new(QualityChecks::SpecMin).double().null())
                        .col(ColumnDef::new(QualityChecks::SpecMax).double().null())
                        .col(ColumnDef::new(QualityChecks::Measured).double().null())
                        .col(ColumnDef::new(QualityChecks::Notes).text().null())
                        .col(ColumnDef::new(QualityChecks::CheckedBy).string_len(100).null())
                        .col(
                            ColumnDef::new(QualityChecks::CheckedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_quality_checks_stage_id")
                                .from(QualityChecks::Table, QualityChecks::StageId)
                                .to(ProductionStages::Table, ProductionStages::StageId)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_quality_checks_stage_id")
                        .table(QualityChecks::Table)
                        .col(QualityChecks::StageId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(QualityChecks::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(SubProducts::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ProductionStageLogs::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ProductionStages::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Production::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Production {
        Table,
        WorkOrderId,
        ProductCode,
        BatchNumber,
        OrderId,
        QuantityIn,
        QuantityOut,
        QuantityScrap,
        Status,
        OperatorId,
        MachineId,
        Notes,
        StartTime,
        EndTime,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum ProductionStages {
        Table,
        StageId,
        WorkOrderId,
        StageSequence,
        StageName,
        StageDescription,
        MachineId,
        MachineType,
        InputQuantity,
        OutputQuantity,
        ScrapQuantity,
        ReworkQuantity,
        PlannedDurationMinutes,
        OperatorId,
        QualityOk,
        QualityNok,
        Status,
        NextStageId,
        Notes,
        StartTime,
        EndTime,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum ProductionStageLogs {
        Table,
        LogId,
        StageId,
        EventType,
        OperatorId,
        Quantity,
        DurationMinutes,
        Notes,
        Timestamp,
    }

    #[derive(DeriveIden)]
    enum SubProducts {
        Table,
        SubProductId,
        ParentWorkOrderId,
        ParentStageId,
        ComponentCode,
        ComponentName,
        Quantity,
        Unit,
        CurrentStageId,
        WarehouseId,
        Position,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum QualityChecks {
        Table,
        CheckId,
        StageId,
        SubProductId,
        CheckType,
        Result,
        Parameter,
        SpecMin,
        SpecMax,
        Measured,
        Notes,
        CheckedBy,
        CheckedAt,
    }
}

mod m20240301_000004_create_assembly_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_assembly_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(AssemblyQualityChecks::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AssemblyQualityChecks::CheckId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(AssemblyQualityChecks::OrderId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(AssemblyQualityChecks::Result)
                                .string_len(10)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(AssemblyQualityChecks::Inspector)
                                .string_len(100)
                                .null(),
                        )
                        .col(ColumnDef::new(AssemblyQualityChecks::Notes).text().null())
                        .col(ColumnDef::new(AssemblyQualityChecks::Parameters).text().null())
                        .col(
                            ColumnDef::new(AssemblyQualityChecks::DateChecked)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(AssemblyReports::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AssemblyReports::ReportId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(AssemblyReports::OrderId).integer().not_null())
                        .col(
                            ColumnDef::new(AssemblyReports::ReportType)
                                .string_len(20)
                                .not_null(),
                        )
                        .col(ColumnDef::new(AssemblyReports::Operator).string_len(100).null())
                        .col(
                            ColumnDef::new(AssemblyReports::PreviousStatus)
                                .string_len(20)
                                .null(),
                        )
                        .col(ColumnDef::new(AssemblyReports::NewStatus).string_len(20).null())
                        .col(
                            ColumnDef::new(AssemblyReports::WorkDurationMinutes)
                                .big_integer()
                                .null(),
                        )
                        .col(ColumnDef::new(AssemblyReports::Notes).text().null())
                        .col(
                            ColumnDef::new(AssemblyReports::DateCreated)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(AuditLog::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AuditLog::AuditId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(AuditLog::TableName).string_len(50).not_null())
                        .col(ColumnDef::new(AuditLog::RecordId).string_len(50).not_null())
                        .col(ColumnDef::new(AuditLog::Action).string_len(30).not_null())
                        .col(ColumnDef::new(AuditLog::UserId).string_len(100).null())
                        .col(ColumnDef::new(AuditLog::OldValue).text().null())
                        .col(ColumnDef::new(AuditLog::NewValue).text().null())
                        .col(
                            ColumnDef::new(AuditLog::DateCreated)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_audit_log_record")
                        .table(AuditLog::Table)
                        .col(AuditLog::TableName)
                        .col(AuditLog::RecordId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AuditLog::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(AssemblyReports::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(AssemblyQualityChecks::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum AssemblyQualityChecks {
        Table,
        CheckId,
        OrderId,
        Result,
        Inspector,
        Notes,
        Parameters,
        DateChecked,
    }

    #[derive(DeriveIden)]
    enum AssemblyReports {
        Table,
        ReportId,
        OrderId,
        ReportType,
        Operator,
        PreviousStatus,
        NewStatus,
        WorkDurationMinutes,
        Notes,
        DateCreated,
    }

    #[derive(DeriveIden)]
    enum AuditLog {
        Table,
        AuditId,
        TableName,
        RecordId,
        Action,
        UserId,
        OldValue,
        NewValue,
        DateCreated,
    }
}

mod m20240301_000005_create_auth_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000005_create_auth_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Users::UserId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Users::Username)
                                .string_len(50)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Users::Email)
                                .string_len(255)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::PasswordHash).text().not_null())
                        .col(
                            ColumnDef::new(Users::Role)
                                .string_len(30)
                                .not_null()
                                .default("operator"),
                        )
                        .col(ColumnDef::new(Users::FullName).string_len(255).null())
                        .col(
                            ColumnDef::new(Users::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Users::LastLogin)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(RefreshTokens::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RefreshTokens::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(RefreshTokens::UserId).integer().not_null())
                        .col(
                            ColumnDef::new(RefreshTokens::Token)
                                .string_len(255)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(RefreshTokens::ExpiresAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RefreshTokens::IsRevoked)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(RefreshTokens::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_refresh_tokens_user_id")
                                .from(RefreshTokens::Table, RefreshTokens::UserId)
                                .to(Users::Table, Users::UserId)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(RefreshTokens::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        UserId,
        Username,
        Email,
        PasswordHash,
        Role,
        FullName,
        IsActive,
        LastLogin,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum RefreshTokens {
        Table,
        Id,
        UserId,
        Token,
        ExpiresAt,
        IsRevoked,
        CreatedAt,
    }
}

/// Standalone migration runner used by the `migration` binary.
pub async fn run_migration(db_url: &str) -> Result<()> {
    info!("Setting up database connection for migrations");

    let mut opt = ConnectOptions::new(db_url);
    opt.max_connections(5)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(true);

    let db = Database::connect(opt).await?;

    info!("Running database migrations");

    match Migrator::up(&db, None).await {
        Ok(_) => {
            info!("Migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Migration failed: {}", e);
            Err(e.into())
        }
    }
}

/// Rolls back every applied migration.
pub async fn rollback_migrations(db_url: &str) -> Result<()> {
    let db = Database::connect(ConnectOptions::new(db_url)).await?;
    info!("Rolling back database migrations");
    Migrator::down(&db, None).await?;
    Ok(())
}
