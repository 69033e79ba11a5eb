use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_users_table::Migration),
            Box::new(m20250101_000002_create_pumps_table::Migration),
            Box::new(m20250101_000003_create_fuel_transactions_table::Migration),
            Box::new(m20250101_000004_create_inventory_items_table::Migration),
            Box::new(m20250101_000005_create_expenses_table::Migration),
            Box::new(m20250101_000006_create_employees_table::Migration),
        ]
    }
}

mod m20250101_000001_create_users_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000001_create_users_table"
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
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Users::Name).string().not_null())
                        .col(
                            ColumnDef::new(Users::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::PasswordHash).text().not_null())
                        .col(ColumnDef::new(Users::Role).string_len(32).not_null())
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Users::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
        Name,
        Email,
        PasswordHash,
        Role,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000002_create_pumps_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000002_create_pumps_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Pumps::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Pumps::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Pumps::Name).string().not_null())
                        .col(ColumnDef::new(Pumps::FuelType).string().not_null())
                        .col(ColumnDef::new(Pumps::Status).string_len(32).not_null())
                        .col(
                            ColumnDef::new(Pumps::CurrentIndex)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Pumps::PreviousIndex)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Pumps::PricePerLiter).double().not_null())
                        .col(
                            ColumnDef::new(Pumps::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Pumps::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Pumps::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Pumps {
        Table,
        Id,
        Name,
        FuelType,
        Status,
        CurrentIndex,
        PreviousIndex,
        PricePerLiter,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000003_create_fuel_transactions_table {

    use super::m20250101_000002_create_pumps_table::Pumps;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000003_create_fuel_transactions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(FuelTransactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(FuelTransactions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(FuelTransactions::PumpId).uuid().not_null())
                        .col(
                            ColumnDef::new(FuelTransactions::Sequence)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(FuelTransactions::PreviousIndex)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(FuelTransactions::CurrentIndex)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(FuelTransactions::LitersDispensed)
                                .double()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(FuelTransactions::PricePerLiter)
                                .double()
                                .not_null(),
                        )
                        .col(ColumnDef::new(FuelTransactions::Revenue).double().not_null())
                        .col(ColumnDef::new(FuelTransactions::FuelType).string().not_null())
                        .col(
                            ColumnDef::new(FuelTransactions::Shift)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(FuelTransactions::PaymentMethod)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(FuelTransactions::Timestamp)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(FuelTransactions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(FuelTransactions::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_fuel_transactions_pump_id")
                                .from(FuelTransactions::Table, FuelTransactions::PumpId)
                                .to(Pumps::Table, Pumps::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_fuel_transactions_pump_sequence")
                        .table(FuelTransactions::Table)
                        .col(FuelTransactions::PumpId)
                        .col(FuelTransactions::Sequence)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_fuel_transactions_timestamp")
                        .table(FuelTransactions::Table)
                        .col(FuelTransactions::Timestamp)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(FuelTransactions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum FuelTransactions {
        Table,
        Id,
        PumpId,
        Sequence,
        PreviousIndex,
        CurrentIndex,
        LitersDispensed,
        PricePerLiter,
        Revenue,
        FuelType,
        Shift,
        PaymentMethod,
        Timestamp,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000004_create_inventory_items_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000004_create_inventory_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InventoryItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryItems::Name).string().not_null())
                        .col(ColumnDef::new(InventoryItems::Category).string().not_null())
                        .col(
                            ColumnDef::new(InventoryItems::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(InventoryItems::UnitPrice).double().not_null())
                        .col(ColumnDef::new(InventoryItems::Supplier).string().null())
                        .col(
                            ColumnDef::new(InventoryItems::LowStockThreshold)
                                .integer()
                                .not_null()
                                .default(10),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::LastUpdated)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::CreatedAt)
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
                        .name("idx_inventory_items_category")
                        .table(InventoryItems::Table)
                        .col(InventoryItems::Category)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum InventoryItems {
        Table,
        Id,
        Name,
        Category,
        Quantity,
        UnitPrice,
        Supplier,
        LowStockThreshold,
        LastUpdated,
        CreatedAt,
    }
}

mod m20250101_000005_create_expenses_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000005_create_expenses_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Expenses::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Expenses::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Expenses::Date).date().not_null())
                        .col(ColumnDef::new(Expenses::Category).string_len(32).not_null())
                        .col(ColumnDef::new(Expenses::Description).string().not_null())
                        .col(ColumnDef::new(Expenses::Amount).double().not_null())
                        .col(
                            ColumnDef::new(Expenses::CreatedAt)
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
                        .name("idx_expenses_date")
                        .table(Expenses::Table)
                        .col(Expenses::Date)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Expenses::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Expenses {
        Table,
        Id,
        Date,
        Category,
        Description,
        Amount,
        CreatedAt,
    }
}

mod m20250101_000006_create_employees_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000006_create_employees_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Employees::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Employees::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Employees::Name).string().not_null())
                        .col(ColumnDef::new(Employees::Shift).string_len(32).not_null())
                        .col(ColumnDef::new(Employees::Salary).double().not_null())
                        .col(ColumnDef::new(Employees::Position).string().not_null())
                        .col(ColumnDef::new(Employees::HireDate).date().not_null())
                        .col(ColumnDef::new(Employees::Status).string_len(32).not_null())
                        .col(
                            ColumnDef::new(Employees::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Employees::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Employees {
        Table,
        Id,
        Name,
        Shift,
        Salary,
        Position,
        HireDate,
        Status,
        CreatedAt,
    }
}
