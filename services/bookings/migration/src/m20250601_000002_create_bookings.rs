use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Bookings::Code)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Bookings::CustomerId).big_integer().null())
                    .col(ColumnDef::new(Bookings::Service).string().not_null())
                    .col(ColumnDef::new(Bookings::ClientName).string().null())
                    .col(ColumnDef::new(Bookings::ClientPhone).string_len(20).null())
                    .col(
                        ColumnDef::new(Bookings::StartsAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::DurationMinutes)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(Bookings::Rating).small_integer().null())
                    .col(
                        ColumnDef::new(Bookings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Bookings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Bookings::Table, Bookings::CustomerId)
                            .to(Customers::Table, Customers::ChannelId)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Bookings::Table)
                    .col(Bookings::CustomerId)
                    .col(Bookings::StartsAt)
                    .name("idx_bookings_customer_id_starts_at")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Bookings::Table)
                    .col(Bookings::ClientPhone)
                    .name("idx_bookings_client_phone")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bookings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Bookings {
    Table,
    Code,
    CustomerId,
    Service,
    ClientName,
    ClientPhone,
    StartsAt,
    DurationMinutes,
    Status,
    Rating,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Customers {
    Table,
    ChannelId,
}
