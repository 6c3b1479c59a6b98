use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FeedbackSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FeedbackSessions::CustomerId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FeedbackSessions::BookingCode)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FeedbackSessions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(FeedbackSessions::Table, FeedbackSessions::CustomerId)
                            .to(Customers::Table, Customers::ChannelId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(FeedbackSessions::Table, FeedbackSessions::BookingCode)
                            .to(Bookings::Table, Bookings::Code)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FeedbackSessions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum FeedbackSessions {
    Table,
    CustomerId,
    BookingCode,
    CreatedAt,
}

#[derive(Iden)]
enum Customers {
    Table,
    ChannelId,
}

#[derive(Iden)]
enum Bookings {
    Table,
    Code,
}
