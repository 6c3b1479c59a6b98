use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(NotificationLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NotificationLog::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(NotificationLog::CustomerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(NotificationLog::BookingCode)
                            .string_len(64)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(NotificationLog::Kind)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(NotificationLog::SentAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(NotificationLog::Table, NotificationLog::CustomerId)
                            .to(Customers::Table, Customers::ChannelId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(NotificationLog::Table)
                    .col(NotificationLog::BookingCode)
                    .col(NotificationLog::Kind)
                    .name("idx_notification_log_booking_code_kind")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(NotificationLog::Table)
                    .col(NotificationLog::CustomerId)
                    .col(NotificationLog::Kind)
                    .col(NotificationLog::SentAt)
                    .name("idx_notification_log_customer_id_kind_sent_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(NotificationLog::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum NotificationLog {
    Table,
    Id,
    CustomerId,
    BookingCode,
    Kind,
    SentAt,
}

#[derive(Iden)]
enum Customers {
    Table,
    ChannelId,
}
