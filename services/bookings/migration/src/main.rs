use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(reserva_bookings_migration::Migrator).await;
}
