use std::sync::Arc;

use anyhow::Context;
use sea_orm::Database;
use tracing::info;

use reserva_core::config::Config;
use reserva_core::tracing::init_tracing;
use reserva_domain::clock::{Clock, SystemClock};
use reserva_domain::phone::PhoneNormalizer;

use reserva_bookings::config::BookingsConfig;
use reserva_bookings::domain::event::EventNormalizer;
use reserva_bookings::domain::types::VenueProfile;
use reserva_bookings::infra::messenger::TelegramMessenger;
use reserva_bookings::infra::platform::HttpPlatformClient;
use reserva_bookings::router::build_router;
use reserva_bookings::scheduler::LifecycleScheduler;
use reserva_bookings::state::AppState;
use reserva_bookings::usecase::restore::RestoreScheduleUseCase;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("info,reserva_bookings=debug");

    let config = BookingsConfig::from_env().context("failed to load configuration")?;
    let utc_offset = config
        .venue_utc_offset()
        .context("VENUE_UTC_OFFSET_MINUTES is out of range")?;

    let db = Database::connect(config.database_options())
        .await
        .context("failed to connect to database")?;

    let http = reqwest::Client::builder()
        .timeout(config.http_timeout())
        .build()
        .context("failed to build HTTP client")?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let scheduler = Arc::new(LifecycleScheduler::new(
        config.reminder_lead(),
        clock.clone(),
    ));

    let state = AppState {
        db,
        scheduler: scheduler.clone(),
        messenger: TelegramMessenger::new(
            http.clone(),
            &config.bot_api_url,
            config.bot_token.clone(),
        ),
        platform: HttpPlatformClient::new(
            http,
            config.platform_api_url.as_deref(),
            config.platform_api_key.clone(),
        ),
        events: EventNormalizer {
            phones: PhoneNormalizer::new(&config.phone_country_code),
            utc_offset,
        },
        venue: Arc::new(VenueProfile {
            name: config.venue_name.clone(),
            address: config.venue_address.clone(),
            utc_offset,
            review_links: config.review_links(),
        }),
        clock,
        support_channel: config.support_channel(),
    };

    RestoreScheduleUseCase {
        repo: state.store(),
        scheduler: scheduler.clone(),
    }
    .execute()
    .await
    .context("failed to restore lifecycle jobs")?;

    tokio::spawn(scheduler.run(state.job_handler(), config.scheduler_tick()));

    let router = build_router(state);
    let http_addr = format!("0.0.0.0:{}", config.bookings_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .with_context(|| format!("failed to bind {http_addr}"))?;

    info!("bookings service listening on {http_addr}");
    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
