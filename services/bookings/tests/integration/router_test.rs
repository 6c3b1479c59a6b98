use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use chrono::Duration;
use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, MockDatabase, RuntimeErr};
use serde_json::Value;

use reserva_bookings::domain::event::EventNormalizer;
use reserva_bookings::domain::types::VenueProfile;
use reserva_bookings::infra::messenger::TelegramMessenger;
use reserva_bookings::infra::platform::HttpPlatformClient;
use reserva_bookings::router::build_router;
use reserva_bookings::scheduler::LifecycleScheduler;
use reserva_bookings::state::AppState;
use reserva_core::identity::CHANNEL_ID_HEADER;
use reserva_domain::phone::PhoneNormalizer;
use reserva_testing::clock::ManualClock;
use reserva_testing::fixture::Fixture;

use crate::helpers::venue_offset;

/// Router over a disconnected database, for routes that answer before touching the store.
fn server() -> TestServer {
    server_with(DatabaseConnection::Disconnected)
}

fn server_with(db: DatabaseConnection) -> TestServer {
    let clock = Arc::new(ManualClock::fixed());
    let http = reqwest::Client::new();
    let state = AppState {
        db,
        scheduler: Arc::new(LifecycleScheduler::new(Duration::hours(1), clock.clone())),
        messenger: TelegramMessenger::new(http.clone(), "http://127.0.0.1:9", "123:abc"),
        platform: HttpPlatformClient::new(http, None, None),
        events: EventNormalizer {
            phones: PhoneNormalizer::default(),
            utc_offset: venue_offset(),
        },
        venue: Arc::new(VenueProfile::default()),
        clock,
        support_channel: None,
    };
    TestServer::new(build_router(state)).unwrap()
}

fn channel(id: &'static str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static(CHANNEL_ID_HEADER),
        HeaderValue::from_static(id),
    )
}

// ── Health ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_report_live_and_attach_request_id() {
    let response = server().get("/healthz").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let id = response.header("x-request-id");
    assert!(!id.is_empty());
}

#[tokio::test]
async fn should_report_not_ready_without_database() {
    let response = server().get("/readyz").await;

    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
}

// ── Webhook ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_webhook_body_that_is_not_json() {
    let response = server()
        .post("/webhooks/reservations?message=newrega")
        .text("code=AB12")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["kind"], "MALFORMED_EVENT");
}

#[tokio::test]
async fn should_reject_unknown_discriminator() {
    let response = server()
        .post("/webhooks/reservations?message=update")
        .json(&Fixture::load("contracts/webhooks/newrega.json"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["kind"], "MALFORMED_EVENT");
}

#[tokio::test]
async fn should_surface_store_outage_as_retryable() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_errors([DbErr::Conn(RuntimeErr::Internal(
            "connection refused".to_owned(),
        ))])
        .into_connection();

    let response = server_with(db)
        .post("/webhooks/reservations?message=newrega")
        .json(&Fixture::load("contracts/webhooks/newrega.json"))
        .await;

    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.json::<Value>()["kind"], "STORE_UNAVAILABLE");
}

// ── Customer routes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_require_channel_identity() {
    let server = server();

    assert_eq!(
        server.post("/customers").await.status_code(),
        StatusCode::UNAUTHORIZED
    );
    let (name, _) = channel("7");
    let response = server
        .get("/customers/@me/bookings")
        .add_header(name, HeaderValue::from_static("seven"))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_treat_blank_code_as_unknown_booking() {
    let (name, value) = channel("7");
    let response = server()
        .post("/customers/@me/bookings/%20/cancel")
        .add_header(name, value)
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["kind"], "UNKNOWN_BOOKING");
}
