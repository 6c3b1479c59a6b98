use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

use reserva_core::identity::ChannelIdentity;
use reserva_domain::booking::BookingStatus;
use reserva_domain::id::{BookingCode, ChannelId};

use crate::domain::types::{Booking, CancelOrigin, CancelOutcome, VenueProfile};
use crate::error::BookingsServiceError;
use crate::state::AppState;
use crate::usecase::cancel::CancelBookingUseCase;
use crate::usecase::matcher::{LinkBookingUseCase, LinkResult};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub code: String,
    pub service: String,
    pub status: BookingStatus,
    #[serde(serialize_with = "reserva_core::serde::to_rfc3339_ms")]
    pub starts_at: DateTime<Utc>,
    /// Start in venue time, as customers see it.
    #[serde(serialize_with = "reserva_core::serde::to_rfc3339_ms_local")]
    pub starts_at_local: DateTime<FixedOffset>,
    pub duration_minutes: i32,
    pub rating: Option<u8>,
    #[serde(serialize_with = "reserva_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl BookingResponse {
    pub fn new(booking: Booking, venue: &VenueProfile) -> Self {
        Self {
            code: booking.code.to_string(),
            service: booking.service,
            status: booking.status,
            starts_at: booking.starts_at,
            starts_at_local: venue.local(booking.starts_at),
            duration_minutes: booking.duration_minutes,
            rating: booking.rating.map(|r| r.value()),
            created_at: booking.created_at,
        }
    }
}

pub(crate) fn parse_code(raw: &str) -> Result<BookingCode, BookingsServiceError> {
    BookingCode::new(raw).ok_or(BookingsServiceError::UnknownBooking)
}

// ── POST /customers/@me/bookings/{code}/link ─────────────────────────────────

#[derive(Debug, Serialize)]
pub struct LinkResponse {
    /// `false` when the caller already held the booking.
    pub linked: bool,
    pub booking: BookingResponse,
}

pub async fn link_booking(
    identity: ChannelIdentity,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<LinkResponse>, BookingsServiceError> {
    let code = parse_code(&code)?;
    let usecase = LinkBookingUseCase {
        store: state.store(),
        scheduler: state.scheduler.clone(),
    };
    let result = usecase
        .execute(ChannelId(identity.channel_id), &code)
        .await?;
    let (linked, booking) = match result {
        LinkResult::Linked(b) => (true, b),
        LinkResult::AlreadyLinked(b) => (false, b),
    };
    Ok(Json(LinkResponse {
        linked,
        booking: BookingResponse::new(booking, &state.venue),
    }))
}

// ── POST /customers/@me/bookings/{code}/cancel ───────────────────────────────

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub code: String,
    pub already_cancelled: bool,
    /// Whether the reservation platform confirmed the cancellation.
    pub remote_synced: bool,
}

pub async fn cancel_booking(
    identity: ChannelIdentity,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<CancelResponse>, BookingsServiceError> {
    let code = parse_code(&code)?;
    let usecase = CancelBookingUseCase {
        store: state.store(),
        scheduler: state.scheduler.clone(),
        notifier: state.notifier(),
        platform: state.platform.clone(),
    };
    let outcome = usecase
        .execute(&code, CancelOrigin::Customer(ChannelId(identity.channel_id)))
        .await?;
    let (already_cancelled, remote_synced) = match outcome {
        CancelOutcome::Cancelled { remote_synced } => (false, remote_synced),
        CancelOutcome::AlreadyCancelled => (true, false),
    };
    Ok(Json(CancelResponse {
        code: code.to_string(),
        already_cancelled,
        remote_synced,
    }))
}
