use axum::{
    Json,
    extract::{RawQuery, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use reserva_core::identity::ChannelIdentity;
use reserva_domain::id::ChannelId;

use crate::error::BookingsServiceError;
use crate::handlers::booking::BookingResponse;
use crate::state::AppState;
use crate::usecase::customer::{ListBookingsUseCase, RegisterCustomerUseCase, UpdatePhoneUseCase};
use crate::usecase::feedback::SubmitRatingUseCase;

// ── POST /customers ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    pub channel_id: i64,
    pub phone: Option<String>,
    #[serde(serialize_with = "reserva_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

pub async fn register_customer(
    identity: ChannelIdentity,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<CustomerResponse>), BookingsServiceError> {
    let usecase = RegisterCustomerUseCase {
        repo: state.store(),
    };
    let customer = usecase.execute(ChannelId(identity.channel_id)).await?;
    Ok((
        StatusCode::CREATED,
        Json(CustomerResponse {
            channel_id: customer.channel_id.0,
            phone: customer.phone.map(|p| p.to_string()),
            created_at: customer.created_at,
        }),
    ))
}

// ── PUT /customers/@me/phone ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdatePhoneRequest {
    pub phone: String,
}

#[derive(Debug, Serialize)]
pub struct UpdatePhoneResponse {
    pub phone: String,
    /// Bookings made before registration that now belong to the caller.
    pub claimed: Vec<String>,
}

pub async fn update_phone(
    identity: ChannelIdentity,
    State(state): State<AppState>,
    Json(body): Json<UpdatePhoneRequest>,
) -> Result<Json<UpdatePhoneResponse>, BookingsServiceError> {
    let usecase = UpdatePhoneUseCase {
        store: state.store(),
        scheduler: state.scheduler.clone(),
        phones: state.events.phones.clone(),
    };
    let update = usecase
        .execute(ChannelId(identity.channel_id), &body.phone)
        .await?;
    Ok(Json(UpdatePhoneResponse {
        phone: update.phone.to_string(),
        claimed: update.claimed.iter().map(ToString::to_string).collect(),
    }))
}

// ── GET /customers/@me/bookings ──────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct BookingListQuery {
    #[serde(default)]
    pub active_only: bool,
}

pub async fn list_bookings(
    identity: ChannelIdentity,
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Vec<BookingResponse>>, BookingsServiceError> {
    let query: BookingListQuery = raw_query
        .as_deref()
        .map(serde_qs::from_str)
        .transpose()
        .unwrap_or_default()
        .unwrap_or_default();
    let usecase = ListBookingsUseCase {
        repo: state.store(),
    };
    let bookings = usecase
        .execute(ChannelId(identity.channel_id), query.active_only)
        .await?;
    Ok(Json(
        bookings
            .into_iter()
            .map(|b| BookingResponse::new(b, &state.venue))
            .collect(),
    ))
}

// ── POST /customers/@me/feedback ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct FeedbackRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub booking_code: String,
    pub rating: u8,
    pub review_links: Vec<String>,
}

pub async fn submit_feedback(
    identity: ChannelIdentity,
    State(state): State<AppState>,
    Json(body): Json<FeedbackRequest>,
) -> Result<Json<FeedbackResponse>, BookingsServiceError> {
    let usecase = SubmitRatingUseCase {
        store: state.store(),
        venue: state.venue.clone(),
    };
    let receipt = usecase
        .execute(ChannelId(identity.channel_id), &body.text)
        .await?;
    Ok(Json(FeedbackResponse {
        booking_code: receipt.booking_code.to_string(),
        rating: receipt.rating.value(),
        review_links: receipt.review_links,
    }))
}
