use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use reserva_domain::rating::RatingError;

/// Bookings service error variants.
#[derive(Debug, thiserror::Error)]
pub enum BookingsServiceError {
    #[error("malformed event: {0}")]
    MalformedEvent(String),
    #[error("booking not found")]
    UnknownBooking,
    #[error("booking belongs to another customer")]
    NotOwner,
    #[error("booking is already linked to another customer")]
    AlreadyLinkedToOther,
    #[error("booking is already rated")]
    AlreadyRated,
    #[error("rating is not a number")]
    NotANumber,
    #[error("rating must be between 1 and 5")]
    OutOfRange,
    #[error("no feedback is pending")]
    NoPendingFeedback,
    #[error("booking is closed")]
    BookingClosed,
    #[error("customer not found")]
    CustomerNotFound,
    #[error("phone is registered to another customer")]
    PhoneTaken,
    #[error("phone number has no digits")]
    InvalidPhone,
    #[error("record store unavailable")]
    StoreUnavailable(#[from] anyhow::Error),
    #[error("message delivery failed")]
    DeliveryFailed(anyhow::Error),
    #[error("reservation platform unavailable")]
    PlatformUnavailable(anyhow::Error),
}

impl BookingsServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedEvent(_) => "MALFORMED_EVENT",
            Self::UnknownBooking => "UNKNOWN_BOOKING",
            Self::NotOwner => "NOT_OWNER",
            Self::AlreadyLinkedToOther => "ALREADY_LINKED_TO_OTHER",
            Self::AlreadyRated => "ALREADY_RATED",
            Self::NotANumber => "NOT_A_NUMBER",
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::NoPendingFeedback => "NO_PENDING_FEEDBACK",
            Self::BookingClosed => "BOOKING_CLOSED",
            Self::CustomerNotFound => "CUSTOMER_NOT_FOUND",
            Self::PhoneTaken => "PHONE_TAKEN",
            Self::InvalidPhone => "INVALID_PHONE",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::DeliveryFailed(_) => "DELIVERY_FAILED",
            Self::PlatformUnavailable(_) => "PLATFORM_UNAVAILABLE",
        }
    }

    /// Transient infrastructure failure; the caller may retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable(_) | Self::DeliveryFailed(_) | Self::PlatformUnavailable(_)
        )
    }
}

impl From<RatingError> for BookingsServiceError {
    fn from(err: RatingError) -> Self {
        match err {
            RatingError::NotANumber => Self::NotANumber,
            RatingError::OutOfRange => Self::OutOfRange,
        }
    }
}

impl IntoResponse for BookingsServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::MalformedEvent(_) | Self::NotANumber | Self::OutOfRange | Self::InvalidPhone => {
                StatusCode::BAD_REQUEST
            }
            Self::UnknownBooking | Self::CustomerNotFound => StatusCode::NOT_FOUND,
            Self::NotOwner => StatusCode::FORBIDDEN,
            Self::AlreadyLinkedToOther
            | Self::AlreadyRated
            | Self::BookingClosed
            | Self::PhoneTaken
            | Self::NoPendingFeedback => StatusCode::CONFLICT,
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::DeliveryFailed(_) | Self::PlatformUnavailable(_) => StatusCode::BAD_GATEWAY,
        };
        match &self {
            Self::StoreUnavailable(e) | Self::DeliveryFailed(e) | Self::PlatformUnavailable(e) => {
                tracing::error!(error = %format!("{e:#}"), kind = self.kind(), "internal error");
            }
            _ => {}
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
