use std::sync::Arc;

use reserva_domain::booking::MessageKind;
use reserva_domain::id::{BookingCode, ChannelId};
use reserva_domain::rating::Rating;

use crate::domain::repository::{
    BookingRepository, FeedbackSessionRepository, NotificationLogRepository,
};
use crate::domain::types::VenueProfile;
use crate::error::BookingsServiceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingReceipt {
    pub booking_code: BookingCode,
    pub rating: Rating,
    /// Review prompts, only for a top rating.
    pub review_links: Vec<String>,
}

// ── SubmitRating ─────────────────────────────────────────────────────────────

pub struct SubmitRatingUseCase<S> {
    pub store: S,
    pub venue: Arc<VenueProfile>,
}

impl<S> SubmitRatingUseCase<S>
where
    S: BookingRepository + FeedbackSessionRepository + NotificationLogRepository,
{
    /// Parse failures leave the session in place so the customer can retry.
    pub async fn execute(
        &self,
        customer: ChannelId,
        text: &str,
    ) -> Result<RatingReceipt, BookingsServiceError> {
        let code = self.pending_booking(customer).await?;
        let rating = Rating::parse(text)?;

        let booking = self
            .store
            .get_by_code(&code)
            .await?
            .ok_or(BookingsServiceError::UnknownBooking)?;
        if booking.rating.is_some() || !self.store.set_rating(&code, rating).await? {
            self.store.clear(customer).await?;
            return Err(BookingsServiceError::AlreadyRated);
        }
        self.store.clear(customer).await?;
        tracing::info!(code = %code, customer = %customer, rating = rating.value(), "rating stored");

        let review_links = if rating.is_top() {
            self.venue.review_links.clone()
        } else {
            Vec::new()
        };
        Ok(RatingReceipt {
            booking_code: code,
            rating,
            review_links,
        })
    }

    /// Awaiting session first, else the booking of the latest feedback prompt.
    async fn pending_booking(
        &self,
        customer: ChannelId,
    ) -> Result<BookingCode, BookingsServiceError> {
        if let Some(session) = self.store.get(customer).await? {
            return Ok(session.booking_code);
        }
        self.store
            .latest_for(customer, MessageKind::FeedbackRequest)
            .await?
            .and_then(|entry| entry.booking_code)
            .ok_or(BookingsServiceError::NoPendingFeedback)
    }
}
