#![allow(async_fn_in_trait)]

use reserva_domain::booking::{BookingStatus, MessageKind};
use reserva_domain::id::{BookingCode, ChannelId};
use reserva_domain::phone::CanonicalPhone;
use reserva_domain::rating::Rating;

use crate::domain::types::{
    Booking, Customer, FeedbackSession, LinkWrite, NewBooking, NotificationLogEntry,
};
use crate::error::BookingsServiceError;

/// Repository for customers known on the messaging channel.
pub trait CustomerRepository: Send + Sync {
    /// Insert the customer if absent. Returns the stored row either way.
    async fn ensure(&self, channel_id: ChannelId) -> Result<Customer, BookingsServiceError>;

    async fn find_by_channel(
        &self,
        channel_id: ChannelId,
    ) -> Result<Option<Customer>, BookingsServiceError>;

    async fn find_by_phone(
        &self,
        phone: &CanonicalPhone,
    ) -> Result<Option<Customer>, BookingsServiceError>;

    /// Fails with `PhoneTaken` if another customer already holds `phone`.
    async fn update_phone(
        &self,
        channel_id: ChannelId,
        phone: &CanonicalPhone,
    ) -> Result<(), BookingsServiceError>;
}

/// Repository for bookings keyed by external code.
pub trait BookingRepository: Send + Sync {
    /// Insert-or-return-existing. The flag is `true` when this call inserted the row.
    async fn upsert_by_code(
        &self,
        booking: &NewBooking,
    ) -> Result<(Booking, bool), BookingsServiceError>;

    async fn get_by_code(&self, code: &BookingCode)
    -> Result<Option<Booking>, BookingsServiceError>;

    /// Move an `active` booking to `to`. Returns `false` if it was not active.
    async fn update_status(
        &self,
        code: &BookingCode,
        to: BookingStatus,
    ) -> Result<bool, BookingsServiceError>;

    /// Link an unlinked booking. Never overwrites an existing owner.
    async fn link_to_customer(
        &self,
        code: &BookingCode,
        customer: ChannelId,
    ) -> Result<LinkWrite, BookingsServiceError>;

    /// First write wins. Returns `false` if the booking already had a rating.
    async fn set_rating(
        &self,
        code: &BookingCode,
        rating: Rating,
    ) -> Result<bool, BookingsServiceError>;

    /// Bookings owned by `customer`, ordered by start time.
    async fn list_by_customer(
        &self,
        customer: ChannelId,
        active_only: bool,
    ) -> Result<Vec<Booking>, BookingsServiceError>;

    /// Active bookings with no owner whose reported phone is `phone`.
    async fn list_unlinked_by_phone(
        &self,
        phone: &CanonicalPhone,
    ) -> Result<Vec<Booking>, BookingsServiceError>;

    /// Active, linked bookings; candidates for lifecycle jobs on startup.
    async fn list_schedulable(&self) -> Result<Vec<Booking>, BookingsServiceError>;
}

/// Append-only log of outbound messages.
pub trait NotificationLogRepository: Send + Sync {
    async fn append(&self, entry: &NotificationLogEntry) -> Result<(), BookingsServiceError>;

    /// Most recent entry of `kind` sent to `customer`.
    async fn latest_for(
        &self,
        customer: ChannelId,
        kind: MessageKind,
    ) -> Result<Option<NotificationLogEntry>, BookingsServiceError>;

    async fn exists(
        &self,
        code: &BookingCode,
        kind: MessageKind,
    ) -> Result<bool, BookingsServiceError>;
}

/// Per-customer "awaiting rating" state.
pub trait FeedbackSessionRepository: Send + Sync {
    /// Replace any prior session for the customer.
    async fn put(&self, session: &FeedbackSession) -> Result<(), BookingsServiceError>;

    async fn get(
        &self,
        customer: ChannelId,
    ) -> Result<Option<FeedbackSession>, BookingsServiceError>;

    async fn clear(&self, customer: ChannelId) -> Result<(), BookingsServiceError>;
}

/// The whole record store, as one cloneable handle.
pub trait BookingStore:
    CustomerRepository
    + BookingRepository
    + NotificationLogRepository
    + FeedbackSessionRepository
    + Clone
{
}

impl<T> BookingStore for T where
    T: CustomerRepository
        + BookingRepository
        + NotificationLogRepository
        + FeedbackSessionRepository
        + Clone
{
}

/// Outbound message delivery on the messaging channel.
pub trait MessengerPort: Send + Sync {
    /// Fails with `DeliveryFailed`.
    async fn send(&self, to: ChannelId, text: &str) -> Result<(), BookingsServiceError>;
}

/// Remote calls into the reservation platform.
pub trait PlatformPort: Send + Sync {
    /// Fails with `PlatformUnavailable`.
    async fn cancel_booking(&self, code: &BookingCode) -> Result<(), BookingsServiceError>;
}
