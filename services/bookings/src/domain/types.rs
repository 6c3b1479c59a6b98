use chrono::{DateTime, Duration, FixedOffset, Offset as _, Utc};
use uuid::Uuid;

use reserva_domain::booking::{BookingStatus, MessageKind};
use reserva_domain::id::{BookingCode, ChannelId};
use reserva_domain::phone::CanonicalPhone;
use reserva_domain::rating::Rating;

// ── Customer ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub channel_id: ChannelId,
    pub phone: Option<CanonicalPhone>,
    pub created_at: DateTime<Utc>,
}

// ── Booking ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub code: BookingCode,
    /// Set once; never re-pointed at a different customer.
    pub customer_id: Option<ChannelId>,
    pub service: String,
    pub client_name: Option<String>,
    /// Phone the platform reported for the booking, kept for later claiming.
    pub client_phone: Option<CanonicalPhone>,
    pub starts_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub status: BookingStatus,
    pub rating: Option<Rating>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn ends_at(&self) -> DateTime<Utc> {
        self.starts_at + Duration::minutes(i64::from(self.duration_minutes))
    }

    pub fn is_active(&self) -> bool {
        self.status == BookingStatus::Active
    }

    pub fn is_owned_by(&self, customer: ChannelId) -> bool {
        self.customer_id == Some(customer)
    }
}

/// Fields written when a booking code is seen for the first time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub code: BookingCode,
    pub service: String,
    pub client_name: Option<String>,
    pub client_phone: Option<CanonicalPhone>,
    pub starts_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub status: BookingStatus,
}

/// Result of a conditional link write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkWrite {
    /// The booking was unlinked and now belongs to the customer.
    Linked,
    /// The booking already had an owner (possibly the same customer).
    Existing(ChannelId),
    /// No booking with that code.
    Missing,
}

// ── Notification log ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationLogEntry {
    pub id: Uuid,
    pub customer_id: ChannelId,
    pub booking_code: Option<BookingCode>,
    pub kind: MessageKind,
    pub sent_at: DateTime<Utc>,
}

impl NotificationLogEntry {
    pub fn new(
        customer_id: ChannelId,
        booking_code: Option<BookingCode>,
        kind: MessageKind,
        sent_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            customer_id,
            booking_code,
            kind,
            sent_at,
        }
    }
}

// ── Feedback ─────────────────────────────────────────────────────────────────

/// A customer is awaiting a rating prompt for `booking_code`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackSession {
    pub customer_id: ChannelId,
    pub booking_code: BookingCode,
    pub created_at: DateTime<Utc>,
}

// ── Cancellation ─────────────────────────────────────────────────────────────

/// Who asked for a cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOrigin {
    /// The reservation platform reported it; no remote call is made.
    Platform,
    /// A customer cancelled through the bot; the platform is told best-effort.
    Customer(ChannelId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled { remote_synced: bool },
    AlreadyCancelled,
}

// ── Venue ────────────────────────────────────────────────────────────────────

/// Static venue facts used when rendering messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueProfile {
    pub name: String,
    pub address: String,
    pub utc_offset: FixedOffset,
    pub review_links: Vec<String>,
}

impl VenueProfile {
    pub fn local(&self, at: DateTime<Utc>) -> DateTime<FixedOffset> {
        at.with_timezone(&self.utc_offset)
    }
}

impl Default for VenueProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            address: String::new(),
            utc_offset: Utc.fix(),
            review_links: Vec::new(),
        }
    }
}
