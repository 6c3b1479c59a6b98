//! Inbound reservation-platform events.
//!
//! The platform delivers loosely shaped JSON (the phone alone may sit in the
//! query string, the body, or a generic `fields` list). Everything is folded
//! into a [`NormalizedEvent`] here; nothing downstream sees the raw payload.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone as _, Utc};
use serde::Deserialize;

use reserva_domain::booking::BookingStatus;
use reserva_domain::id::BookingCode;
use reserva_domain::phone::{CanonicalPhone, PhoneNormalizer};

use crate::domain::types::NewBooking;
use crate::error::BookingsServiceError;

/// Local timestamp layout used by the platform.
pub const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Unexpanded template variable the platform sends when it has no phone.
pub const PHONE_PLACEHOLDER: &str = "{client_phone}";

/// Name used when the platform sends none (or `-`).
pub const DEFAULT_CLIENT_NAME: &str = "Guest";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Created,
    Cancelled,
}

impl EventKind {
    /// Map the `message` query discriminator.
    pub fn from_discriminator(value: &str) -> Option<Self> {
        match value.trim() {
            "newrega" => Some(Self::Created),
            "cancel" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

// ── Raw payload ──────────────────────────────────────────────────────────────

/// Query string of `POST /webhooks/reservations`.
#[derive(Debug, Default, Deserialize)]
pub struct WebhookQuery {
    pub message: Option<String>,
    pub phone: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawScalar {
    Text(String),
    Number(serde_json::Number),
}

impl RawScalar {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawField {
    #[serde(default)]
    pub name: String,
    pub value: Option<RawScalar>,
}

/// JSON body of `POST /webhooks/reservations`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookBody {
    pub code: Option<RawScalar>,
    pub resource: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub client_phone: Option<String>,
    pub total_sum: Option<RawScalar>,
    #[serde(default)]
    pub fields: Vec<RawField>,
}

// ── Normalized event ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEvent {
    pub kind: EventKind,
    pub code: BookingCode,
    pub service: String,
    pub client_name: String,
    pub phone: Option<CanonicalPhone>,
    pub starts_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub total_sum: Option<String>,
}

impl NormalizedEvent {
    /// Row inserted when this code has not been seen before. A cancellation that
    /// overtakes its creation is stored already cancelled.
    pub fn to_new_booking(&self) -> NewBooking {
        NewBooking {
            code: self.code.clone(),
            service: self.service.clone(),
            client_name: Some(self.client_name.clone()),
            client_phone: self.phone.clone(),
            starts_at: self.starts_at,
            duration_minutes: self.duration_minutes,
            status: match self.kind {
                EventKind::Created => BookingStatus::Active,
                EventKind::Cancelled => BookingStatus::Cancelled,
            },
        }
    }
}

/// Turns raw webhook input into a [`NormalizedEvent`].
#[derive(Debug, Clone)]
pub struct EventNormalizer {
    pub phones: PhoneNormalizer,
    /// Offset of the venue; platform timestamps carry no zone.
    pub utc_offset: FixedOffset,
}

impl EventNormalizer {
    pub fn normalize(
        &self,
        query: &WebhookQuery,
        body: WebhookBody,
    ) -> Result<NormalizedEvent, BookingsServiceError> {
        let kind = query
            .message
            .as_deref()
            .and_then(EventKind::from_discriminator)
            .ok_or_else(|| malformed("unknown event kind"))?;

        let code = body
            .code
            .clone()
            .map(RawScalar::into_string)
            .and_then(BookingCode::new)
            .ok_or_else(|| malformed("missing code"))?;
        let service = body
            .resource
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| malformed("missing resource"))?
            .to_owned();
        let start = body
            .start
            .as_deref()
            .ok_or_else(|| malformed("missing start"))?;
        let end = body.end.as_deref().ok_or_else(|| malformed("missing end"))?;

        let starts_at = self.parse_local(start)?;
        let ends_at = self.parse_local(end)?;
        if ends_at < starts_at {
            return Err(malformed("end is before start"));
        }
        let duration_minutes = i32::try_from((ends_at - starts_at).num_minutes())
            .map_err(|_| malformed("duration out of range"))?;

        Ok(NormalizedEvent {
            kind,
            code,
            service,
            client_name: pick_name(query, &body),
            phone: pick_phone(query, &body).and_then(|raw| self.phones.normalize(&raw)),
            starts_at,
            duration_minutes,
            total_sum: body
                .total_sum
                .map(RawScalar::into_string)
                .filter(|s| !s.trim().is_empty()),
        })
    }

    fn parse_local(&self, value: &str) -> Result<DateTime<Utc>, BookingsServiceError> {
        let naive = NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT)
            .map_err(|_| malformed(format!("bad timestamp {value:?}")))?;
        self.utc_offset
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| malformed(format!("bad timestamp {value:?}")))
    }
}

fn malformed(reason: impl Into<String>) -> BookingsServiceError {
    BookingsServiceError::MalformedEvent(reason.into())
}

fn is_present(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value != PHONE_PLACEHOLDER
}

/// First usable phone: query, body `phone`, body `client_phone`, then `fields[]`.
fn pick_phone(query: &WebhookQuery, body: &WebhookBody) -> Option<String> {
    let direct = [
        query.phone.as_deref(),
        body.phone.as_deref(),
        body.client_phone.as_deref(),
    ]
    .into_iter()
    .flatten()
    .find(|v| is_present(v))
    .map(str::to_owned);
    if direct.is_some() {
        return direct;
    }
    body.fields
        .iter()
        .find(|f| {
            let name = f.name.to_lowercase();
            name.contains("phone") || name.contains("телефон")
        })
        .and_then(|f| f.value.clone())
        .map(RawScalar::into_string)
        .filter(|v| is_present(v))
}

fn pick_name(query: &WebhookQuery, body: &WebhookBody) -> String {
    [query.name.as_deref(), body.name.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|n| !n.is_empty())
        .filter(|n| *n != "-")
        .unwrap_or(DEFAULT_CLIENT_NAME)
        .to_owned()
}
