use std::sync::Arc;

use chrono::Duration;

use reserva_domain::booking::MessageKind;
use reserva_domain::clock::Clock;
use reserva_domain::id::{BookingCode, ChannelId};

use crate::domain::event::NormalizedEvent;
use crate::domain::repository::{MessengerPort, NotificationLogRepository};
use crate::domain::types::{Booking, NotificationLogEntry, VenueProfile};
use crate::error::BookingsServiceError;
use crate::usecase::message;

/// Sends customer and staff messages and records customer sends in the log.
#[derive(Clone)]
pub struct Notifier<L, M> {
    pub log: L,
    pub messenger: M,
    pub venue: Arc<VenueProfile>,
    pub clock: Arc<dyn Clock>,
    /// Staff channel for booking summaries. `None` disables them.
    pub support_channel: Option<ChannelId>,
}

impl<L: NotificationLogRepository, M: MessengerPort> Notifier<L, M> {
    /// Deliver `text` and append a log entry. Nothing is logged if delivery fails.
    pub async fn send_logged(
        &self,
        to: ChannelId,
        code: Option<&BookingCode>,
        kind: MessageKind,
        text: &str,
    ) -> Result<(), BookingsServiceError> {
        self.messenger.send(to, text).await?;
        self.log
            .append(&NotificationLogEntry::new(
                to,
                code.cloned(),
                kind,
                self.clock.now(),
            ))
            .await
    }

    /// Booking confirmation, at most once per booking. Best-effort.
    pub async fn confirm_booking(&self, booking: &Booking, reminder_lead: Duration) {
        let Some(customer) = booking.customer_id else {
            return;
        };
        match self
            .log
            .exists(&booking.code, MessageKind::BookingCreated)
            .await
        {
            Ok(true) => {
                tracing::debug!(code = %booking.code, "confirmation already sent");
                return;
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(code = %booking.code, error = %e, "confirmation skipped");
                return;
            }
        }
        let text = message::confirmation(booking, &self.venue, reminder_lead);
        if let Err(e) = self
            .send_logged(
                customer,
                Some(&booking.code),
                MessageKind::BookingCreated,
                &text,
            )
            .await
        {
            tracing::warn!(code = %booking.code, customer = %customer, error = %e, "confirmation failed");
        }
    }

    /// Cancellation notice to the owning customer. Best-effort.
    pub async fn notify_cancelled(&self, booking: &Booking) {
        let Some(customer) = booking.customer_id else {
            return;
        };
        let text = message::cancellation(booking, &self.venue);
        if let Err(e) = self
            .send_logged(
                customer,
                Some(&booking.code),
                MessageKind::BookingCancelled,
                &text,
            )
            .await
        {
            tracing::warn!(code = %booking.code, customer = %customer, error = %e, "cancellation notice failed");
        }
    }

    pub async fn staff_new_booking(&self, event: &NormalizedEvent, known_customer: bool) {
        self.notify_staff(&event.code, || {
            message::staff_new_booking(event, &self.venue, known_customer)
        })
        .await;
    }

    pub async fn staff_cancellation(&self, event: &NormalizedEvent) {
        self.notify_staff(&event.code, || {
            message::staff_cancellation(event, &self.venue)
        })
        .await;
    }

    async fn notify_staff(&self, code: &BookingCode, render: impl FnOnce() -> String) {
        let Some(channel) = self.support_channel else {
            return;
        };
        if let Err(e) = self.messenger.send(channel, &render()).await {
            tracing::warn!(code = %code, channel = %channel, error = %e, "staff notice failed");
        }
    }
}
