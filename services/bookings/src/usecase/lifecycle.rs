use reserva_domain::booking::{BookingStatus, JobKind, MessageKind};
use reserva_domain::clock::Clock as _;
use reserva_domain::id::BookingCode;

use crate::domain::repository::{BookingStore, MessengerPort};
use crate::domain::types::FeedbackSession;
use crate::error::BookingsServiceError;
use crate::scheduler::{JobCommand, JobHandler};
use crate::usecase::message;
use crate::usecase::notify::Notifier;

/// Fire-time callbacks. Each one re-reads the booking before acting, so a job
/// that raced a cancellation turns into a no-op.
pub struct LifecycleJobHandler<S, M> {
    pub store: S,
    pub notifier: Notifier<S, M>,
}

impl<S: BookingStore, M: MessengerPort> JobHandler for LifecycleJobHandler<S, M> {
    async fn handle(&self, job: JobCommand) -> Result<(), BookingsServiceError> {
        match job.kind {
            JobKind::Reminder => self.remind(&job.booking_code).await,
            JobKind::FeedbackRequest => self.request_feedback(&job.booking_code).await,
        }
    }
}

impl<S: BookingStore, M: MessengerPort> LifecycleJobHandler<S, M> {
    async fn remind(&self, code: &BookingCode) -> Result<(), BookingsServiceError> {
        let Some(booking) = self.store.get_by_code(code).await? else {
            return Ok(());
        };
        let Some(customer) = booking.customer_id else {
            return Ok(());
        };
        if !booking.is_active() {
            tracing::debug!(code = %code, status = %booking.status, "reminder dropped");
            return Ok(());
        }
        if self.store.exists(code, MessageKind::Reminder).await? {
            return Ok(());
        }
        let text = message::reminder(&booking, &self.notifier.venue);
        self.notifier
            .send_logged(customer, Some(code), MessageKind::Reminder, &text)
            .await?;
        tracing::info!(code = %code, customer = %customer, "reminder sent");
        Ok(())
    }

    async fn request_feedback(&self, code: &BookingCode) -> Result<(), BookingsServiceError> {
        let Some(booking) = self.store.get_by_code(code).await? else {
            return Ok(());
        };
        let Some(customer) = booking.customer_id else {
            return Ok(());
        };
        if booking.status == BookingStatus::Cancelled {
            tracing::debug!(code = %code, "feedback request dropped for cancelled booking");
            return Ok(());
        }
        if self.store.exists(code, MessageKind::FeedbackRequest).await? {
            return Ok(());
        }
        let text = message::feedback_request(&booking);
        self.notifier
            .send_logged(customer, Some(code), MessageKind::FeedbackRequest, &text)
            .await?;
        self.store
            .put(&FeedbackSession {
                customer_id: customer,
                booking_code: code.clone(),
                created_at: self.notifier.clock.now(),
            })
            .await?;
        if booking.status.can_transition_to(BookingStatus::Completed) {
            self.store
                .update_status(code, BookingStatus::Completed)
                .await?;
        }
        tracing::info!(code = %code, customer = %customer, "feedback requested");
        Ok(())
    }
}
