use std::sync::Arc;

use reserva_domain::booking::BookingStatus;
use reserva_domain::id::BookingCode;

use crate::domain::repository::{BookingStore, MessengerPort, PlatformPort};
use crate::domain::types::{CancelOrigin, CancelOutcome};
use crate::error::BookingsServiceError;
use crate::scheduler::LifecycleScheduler;
use crate::usecase::notify::Notifier;

pub struct CancelBookingUseCase<S, M, P> {
    pub store: S,
    pub scheduler: Arc<LifecycleScheduler>,
    pub notifier: Notifier<S, M>,
    pub platform: P,
}

impl<S: BookingStore, M: MessengerPort, P: PlatformPort> CancelBookingUseCase<S, M, P> {
    pub async fn execute(
        &self,
        code: &BookingCode,
        origin: CancelOrigin,
    ) -> Result<CancelOutcome, BookingsServiceError> {
        let booking = self
            .store
            .get_by_code(code)
            .await?
            .ok_or(BookingsServiceError::UnknownBooking)?;

        if booking.status == BookingStatus::Cancelled {
            self.scheduler.cancel(code);
            return Ok(CancelOutcome::AlreadyCancelled);
        }
        if let CancelOrigin::Customer(customer) = origin {
            if !booking.is_owned_by(customer) {
                return Err(BookingsServiceError::NotOwner);
            }
        }
        if !booking.status.can_transition_to(BookingStatus::Cancelled) {
            return Err(BookingsServiceError::BookingClosed);
        }

        let remote_synced = match origin {
            CancelOrigin::Platform => true,
            CancelOrigin::Customer(_) => match self.platform.cancel_booking(code).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(code = %code, error = %e, "remote cancellation failed, cancelling locally");
                    false
                }
            },
        };

        if !self.store.update_status(code, BookingStatus::Cancelled).await? {
            // Lost a race with another transition; report what actually happened.
            self.scheduler.cancel(code);
            let current = self.store.get_by_code(code).await?.map(|b| b.status);
            return match current {
                Some(BookingStatus::Cancelled) => Ok(CancelOutcome::AlreadyCancelled),
                Some(_) => Err(BookingsServiceError::BookingClosed),
                None => Err(BookingsServiceError::UnknownBooking),
            };
        }
        self.scheduler.cancel(code);
        tracing::info!(code = %code, ?origin, remote_synced, "booking cancelled");

        self.notifier.notify_cancelled(&booking).await;
        Ok(CancelOutcome::Cancelled { remote_synced })
    }
}
