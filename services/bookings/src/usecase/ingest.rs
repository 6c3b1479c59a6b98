use std::sync::Arc;

use reserva_domain::booking::BookingStatus;
use reserva_domain::id::{BookingCode, ChannelId};

use crate::domain::event::{EventKind, NormalizedEvent};
use crate::domain::repository::{BookingStore, MessengerPort, PlatformPort};
use crate::domain::types::{CancelOrigin, CancelOutcome};
use crate::error::BookingsServiceError;
use crate::scheduler::{LifecycleScheduler, Scheduled};
use crate::usecase::cancel::CancelBookingUseCase;
use crate::usecase::matcher::CustomerMatcher;
use crate::usecase::notify::Notifier;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Linked to a customer; lifecycle jobs registered (where still in the future).
    Scheduled {
        code: BookingCode,
        customer: ChannelId,
        jobs: Scheduled,
    },
    /// Stored without an owner; jobs follow once a customer claims it.
    StoredUnlinked { code: BookingCode },
    /// A creation replayed after the booking already reached a terminal state.
    Inactive {
        code: BookingCode,
        status: BookingStatus,
    },
    Cancelled {
        code: BookingCode,
        outcome: CancelOutcome,
    },
}

pub struct IngestEventUseCase<S, M, P> {
    pub store: S,
    pub scheduler: Arc<LifecycleScheduler>,
    pub notifier: Notifier<S, M>,
    pub platform: P,
}

impl<S: BookingStore, M: MessengerPort + Clone, P: PlatformPort + Clone>
    IngestEventUseCase<S, M, P>
{
    /// Idempotent: replaying an event never duplicates the booking or its jobs.
    pub async fn execute(
        &self,
        event: NormalizedEvent,
    ) -> Result<IngestOutcome, BookingsServiceError> {
        let (mut booking, inserted) = self.store.upsert_by_code(&event.to_new_booking()).await?;
        tracing::info!(
            code = %booking.code,
            kind = ?event.kind,
            inserted,
            status = %booking.status,
            "event ingested"
        );

        match event.kind {
            EventKind::Created => {
                let matcher = CustomerMatcher {
                    store: self.store.clone(),
                };
                let customer = matcher
                    .link_if_possible(&booking, event.phone.as_ref())
                    .await?;
                if inserted {
                    self.notifier
                        .staff_new_booking(&event, customer.is_some())
                        .await;
                }
                if booking.status.is_terminal() {
                    return Ok(IngestOutcome::Inactive {
                        code: booking.code,
                        status: booking.status,
                    });
                }
                // A replayed create keeps the owner linked earlier by code or phone claim.
                let Some(owner) = customer.map(|c| c.channel_id).or(booking.customer_id) else {
                    return Ok(IngestOutcome::StoredUnlinked { code: booking.code });
                };
                booking.customer_id = Some(owner);
                let jobs = self.scheduler.schedule_lifecycle(&booking);
                self.notifier
                    .confirm_booking(&booking, self.scheduler.reminder_lead())
                    .await;
                Ok(IngestOutcome::Scheduled {
                    code: booking.code,
                    customer: owner,
                    jobs,
                })
            }
            EventKind::Cancelled => {
                let cancel = CancelBookingUseCase {
                    store: self.store.clone(),
                    scheduler: self.scheduler.clone(),
                    notifier: self.notifier.clone(),
                    platform: self.platform.clone(),
                };
                let outcome = cancel.execute(&booking.code, CancelOrigin::Platform).await?;
                if inserted || matches!(outcome, CancelOutcome::Cancelled { .. }) {
                    self.notifier.staff_cancellation(&event).await;
                }
                Ok(IngestOutcome::Cancelled {
                    code: booking.code,
                    outcome,
                })
            }
        }
    }
}
