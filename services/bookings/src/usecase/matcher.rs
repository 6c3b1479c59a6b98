use std::sync::Arc;

use reserva_domain::id::{BookingCode, ChannelId};
use reserva_domain::phone::CanonicalPhone;

use crate::domain::repository::{BookingRepository, CustomerRepository};
use crate::domain::types::{Booking, Customer, LinkWrite};
use crate::error::BookingsServiceError;
use crate::scheduler::LifecycleScheduler;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkResult {
    Linked(Booking),
    /// The caller already held the booking; nothing was written.
    AlreadyLinked(Booking),
}

impl LinkResult {
    pub fn booking(&self) -> &Booking {
        match self {
            Self::Linked(b) | Self::AlreadyLinked(b) => b,
        }
    }
}

/// Resolves bookings to customers. A booking's owner, once set, never changes.
pub struct CustomerMatcher<S> {
    pub store: S,
}

impl<S: CustomerRepository + BookingRepository> CustomerMatcher<S> {
    /// Link `booking` to the customer registered with `phone`, if any.
    ///
    /// Returns the customer now holding the booking, or `None` when nobody
    /// matches or the booking belongs to someone else (left untouched).
    pub async fn link_if_possible(
        &self,
        booking: &Booking,
        phone: Option<&CanonicalPhone>,
    ) -> Result<Option<Customer>, BookingsServiceError> {
        let Some(phone) = phone else {
            return Ok(None);
        };
        let Some(customer) = self.store.find_by_phone(phone).await? else {
            return Ok(None);
        };
        if let Some(owner) = booking.customer_id {
            return Ok(self.keep_existing(booking, owner, customer));
        }
        match self
            .store
            .link_to_customer(&booking.code, customer.channel_id)
            .await?
        {
            LinkWrite::Linked => {
                tracing::info!(code = %booking.code, customer = %customer.channel_id, "booking linked by phone");
                Ok(Some(customer))
            }
            LinkWrite::Existing(owner) => Ok(self.keep_existing(booking, owner, customer)),
            LinkWrite::Missing => Err(BookingsServiceError::UnknownBooking),
        }
    }

    fn keep_existing(
        &self,
        booking: &Booking,
        owner: ChannelId,
        customer: Customer,
    ) -> Option<Customer> {
        if owner == customer.channel_id {
            Some(customer)
        } else {
            tracing::info!(
                code = %booking.code,
                owner = %owner,
                customer = %customer.channel_id,
                "booking held by another customer, link refused"
            );
            None
        }
    }

    /// Explicit self-service link by booking code.
    pub async fn link_by_code(
        &self,
        code: &BookingCode,
        customer: ChannelId,
    ) -> Result<LinkResult, BookingsServiceError> {
        let mut booking = self
            .store
            .get_by_code(code)
            .await?
            .ok_or(BookingsServiceError::UnknownBooking)?;
        match booking.customer_id {
            Some(owner) if owner == customer => return Ok(LinkResult::AlreadyLinked(booking)),
            Some(_) => return Err(BookingsServiceError::AlreadyLinkedToOther),
            None => {}
        }
        match self.store.link_to_customer(code, customer).await? {
            LinkWrite::Linked => {
                booking.customer_id = Some(customer);
                Ok(LinkResult::Linked(booking))
            }
            LinkWrite::Existing(owner) if owner == customer => {
                booking.customer_id = Some(owner);
                Ok(LinkResult::AlreadyLinked(booking))
            }
            LinkWrite::Existing(_) => Err(BookingsServiceError::AlreadyLinkedToOther),
            LinkWrite::Missing => Err(BookingsServiceError::UnknownBooking),
        }
    }
}

// ── LinkBooking ──────────────────────────────────────────────────────────────

/// `POST /customers/@me/bookings/{code}/link`: link, then schedule if the booking is live.
pub struct LinkBookingUseCase<S> {
    pub store: S,
    pub scheduler: Arc<LifecycleScheduler>,
}

impl<S: CustomerRepository + BookingRepository + Clone> LinkBookingUseCase<S> {
    pub async fn execute(
        &self,
        customer: ChannelId,
        code: &BookingCode,
    ) -> Result<LinkResult, BookingsServiceError> {
        self.store
            .find_by_channel(customer)
            .await?
            .ok_or(BookingsServiceError::CustomerNotFound)?;
        let matcher = CustomerMatcher {
            store: self.store.clone(),
        };
        let result = matcher.link_by_code(code, customer).await?;
        if let LinkResult::Linked(booking) = &result {
            if booking.is_active() {
                self.scheduler.schedule_lifecycle(booking);
            }
        }
        Ok(result)
    }
}
