use std::sync::Arc;

use reserva_domain::id::{BookingCode, ChannelId};
use reserva_domain::phone::{CanonicalPhone, PhoneNormalizer};

use crate::domain::repository::{BookingRepository, CustomerRepository};
use crate::domain::types::{Booking, Customer, LinkWrite};
use crate::error::BookingsServiceError;
use crate::scheduler::LifecycleScheduler;

// ── RegisterCustomer ─────────────────────────────────────────────────────────

pub struct RegisterCustomerUseCase<R: CustomerRepository> {
    pub repo: R,
}

impl<R: CustomerRepository> RegisterCustomerUseCase<R> {
    pub async fn execute(&self, channel_id: ChannelId) -> Result<Customer, BookingsServiceError> {
        self.repo.ensure(channel_id).await
    }
}

// ── UpdatePhone ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneUpdate {
    pub phone: CanonicalPhone,
    /// Previously unlinked bookings now owned by the customer.
    pub claimed: Vec<BookingCode>,
}

pub struct UpdatePhoneUseCase<S> {
    pub store: S,
    pub scheduler: Arc<LifecycleScheduler>,
    pub phones: PhoneNormalizer,
}

impl<S: CustomerRepository + BookingRepository> UpdatePhoneUseCase<S> {
    pub async fn execute(
        &self,
        channel_id: ChannelId,
        raw_phone: &str,
    ) -> Result<PhoneUpdate, BookingsServiceError> {
        let phone = self
            .phones
            .normalize(raw_phone)
            .ok_or(BookingsServiceError::InvalidPhone)?;
        self.store
            .find_by_channel(channel_id)
            .await?
            .ok_or(BookingsServiceError::CustomerNotFound)?;
        self.store.update_phone(channel_id, &phone).await?;

        let mut claimed = Vec::new();
        for mut booking in self.store.list_unlinked_by_phone(&phone).await? {
            if self
                .store
                .link_to_customer(&booking.code, channel_id)
                .await?
                != LinkWrite::Linked
            {
                continue;
            }
            booking.customer_id = Some(channel_id);
            if booking.is_active() {
                self.scheduler.schedule_lifecycle(&booking);
            }
            claimed.push(booking.code);
        }
        tracing::info!(customer = %channel_id, claimed = claimed.len(), "phone updated");
        Ok(PhoneUpdate { phone, claimed })
    }
}

// ── ListBookings ─────────────────────────────────────────────────────────────

pub struct ListBookingsUseCase<R: BookingRepository> {
    pub repo: R,
}

impl<R: BookingRepository> ListBookingsUseCase<R> {
    pub async fn execute(
        &self,
        channel_id: ChannelId,
        active_only: bool,
    ) -> Result<Vec<Booking>, BookingsServiceError> {
        self.repo.list_by_customer(channel_id, active_only).await
    }
}
