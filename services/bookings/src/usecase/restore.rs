use std::sync::Arc;

use crate::domain::repository::BookingRepository;
use crate::error::BookingsServiceError;
use crate::scheduler::LifecycleScheduler;

/// Rebuild the in-memory job registry from the store after a restart.
pub struct RestoreScheduleUseCase<R: BookingRepository> {
    pub repo: R,
    pub scheduler: Arc<LifecycleScheduler>,
}

impl<R: BookingRepository> RestoreScheduleUseCase<R> {
    /// Returns how many bookings got at least one job back.
    pub async fn execute(&self) -> Result<usize, BookingsServiceError> {
        let bookings = self.repo.list_schedulable().await?;
        let total = bookings.len();
        let restored = bookings
            .iter()
            .filter(|b| b.is_active() && b.customer_id.is_some())
            .map(|b| self.scheduler.schedule_lifecycle(b))
            .filter(|s| s.reminder.is_some() || s.feedback_request.is_some())
            .count();
        tracing::info!(candidates = total, restored, "lifecycle jobs restored");
        Ok(restored)
    }
}
