#![allow(async_fn_in_trait)]

//! In-process registry of timed lifecycle jobs.
//!
//! Jobs are keyed by `(booking code, kind)`; registering the same key again
//! replaces the pending fire time. The registry holds no booking state: a fired
//! job is a [`JobCommand`] value and the [`JobHandler`] re-reads whatever it
//! needs from the store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use tokio::time::MissedTickBehavior;

use reserva_domain::booking::JobKind;
use reserva_domain::clock::Clock;
use reserva_domain::id::BookingCode;

use crate::domain::types::Booking;
use crate::error::BookingsServiceError;

/// A due job, handed to the [`JobHandler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobCommand {
    pub kind: JobKind,
    pub booking_code: BookingCode,
}

/// Executes fired jobs. Implementations must re-validate booking state.
pub trait JobHandler: Send + Sync {
    async fn handle(&self, job: JobCommand) -> Result<(), BookingsServiceError>;
}

/// Fire times actually registered by [`LifecycleScheduler::schedule_lifecycle`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scheduled {
    pub reminder: Option<DateTime<Utc>>,
    pub feedback_request: Option<DateTime<Utc>>,
}

type JobKey = (BookingCode, JobKind);

pub struct LifecycleScheduler {
    jobs: Mutex<HashMap<JobKey, DateTime<Utc>>>,
    reminder_lead: Duration,
    clock: Arc<dyn Clock>,
}

impl LifecycleScheduler {
    pub fn new(reminder_lead: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
            reminder_lead,
            clock,
        }
    }

    pub fn reminder_lead(&self) -> Duration {
        self.reminder_lead
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn reminder_time(&self, booking: &Booking) -> DateTime<Utc> {
        booking.starts_at - self.reminder_lead
    }

    pub fn feedback_time(&self, booking: &Booking) -> DateTime<Utc> {
        booking.ends_at()
    }

    /// Returns the fire time, or `None` if it has already passed.
    pub fn schedule_reminder(&self, booking: &Booking) -> Option<DateTime<Utc>> {
        self.register(&booking.code, JobKind::Reminder, self.reminder_time(booking))
    }

    /// Returns the fire time, or `None` if it has already passed.
    pub fn schedule_feedback_request(&self, booking: &Booking) -> Option<DateTime<Utc>> {
        self.register(
            &booking.code,
            JobKind::FeedbackRequest,
            self.feedback_time(booking),
        )
    }

    pub fn schedule_lifecycle(&self, booking: &Booking) -> Scheduled {
        Scheduled {
            reminder: self.schedule_reminder(booking),
            feedback_request: self.schedule_feedback_request(booking),
        }
    }

    fn register(
        &self,
        code: &BookingCode,
        kind: JobKind,
        fire_at: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        let now = self.clock.now();
        if fire_at <= now {
            tracing::debug!(code = %code, kind = %kind, %fire_at, "fire time passed, job skipped");
            return None;
        }
        let replaced = self.lock().insert((code.clone(), kind), fire_at);
        tracing::debug!(
            code = %code,
            kind = %kind,
            %fire_at,
            replaced = replaced.is_some(),
            "job scheduled"
        );
        Some(fire_at)
    }

    /// Drop both jobs for `code`. Returns how many were pending.
    pub fn cancel(&self, code: &BookingCode) -> usize {
        let mut jobs = self.lock();
        let removed = JobKind::ALL
            .iter()
            .filter(|kind| jobs.remove(&(code.clone(), **kind)).is_some())
            .count();
        drop(jobs);
        if removed > 0 {
            tracing::debug!(code = %code, removed, "jobs cancelled");
        }
        removed
    }

    pub fn pending(&self, code: &BookingCode, kind: JobKind) -> Option<DateTime<Utc>> {
        self.lock().get(&(code.clone(), kind)).copied()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove and return every job whose fire time has been reached, earliest first.
    pub fn take_due(&self) -> Vec<JobCommand> {
        let now = self.clock.now();
        let mut jobs = self.lock();
        let mut due: Vec<(DateTime<Utc>, JobKey)> = jobs
            .iter()
            .filter(|(_, fire_at)| **fire_at <= now)
            .map(|(key, fire_at)| (*fire_at, key.clone()))
            .collect();
        for (_, key) in &due {
            jobs.remove(key);
        }
        drop(jobs);
        due.sort();
        due.into_iter()
            .map(|(_, (booking_code, kind))| JobCommand { kind, booking_code })
            .collect()
    }

    /// Fire every due job through `handler`. Handler errors are logged, not returned.
    pub async fn run_due<H: JobHandler>(&self, handler: &H) -> usize {
        let due = self.take_due();
        let fired = due.len();
        for job in due {
            let (kind, code) = (job.kind, job.booking_code.clone());
            if let Err(e) = handler.handle(job).await {
                tracing::error!(code = %code, kind = %kind, error = %e, "lifecycle job failed");
            }
        }
        fired
    }

    /// Timing loop. Never returns; spawn it.
    pub async fn run<H: JobHandler>(self: Arc<Self>, handler: H, tick: std::time::Duration) {
        let mut interval = tokio::time::interval(tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(tick_ms = tick.as_millis() as u64, "lifecycle scheduler started");
        loop {
            interval.tick().await;
            self.run_due(&handler).await;
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<JobKey, DateTime<Utc>>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
