use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};

use reserva_bookings::scheduler::{JobCommand, JobHandler, LifecycleScheduler};
use reserva_bookings::usecase::restore::RestoreScheduleUseCase;
use reserva_domain::booking::{BookingStatus, JobKind, MessageKind};
use reserva_domain::rating::Rating;

use crate::helpers::{Harness, code};

// ── End-to-end ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_run_full_lifecycle_for_linked_booking() {
    let h = Harness::new();
    let customer = h.customer(7, "+79990000000").await;
    h.ingest().execute(h.created_ab12()).await.unwrap();
    let handler = h.job_handler();

    h.clock
        .advance_to(Utc.with_ymd_and_hms(2025, 7, 1, 11, 59, 0).unwrap());
    assert_eq!(h.scheduler.run_due(&handler).await, 0);

    h.clock
        .advance_to(Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap());
    assert_eq!(h.scheduler.run_due(&handler).await, 1);
    let sent = h.messenger.sent_to(customer);
    assert_eq!(sent.len(), 2);
    assert!(sent[1].starts_with("Reminder: VR Arena on 01.07.2025 at 18:00"));

    h.clock
        .advance_to(Utc.with_ymd_and_hms(2025, 7, 1, 14, 0, 0).unwrap());
    assert_eq!(h.scheduler.run_due(&handler).await, 1);
    assert!(h.scheduler.is_empty());
    assert!(h.messenger.sent_to(customer)[2].contains("rate \"VR Arena\""));
    assert_eq!(
        h.store.booking(&code("AB12")).unwrap().status,
        BookingStatus::Completed
    );
    assert_eq!(
        h.store.session(customer).map(|s| s.booking_code),
        Some(code("AB12"))
    );

    let receipt = h.rating().execute(customer, "5").await.unwrap();
    assert_eq!(receipt.booking_code, code("AB12"));
    assert_eq!(receipt.review_links, vec!["https://maps.example/reserva"]);
    assert_eq!(
        h.store.booking(&code("AB12")).unwrap().rating,
        Some(Rating::new(5).unwrap())
    );
}

#[tokio::test]
async fn should_deliver_nothing_after_cancellation() {
    let h = Harness::new();
    let customer = h.customer(7, "+79990000000").await;
    h.ingest().execute(h.created_ab12()).await.unwrap();
    h.ingest().execute(h.cancelled_ab12()).await.unwrap();
    let before = h.messenger.sent_to(customer).len();

    let fired = h.advance(Duration::days(45)).await;

    assert_eq!(fired, 0);
    assert_eq!(h.messenger.sent_to(customer).len(), before);
    assert_eq!(h.store.log_count(&code("AB12"), MessageKind::Reminder), 0);
    assert_eq!(h.store.log_count(&code("AB12"), MessageKind::FeedbackRequest), 0);
}

// ── Fire-time callbacks ──────────────────────────────────────────────────────

#[tokio::test]
async fn should_drop_due_reminder_when_booking_was_cancelled_meanwhile() {
    let h = Harness::new();
    let customer = h.customer(7, "+79990000000").await;
    h.ingest().execute(h.created_ab12()).await.unwrap();
    h.store.set_status(&code("AB12"), BookingStatus::Cancelled);

    let fired = h.advance(Duration::days(45)).await;

    assert_eq!(fired, 2);
    assert_eq!(h.messenger.sent_to(customer).len(), 1);
    assert_eq!(h.store.session(customer), None);
    assert_eq!(
        h.store.booking(&code("AB12")).unwrap().status,
        BookingStatus::Cancelled
    );
}

#[tokio::test]
async fn should_not_send_the_same_reminder_twice() {
    let h = Harness::new();
    let customer = h.customer(7, "+79990000000").await;
    h.ingest().execute(h.created_ab12()).await.unwrap();
    let handler = h.job_handler();
    let job = || JobCommand {
        kind: JobKind::Reminder,
        booking_code: code("AB12"),
    };

    handler.handle(job()).await.unwrap();
    handler.handle(job()).await.unwrap();

    assert_eq!(h.store.log_count(&code("AB12"), MessageKind::Reminder), 1);
    assert_eq!(h.messenger.sent_to(customer).len(), 2);
}

#[tokio::test]
async fn should_not_request_feedback_twice() {
    let h = Harness::new();
    let customer = h.customer(7, "+79990000000").await;
    h.ingest().execute(h.created_ab12()).await.unwrap();
    let handler = h.job_handler();
    let job = || JobCommand {
        kind: JobKind::FeedbackRequest,
        booking_code: code("AB12"),
    };

    handler.handle(job()).await.unwrap();
    handler.handle(job()).await.unwrap();

    assert_eq!(h.store.log_count(&code("AB12"), MessageKind::FeedbackRequest), 1);
    assert_eq!(h.messenger.sent_to(customer).len(), 2);
}

#[tokio::test]
async fn should_ignore_jobs_for_unknown_or_unlinked_bookings() {
    let h = Harness::new();
    h.ingest().execute(h.created_ab12()).await.unwrap();
    let handler = h.job_handler();

    for kind in JobKind::ALL {
        for raw in ["AB12", "ZZ99"] {
            handler
                .handle(JobCommand {
                    kind,
                    booking_code: code(raw),
                })
                .await
                .unwrap();
        }
    }

    assert!(h.messenger.sent.lock().unwrap().is_empty());
    assert_eq!(
        h.store.booking(&code("AB12")).unwrap().status,
        BookingStatus::Active
    );
}

#[tokio::test]
async fn should_surface_delivery_failure_and_leave_log_untouched() {
    let h = Harness::new();
    h.customer(7, "+79990000000").await;
    h.ingest().execute(h.created_ab12()).await.unwrap();
    h.messenger.set_failing(true);

    let result = h
        .job_handler()
        .handle(JobCommand {
            kind: JobKind::Reminder,
            booking_code: code("AB12"),
        })
        .await;

    assert!(result.is_err_and(|e| e.kind() == "DELIVERY_FAILED"));
    assert_eq!(h.store.log_count(&code("AB12"), MessageKind::Reminder), 0);
}

// ── Restore ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_restore_future_jobs_into_a_fresh_registry() {
    let h = Harness::new();
    h.customer(7, "+79990000000").await;
    h.ingest().execute(h.created_ab12()).await.unwrap();
    // Unlinked booking: nothing to restore for it.
    let unlinked = h.fixture_event("contracts/webhooks/fields_phone.json", "newrega");
    h.ingest().execute(unlinked).await.unwrap();

    let scheduler = Arc::new(LifecycleScheduler::new(
        Duration::hours(1),
        h.clock.clone(),
    ));
    let restored = RestoreScheduleUseCase {
        repo: h.store.clone(),
        scheduler: scheduler.clone(),
    }
    .execute()
    .await
    .unwrap();

    assert_eq!(restored, 1);
    assert_eq!(scheduler.len(), 2);
    assert!(scheduler.pending(&code("AB12"), JobKind::Reminder).is_some());
}

#[tokio::test]
async fn should_skip_restore_when_every_fire_time_has_passed() {
    let h = Harness::new();
    h.customer(7, "+79990000000").await;
    h.ingest().execute(h.created_ab12()).await.unwrap();
    h.clock.advance(Duration::days(45));

    let scheduler = Arc::new(LifecycleScheduler::new(
        Duration::hours(1),
        h.clock.clone(),
    ));
    let restored = RestoreScheduleUseCase {
        repo: h.store.clone(),
        scheduler: scheduler.clone(),
    }
    .execute()
    .await
    .unwrap();

    assert_eq!(restored, 0);
    assert!(scheduler.is_empty());
}
