use chrono::{Duration, TimeZone, Utc};

use reserva_bookings::domain::types::CancelOutcome;
use reserva_bookings::usecase::ingest::IngestOutcome;
use reserva_domain::booking::{BookingStatus, JobKind, MessageKind};
use reserva_domain::id::ChannelId;

use crate::helpers::{Harness, STAFF_CHANNEL, code};

// ── Created events ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_store_unlinked_booking_when_phone_is_unknown() {
    let h = Harness::new();

    let outcome = h.ingest().execute(h.created_ab12()).await.unwrap();

    assert_eq!(outcome, IngestOutcome::StoredUnlinked { code: code("AB12") });
    let stored = h.store.booking(&code("AB12")).unwrap();
    assert_eq!(stored.status, BookingStatus::Active);
    assert_eq!(stored.customer_id, None);
    assert_eq!(
        stored.client_phone.as_ref().map(|p| p.as_str()),
        Some("+79990000000")
    );
    assert!(h.scheduler.is_empty());
}

#[tokio::test]
async fn should_link_known_customer_and_schedule_both_jobs() {
    let h = Harness::new();
    let customer = h.customer(7, "+7 999 000 00 00").await;

    let outcome = h.ingest().execute(h.created_ab12()).await.unwrap();

    let IngestOutcome::Scheduled { code: c, customer: owner, jobs } = outcome else {
        panic!("expected Scheduled, got {outcome:?}");
    };
    assert_eq!(c, code("AB12"));
    assert_eq!(owner, customer);
    // 18:00 at +05:00 is 13:00 UTC.
    assert_eq!(
        jobs.reminder,
        Some(Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap())
    );
    assert_eq!(
        jobs.feedback_request,
        Some(Utc.with_ymd_and_hms(2025, 7, 1, 14, 0, 0).unwrap())
    );
    assert_eq!(h.store.booking(&c).unwrap().customer_id, Some(customer));

    let sent = h.messenger.sent_to(customer);
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("confirmed"));
    assert!(sent[0].contains("01.07.2025 at 18:00"));
    assert_eq!(h.store.log_count(&c, MessageKind::BookingCreated), 1);
}

#[tokio::test]
async fn should_absorb_replayed_creation() {
    let h = Harness::new();
    let customer = h.customer(7, "89990000000").await;

    let first = h.ingest().execute(h.created_ab12()).await.unwrap();
    let second = h.ingest().execute(h.created_ab12()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(h.store.state.lock().unwrap().bookings.len(), 1);
    assert_eq!(h.scheduler.len(), 2);
    assert_eq!(h.messenger.sent_to(customer).len(), 1);
    assert_eq!(h.store.log_count(&code("AB12"), MessageKind::BookingCreated), 1);
}

#[tokio::test]
async fn should_skip_reminder_whose_time_has_passed() {
    let h = Harness::new();
    h.customer(7, "89990000000").await;
    h.clock
        .advance_to(Utc.with_ymd_and_hms(2025, 7, 1, 12, 30, 0).unwrap());

    let outcome = h.ingest().execute(h.created_ab12()).await.unwrap();

    let IngestOutcome::Scheduled { jobs, .. } = outcome else {
        panic!("expected Scheduled, got {outcome:?}");
    };
    assert_eq!(jobs.reminder, None);
    assert!(jobs.feedback_request.is_some());
    assert_eq!(h.scheduler.pending(&code("AB12"), JobKind::Reminder), None);
    assert_eq!(h.scheduler.len(), 1);
}

#[tokio::test]
async fn should_schedule_nothing_for_a_booking_already_over() {
    let h = Harness::new();
    h.customer(7, "89990000000").await;
    h.clock.advance(Duration::days(60));

    let outcome = h.ingest().execute(h.created_ab12()).await.unwrap();

    let IngestOutcome::Scheduled { jobs, .. } = outcome else {
        panic!("expected Scheduled, got {outcome:?}");
    };
    assert_eq!(jobs.reminder, None);
    assert_eq!(jobs.feedback_request, None);
    assert!(h.scheduler.is_empty());
}

#[tokio::test]
async fn should_pick_phone_from_custom_fields() {
    let h = Harness::new();
    let customer = h.customer(9, "+7 999 111 22 33").await;
    let event = h.fixture_event("contracts/webhooks/fields_phone.json", "newrega");

    let outcome = h.ingest().execute(event).await.unwrap();

    let IngestOutcome::Scheduled { code: c, customer: owner, .. } = outcome else {
        panic!("expected Scheduled, got {outcome:?}");
    };
    assert_eq!(c, code("48213"));
    assert_eq!(owner, customer);
    assert_eq!(
        h.store.booking(&c).unwrap().client_name.as_deref(),
        Some("Guest")
    );
}

#[tokio::test]
async fn should_not_fail_ingestion_when_confirmation_cannot_be_delivered() {
    let h = Harness::new();
    h.customer(7, "89990000000").await;
    h.messenger.set_failing(true);

    let outcome = h.ingest().execute(h.created_ab12()).await.unwrap();

    assert!(matches!(outcome, IngestOutcome::Scheduled { .. }));
    assert_eq!(h.store.log_count(&code("AB12"), MessageKind::BookingCreated), 0);
    assert_eq!(h.scheduler.len(), 2);
}

#[tokio::test]
async fn should_keep_existing_owner_when_another_customer_shares_the_phone() {
    let h = Harness::new();
    h.ingest().execute(h.created_ab12()).await.unwrap();
    let holder = ChannelId(5);
    h.store.set_owner(&code("AB12"), holder);
    h.customer(7, "89990000000").await;

    let outcome = h.ingest().execute(h.created_ab12()).await.unwrap();

    let IngestOutcome::Scheduled { customer: owner, jobs, .. } = outcome else {
        panic!("expected Scheduled, got {outcome:?}");
    };
    assert_eq!(owner, holder);
    assert!(jobs.reminder.is_some());
    assert_eq!(h.store.booking(&code("AB12")).unwrap().customer_id, Some(holder));
    assert_eq!(h.scheduler.len(), 2);
}

#[tokio::test]
async fn should_reschedule_code_linked_booking_on_replayed_create() {
    let h = Harness::new();
    h.ingest().execute(h.created_ab12()).await.unwrap();
    h.store_customer(42).await;
    h.link().execute(ChannelId(42), &code("AB12")).await.unwrap();
    assert_eq!(h.scheduler.len(), 2);

    let outcome = h.ingest().execute(h.created_ab12()).await.unwrap();

    let IngestOutcome::Scheduled { customer, jobs, .. } = outcome else {
        panic!("expected Scheduled, got {outcome:?}");
    };
    assert_eq!(customer, ChannelId(42));
    assert!(jobs.reminder.is_some());
    assert!(jobs.feedback_request.is_some());
    assert_eq!(
        h.store.booking(&code("AB12")).unwrap().customer_id,
        Some(ChannelId(42))
    );
    assert_eq!(h.scheduler.len(), 2);
}

// ── Cancelled events ─────────────────────────────────────────────────────────

#[tokio::test]
async fn should_cancel_booking_and_purge_its_jobs() {
    let h = Harness::new();
    let customer = h.customer(7, "89990000000").await;
    h.ingest().execute(h.created_ab12()).await.unwrap();
    assert_eq!(h.scheduler.len(), 2);

    let outcome = h.ingest().execute(h.cancelled_ab12()).await.unwrap();

    assert_eq!(
        outcome,
        IngestOutcome::Cancelled {
            code: code("AB12"),
            outcome: CancelOutcome::Cancelled { remote_synced: true },
        }
    );
    assert!(h.scheduler.is_empty());
    assert_eq!(
        h.store.booking(&code("AB12")).unwrap().status,
        BookingStatus::Cancelled
    );
    // Platform-originated: nothing to report back.
    assert!(h.platform.calls().is_empty());
    let sent = h.messenger.sent_to(customer);
    assert_eq!(sent.len(), 2);
    assert!(sent[1].contains("cancelled"));
}

#[tokio::test]
async fn should_store_cancellation_that_overtakes_its_creation() {
    let h = Harness::new();
    h.customer(7, "89990000000").await;

    let cancelled = h.ingest().execute(h.cancelled_ab12()).await.unwrap();
    let created = h.ingest().execute(h.created_ab12()).await.unwrap();

    assert_eq!(
        cancelled,
        IngestOutcome::Cancelled {
            code: code("AB12"),
            outcome: CancelOutcome::AlreadyCancelled,
        }
    );
    assert_eq!(
        created,
        IngestOutcome::Inactive {
            code: code("AB12"),
            status: BookingStatus::Cancelled,
        }
    );
    assert!(h.scheduler.is_empty());
}

#[tokio::test]
async fn should_treat_replayed_cancellation_as_already_cancelled() {
    let h = Harness::new();
    h.customer(7, "89990000000").await;
    h.ingest().execute(h.created_ab12()).await.unwrap();
    h.ingest().execute(h.cancelled_ab12()).await.unwrap();

    let replay = h.ingest().execute(h.cancelled_ab12()).await.unwrap();

    assert_eq!(
        replay,
        IngestOutcome::Cancelled {
            code: code("AB12"),
            outcome: CancelOutcome::AlreadyCancelled,
        }
    );
}

// ── Staff notices ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_notify_staff_once_per_new_booking_and_cancellation() {
    let h = Harness::new().with_staff_channel();

    h.ingest().execute(h.created_ab12()).await.unwrap();
    h.ingest().execute(h.created_ab12()).await.unwrap();
    h.ingest().execute(h.cancelled_ab12()).await.unwrap();
    h.ingest().execute(h.cancelled_ab12()).await.unwrap();

    let staff = h.messenger.sent_to(STAFF_CHANNEL);
    assert_eq!(staff.len(), 2);
    assert!(staff[0].starts_with("New booking"));
    assert!(staff[0].contains("Sum: 3500"));
    assert!(staff[0].contains("Customer in bot: no"));
    assert!(staff[1].starts_with("Booking cancelled"));
}
