use reserva_bookings::error::BookingsServiceError;
use reserva_bookings::usecase::customer::{ListBookingsUseCase, RegisterCustomerUseCase};
use reserva_bookings::usecase::matcher::LinkResult;
use reserva_domain::booking::{BookingStatus, JobKind};
use reserva_domain::id::ChannelId;

use crate::helpers::{Harness, code};

// ── RegisterCustomer ─────────────────────────────────────────────────────────

#[tokio::test]
async fn should_register_customer_idempotently() {
    let h = Harness::new();
    let register = RegisterCustomerUseCase {
        repo: h.store.clone(),
    };

    let first = register.execute(ChannelId(7)).await.unwrap();
    let second = register.execute(ChannelId(7)).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.phone, None);
    assert_eq!(h.store.state.lock().unwrap().customers.len(), 1);
}

// ── UpdatePhone ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_claim_unlinked_bookings_made_with_the_new_phone() {
    let h = Harness::new();
    h.ingest().execute(h.created_ab12()).await.unwrap();
    assert!(h.scheduler.is_empty());
    h.store_customer(7).await;

    let update = h
        .update_phone()
        .execute(ChannelId(7), "8 (999) 000-00-00")
        .await
        .unwrap();

    assert_eq!(update.phone.as_str(), "+79990000000");
    assert_eq!(update.claimed, vec![code("AB12")]);
    assert_eq!(
        h.store.booking(&code("AB12")).unwrap().customer_id,
        Some(ChannelId(7))
    );
    assert!(h.scheduler.pending(&code("AB12"), JobKind::Reminder).is_some());
    assert!(
        h.scheduler
            .pending(&code("AB12"), JobKind::FeedbackRequest)
            .is_some()
    );
}

#[tokio::test]
async fn should_not_claim_cancelled_bookings() {
    let h = Harness::new();
    h.ingest().execute(h.created_ab12()).await.unwrap();
    h.ingest().execute(h.cancelled_ab12()).await.unwrap();
    h.store_customer(7).await;

    let update = h
        .update_phone()
        .execute(ChannelId(7), "+79990000000")
        .await
        .unwrap();

    assert!(update.claimed.is_empty());
    assert!(h.scheduler.is_empty());
}

#[tokio::test]
async fn should_reject_phone_update_errors() {
    let h = Harness::new();
    h.customer(7, "+79990000000").await;
    h.store_customer(8).await;

    let no_digits = h.update_phone().execute(ChannelId(8), "call me").await;
    assert!(matches!(no_digits, Err(BookingsServiceError::InvalidPhone)));

    let unknown = h.update_phone().execute(ChannelId(9), "+79991112233").await;
    assert!(matches!(unknown, Err(BookingsServiceError::CustomerNotFound)));

    let taken = h.update_phone().execute(ChannelId(8), "89990000000").await;
    assert!(
        matches!(taken, Err(BookingsServiceError::PhoneTaken)),
        "expected PhoneTaken, got {taken:?}"
    );
}

// ── LinkBooking ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_link_booking_to_exactly_one_customer() {
    let h = Harness::new();
    h.ingest().execute(h.created_ab12()).await.unwrap();
    h.store_customer(7).await;
    h.store_customer(8).await;

    let first = h.link().execute(ChannelId(7), &code("AB12")).await.unwrap();
    assert!(matches!(first, LinkResult::Linked(_)));
    assert_eq!(h.scheduler.len(), 2);

    let again = h.link().execute(ChannelId(7), &code("AB12")).await.unwrap();
    assert!(matches!(again, LinkResult::AlreadyLinked(_)));
    assert_eq!(again.booking().customer_id, Some(ChannelId(7)));

    let other = h.link().execute(ChannelId(8), &code("AB12")).await;
    assert!(
        matches!(other, Err(BookingsServiceError::AlreadyLinkedToOther)),
        "expected AlreadyLinkedToOther, got {other:?}"
    );
    assert_eq!(
        h.store.booking(&code("AB12")).unwrap().customer_id,
        Some(ChannelId(7))
    );
}

#[tokio::test]
async fn should_reject_link_for_unknown_booking_or_customer() {
    let h = Harness::new();
    h.ingest().execute(h.created_ab12()).await.unwrap();
    h.store_customer(7).await;

    let missing = h.link().execute(ChannelId(7), &code("ZZ99")).await;
    assert!(matches!(missing, Err(BookingsServiceError::UnknownBooking)));

    let stranger = h.link().execute(ChannelId(42), &code("AB12")).await;
    assert!(matches!(stranger, Err(BookingsServiceError::CustomerNotFound)));
}

#[tokio::test]
async fn should_link_terminal_booking_without_scheduling() {
    let h = Harness::new();
    h.ingest().execute(h.created_ab12()).await.unwrap();
    h.store.set_status(&code("AB12"), BookingStatus::Completed);
    h.store_customer(7).await;

    let result = h.link().execute(ChannelId(7), &code("AB12")).await.unwrap();

    assert!(matches!(result, LinkResult::Linked(_)));
    assert!(h.scheduler.is_empty());
}

// ── ListBookings ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_list_own_bookings_by_start_time() {
    let h = Harness::new();
    let customer = h.customer(7, "+79990000000").await;
    h.ingest().execute(h.created_ab12()).await.unwrap();
    let second = h.fixture_event("contracts/webhooks/fields_phone.json", "newrega");
    h.ingest().execute(second).await.unwrap();
    h.link().execute(customer, &code("48213")).await.unwrap();
    h.store.set_status(&code("48213"), BookingStatus::Completed);
    let list = ListBookingsUseCase {
        repo: h.store.clone(),
    };

    let all = list.execute(customer, false).await.unwrap();
    let active = list.execute(customer, true).await.unwrap();

    let codes: Vec<_> = all.iter().map(|b| b.code.as_str().to_owned()).collect();
    assert_eq!(codes, vec!["AB12", "48213"]);
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].code, code("AB12"));
    assert!(list.execute(ChannelId(8), false).await.unwrap().is_empty());
}
