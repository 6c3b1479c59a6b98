use chrono::{TimeZone, Utc};

use reserva_bookings::error::BookingsServiceError;
use reserva_domain::id::ChannelId;

use crate::helpers::{Harness, code};

/// AB12 linked to customer 7 with its feedback request already delivered.
async fn awaiting_rating() -> (Harness, ChannelId) {
    let h = Harness::new();
    let customer = h.customer(7, "+79990000000").await;
    h.ingest().execute(h.created_ab12()).await.unwrap();
    h.clock
        .advance_to(Utc.with_ymd_and_hms(2025, 7, 1, 14, 0, 0).unwrap());
    assert_eq!(h.scheduler.run_due(&h.job_handler()).await, 2);
    (h, customer)
}

#[tokio::test]
async fn should_reject_out_of_range_and_keep_waiting() {
    let (h, customer) = awaiting_rating().await;

    for text in ["0", "6", "-1", "100"] {
        let result = h.rating().execute(customer, text).await;
        assert!(
            matches!(result, Err(BookingsServiceError::OutOfRange)),
            "{text:?}: expected OutOfRange, got {result:?}"
        );
    }
    let result = h.rating().execute(customer, "five").await;
    assert!(matches!(result, Err(BookingsServiceError::NotANumber)));

    assert!(h.store.session(customer).is_some());
    assert_eq!(h.store.booking(&code("AB12")).unwrap().rating, None);
}

#[tokio::test]
async fn should_accept_rating_without_review_links_below_five() {
    let (h, customer) = awaiting_rating().await;

    let receipt = h.rating().execute(customer, "3").await.unwrap();

    assert_eq!(receipt.rating.value(), 3);
    assert!(receipt.review_links.is_empty());
    assert_eq!(h.store.session(customer), None);
}

#[tokio::test]
async fn should_reject_second_rating_for_same_booking() {
    let (h, customer) = awaiting_rating().await;
    h.rating().execute(customer, "4").await.unwrap();

    let second = h.rating().execute(customer, "5").await;

    assert!(
        matches!(second, Err(BookingsServiceError::AlreadyRated)),
        "expected AlreadyRated, got {second:?}"
    );
    assert_eq!(
        h.store.booking(&code("AB12")).unwrap().rating.map(|r| r.value()),
        Some(4)
    );
}

#[tokio::test]
async fn should_rate_from_log_when_session_is_gone() {
    let (h, customer) = awaiting_rating().await;
    h.store.state.lock().unwrap().sessions.clear();

    let receipt = h.rating().execute(customer, "5").await.unwrap();

    assert_eq!(receipt.booking_code, code("AB12"));
}

#[tokio::test]
async fn should_report_no_pending_feedback_for_customer_never_asked() {
    let h = Harness::new();
    let customer = h.customer(7, "+79990000000").await;

    let result = h.rating().execute(customer, "5").await;

    assert!(matches!(result, Err(BookingsServiceError::NoPendingFeedback)));
}
