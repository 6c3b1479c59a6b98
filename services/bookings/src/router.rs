use axum::{
    Router,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use reserva_core::health::{healthz, readyz};
use reserva_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    booking::{cancel_booking, link_booking},
    customer::{list_bookings, register_customer, submit_feedback, update_phone},
    webhook::receive_reservation_event,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz::<AppState>))
        // Reservation platform
        .route("/webhooks/reservations", post(receive_reservation_event))
        // Customers
        .route("/customers", post(register_customer))
        .route("/customers/@me/phone", put(update_phone))
        .route("/customers/@me/bookings", get(list_bookings))
        .route("/customers/@me/bookings/{code}/link", post(link_booking))
        .route("/customers/@me/bookings/{code}/cancel", post(cancel_booking))
        .route("/customers/@me/feedback", post(submit_feedback))
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(TraceLayer::new_for_http())
                .layer(propagate_request_id_layer()),
        )
        .with_state(state)
}
