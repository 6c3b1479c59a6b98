//! `sea-orm` entities for the bookings service.

pub mod bookings;
pub mod customers;
pub mod feedback_sessions;
pub mod notification_log;
