pub mod booking;
pub mod customer;
pub mod webhook;
