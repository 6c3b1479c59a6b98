//! Domain types shared across Reserva services.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; never in `infra/` or `handlers/`.

pub mod booking;
pub mod clock;
pub mod id;
pub mod phone;
pub mod rating;
