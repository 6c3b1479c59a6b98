//! Test utilities for Reserva services.
//!
//! Provides a manually driven clock and the recorded-payload fixture loader.
//! Import from `[dev-dependencies]` only, never in production code.

pub mod clock;
pub mod fixture;
