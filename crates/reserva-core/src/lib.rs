//! Cross-service plumbing for Reserva services: configuration, tracing,
//! health endpoints, request ids and caller identity.

pub mod config;
pub mod health;
pub mod identity;
pub mod middleware;
pub mod serde;
pub mod tracing;
