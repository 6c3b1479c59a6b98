#![allow(async_fn_in_trait)]

use axum::extract::State;
use axum::http::StatusCode;

/// Dependency check backing `GET /readyz`.
pub trait ReadinessProbe: Send + Sync {
    /// Returns `true` when the service can take traffic.
    async fn is_ready(&self) -> bool;
}

/// Handler for `GET /healthz`: liveness check.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Handler for `GET /readyz`: 503 until the probe reports ready.
pub async fn readyz<S: ReadinessProbe>(State(probe): State<S>) -> StatusCode {
    if probe.is_ready().await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
