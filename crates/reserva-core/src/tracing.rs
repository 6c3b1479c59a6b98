use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured stdout tracing. Call once at service startup.
///
/// Uses JSON format. `RUST_LOG` wins when set; otherwise `default_directives`
/// (e.g. `"info,reserva_bookings=debug"`) is used.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing(default_directives: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_target(true))
        .try_init();
}
