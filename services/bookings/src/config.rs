use chrono::FixedOffset;
use sea_orm::ConnectOptions;
use serde::Deserialize;

use reserva_core::config::Config;
use reserva_domain::id::ChannelId;
use reserva_domain::phone::DEFAULT_COUNTRY_CODE;

/// Bookings service configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingsConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,
    /// Upper bound on waiting for a pooled connection.
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,
    /// Server-side `statement_timeout` applied to every session.
    #[serde(default = "default_db_statement_timeout_ms")]
    pub db_statement_timeout_ms: u64,
    /// TCP port for the HTTP server (default 3114). Env var: `BOOKINGS_PORT`.
    #[serde(default = "default_port")]
    pub bookings_port: u16,
    pub bot_token: String,
    #[serde(default = "default_bot_api_url")]
    pub bot_api_url: String,
    /// Reservation platform REST base. Unset disables remote cancellation.
    #[serde(default)]
    pub platform_api_url: Option<String>,
    #[serde(default)]
    pub platform_api_key: Option<String>,
    #[serde(default = "default_reminder_lead_minutes")]
    pub reminder_lead_minutes: u32,
    #[serde(default = "default_scheduler_tick_ms")]
    pub scheduler_tick_ms: u64,
    /// Offset of the venue's wall clock; platform timestamps are venue-local.
    #[serde(default = "default_venue_utc_offset_minutes")]
    pub venue_utc_offset_minutes: i32,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    /// Staff channel for booking summaries.
    #[serde(default)]
    pub support_channel_id: Option<i64>,
    #[serde(default)]
    pub venue_name: String,
    #[serde(default)]
    pub venue_address: String,
    /// Comma-separated review page URLs offered after a five-star rating.
    #[serde(default)]
    pub review_links: Vec<String>,
    #[serde(default = "default_phone_country_code")]
    pub phone_country_code: String,
}

fn default_port() -> u16 {
    3114
}

fn default_db_connect_timeout_secs() -> u64 {
    5
}

fn default_db_acquire_timeout_secs() -> u64 {
    5
}

fn default_db_statement_timeout_ms() -> u64 {
    5000
}

fn default_bot_api_url() -> String {
    "https://api.telegram.org".to_owned()
}

fn default_reminder_lead_minutes() -> u32 {
    60
}

fn default_scheduler_tick_ms() -> u64 {
    1000
}

fn default_venue_utc_offset_minutes() -> i32 {
    300
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_phone_country_code() -> String {
    DEFAULT_COUNTRY_CODE.to_owned()
}

impl Config for BookingsConfig {}

impl BookingsConfig {
    /// Pool options with connect, acquire and statement deadlines.
    pub fn database_options(&self) -> ConnectOptions {
        let separator = if self.database_url.contains('?') { '&' } else { '?' };
        let url = format!(
            "{}{separator}options=-c%20statement_timeout%3D{}",
            self.database_url, self.db_statement_timeout_ms
        );
        let mut options = ConnectOptions::new(url);
        options
            .connect_timeout(std::time::Duration::from_secs(self.db_connect_timeout_secs))
            .acquire_timeout(std::time::Duration::from_secs(self.db_acquire_timeout_secs));
        options
    }

    pub fn reminder_lead(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.reminder_lead_minutes))
    }

    pub fn scheduler_tick(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.scheduler_tick_ms.max(1))
    }

    pub fn http_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.http_timeout_secs)
    }

    /// `None` if the offset is outside ±24h.
    pub fn venue_utc_offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.venue_utc_offset_minutes.checked_mul(60)?)
    }

    pub fn support_channel(&self) -> Option<ChannelId> {
        self.support_channel_id.map(ChannelId)
    }

    pub fn review_links(&self) -> Vec<String> {
        self.review_links
            .iter()
            .map(|l| l.trim().to_owned())
            .filter(|l| !l.is_empty())
            .collect()
    }
}
