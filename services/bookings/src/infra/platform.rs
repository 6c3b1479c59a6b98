use anyhow::anyhow;
use reqwest::{Client, Url};

use reserva_domain::id::BookingCode;

use crate::domain::repository::PlatformPort;
use crate::error::BookingsServiceError;

/// Reservation platform REST client. Only cancellation is pushed upstream.
#[derive(Clone)]
pub struct HttpPlatformClient {
    client: Client,
    base_url: Option<String>,
    api_key: Option<String>,
}

impl HttpPlatformClient {
    /// Without `base_url` every call fails with `PlatformUnavailable`.
    pub fn new(client: Client, base_url: Option<&str>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url
                .map(|u| u.trim_end_matches('/').to_owned())
                .filter(|u| !u.is_empty()),
            api_key,
        }
    }

    fn cancel_url(&self, code: &BookingCode) -> Result<Url, BookingsServiceError> {
        let base = self.base_url.as_deref().ok_or_else(|| {
            BookingsServiceError::PlatformUnavailable(anyhow!("platform API is not configured"))
        })?;
        let mut url = Url::parse(base).map_err(|e| {
            BookingsServiceError::PlatformUnavailable(
                anyhow::Error::new(e).context("invalid platform API url"),
            )
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                BookingsServiceError::PlatformUnavailable(anyhow!(
                    "platform API url cannot carry a path"
                ))
            })?
            .pop_if_empty()
            .extend(["bookings", code.as_str(), "cancel"]);
        Ok(url)
    }
}

impl PlatformPort for HttpPlatformClient {
    async fn cancel_booking(&self, code: &BookingCode) -> Result<(), BookingsServiceError> {
        let url = self.cancel_url(code)?;
        let mut req = self.client.post(url);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        req.send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| {
                BookingsServiceError::PlatformUnavailable(
                    anyhow::Error::new(e).context(format!("cancel booking {code}")),
                )
            })?;
        Ok(())
    }
}
