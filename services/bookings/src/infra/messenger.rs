use anyhow::anyhow;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use reserva_domain::id::ChannelId;

use crate::domain::repository::MessengerPort;
use crate::error::BookingsServiceError;

/// Bot API `sendMessage` client.
#[derive(Clone)]
pub struct TelegramMessenger {
    client: Client,
    base_url: String,
    token: String,
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramMessenger {
    /// `client` should carry the outbound request timeout.
    pub fn new(client: Client, base_url: &str, token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            token: token.into(),
        }
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.base_url, self.token)
    }
}

impl MessengerPort for TelegramMessenger {
    async fn send(&self, to: ChannelId, text: &str) -> Result<(), BookingsServiceError> {
        // The URL embeds the bot token; keep it out of errors and logs.
        let resp = self
            .client
            .post(self.send_message_url())
            .json(&SendMessageRequest { chat_id: to.0, text })
            .send()
            .await
            .map_err(|e| delivery_failed(e.without_url(), "sendMessage request"))?;
        let status = resp.status();
        let body: ApiResponse = resp
            .json()
            .await
            .map_err(|e| delivery_failed(e.without_url(), "decode sendMessage response"))?;
        if !body.ok {
            return Err(BookingsServiceError::DeliveryFailed(anyhow!(
                "sendMessage rejected ({status}): {}",
                body.description.unwrap_or_default()
            )));
        }
        Ok(())
    }
}

fn delivery_failed(err: reqwest::Error, what: &'static str) -> BookingsServiceError {
    BookingsServiceError::DeliveryFailed(anyhow::Error::new(err).context(what))
}
