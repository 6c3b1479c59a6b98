//! Messaging-channel identity extractor.

use axum::extract::FromRequestParts;
use http::StatusCode;
use http::request::Parts;

/// Header carrying the caller's messaging-channel id, injected by the bot front-end.
pub const CHANNEL_ID_HEADER: &str = "x-reserva-channel-id";

/// Customer identity of a customer-facing request.
///
/// Returns 401 if `x-reserva-channel-id` is absent or not an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelIdentity {
    pub channel_id: i64,
}

impl<S> FromRequestParts<S> for ChannelIdentity
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let channel_id = parts
            .headers
            .get(CHANNEL_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<i64>().ok());

        async move {
            let Some(channel_id) = channel_id else {
                tracing::debug!(header = CHANNEL_ID_HEADER, "channel identity rejected");
                return Err(StatusCode::UNAUTHORIZED);
            };
            Ok(Self { channel_id })
        }
    }
}
