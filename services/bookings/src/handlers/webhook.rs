use axum::{
    Json,
    body::Bytes,
    extract::{RawQuery, State},
};
use serde::Serialize;

use reserva_domain::booking::BookingStatus;

use crate::domain::event::{WebhookBody, WebhookQuery};
use crate::domain::types::CancelOutcome;
use crate::error::BookingsServiceError;
use crate::state::AppState;
use crate::usecase::ingest::{IngestEventUseCase, IngestOutcome};

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WebhookResponse {
    Scheduled {
        code: String,
        customer_id: i64,
        reminder_scheduled: bool,
        feedback_scheduled: bool,
    },
    StoredUnlinked {
        code: String,
    },
    Inactive {
        code: String,
        status: BookingStatus,
    },
    Cancelled {
        code: String,
        remote_synced: bool,
    },
    AlreadyCancelled {
        code: String,
    },
}

impl From<IngestOutcome> for WebhookResponse {
    fn from(outcome: IngestOutcome) -> Self {
        match outcome {
            IngestOutcome::Scheduled {
                code,
                customer,
                jobs,
            } => Self::Scheduled {
                code: code.to_string(),
                customer_id: customer.0,
                reminder_scheduled: jobs.reminder.is_some(),
                feedback_scheduled: jobs.feedback_request.is_some(),
            },
            IngestOutcome::StoredUnlinked { code } => Self::StoredUnlinked {
                code: code.to_string(),
            },
            IngestOutcome::Inactive { code, status } => Self::Inactive {
                code: code.to_string(),
                status,
            },
            IngestOutcome::Cancelled {
                code,
                outcome: CancelOutcome::Cancelled { remote_synced },
            } => Self::Cancelled {
                code: code.to_string(),
                remote_synced,
            },
            IngestOutcome::Cancelled {
                code,
                outcome: CancelOutcome::AlreadyCancelled,
            } => Self::AlreadyCancelled {
                code: code.to_string(),
            },
        }
    }
}

// ── POST /webhooks/reservations ──────────────────────────────────────────────

/// The body is read as raw bytes: the platform does not always send a JSON
/// content type.
pub async fn receive_reservation_event(
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
    body: Bytes,
) -> Result<Json<WebhookResponse>, BookingsServiceError> {
    let query: WebhookQuery = raw_query
        .as_deref()
        .map(serde_qs::from_str)
        .transpose()
        .map_err(|e| BookingsServiceError::MalformedEvent(format!("bad query: {e}")))?
        .unwrap_or_default();
    let body: WebhookBody = serde_json::from_slice(&body)
        .map_err(|e| BookingsServiceError::MalformedEvent(format!("bad body: {e}")))?;
    let event = state.events.normalize(&query, body)?;

    let usecase = IngestEventUseCase {
        store: state.store(),
        scheduler: state.scheduler.clone(),
        notifier: state.notifier(),
        platform: state.platform.clone(),
    };
    let outcome = usecase.execute(event).await?;
    Ok(Json(outcome.into()))
}
