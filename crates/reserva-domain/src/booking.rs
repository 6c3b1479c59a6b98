//! Booking lifecycle enums.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a booking.
///
/// Transitions are monotone: `Active -> Cancelled` or `Active -> Completed`.
/// Nothing leaves a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Active,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    /// Parse the stored wire value. Returns `None` for unknown values.
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "cancelled" => Some(Self::Cancelled),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Active)
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        self == Self::Active && next.is_terminal()
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of timed lifecycle job attached to a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Reminder,
    FeedbackRequest,
}

impl JobKind {
    pub const ALL: [JobKind; 2] = [JobKind::Reminder, JobKind::FeedbackRequest];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reminder => "reminder",
            Self::FeedbackRequest => "feedback_request",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of outbound message recorded in the notification log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    BookingCreated,
    BookingCancelled,
    Reminder,
    FeedbackRequest,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BookingCreated => "booking_created",
            Self::BookingCancelled => "booking_cancelled",
            Self::Reminder => "reminder",
            Self::FeedbackRequest => "feedback_request",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "booking_created" => Some(Self::BookingCreated),
            "booking_cancelled" => Some(Self::BookingCancelled),
            "reminder" => Some(Self::Reminder),
            "feedback_request" => Some(Self::FeedbackRequest),
            _ => None,
        }
    }
}

impl From<JobKind> for MessageKind {
    fn from(kind: JobKind) -> Self {
        match kind {
            JobKind::Reminder => Self::Reminder,
            JobKind::FeedbackRequest => Self::FeedbackRequest,
        }
    }
}
