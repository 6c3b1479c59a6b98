//! Customer feedback rating.

use serde::{Deserialize, Serialize};

/// Lowest accepted rating.
pub const MIN_RATING: u8 = 1;

/// Highest accepted rating; also the score that triggers the review prompt.
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RatingError {
    #[error("rating is not a number")]
    NotANumber,
    #[error("rating must be between 1 and 5")]
    OutOfRange,
}

/// A validated 1–5 rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    pub fn new(value: i64) -> Result<Self, RatingError> {
        if (i64::from(MIN_RATING)..=i64::from(MAX_RATING)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(RatingError::OutOfRange)
        }
    }

    /// Parse free text typed by the customer (surrounding whitespace allowed).
    pub fn parse(text: &str) -> Result<Self, RatingError> {
        let value: i64 = text
            .trim()
            .parse()
            .map_err(|_| RatingError::NotANumber)?;
        Self::new(value)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_top(self) -> bool {
        self.0 == MAX_RATING
    }
}
