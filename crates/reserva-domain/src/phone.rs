//! Phone canonicalization.
//!
//! The canonical phone is the only key used to match a reservation to a known
//! customer, so every phone that enters the system goes through
//! [`PhoneNormalizer::normalize`] first.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Country code prepended to national numbers when none is configured.
pub const DEFAULT_COUNTRY_CODE: &str = "7";

/// National trunk prefix replaced by the country code in 11-digit numbers.
pub const DEFAULT_TRUNK_DIGIT: char = '8';

/// Phone number in international `+<digits>` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalPhone(String);

impl CanonicalPhone {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wrap a value already stored in canonical form (e.g. read back from the store).
    pub fn from_canonical(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for CanonicalPhone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Converts arbitrary phone spellings into [`CanonicalPhone`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNormalizer {
    country_code: String,
    trunk_digit: char,
}

impl Default for PhoneNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTRY_CODE)
    }
}

impl PhoneNormalizer {
    pub fn new(country_code: impl Into<String>) -> Self {
        Self {
            country_code: country_code.into(),
            trunk_digit: DEFAULT_TRUNK_DIGIT,
        }
    }

    /// Normalize `raw`. Returns `None` when it contains no digits at all.
    ///
    /// - non-digits are stripped first;
    /// - 11 digits starting with the trunk digit: trunk digit becomes the country code;
    /// - 10 digits: country code is prepended;
    /// - anything else is taken as already international.
    pub fn normalize(&self, raw: &str) -> Option<CanonicalPhone> {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return None;
        }
        let canonical = if digits.len() == 11 && digits.starts_with(self.trunk_digit) {
            format!("+{}{}", self.country_code, &digits[1..])
        } else if digits.len() == 10 {
            format!("+{}{}", self.country_code, digits)
        } else {
            format!("+{digits}")
        };
        Some(CanonicalPhone(canonical))
    }
}

/// Normalize with the default country code.
pub fn normalize_phone(raw: &str) -> Option<CanonicalPhone> {
    PhoneNormalizer::default().normalize(raw)
}
