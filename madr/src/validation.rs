//! Storage-independent request validation
//!
//! Partial updates are modeled with [`Field`], which keeps "absent" and
//! "explicitly null" apart from "present". [`require_any`] enforces the
//! at-least-one-field rule before anything touches the database.

use std::sync::LazyLock;

use chrono::Datelike;
use regex::Regex;
use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};
use crate::messages;

/// How far past the current year a year filter may reach
pub const YEAR_FILTER_HORIZON: i32 = 20;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
        .expect("email regex is valid")
});

/// One field of a partial-update payload
///
/// Use with `#[serde(default)]` so a missing key deserializes to
/// [`Field::Absent`] while `null` becomes [`Field::Null`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    /// Key not sent
    Absent,
    /// Key sent as `null`
    Null,
    /// Key sent with a value
    Present(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Absent
    }
}

impl<'de, T> Deserialize<'de> for Field<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Field::Present(value),
            None => Field::Null,
        })
    }
}

impl<T> Field<T> {
    /// Whether the field carries a usable value
    pub fn is_provided(&self) -> bool {
        matches!(self, Field::Present(_))
    }

    /// The value, treating null the same as absent
    pub fn into_option(self) -> Option<T> {
        match self {
            Field::Present(value) => Some(value),
            Field::Absent | Field::Null => None,
        }
    }
}

/// Fail with `DATA_MISSING_FIELDS` unless at least one flag is set
pub fn require_any(provided: &[bool]) -> Result<()> {
    if provided.iter().any(|p| *p) {
        Ok(())
    } else {
        Err(Error::ValidationError(messages::DATA_MISSING_FIELDS.to_string()))
    }
}

/// Trim an email address and check its syntax
pub fn validate_email(email: &str) -> Result<String> {
    let email = email.trim();
    if EMAIL_RE.is_match(email) {
        Ok(email.to_string())
    } else {
        Err(Error::ValidationError(messages::INVALID_EMAIL.to_string()))
    }
}

/// Reject a value that normalized down to nothing
pub fn require_non_empty(field: &str, value: String) -> Result<String> {
    if value.is_empty() {
        Err(Error::ValidationError(messages::empty_field(field)))
    } else {
        Ok(value)
    }
}

/// Page numbers are 1-indexed
pub fn validate_page(page: i64) -> Result<u64> {
    if page < 1 {
        return Err(Error::ValidationError(messages::INVALID_PAGE.to_string()));
    }
    Ok(page as u64)
}

/// Upper bound for the year filter relative to `current_year`
pub fn validate_year_filter(year: i32, current_year: i32) -> Result<i32> {
    let max = current_year + YEAR_FILTER_HORIZON;
    if year > max {
        return Err(Error::ValidationError(messages::year_out_of_range(max)));
    }
    Ok(year)
}

/// The current calendar year in UTC
pub fn current_year() -> i32 {
    chrono::Utc::now().year()
}
