//! Caller-owned lookup keys.

use crate::domain::error::FundamentalsError;
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

/// Point in time a query is evaluated at.
pub type PointInTime = NaiveDateTime;

/// Opaque identifier of a tradable instrument, e.g. `AAPL R735QTJ8XC9X`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SecurityIdentifier(String);

impl SecurityIdentifier {
    pub fn new(id: &str) -> Result<Self, FundamentalsError> {
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(FundamentalsError::InvalidSecurity {
                reason: "identifier is empty".into(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SecurityIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS` (also with a `T` separator).
/// A bare date means the end of that day.
pub fn parse_point_in_time(input: &str) -> Option<PointInTime> {
    let s = input.trim();
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    date.and_hms_opt(23, 59, 59)
}
