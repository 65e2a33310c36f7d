//! Calendar date and HH:MM slot helpers.
//!
//! Slots are minute-granular naive wall-clock times. Two bookings clash only
//! when their HH:MM values are equal; seconds never take part in a comparison.

use chrono::{NaiveDate, NaiveTime, Timelike};
use thiserror::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const SLOT_FORMAT: &str = "%H:%M";

/// Date/time parsing errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SlotParseError {
    #[error("Invalid date (expected YYYY-MM-DD): {0}")]
    InvalidDate(String),

    #[error("Invalid time (expected HH:MM): {0}")]
    InvalidTime(String),
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate, SlotParseError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| SlotParseError::InvalidDate(s.to_string()))
}

/// Parse an `HH:MM` (or `HH:MM:SS`) time, dropping seconds.
pub fn parse_slot_time(s: &str) -> Result<NaiveTime, SlotParseError> {
    let trimmed = s.trim();
    NaiveTime::parse_from_str(trimmed, SLOT_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map(truncate_to_minute)
        .map_err(|_| SlotParseError::InvalidTime(s.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_slot_time(time: NaiveTime) -> String {
    time.format(SLOT_FORMAT).to_string()
}

/// Drop seconds and sub-second precision.
pub fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

/// Serde adapter storing a [`NaiveTime`] as `HH:MM`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_slot_time(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_slot_time(&raw).map_err(serde::de::Error::custom)
    }
}
