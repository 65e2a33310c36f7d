//! Weekly work schedule for veterinarians.
//!
//! A schedule is a single-week pattern: seven day entries indexed by
//! [`DayOfWeek`], each with an active flag and an inclusive `[start, end]`
//! window. There is no notion of multi-week rotation or timezone; every
//! value is a naive local wall-clock time.

mod work_hours;

pub use work_hours::*;

use thiserror::Error;

/// Schedule editing errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("Invalid work window for {day}: start {start} is after end {end}")]
    InvalidWindow {
        day: DayOfWeek,
        start: String,
        end: String,
    },

    #[error("Unknown day of week: {0}")]
    UnknownDay(String),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
