//! Vaccine dose recurrence.
//!
//! A multi-dose series is generated in one batch when the first dose is
//! registered. Later entries then move independently: `scheduled` →
//! `applied` or `scheduled` → `canceled`. Ordering between entries is not
//! enforced, so a later dose can be canceled while an earlier one is still
//! scheduled.

mod generator;
mod records;

pub use generator::*;
pub use records::*;

use thiserror::Error;

use crate::db::DbError;
use crate::models::DoseStatus;

/// Dose errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DoseError {
    #[error("Date arithmetic overflowed after dose {0}")]
    DateOverflow(u32),

    #[error("Dose {sequence} is {status:?} and can no longer change")]
    NotScheduled { sequence: u32, status: DoseStatus },

    #[error("A cancellation reason is required")]
    MissingReason,

    #[error("Too many doses in one series: {0}")]
    TooManyDoses(u32),
}

/// Upper bound on the length of a generated series.
pub const MAX_DOSES: u32 = 24;

pub type DoseResult<T> = Result<T, DoseError>;

/// Vaccination log errors.
#[derive(Error, Debug)]
pub enum VaccinationError {
    #[error("Dose error: {0}")]
    Dose(#[from] DoseError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("No standard protocol named {0}")]
    UnknownProtocol(String),

    #[error("Vaccine name is required")]
    MissingVaccine,
}

pub type VaccinationResult<T> = Result<T, VaccinationError>;
