//! Booking conflict validation.
//!
//! Pipeline: Required fields → Work hours → Exam exemption → Animal clash → Vet clash
//!
//! [`validate`] is a pure decision function. Persisting an accepted booking,
//! and making validate-then-commit atomic, is the caller's job; see
//! [`AppointmentBook`] for the SQLite-backed coordinator.

mod book;
mod index;
mod validator;

pub use book::*;
pub use index::*;
pub use validator::*;

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::ServiceCategory;

/// A candidate booking, built per validation call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingRequest {
    pub animal_id: Option<String>,
    pub veterinarian_id: Option<String>,
    pub service_category: ServiceCategory,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    /// Appointment being edited, ignored in clash comparisons
    pub exclude_appointment_id: Option<String>,
}

impl BookingRequest {
    /// Request with every slot field filled in.
    pub fn new(
        animal_id: impl Into<String>,
        service_category: ServiceCategory,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Self {
        Self {
            animal_id: Some(animal_id.into()),
            veterinarian_id: None,
            service_category,
            date: Some(date),
            time: Some(time),
            exclude_appointment_id: None,
        }
    }

    pub fn with_veterinarian(mut self, veterinarian_id: impl Into<String>) -> Self {
        self.veterinarian_id = Some(veterinarian_id.into());
        self
    }

    pub fn excluding(mut self, appointment_id: impl Into<String>) -> Self {
        self.exclude_appointment_id = Some(appointment_id.into());
        self
    }
}

/// Field reported by [`RejectionReason::MissingRequiredField`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    Animal,
    Date,
    Time,
    Veterinarian,
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RequiredField::Animal => "animal",
            RequiredField::Date => "date",
            RequiredField::Time => "time",
            RequiredField::Veterinarian => "veterinarian",
        };
        f.write_str(label)
    }
}

/// Why a booking was refused.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    MissingRequiredField(RequiredField),
    VeterinarianUnavailable,
    AnimalDoubleBooked,
    VeterinarianDoubleBooked,
}

impl RejectionReason {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            RejectionReason::MissingRequiredField(_) => "missing_required_field",
            RejectionReason::VeterinarianUnavailable => "veterinarian_unavailable",
            RejectionReason::AnimalDoubleBooked => "animal_double_booked",
            RejectionReason::VeterinarianDoubleBooked => "veterinarian_double_booked",
        }
    }

    /// Message shown verbatim to the operator.
    pub fn message(&self) -> String {
        match self {
            RejectionReason::MissingRequiredField(field) => {
                format!("Please fill in all required fields ({} is missing).", field)
            }
            RejectionReason::VeterinarianUnavailable => {
                "The selected veterinarian does not work at this date and time.".to_string()
            }
            RejectionReason::AnimalDoubleBooked => {
                "This animal already has an appointment at this date and time.".to_string()
            }
            RejectionReason::VeterinarianDoubleBooked => {
                "The selected veterinarian already has an appointment at this date and time."
                    .to_string()
            }
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Outcome of [`validate`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingDecision {
    Accepted,
    Rejected(RejectionReason),
}

impl BookingDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, BookingDecision::Accepted)
    }

    pub fn rejection(&self) -> Option<RejectionReason> {
        match self {
            BookingDecision::Accepted => None,
            BookingDecision::Rejected(reason) => Some(*reason),
        }
    }
}
