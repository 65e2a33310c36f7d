//! Vaccination dose models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Status of a single dose in a schedule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DoseStatus {
    /// Dose administered
    Applied,
    /// Dose planned for `application_date`
    Scheduled,
    /// Dose will not be given (final)
    Canceled,
}

impl DoseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DoseStatus::Applied => "applied",
            DoseStatus::Scheduled => "scheduled",
            DoseStatus::Canceled => "canceled",
        }
    }
}

/// One entry of a multi-dose schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoseScheduleEntry {
    /// 1-based position in the series
    pub sequence_number: u32,
    /// Date the dose is (or was) given
    pub application_date: NaiveDate,
    /// Days until the following dose
    pub due_interval_days: u32,
    /// `application_date + due_interval_days`
    pub next_due: NaiveDate,
    pub status: DoseStatus,
    /// Mandatory when `status` is `Canceled`
    pub cancellation_reason: Option<String>,
}

/// A persisted dose for one animal and vaccine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VaccinationRecord {
    pub id: String,
    pub animal_id: String,
    pub vaccine_name: String,
    pub veterinarian_id: Option<String>,
    /// Groups the doses generated together
    pub series_id: String,
    pub dose: DoseScheduleEntry,
}

impl VaccinationRecord {
    pub fn new(
        animal_id: String,
        vaccine_name: String,
        series_id: String,
        dose: DoseScheduleEntry,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            animal_id,
            vaccine_name,
            veterinarian_id: None,
            series_id,
            dose,
        }
    }
}

/// Standard dose count and spacing for a vaccine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VaccineProtocol {
    pub name: String,
    pub dose_count: u32,
    pub interval_days: u32,
}

impl VaccineProtocol {
    pub fn new(name: &str, dose_count: u32, interval_days: u32) -> Self {
        Self {
            name: name.to_string(),
            dose_count,
            interval_days,
        }
    }

    /// Common canine and feline primary series.
    pub fn standard_protocols() -> Vec<VaccineProtocol> {
        vec![
            VaccineProtocol::new("V10", 3, 21),
            VaccineProtocol::new("V8", 3, 21),
            VaccineProtocol::new("Feline V4", 2, 21),
            VaccineProtocol::new("Rabies", 1, 365),
            VaccineProtocol::new("Giardia", 2, 21),
            VaccineProtocol::new("Kennel Cough", 1, 365),
        ]
    }

    /// Look up a standard protocol by name, case-insensitive.
    pub fn find_standard(name: &str) -> Option<VaccineProtocol> {
        Self::standard_protocols()
            .into_iter()
            .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
    }
}
