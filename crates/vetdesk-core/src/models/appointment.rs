//! Appointment models.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::slot::{self, truncate_to_minute};

/// Execution state of an appointment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Accepted by the validator, not yet confirmed
    Scheduled,
    /// Confirmed with the tutor
    Confirmed,
    /// Service started
    InProgress,
    /// Payment confirmed (terminal)
    Completed,
    /// Cancelled by an operator (terminal)
    Cancelled,
    /// Tutor did not show up (terminal)
    NoShow,
}

impl AppointmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::InProgress => "in_progress",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::NoShow => "no_show",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled | AppointmentStatus::NoShow
        )
    }

    /// Products may be attached or removed only in these states.
    pub fn accepts_products(self) -> bool {
        matches!(
            self,
            AppointmentStatus::Scheduled | AppointmentStatus::Confirmed | AppointmentStatus::InProgress
        )
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A product line consumed during an appointment.
///
/// Name and unit price are captured when the product is attached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentProduct {
    pub product_id: String,
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
}

impl AppointmentProduct {
    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

/// A booked appointment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    /// Unique appointment ID
    pub id: String,
    /// Animal being seen
    pub animal_id: String,
    /// Assigned veterinarian (absent for services that need none)
    pub veterinarian_id: Option<String>,
    /// Booked service
    pub service_type_id: String,
    /// Room, if any
    pub room_id: Option<String>,
    /// Calendar date of the slot
    pub date: NaiveDate,
    /// HH:MM slot
    #[serde(with = "slot::hhmm")]
    pub time: NaiveTime,
    /// Lifecycle state
    pub status: AppointmentStatus,
    /// Products attached during execution
    pub products: Vec<AppointmentProduct>,
    /// Service price plus products, set on completion
    pub total_price: f64,
    /// Free-form notes
    pub notes: Option<String>,
    /// Reason recorded on cancellation
    pub cancellation_reason: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Appointment {
    /// Create a new appointment in the `scheduled` state.
    pub fn new(animal_id: String, service_type_id: String, date: NaiveDate, time: NaiveTime) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            animal_id,
            veterinarian_id: None,
            service_type_id,
            room_id: None,
            date,
            time: truncate_to_minute(time),
            status: AppointmentStatus::Scheduled,
            products: Vec::new(),
            total_price: 0.0,
            notes: None,
            cancellation_reason: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Whether this appointment occupies the given date and HH:MM slot.
    pub fn occupies(&self, date: NaiveDate, time: NaiveTime) -> bool {
        self.date == date && self.time == truncate_to_minute(time)
    }

    /// Sum of attached product lines.
    pub fn products_total(&self) -> f64 {
        self.products.iter().map(AppointmentProduct::line_total).sum()
    }

    /// Touch the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}
