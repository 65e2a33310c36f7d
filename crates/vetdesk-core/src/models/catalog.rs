//! Clinic catalog models: services, products and veterinarians.
//!
//! The booking core only reads availability-relevant fields from these; all
//! other fields are carried for the store and the POS export.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::schedule::WorkSchedule;

/// Service category, used by the validator for the veterinarian requirement
/// and the exam double-booking exemption.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    Consultation,
    Exam,
    Vaccination,
    Surgery,
    Grooming,
    Hospitalization,
}

impl ServiceCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceCategory::Consultation => "consultation",
            ServiceCategory::Exam => "exam",
            ServiceCategory::Vaccination => "vaccination",
            ServiceCategory::Surgery => "surgery",
            ServiceCategory::Grooming => "grooming",
            ServiceCategory::Hospitalization => "hospitalization",
        }
    }

    /// Whether a booking in this category must name a veterinarian.
    pub fn requires_veterinarian(self) -> bool {
        !matches!(self, ServiceCategory::Grooming)
    }

    pub fn is_exam(self) -> bool {
        matches!(self, ServiceCategory::Exam)
    }
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "consultation" => Ok(ServiceCategory::Consultation),
            "exam" => Ok(ServiceCategory::Exam),
            "vaccination" | "vaccine" => Ok(ServiceCategory::Vaccination),
            "surgery" => Ok(ServiceCategory::Surgery),
            "grooming" | "bath_grooming" => Ok(ServiceCategory::Grooming),
            "hospitalization" => Ok(ServiceCategory::Hospitalization),
            other => Err(format!("Unknown service category: {}", other)),
        }
    }
}

/// A bookable service from the clinic's catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceType {
    /// Unique service ID
    pub id: String,
    /// Display name (e.g., "Routine consultation")
    pub name: String,
    /// Category driving validation rules
    pub category: ServiceCategory,
    /// Base price charged on completion
    pub price: f64,
    /// Nominal duration, informational only (clashes are slot-exact)
    pub duration_minutes: u32,
    /// Whether the service can still be booked
    pub active: bool,
}

impl ServiceType {
    /// Create a new active service.
    pub fn new(name: String, category: ServiceCategory, price: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            category,
            price,
            duration_minutes: 30,
            active: true,
        }
    }
}

/// A product that can be consumed during an appointment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Price per unit
    pub unit_price: f64,
    /// Whether the product is still sold
    pub active: bool,
}

impl Product {
    pub fn new(name: String, unit_price: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            unit_price,
            active: true,
        }
    }
}

/// A veterinarian and their weekly availability.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Veterinarian {
    /// Unique veterinarian ID
    pub id: String,
    /// Full name
    pub name: String,
    /// Professional license number
    pub license_number: Option<String>,
    /// Weekly availability; `None` means no work-hours restriction
    pub work_schedule: Option<WorkSchedule>,
    /// Whether the veterinarian can receive bookings
    pub active: bool,
}

impl Veterinarian {
    /// Create a new veterinarian with the default business-hours schedule.
    pub fn new(name: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            license_number: None,
            work_schedule: Some(WorkSchedule::business_default()),
            active: true,
        }
    }
}
