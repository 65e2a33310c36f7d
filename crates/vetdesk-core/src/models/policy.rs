//! Clinic booking policy.

use serde::{Deserialize, Serialize};

/// Toggles controlling which conflict rules the validator enforces.
///
/// Passed by value into every validation; never read from ambient state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClinicPolicy {
    /// Reject a second booking for the same animal in the same slot
    pub prevent_animal_double_booking: bool,
    /// Reject a second booking for the same veterinarian in the same slot
    pub prevent_vet_double_booking: bool,
    /// Reject bookings outside the veterinarian's work schedule
    pub prevent_booking_outside_work_hours: bool,
    /// Exempt exam-category services from both double-booking checks
    pub allow_double_booking_for_exam_services: bool,
}

impl ClinicPolicy {
    /// Policy with every check disabled.
    pub fn permissive() -> Self {
        Self {
            prevent_animal_double_booking: false,
            prevent_vet_double_booking: false,
            prevent_booking_outside_work_hours: false,
            allow_double_booking_for_exam_services: true,
        }
    }
}

impl Default for ClinicPolicy {
    fn default() -> Self {
        Self {
            prevent_animal_double_booking: true,
            prevent_vet_double_booking: true,
            prevent_booking_outside_work_hours: true,
            allow_double_booking_for_exam_services: false,
        }
    }
}
