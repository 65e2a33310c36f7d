//! Appointment lifecycle state machine.
//!
//! ```text
//! scheduled ──► confirmed ──► in_progress ──► completed
//!     │  └──────────┬───────────┘   │
//!     │             ▼               ▼
//!     ├──────► no_show          cancelled ◄── (any non-terminal)
//! ```
//!
//! Transitions are methods on [`Appointment`](crate::models::Appointment).
//! Completing an appointment produces the [`PricedSummary`] handed to POS.

mod pricing;
mod transitions;

pub use pricing::*;
pub use transitions::*;

use thiserror::Error;

use crate::models::AppointmentStatus;

/// Lifecycle errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LifecycleError {
    #[error("Cannot move appointment from {from} to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Appointment is {0}; it can no longer be edited")]
    Terminal(AppointmentStatus),

    #[error("Products cannot be changed while the appointment is {0}")]
    ProductsLocked(AppointmentStatus),

    #[error("Product quantity must be greater than zero")]
    InvalidQuantity,

    #[error("Product not attached to appointment: {0}")]
    ProductNotAttached(String),

    #[error("Operator confirmation is required")]
    ConfirmationRequired,

    #[error("A cancellation reason is required")]
    MissingReason,

    #[error("Service {found} does not match the booked service {expected}")]
    ServiceMismatch { expected: String, found: String },
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;
