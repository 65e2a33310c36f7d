//! Vetdesk Core Library
//!
//! Appointment booking engine for veterinary clinics: conflict validation,
//! appointment lifecycle and vaccine dose scheduling.
//!
//! # Architecture
//!
//! ```text
//! Booking form
//!      │
//!      ▼
//! Booking Conflict Validator ◄── WorkSchedule + ClinicPolicy + appointments on the date
//!      │ accepted
//!      ▼
//! Appointment (scheduled) ──► confirmed ──► in_progress ──► completed
//!      │                                        │               │
//!      └──► cancelled / no_show          products attached      ▼
//!                                                         Pending sale ──► POS export
//!
//! First vaccine dose ──► Dose Recurrence Generator ──► scheduled follow-up doses
//! ```
//!
//! The validator, state machine and dose generator are pure. The SQLite
//! store wraps each validate-then-commit in one immediate transaction.
//!
//! # Modules
//!
//! - [`schedule`]: weekly work schedules
//! - [`booking`]: conflict validator, slot index and the appointment book
//! - [`lifecycle`]: status transitions, products and pricing
//! - [`doses`]: dose recurrence and the vaccination log
//! - [`db`]: SQLite store
//! - [`export`]: pending sale export for the point of sale
//! - [`config`]: environment configuration

pub mod booking;
pub mod config;
pub mod db;
pub mod doses;
pub mod export;
pub mod lifecycle;
pub mod models;
pub mod schedule;

// Re-export commonly used types
pub use booking::{
    validate, AppointmentBook, BookingDecision, BookingOutcome, BookingRequest, NewAppointment,
    RejectionReason, SlotIndex, SlotLookup,
};
pub use config::ClinicConfig;
pub use db::Database;
pub use doses::{generate_doses, FirstDose, VaccinationLog};
pub use lifecycle::{AppointmentEdit, PricedSummary};
pub use models::{
    Appointment, AppointmentStatus, ClinicPolicy, DoseScheduleEntry, DoseStatus, PendingSale,
    Product, ServiceCategory, ServiceType, VaccinationRecord, Veterinarian,
};
pub use schedule::{DayOfWeek, DaySchedule, WorkSchedule};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use models::slot::{format_date, format_slot_time, parse_date, parse_slot_time, SlotParseError};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum VetdeskError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Lifecycle error: {0}")]
    LifecycleError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl From<db::DbError> for VetdeskError {
    fn from(e: db::DbError) -> Self {
        VetdeskError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for VetdeskError {
    fn from(e: serde_json::Error) -> Self {
        VetdeskError::SerializationError(e.to_string())
    }
}

impl From<SlotParseError> for VetdeskError {
    fn from(e: SlotParseError) -> Self {
        VetdeskError::InvalidInput(e.to_string())
    }
}

impl From<schedule::ScheduleError> for VetdeskError {
    fn from(e: schedule::ScheduleError) -> Self {
        VetdeskError::InvalidInput(e.to_string())
    }
}

impl From<lifecycle::LifecycleError> for VetdeskError {
    fn from(e: lifecycle::LifecycleError) -> Self {
        VetdeskError::LifecycleError(e.to_string())
    }
}

impl From<booking::BookingError> for VetdeskError {
    fn from(e: booking::BookingError) -> Self {
        match e {
            booking::BookingError::Database(e) => e.into(),
            booking::BookingError::Lifecycle(e) => e.into(),
            e @ booking::BookingError::NotFound { .. } => VetdeskError::NotFound(e.to_string()),
        }
    }
}

impl From<doses::VaccinationError> for VetdeskError {
    fn from(e: doses::VaccinationError) -> Self {
        match e {
            doses::VaccinationError::Database(e) => e.into(),
            e @ doses::VaccinationError::NotFound { .. } => VetdeskError::NotFound(e.to_string()),
            e => VetdeskError::InvalidInput(e.to_string()),
        }
    }
}

impl From<anyhow::Error> for VetdeskError {
    fn from(e: anyhow::Error) -> Self {
        VetdeskError::ConfigurationError(format!("{:#}", e))
    }
}

impl<T> From<std::sync::PoisonError<T>> for VetdeskError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        VetdeskError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a clinic database at the given path.
#[uniffi::export]
pub fn open_clinic(path: String) -> Result<Arc<VetdeskCore>, VetdeskError> {
    let db = Database::open(&path)?;
    db.seed_policy(&ClinicPolicy::default())?;
    Ok(VetdeskCore::wrap(db))
}

/// Create an in-memory clinic database (for testing).
#[uniffi::export]
pub fn open_clinic_in_memory() -> Result<Arc<VetdeskCore>, VetdeskError> {
    let db = Database::open_in_memory()?;
    Ok(VetdeskCore::wrap(db))
}

/// Open the clinic database named by `VETDESK_DATABASE_PATH`.
#[uniffi::export]
pub fn open_clinic_from_env() -> Result<Arc<VetdeskCore>, VetdeskError> {
    let db = ClinicConfig::from_env()?.open_database()?;
    Ok(VetdeskCore::wrap(db))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
#[derive(uniffi::Object)]
pub struct VetdeskCore {
    db: Arc<Mutex<Database>>,
}

impl VetdeskCore {
    fn wrap(db: Database) -> Arc<Self> {
        Arc::new(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }
}

#[uniffi::export]
impl VetdeskCore {
    // =========================================================================
    // Catalog Operations
    // =========================================================================

    /// Add or update a veterinarian. The work schedule is left untouched.
    pub fn upsert_veterinarian(&self, vet: FfiVeterinarian) -> Result<(), VetdeskError> {
        let db = self.db.lock()?;
        let work_schedule = db
            .get_veterinarian(&vet.id)?
            .map(|existing| existing.work_schedule)
            .unwrap_or_else(|| Some(WorkSchedule::business_default()));
        db.upsert_veterinarian(&Veterinarian {
            id: vet.id,
            name: vet.name,
            license_number: vet.license_number,
            work_schedule,
            active: vet.active,
        })?;
        Ok(())
    }

    pub fn get_veterinarian(&self, id: String) -> Result<Option<FfiVeterinarian>, VetdeskError> {
        let db = self.db.lock()?;
        Ok(db.get_veterinarian(&id)?.map(Into::into))
    }

    pub fn list_veterinarians(&self, active_only: bool) -> Result<Vec<FfiVeterinarian>, VetdeskError> {
        let db = self.db.lock()?;
        Ok(db
            .list_veterinarians(active_only)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Add or update a service type.
    pub fn upsert_service_type(&self, service: FfiServiceType) -> Result<(), VetdeskError> {
        let db = self.db.lock()?;
        db.upsert_service_type(&service.try_into()?)?;
        Ok(())
    }

    pub fn list_service_types(&self, active_only: bool) -> Result<Vec<FfiServiceType>, VetdeskError> {
        let db = self.db.lock()?;
        Ok(db
            .list_service_types(active_only)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Add or update a product.
    pub fn upsert_product(&self, product: FfiProduct) -> Result<(), VetdeskError> {
        let db = self.db.lock()?;
        db.upsert_product(&Product {
            id: product.id,
            name: product.name,
            unit_price: product.unit_price,
            active: product.active,
        })?;
        Ok(())
    }

    pub fn list_products(&self, active_only: bool) -> Result<Vec<FfiProduct>, VetdeskError> {
        let db = self.db.lock()?;
        Ok(db
            .list_products(active_only)?
            .into_iter()
            .map(|p| FfiProduct {
                id: p.id,
                name: p.name,
                unit_price: p.unit_price,
                active: p.active,
            })
            .collect())
    }

    // =========================================================================
    // Schedule & Policy Operations
    // =========================================================================

    /// Weekly schedule of a veterinarian, Sunday first. `None` means unrestricted.
    pub fn get_work_schedule(
        &self,
        veterinarian_id: String,
    ) -> Result<Option<Vec<FfiDaySchedule>>, VetdeskError> {
        let db = self.db.lock()?;
        let vet = db
            .get_veterinarian(&veterinarian_id)?
            .ok_or_else(|| VetdeskError::NotFound(format!("Veterinarian {}", veterinarian_id)))?;
        Ok(vet.work_schedule.map(|schedule| {
            schedule
                .iter()
                .map(|(day, entry)| FfiDaySchedule {
                    day: day.as_str().to_string(),
                    active: entry.active,
                    start: format_slot_time(entry.start),
                    end: format_slot_time(entry.end),
                })
                .collect()
        }))
    }

    /// Replace a veterinarian's schedule. Days not listed keep the business default.
    pub fn set_work_schedule(
        &self,
        veterinarian_id: String,
        days: Option<Vec<FfiDaySchedule>>,
    ) -> Result<(), VetdeskError> {
        let schedule = days
            .map(|days| {
                let mut schedule = WorkSchedule::business_default();
                for entry in days {
                    let day: DayOfWeek = entry.day.parse()?;
                    schedule.set_day(
                        day,
                        DaySchedule::new(
                            entry.active,
                            parse_slot_time(&entry.start)?,
                            parse_slot_time(&entry.end)?,
                        ),
                    )?;
                }
                Ok::<_, VetdeskError>(schedule)
            })
            .transpose()?;

        let db = self.db.lock()?;
        if !db.update_work_schedule(&veterinarian_id, schedule.as_ref())? {
            return Err(VetdeskError::NotFound(format!(
                "Veterinarian {}",
                veterinarian_id
            )));
        }
        Ok(())
    }

    pub fn get_policy(&self) -> Result<FfiClinicPolicy, VetdeskError> {
        let db = self.db.lock()?;
        Ok(db.effective_policy()?.into())
    }

    pub fn set_policy(&self, policy: FfiClinicPolicy) -> Result<(), VetdeskError> {
        let db = self.db.lock()?;
        db.save_policy(&policy.into())?;
        Ok(())
    }

    // =========================================================================
    // Booking Operations
    // =========================================================================

    /// Validate and store a new appointment.
    pub fn book_appointment(
        &self,
        new: FfiNewAppointment,
    ) -> Result<FfiBookingOutcome, VetdeskError> {
        let new = NewAppointment {
            animal_id: new.animal_id,
            veterinarian_id: new.veterinarian_id,
            service_type_id: new.service_type_id,
            room_id: new.room_id,
            date: parse_optional(new.date.as_deref(), parse_date)?,
            time: parse_optional(new.time.as_deref(), parse_slot_time)?,
            notes: new.notes,
        };
        let mut db = self.db.lock()?;
        let mut book = AppointmentBook::new(&mut db);
        Ok(book.book(new)?.into())
    }

    /// Re-validate and apply an edit.
    pub fn edit_appointment(
        &self,
        id: String,
        edit: FfiAppointmentEdit,
    ) -> Result<FfiBookingOutcome, VetdeskError> {
        let edit = AppointmentEdit {
            animal_id: edit.animal_id,
            veterinarian_id: if edit.clear_veterinarian {
                Some(None)
            } else {
                edit.veterinarian_id.map(Some)
            },
            service_type_id: edit.service_type_id,
            room_id: if edit.clear_room {
                Some(None)
            } else {
                edit.room_id.map(Some)
            },
            date: parse_optional(edit.date.as_deref(), parse_date)?,
            time: parse_optional(edit.time.as_deref(), parse_slot_time)?,
            notes: if edit.clear_notes {
                Some(None)
            } else {
                edit.notes.map(Some)
            },
        };
        let mut db = self.db.lock()?;
        let mut book = AppointmentBook::new(&mut db);
        Ok(book.edit(&id, edit)?.into())
    }

    pub fn get_appointment(&self, id: String) -> Result<Option<FfiAppointment>, VetdeskError> {
        let db = self.db.lock()?;
        Ok(db.get_appointment(&id)?.map(Into::into))
    }

    /// All appointments on a `YYYY-MM-DD` date.
    pub fn list_appointments_on(&self, date: String) -> Result<Vec<FfiAppointment>, VetdeskError> {
        let date = parse_date(&date)?;
        let db = self.db.lock()?;
        Ok(db
            .list_appointments_on(date)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    pub fn list_appointments_for_animal(
        &self,
        animal_id: String,
    ) -> Result<Vec<FfiAppointment>, VetdeskError> {
        let db = self.db.lock()?;
        Ok(db
            .list_appointments_for_animal(&animal_id)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    // =========================================================================
    // Lifecycle Operations
    // =========================================================================

    pub fn confirm_appointment(&self, id: String) -> Result<FfiAppointment, VetdeskError> {
        let mut db = self.db.lock()?;
        Ok(AppointmentBook::new(&mut db).confirm(&id)?.into())
    }

    pub fn start_service(&self, id: String) -> Result<FfiAppointment, VetdeskError> {
        let mut db = self.db.lock()?;
        Ok(AppointmentBook::new(&mut db).start_service(&id)?.into())
    }

    /// Confirm payment: completes the appointment and records the pending sale.
    pub fn complete_appointment(&self, id: String) -> Result<FfiPendingSale, VetdeskError> {
        let mut db = self.db.lock()?;
        Ok(AppointmentBook::new(&mut db).complete(&id)?.into())
    }

    pub fn cancel_appointment(
        &self,
        id: String,
        reason: String,
        operator_confirmed: bool,
    ) -> Result<FfiAppointment, VetdeskError> {
        let mut db = self.db.lock()?;
        Ok(AppointmentBook::new(&mut db)
            .cancel(&id, &reason, operator_confirmed)?
            .into())
    }

    pub fn mark_no_show(&self, id: String) -> Result<FfiAppointment, VetdeskError> {
        let mut db = self.db.lock()?;
        Ok(AppointmentBook::new(&mut db).mark_no_show(&id)?.into())
    }

    pub fn attach_product(
        &self,
        id: String,
        product_id: String,
        quantity: u32,
    ) -> Result<FfiAppointment, VetdeskError> {
        let mut db = self.db.lock()?;
        Ok(AppointmentBook::new(&mut db)
            .attach_product(&id, &product_id, quantity)?
            .into())
    }

    pub fn remove_product(
        &self,
        id: String,
        product_id: String,
    ) -> Result<FfiAppointment, VetdeskError> {
        let mut db = self.db.lock()?;
        Ok(AppointmentBook::new(&mut db)
            .remove_product(&id, &product_id)?
            .into())
    }

    /// Hard-delete an appointment. Non-terminal ones need `confirmed`.
    pub fn delete_appointment(&self, id: String, confirmed: bool) -> Result<bool, VetdeskError> {
        let mut db = self.db.lock()?;
        Ok(AppointmentBook::new(&mut db).delete(&id, confirmed)?)
    }

    // =========================================================================
    // Vaccination Operations
    // =========================================================================

    /// Register a first dose and its generated follow-ups.
    pub fn record_first_dose(
        &self,
        first: FfiFirstDose,
    ) -> Result<Vec<FfiVaccinationRecord>, VetdeskError> {
        let first = FirstDose {
            animal_id: first.animal_id,
            vaccine_name: first.vaccine_name,
            veterinarian_id: first.veterinarian_id,
            application_date: parse_date(&first.application_date)?,
            dose_count: first.dose_count,
            interval_days: first.interval_days,
            auto_schedule: first.auto_schedule,
        };
        let mut db = self.db.lock()?;
        let records = VaccinationLog::new(&mut db).record_first_dose(first)?;
        Ok(records.into_iter().map(Into::into).collect())
    }

    pub fn apply_dose(
        &self,
        record_id: String,
        applied_on: String,
    ) -> Result<FfiVaccinationRecord, VetdeskError> {
        let applied_on = parse_date(&applied_on)?;
        let mut db = self.db.lock()?;
        Ok(VaccinationLog::new(&mut db)
            .apply_dose(&record_id, applied_on)?
            .into())
    }

    pub fn cancel_dose(
        &self,
        record_id: String,
        reason: String,
    ) -> Result<FfiVaccinationRecord, VetdeskError> {
        let mut db = self.db.lock()?;
        Ok(VaccinationLog::new(&mut db)
            .cancel_dose(&record_id, &reason)?
            .into())
    }

    /// Scheduled doses on or after `as_of`, optionally for one animal.
    pub fn upcoming_doses(
        &self,
        animal_id: Option<String>,
        as_of: String,
    ) -> Result<Vec<FfiVaccinationRecord>, VetdeskError> {
        let as_of = parse_date(&as_of)?;
        let db = self.db.lock()?;
        Ok(db
            .list_upcoming_doses(animal_id.as_deref(), as_of)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    // =========================================================================
    // Export Operations
    // =========================================================================

    pub fn list_pending_sales(&self) -> Result<Vec<FfiPendingSale>, VetdeskError> {
        let db = self.db.lock()?;
        Ok(db
            .list_pending_sales()?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Export pending sales as JSON.
    pub fn export_pending_sales_json(&self) -> Result<String, VetdeskError> {
        let db = self.db.lock()?;
        let batch = export::SaleExporter::new(&db).export_pending()?;
        Ok(batch.to_json()?)
    }

    /// Export pending sales as CSV.
    pub fn export_pending_sales_csv(&self) -> Result<String, VetdeskError> {
        let db = self.db.lock()?;
        let batch = export::SaleExporter::new(&db).export_pending()?;
        Ok(batch.to_csv())
    }

    pub fn mark_sale_exported(&self, sale_id: String) -> Result<bool, VetdeskError> {
        let db = self.db.lock()?;
        Ok(db.mark_sale_exported(&sale_id)?)
    }
}

fn parse_optional<T>(
    value: Option<&str>,
    parse: fn(&str) -> Result<T, SlotParseError>,
) -> Result<Option<T>, SlotParseError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(parse)
        .transpose()
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe veterinarian.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiVeterinarian {
    pub id: String,
    pub name: String,
    pub license_number: Option<String>,
    pub active: bool,
}

impl From<Veterinarian> for FfiVeterinarian {
    fn from(vet: Veterinarian) -> Self {
        Self {
            id: vet.id,
            name: vet.name,
            license_number: vet.license_number,
            active: vet.active,
        }
    }
}

/// FFI-safe service type. `category` is the snake_case category name.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiServiceType {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub duration_minutes: u32,
    pub active: bool,
}

impl From<ServiceType> for FfiServiceType {
    fn from(service: ServiceType) -> Self {
        Self {
            id: service.id,
            name: service.name,
            category: service.category.as_str().to_string(),
            price: service.price,
            duration_minutes: service.duration_minutes,
            active: service.active,
        }
    }
}

impl TryFrom<FfiServiceType> for ServiceType {
    type Error = VetdeskError;

    fn try_from(service: FfiServiceType) -> Result<Self, Self::Error> {
        Ok(ServiceType {
            id: service.id,
            name: service.name,
            category: service
                .category
                .parse()
                .map_err(VetdeskError::InvalidInput)?,
            price: service.price,
            duration_minutes: service.duration_minutes,
            active: service.active,
        })
    }
}

/// FFI-safe product.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiProduct {
    pub id: String,
    pub name: String,
    pub unit_price: f64,
    pub active: bool,
}

/// FFI-safe day entry of a weekly schedule.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDaySchedule {
    /// Day name, e.g. "monday"
    pub day: String,
    pub active: bool,
    /// HH:MM
    pub start: String,
    /// HH:MM
    pub end: String,
}

/// FFI-safe clinic policy.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiClinicPolicy {
    pub prevent_animal_double_booking: bool,
    pub prevent_vet_double_booking: bool,
    pub prevent_booking_outside_work_hours: bool,
    pub allow_double_booking_for_exam_services: bool,
}

impl From<ClinicPolicy> for FfiClinicPolicy {
    fn from(policy: ClinicPolicy) -> Self {
        Self {
            prevent_animal_double_booking: policy.prevent_animal_double_booking,
            prevent_vet_double_booking: policy.prevent_vet_double_booking,
            prevent_booking_outside_work_hours: policy.prevent_booking_outside_work_hours,
            allow_double_booking_for_exam_services: policy.allow_double_booking_for_exam_services,
        }
    }
}

impl From<FfiClinicPolicy> for ClinicPolicy {
    fn from(policy: FfiClinicPolicy) -> Self {
        Self {
            prevent_animal_double_booking: policy.prevent_animal_double_booking,
            prevent_vet_double_booking: policy.prevent_vet_double_booking,
            prevent_booking_outside_work_hours: policy.prevent_booking_outside_work_hours,
            allow_double_booking_for_exam_services: policy.allow_double_booking_for_exam_services,
        }
    }
}

/// FFI-safe booking form. Dates are `YYYY-MM-DD`, times `HH:MM`.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewAppointment {
    pub animal_id: String,
    pub veterinarian_id: Option<String>,
    pub service_type_id: String,
    pub room_id: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub notes: Option<String>,
}

/// FFI-safe appointment edit. Unset fields stay unchanged.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAppointmentEdit {
    pub animal_id: Option<String>,
    pub veterinarian_id: Option<String>,
    pub clear_veterinarian: bool,
    pub service_type_id: Option<String>,
    pub room_id: Option<String>,
    pub clear_room: bool,
    pub date: Option<String>,
    pub time: Option<String>,
    pub notes: Option<String>,
    pub clear_notes: bool,
}

/// FFI-safe product line.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAppointmentProduct {
    pub product_id: String,
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
}

/// FFI-safe appointment.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAppointment {
    pub id: String,
    pub animal_id: String,
    pub veterinarian_id: Option<String>,
    pub service_type_id: String,
    pub room_id: Option<String>,
    pub date: String,
    pub time: String,
    pub status: String,
    pub products: Vec<FfiAppointmentProduct>,
    pub total_price: f64,
    pub notes: Option<String>,
    pub cancellation_reason: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Appointment> for FfiAppointment {
    fn from(appointment: Appointment) -> Self {
        Self {
            id: appointment.id,
            animal_id: appointment.animal_id,
            veterinarian_id: appointment.veterinarian_id,
            service_type_id: appointment.service_type_id,
            room_id: appointment.room_id,
            date: format_date(appointment.date),
            time: format_slot_time(appointment.time),
            status: appointment.status.as_str().to_string(),
            products: appointment
                .products
                .into_iter()
                .map(|line| FfiAppointmentProduct {
                    product_id: line.product_id,
                    name: line.name,
                    unit_price: line.unit_price,
                    quantity: line.quantity,
                })
                .collect(),
            total_price: appointment.total_price,
            notes: appointment.notes,
            cancellation_reason: appointment.cancellation_reason,
            created_at: appointment.created_at,
            updated_at: appointment.updated_at,
        }
    }
}

/// FFI-safe booking result. A rejection carries its stable code and the
/// message to show the operator.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiBookingOutcome {
    pub accepted: bool,
    pub appointment: Option<FfiAppointment>,
    pub rejection_code: Option<String>,
    pub rejection_message: Option<String>,
}

impl From<BookingOutcome> for FfiBookingOutcome {
    fn from(outcome: BookingOutcome) -> Self {
        match outcome {
            BookingOutcome::Booked(appointment) => Self {
                accepted: true,
                appointment: Some(appointment.into()),
                rejection_code: None,
                rejection_message: None,
            },
            BookingOutcome::Rejected(reason) => Self {
                accepted: false,
                appointment: None,
                rejection_code: Some(reason.code().to_string()),
                rejection_message: Some(reason.message()),
            },
        }
    }
}

/// FFI-safe priced line.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPricedItem {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub total: f64,
}

/// FFI-safe pending sale.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPendingSale {
    pub id: String,
    pub appointment_id: String,
    pub animal_id: String,
    pub items: Vec<FfiPricedItem>,
    pub subtotal: f64,
    pub status: String,
    pub created_at: String,
}

impl From<PendingSale> for FfiPendingSale {
    fn from(sale: PendingSale) -> Self {
        Self {
            id: sale.id,
            appointment_id: sale.appointment_id,
            animal_id: sale.summary.animal_id,
            items: sale
                .summary
                .items
                .into_iter()
                .map(|item| FfiPricedItem {
                    id: item.id,
                    name: item.name,
                    kind: item.kind.as_str().to_string(),
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    total: item.total,
                })
                .collect(),
            subtotal: sale.summary.subtotal,
            status: sale.status.as_str().to_string(),
            created_at: sale.created_at,
        }
    }
}

/// FFI-safe first dose registration.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFirstDose {
    pub animal_id: String,
    pub vaccine_name: String,
    pub veterinarian_id: Option<String>,
    pub application_date: String,
    pub dose_count: u32,
    pub interval_days: u32,
    pub auto_schedule: bool,
}

/// FFI-safe vaccination record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiVaccinationRecord {
    pub id: String,
    pub animal_id: String,
    pub vaccine_name: String,
    pub veterinarian_id: Option<String>,
    pub series_id: String,
    pub sequence_number: u32,
    pub application_date: String,
    pub next_due: String,
    pub status: String,
    pub cancellation_reason: Option<String>,
}

impl From<VaccinationRecord> for FfiVaccinationRecord {
    fn from(record: VaccinationRecord) -> Self {
        Self {
            id: record.id,
            animal_id: record.animal_id,
            vaccine_name: record.vaccine_name,
            veterinarian_id: record.veterinarian_id,
            series_id: record.series_id,
            sequence_number: record.dose.sequence_number,
            application_date: format_date(record.dose.application_date),
            next_due: format_date(record.dose.next_due),
            status: record.dose.status.as_str().to_string(),
            cancellation_reason: record.dose.cancellation_reason,
        }
    }
}
