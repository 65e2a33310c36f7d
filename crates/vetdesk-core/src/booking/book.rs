//! SQLite-backed appointment book.
//!
//! Every mutation runs inside one `BEGIN IMMEDIATE` transaction, so the
//! policy load, the slot snapshot, validation and the write form a single
//! atomic step.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::{validate, BookingDecision, BookingRequest, RejectionReason, RequiredField, SlotIndex};
use crate::db::{Database, DbError};
use crate::lifecycle::{AppointmentEdit, LifecycleError};
use crate::models::{Appointment, PendingSale, ServiceType};
use crate::schedule::WorkSchedule;

/// Appointment book errors.
#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
}

impl BookingError {
    fn not_found(kind: &'static str, id: &str) -> Self {
        BookingError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

pub type BookingResult<T> = Result<T, BookingError>;

/// Form data for a new appointment.
///
/// Missing date or time, and blank animal or veterinarian ids, are reported
/// by the validator as a rejection rather than an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewAppointment {
    pub animal_id: String,
    pub veterinarian_id: Option<String>,
    pub service_type_id: String,
    pub room_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub notes: Option<String>,
}

/// Result of a booking or edit.
#[derive(Debug, Clone, PartialEq)]
pub enum BookingOutcome {
    Booked(Appointment),
    Rejected(RejectionReason),
}

impl BookingOutcome {
    pub fn appointment(&self) -> Option<&Appointment> {
        match self {
            BookingOutcome::Booked(appointment) => Some(appointment),
            BookingOutcome::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<RejectionReason> {
        match self {
            BookingOutcome::Booked(_) => None,
            BookingOutcome::Rejected(reason) => Some(*reason),
        }
    }
}

/// Appointment book manager.
pub struct AppointmentBook<'a> {
    db: &'a mut Database,
}

impl<'a> AppointmentBook<'a> {
    /// Create a new appointment book over `db`.
    pub fn new(db: &'a mut Database) -> Self {
        Self { db }
    }

    /// Validate and store a new appointment.
    pub fn book(&mut self, new: NewAppointment) -> BookingResult<BookingOutcome> {
        self.db.with_immediate_transaction(|db| {
            let service = require_service(db, &new.service_type_id)?;
            let veterinarian_id = non_blank(new.veterinarian_id.as_deref());
            let schedule = schedule_for(db, veterinarian_id)?;
            let policy = db.effective_policy()?;

            let request = BookingRequest {
                animal_id: Some(new.animal_id.trim().to_string()),
                veterinarian_id: veterinarian_id.map(str::to_string),
                service_category: service.category,
                date: new.date,
                time: new.time,
                exclude_appointment_id: None,
            };

            let index = match request.date {
                Some(date) => booked_slots(db, date)?,
                None => SlotIndex::default(),
            };

            let decision = validate(&request, &index, schedule.as_ref(), &policy);
            if let BookingDecision::Rejected(reason) = decision {
                return Ok(BookingOutcome::Rejected(reason));
            }
            let (Some(date), Some(time), Some(animal_id)) =
                (request.date, request.time, request.animal_id)
            else {
                return Ok(BookingOutcome::Rejected(
                    RejectionReason::MissingRequiredField(RequiredField::Date),
                ));
            };

            let mut appointment = Appointment::new(animal_id, service.id, date, time);
            appointment.veterinarian_id = request.veterinarian_id;
            appointment.room_id = new.room_id;
            appointment.notes = new.notes;
            db.insert_appointment(&appointment)?;

            info!(
                appointment_id = %appointment.id,
                animal_id = %appointment.animal_id,
                date = %appointment.date,
                time = %appointment.time,
                "appointment booked"
            );
            Ok(BookingOutcome::Booked(appointment))
        })
    }

    /// Re-validate and apply an edit to a non-terminal appointment.
    ///
    /// The appointment does not clash with itself. A rejection leaves the
    /// stored appointment unchanged.
    pub fn edit(&mut self, id: &str, edit: AppointmentEdit) -> BookingResult<BookingOutcome> {
        self.db.with_immediate_transaction(|db| {
            let mut appointment = require_appointment(db, id)?;
            let service = require_service(db, edit.resulting_service(&appointment))?;
            let veterinarian_id = non_blank(edit.resulting_veterinarian(&appointment));
            let schedule = schedule_for(db, veterinarian_id)?;
            let policy = db.effective_policy()?;

            let date = edit.date.unwrap_or(appointment.date);
            let index = booked_slots(db, date)?;

            let decision = appointment.apply_edit(
                edit,
                service.category,
                &index,
                schedule.as_ref(),
                &policy,
            )?;
            if let BookingDecision::Rejected(reason) = decision {
                return Ok(BookingOutcome::Rejected(reason));
            }

            db.update_appointment(&appointment)?;
            info!(appointment_id = %appointment.id, "appointment edited");
            Ok(BookingOutcome::Booked(appointment))
        })
    }

    /// Get an appointment by ID.
    pub fn get(&self, id: &str) -> BookingResult<Appointment> {
        require_appointment(&*self.db, id)
    }

    /// scheduled → confirmed.
    pub fn confirm(&mut self, id: &str) -> BookingResult<Appointment> {
        self.mutate(id, |_, appointment| Ok(appointment.confirm()?))
    }

    /// scheduled/confirmed → in_progress.
    pub fn start_service(&mut self, id: &str) -> BookingResult<Appointment> {
        self.mutate(id, |_, appointment| Ok(appointment.start_service()?))
    }

    /// in_progress → completed.
    ///
    /// Stores the appointment total and the pending sale together.
    pub fn complete(&mut self, id: &str) -> BookingResult<PendingSale> {
        self.db.with_immediate_transaction(|db| {
            let mut appointment = require_appointment(db, id)?;
            let service = require_service(db, &appointment.service_type_id)?;

            let summary = appointment.complete(&service)?;
            db.update_appointment(&appointment)?;

            let sale = PendingSale::new(summary);
            db.insert_pending_sale(&sale)?;
            info!(
                appointment_id = %appointment.id,
                sale_id = %sale.id,
                subtotal = sale.subtotal(),
                "pending sale recorded"
            );
            Ok(sale)
        })
    }

    /// Any non-terminal state → cancelled.
    pub fn cancel(
        &mut self,
        id: &str,
        reason: &str,
        operator_confirmed: bool,
    ) -> BookingResult<Appointment> {
        self.mutate(id, |_, appointment| {
            Ok(appointment.cancel(reason, operator_confirmed)?)
        })
    }

    /// scheduled/confirmed → no_show.
    pub fn mark_no_show(&mut self, id: &str) -> BookingResult<Appointment> {
        self.mutate(id, |_, appointment| Ok(appointment.mark_no_show()?))
    }

    /// Attach `quantity` units of a catalog product.
    pub fn attach_product(
        &mut self,
        id: &str,
        product_id: &str,
        quantity: u32,
    ) -> BookingResult<Appointment> {
        self.mutate(id, |db, appointment| {
            let product = db
                .get_product(product_id)?
                .ok_or_else(|| BookingError::not_found("Product", product_id))?;
            Ok(appointment.attach_product(&product, quantity)?)
        })
    }

    /// Remove a product line.
    pub fn remove_product(&mut self, id: &str, product_id: &str) -> BookingResult<Appointment> {
        self.mutate(id, |_, appointment| {
            appointment.remove_product(product_id)?;
            Ok(())
        })
    }

    /// Hard-delete an appointment. Non-terminal ones need `confirmed`.
    pub fn delete(&mut self, id: &str, confirmed: bool) -> BookingResult<bool> {
        self.db
            .with_immediate_transaction(|db| Ok(db.delete_appointment(id, confirmed)?))
    }

    /// Load, change and store one appointment in a single transaction.
    fn mutate<F>(&mut self, id: &str, f: F) -> BookingResult<Appointment>
    where
        F: FnOnce(&Database, &mut Appointment) -> BookingResult<()>,
    {
        self.db.with_immediate_transaction(|db| {
            let mut appointment = require_appointment(db, id)?;
            f(db, &mut appointment)?;
            db.update_appointment(&appointment)?;
            Ok(appointment)
        })
    }
}

fn require_appointment(db: &Database, id: &str) -> BookingResult<Appointment> {
    db.get_appointment(id)?
        .ok_or_else(|| BookingError::not_found("Appointment", id))
}

fn require_service(db: &Database, id: &str) -> BookingResult<ServiceType> {
    db.get_service_type(id)?
        .ok_or_else(|| BookingError::not_found("Service type", id))
}

/// Work schedule of the named veterinarian, `None` when no veterinarian is
/// named or the veterinarian has no restriction.
fn schedule_for(db: &Database, veterinarian_id: Option<&str>) -> BookingResult<Option<WorkSchedule>> {
    match veterinarian_id {
        Some(id) => {
            let vet = db
                .get_veterinarian(id)?
                .ok_or_else(|| BookingError::not_found("Veterinarian", id))?;
            Ok(vet.work_schedule)
        }
        None => Ok(None),
    }
}

/// Slots held on `date`; cancelled and no-show appointments are left out.
fn booked_slots(db: &Database, date: NaiveDate) -> BookingResult<SlotIndex> {
    let index = SlotIndex::build(&db.list_booked_appointments_on(date)?);
    debug!(%date, booked = index.len(), "slot index built");
    Ok(index)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::slot::{parse_date, parse_slot_time};
    use crate::models::{AppointmentStatus, ClinicPolicy, Product, ServiceCategory, Veterinarian};

    struct Clinic {
        db: Database,
        consult: ServiceType,
        exam: ServiceType,
        vet: Veterinarian,
        product: Product,
    }

    fn clinic() -> Clinic {
        let db = Database::open_in_memory().unwrap();
        let consult = ServiceType::new("Consultation".into(), ServiceCategory::Consultation, 100.0);
        let exam = ServiceType::new("Blood panel".into(), ServiceCategory::Exam, 60.0);
        let vet = Veterinarian::new("Dr. Ana".into());
        let product = Product::new("Dewormer".into(), 25.0);
        db.upsert_service_type(&consult).unwrap();
        db.upsert_service_type(&exam).unwrap();
        db.upsert_veterinarian(&vet).unwrap();
        db.upsert_product(&product).unwrap();
        Clinic {
            db,
            consult,
            exam,
            vet,
            product,
        }
    }

    fn form(clinic: &Clinic, animal: &str, service: &ServiceType, time: &str) -> NewAppointment {
        NewAppointment {
            animal_id: animal.into(),
            veterinarian_id: Some(clinic.vet.id.clone()),
            service_type_id: service.id.clone(),
            // Friday
            date: Some(parse_date("2024-12-20").unwrap()),
            time: Some(parse_slot_time(time).unwrap()),
            ..NewAppointment::default()
        }
    }

    fn booked(outcome: BookingOutcome) -> Appointment {
        match outcome {
            BookingOutcome::Booked(appointment) => appointment,
            BookingOutcome::Rejected(reason) => panic!("unexpected rejection: {}", reason),
        }
    }

    #[test]
    fn test_book_and_reject_animal_clash() {
        let mut c = clinic();
        let first = form(&c, "A1", &c.consult, "09:00");
        let again = form(&c, "A1", &c.consult, "09:00");
        let mut book = AppointmentBook::new(&mut c.db);

        let appointment = booked(book.book(first).unwrap());
        assert_eq!(appointment.status, AppointmentStatus::Scheduled);

        let outcome = book.book(again).unwrap();
        assert_eq!(
            outcome.rejection(),
            Some(RejectionReason::AnimalDoubleBooked)
        );
        assert_eq!(
            c.db.list_appointments_on(parse_date("2024-12-20").unwrap())
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_exam_exemption_from_stored_policy() {
        let mut c = clinic();
        let mut policy = ClinicPolicy::default();
        policy.allow_double_booking_for_exam_services = true;
        c.db.save_policy(&policy).unwrap();

        let first = form(&c, "A1", &c.exam, "09:00");
        let second = form(&c, "A1", &c.exam, "09:00");
        let mut book = AppointmentBook::new(&mut c.db);
        booked(book.book(first).unwrap());
        booked(book.book(second).unwrap());
    }

    #[test]
    fn test_missing_date_is_rejection() {
        let mut c = clinic();
        let mut new = form(&c, "A1", &c.consult, "09:00");
        new.date = None;
        let mut book = AppointmentBook::new(&mut c.db);
        assert_eq!(
            book.book(new).unwrap().rejection(),
            Some(RejectionReason::MissingRequiredField(RequiredField::Date))
        );
    }

    #[test]
    fn test_unknown_entities_are_errors() {
        let mut c = clinic();
        let mut unknown_service = form(&c, "A1", &c.consult, "09:00");
        unknown_service.service_type_id = "nope".into();
        let mut unknown_vet = form(&c, "A1", &c.consult, "09:00");
        unknown_vet.veterinarian_id = Some("ghost".into());

        let mut book = AppointmentBook::new(&mut c.db);
        assert!(matches!(
            book.book(unknown_service),
            Err(BookingError::NotFound { kind: "Service type", .. })
        ));
        assert!(matches!(
            book.book(unknown_vet),
            Err(BookingError::NotFound { kind: "Veterinarian", .. })
        ));
        assert!(matches!(
            book.confirm("missing"),
            Err(BookingError::NotFound { kind: "Appointment", .. })
        ));
    }

    #[test]
    fn test_cancelled_slot_can_be_rebooked() {
        let mut c = clinic();
        let first = form(&c, "A1", &c.consult, "09:00");
        let again = form(&c, "A1", &c.consult, "09:00");
        let mut book = AppointmentBook::new(&mut c.db);

        let appointment = booked(book.book(first).unwrap());
        book.cancel(&appointment.id, "Owner rescheduled", true)
            .unwrap();
        booked(book.book(again).unwrap());
    }

    #[test]
    fn test_edit_excludes_itself_and_detects_clash() {
        let mut c = clinic();
        let a1 = form(&c, "A1", &c.consult, "09:00");
        let a2 = form(&c, "A2", &c.consult, "10:00");
        let mut book = AppointmentBook::new(&mut c.db);
        let first = booked(book.book(a1).unwrap());
        let second = booked(book.book(a2).unwrap());

        // Saving without changes never clashes with itself
        let outcome = book.edit(&first.id, AppointmentEdit::default()).unwrap();
        assert!(outcome.appointment().is_some());

        // Moving onto the vet's 10:00 slot clashes
        let edit = AppointmentEdit {
            time: Some(parse_slot_time("10:00").unwrap()),
            ..AppointmentEdit::default()
        };
        assert_eq!(
            book.edit(&first.id, edit).unwrap().rejection(),
            Some(RejectionReason::VeterinarianDoubleBooked)
        );
        let stored = book.get(&first.id).unwrap();
        assert_eq!(stored.time, parse_slot_time("09:00").unwrap());
        assert_ne!(stored.id, second.id);
    }

    #[test]
    fn test_notes_edit_survives_schedule_change() {
        let mut c = clinic();
        let new = form(&c, "A1", &c.consult, "09:00");
        let first = booked(AppointmentBook::new(&mut c.db).book(new).unwrap());

        let mut schedule = WorkSchedule::business_default();
        schedule.set_active(crate::schedule::DayOfWeek::Friday, false);
        assert!(c.db.update_work_schedule(&c.vet.id, Some(&schedule)).unwrap());

        let mut book = AppointmentBook::new(&mut c.db);
        let notes = AppointmentEdit {
            notes: Some(Some("bring card".into())),
            ..AppointmentEdit::default()
        };
        let edited = booked(book.edit(&first.id, notes).unwrap());
        assert_eq!(edited.notes.as_deref(), Some("bring card"));
        assert_eq!(book.get(&first.id).unwrap().notes.as_deref(), Some("bring card"));

        // Moving it is validated against the new schedule
        let later = AppointmentEdit::reschedule(first.date, parse_slot_time("10:00").unwrap());
        assert_eq!(
            book.edit(&first.id, later).unwrap().rejection(),
            Some(RejectionReason::VeterinarianUnavailable)
        );
    }

    #[test]
    fn test_complete_records_pending_sale() {
        let mut c = clinic();
        let new = form(&c, "A1", &c.consult, "09:00");
        let product_id = c.product.id.clone();
        let mut book = AppointmentBook::new(&mut c.db);

        let appointment = booked(book.book(new).unwrap());
        book.start_service(&appointment.id).unwrap();
        book.attach_product(&appointment.id, &product_id, 2).unwrap();

        let sale = book.complete(&appointment.id).unwrap();
        assert_eq!(sale.subtotal(), 150.0);
        assert_eq!(sale.summary.product_count(), 1);

        let stored = book.get(&appointment.id).unwrap();
        assert_eq!(stored.status, AppointmentStatus::Completed);
        assert_eq!(stored.total_price, 150.0);

        // A second completion fails and records nothing
        assert!(matches!(
            book.complete(&appointment.id),
            Err(BookingError::Lifecycle(LifecycleError::InvalidTransition { .. }))
        ));
        assert!(matches!(
            book.attach_product(&appointment.id, &product_id, 1),
            Err(BookingError::Lifecycle(LifecycleError::ProductsLocked(_)))
        ));
        assert_eq!(c.db.list_pending_sales().unwrap().len(), 1);
    }

    #[test]
    fn test_failed_transition_leaves_store_unchanged() {
        let mut c = clinic();
        let new = form(&c, "A1", &c.consult, "09:00");
        let mut book = AppointmentBook::new(&mut c.db);
        let appointment = booked(book.book(new).unwrap());

        assert!(book.cancel(&appointment.id, "  ", true).is_err());
        assert!(book.cancel(&appointment.id, "Sick", false).is_err());
        assert_eq!(
            book.get(&appointment.id).unwrap().status,
            AppointmentStatus::Scheduled
        );

        book.mark_no_show(&appointment.id).unwrap();
        assert!(book.confirm(&appointment.id).is_err());
    }

    #[test]
    fn test_delete_guard() {
        let mut c = clinic();
        let new = form(&c, "A1", &c.consult, "09:00");
        let mut book = AppointmentBook::new(&mut c.db);
        let appointment = booked(book.book(new).unwrap());

        assert!(book.delete(&appointment.id, false).is_err());
        assert!(book.delete(&appointment.id, true).unwrap());
        assert!(book.get(&appointment.id).is_err());
    }
}
