//! Status transitions, product attachment and edits.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{LifecycleError, LifecycleResult, PricedSummary};
use crate::booking::{validate, BookingDecision, BookingRequest, SlotLookup};
use crate::models::slot::truncate_to_minute;
use crate::models::{
    Appointment, AppointmentProduct, AppointmentStatus, ClinicPolicy, Product, ServiceCategory,
    ServiceType,
};
use crate::schedule::WorkSchedule;

/// All statuses reachable in one step from `status`.
pub fn valid_transitions(status: AppointmentStatus) -> &'static [AppointmentStatus] {
    use AppointmentStatus::*;
    match status {
        Scheduled => &[Confirmed, InProgress, Cancelled, NoShow],
        Confirmed => &[InProgress, Cancelled, NoShow],
        InProgress => &[Completed, Cancelled],
        // Terminal states
        Completed | Cancelled | NoShow => &[],
    }
}

pub fn can_transition(from: AppointmentStatus, to: AppointmentStatus) -> bool {
    valid_transitions(from).contains(&to)
}

/// Changes requested on an existing appointment.
///
/// `None` leaves a field untouched. `veterinarian_id: Some(None)` removes
/// the veterinarian.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppointmentEdit {
    pub animal_id: Option<String>,
    pub veterinarian_id: Option<Option<String>>,
    pub service_type_id: Option<String>,
    pub room_id: Option<Option<String>>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub notes: Option<Option<String>>,
}

impl AppointmentEdit {
    pub fn reschedule(date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            date: Some(date),
            time: Some(time),
            ..Self::default()
        }
    }

    /// Veterinarian the appointment will have once the edit is applied.
    pub fn resulting_veterinarian<'a>(&'a self, current: &'a Appointment) -> Option<&'a str> {
        match &self.veterinarian_id {
            Some(next) => next.as_deref(),
            None => current.veterinarian_id.as_deref(),
        }
    }

    /// Whether the edit moves the appointment to another animal, veterinarian,
    /// service or slot. Room and notes changes do not count.
    pub fn changes_booking(&self, current: &Appointment) -> bool {
        let differs = |next: Option<&str>, now: &str| next.is_some_and(|n| n != now);
        differs(self.animal_id.as_deref(), &current.animal_id)
            || self.resulting_veterinarian(current) != current.veterinarian_id.as_deref()
            || differs(self.service_type_id.as_deref(), &current.service_type_id)
            || self.date.is_some_and(|d| d != current.date)
            || self.time.is_some_and(|t| truncate_to_minute(t) != current.time)
    }

    /// Service the appointment will have once the edit is applied.
    pub fn resulting_service<'a>(&'a self, current: &'a Appointment) -> &'a str {
        self.service_type_id
            .as_deref()
            .unwrap_or(&current.service_type_id)
    }
}

impl Appointment {
    fn transition_to(&mut self, target: AppointmentStatus) -> LifecycleResult<()> {
        if !can_transition(self.status, target) {
            warn!(
                appointment_id = %self.id,
                from = %self.status,
                to = %target,
                "invalid status transition"
            );
            return Err(LifecycleError::InvalidTransition {
                from: self.status,
                to: target,
            });
        }
        debug!(appointment_id = %self.id, from = %self.status, to = %target, "status transition");
        self.status = target;
        self.touch();
        Ok(())
    }

    /// scheduled → confirmed.
    pub fn confirm(&mut self) -> LifecycleResult<()> {
        self.transition_to(AppointmentStatus::Confirmed)
    }

    /// "Start service": scheduled/confirmed → in_progress.
    pub fn start_service(&mut self) -> LifecycleResult<()> {
        self.transition_to(AppointmentStatus::InProgress)
    }

    /// "Confirm payment": in_progress → completed.
    ///
    /// Sets `total_price` to the summary subtotal and returns the summary for
    /// the point of sale.
    pub fn complete(&mut self, service: &ServiceType) -> LifecycleResult<PricedSummary> {
        if service.id != self.service_type_id {
            return Err(LifecycleError::ServiceMismatch {
                expected: self.service_type_id.clone(),
                found: service.id.clone(),
            });
        }
        if !can_transition(self.status, AppointmentStatus::Completed) {
            return Err(LifecycleError::InvalidTransition {
                from: self.status,
                to: AppointmentStatus::Completed,
            });
        }

        let summary = PricedSummary::for_appointment(self, service);
        self.transition_to(AppointmentStatus::Completed)?;
        self.total_price = summary.subtotal;
        info!(
            appointment_id = %self.id,
            subtotal = summary.subtotal,
            lines = summary.items.len(),
            "appointment completed"
        );
        Ok(summary)
    }

    /// Any non-terminal state → cancelled.
    pub fn cancel(&mut self, reason: &str, operator_confirmed: bool) -> LifecycleResult<()> {
        if !operator_confirmed {
            return Err(LifecycleError::ConfirmationRequired);
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(LifecycleError::MissingReason);
        }
        self.transition_to(AppointmentStatus::Cancelled)?;
        self.cancellation_reason = Some(reason.to_string());
        Ok(())
    }

    /// scheduled/confirmed → no_show.
    pub fn mark_no_show(&mut self) -> LifecycleResult<()> {
        self.transition_to(AppointmentStatus::NoShow)
    }

    /// Attach `quantity` units of `product`, merging with an existing line.
    pub fn attach_product(&mut self, product: &Product, quantity: u32) -> LifecycleResult<()> {
        self.ensure_products_editable()?;
        if quantity == 0 {
            return Err(LifecycleError::InvalidQuantity);
        }

        match self
            .products
            .iter_mut()
            .find(|line| line.product_id == product.id)
        {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.products.push(AppointmentProduct {
                product_id: product.id.clone(),
                name: product.name.clone(),
                unit_price: product.unit_price,
                quantity,
            }),
        }
        self.touch();
        Ok(())
    }

    /// Remove a product line entirely.
    pub fn remove_product(&mut self, product_id: &str) -> LifecycleResult<AppointmentProduct> {
        self.ensure_products_editable()?;
        let position = self
            .products
            .iter()
            .position(|line| line.product_id == product_id)
            .ok_or_else(|| LifecycleError::ProductNotAttached(product_id.to_string()))?;
        let removed = self.products.remove(position);
        self.touch();
        Ok(removed)
    }

    fn ensure_products_editable(&self) -> LifecycleResult<()> {
        if !self.status.accepts_products() {
            return Err(LifecycleError::ProductsLocked(self.status));
        }
        Ok(())
    }

    /// Booking request describing this appointment after `edit`, excluding
    /// itself from clash checks.
    pub fn edit_request(&self, edit: &AppointmentEdit, category: ServiceCategory) -> BookingRequest {
        BookingRequest {
            animal_id: Some(edit.animal_id.clone().unwrap_or_else(|| self.animal_id.clone())),
            veterinarian_id: edit.resulting_veterinarian(self).map(str::to_string),
            service_category: category,
            date: Some(edit.date.unwrap_or(self.date)),
            time: Some(edit.time.unwrap_or(self.time)),
            exclude_appointment_id: Some(self.id.clone()),
        }
    }

    /// Apply an edit, re-validating it when it changes the booking.
    ///
    /// `category` and `schedule` describe the service and veterinarian the
    /// appointment will have after the edit. A rejection leaves `self`
    /// untouched and is returned as `Ok(BookingDecision::Rejected(_))`.
    /// Room and notes edits are applied without validation, so a later
    /// policy or schedule change never blocks them.
    pub fn apply_edit<L>(
        &mut self,
        edit: AppointmentEdit,
        category: ServiceCategory,
        existing: &L,
        schedule: Option<&WorkSchedule>,
        policy: &ClinicPolicy,
    ) -> LifecycleResult<BookingDecision>
    where
        L: SlotLookup + ?Sized,
    {
        if self.status.is_terminal() {
            return Err(LifecycleError::Terminal(self.status));
        }

        let decision = if edit.changes_booking(self) {
            let request = self.edit_request(&edit, category);
            validate(&request, existing, schedule, policy)
        } else {
            BookingDecision::Accepted
        };
        if !decision.is_accepted() {
            return Ok(decision);
        }

        if let Some(animal_id) = edit.animal_id {
            self.animal_id = animal_id;
        }
        if let Some(veterinarian_id) = edit.veterinarian_id {
            self.veterinarian_id = veterinarian_id;
        }
        if let Some(service_type_id) = edit.service_type_id {
            self.service_type_id = service_type_id;
        }
        if let Some(room_id) = edit.room_id {
            self.room_id = room_id;
        }
        if let Some(date) = edit.date {
            self.date = date;
        }
        if let Some(time) = edit.time {
            self.time = truncate_to_minute(time);
        }
        if let Some(notes) = edit.notes {
            self.notes = notes;
        }
        self.touch();
        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::RejectionReason;
    use crate::models::slot::{parse_date, parse_slot_time};

    fn service() -> ServiceType {
        ServiceType::new("Consultation".into(), ServiceCategory::Consultation, 100.0)
    }

    fn booked(service: &ServiceType, animal: &str, time: &str) -> Appointment {
        let mut appt = Appointment::new(
            animal.into(),
            service.id.clone(),
            parse_date("2024-12-20").unwrap(),
            parse_slot_time(time).unwrap(),
        );
        appt.veterinarian_id = Some("v1".into());
        appt
    }

    #[test]
    fn test_happy_path() {
        let svc = service();
        let mut appt = booked(&svc, "a1", "09:00");
        let product = Product::new("Bandage".into(), 5.0);

        appt.confirm().unwrap();
        appt.start_service().unwrap();
        appt.attach_product(&product, 2).unwrap();
        let summary = appt.complete(&svc).unwrap();

        assert_eq!(appt.status, AppointmentStatus::Completed);
        assert_eq!(summary.subtotal, 110.0);
        assert_eq!(appt.total_price, 110.0);
    }

    #[test]
    fn test_start_directly_from_scheduled() {
        let svc = service();
        let mut appt = booked(&svc, "a1", "09:00");
        appt.start_service().unwrap();
        assert_eq!(appt.status, AppointmentStatus::InProgress);
    }

    #[test]
    fn test_cannot_complete_before_start() {
        let svc = service();
        let mut appt = booked(&svc, "a1", "09:00");
        let err = appt.complete(&svc).unwrap_err();
        assert_eq!(
            err,
            LifecycleError::InvalidTransition {
                from: AppointmentStatus::Scheduled,
                to: AppointmentStatus::Completed,
            }
        );
        assert_eq!(appt.total_price, 0.0);
    }

    #[test]
    fn test_complete_checks_service() {
        let svc = service();
        let other = service();
        let mut appt = booked(&svc, "a1", "09:00");
        appt.start_service().unwrap();
        assert!(matches!(
            appt.complete(&other),
            Err(LifecycleError::ServiceMismatch { .. })
        ));
        assert_eq!(appt.status, AppointmentStatus::InProgress);
    }

    #[test]
    fn test_cancel_requires_confirmation_and_reason() {
        let svc = service();
        let mut appt = booked(&svc, "a1", "09:00");

        assert_eq!(appt.cancel("owner asked", false), Err(LifecycleError::ConfirmationRequired));
        assert_eq!(appt.cancel("   ", true), Err(LifecycleError::MissingReason));
        assert_eq!(appt.status, AppointmentStatus::Scheduled);

        appt.cancel("owner asked", true).unwrap();
        assert_eq!(appt.status, AppointmentStatus::Cancelled);
        assert_eq!(appt.cancellation_reason.as_deref(), Some("owner asked"));
        assert!(appt.cancel("again", true).is_err());
    }

    #[test]
    fn test_no_show_only_before_start() {
        let svc = service();
        let mut appt = booked(&svc, "a1", "09:00");
        appt.confirm().unwrap();
        appt.mark_no_show().unwrap();
        assert_eq!(appt.status, AppointmentStatus::NoShow);

        let mut started = booked(&svc, "a2", "10:00");
        started.start_service().unwrap();
        assert!(started.mark_no_show().is_err());
    }

    #[test]
    fn test_attach_merges_and_remove() {
        let svc = service();
        let mut appt = booked(&svc, "a1", "09:00");
        let product = Product::new("Syringe".into(), 1.5);

        appt.attach_product(&product, 2).unwrap();
        appt.attach_product(&product, 3).unwrap();
        assert_eq!(appt.products.len(), 1);
        assert_eq!(appt.products[0].quantity, 5);

        assert_eq!(appt.attach_product(&product, 0), Err(LifecycleError::InvalidQuantity));

        let removed = appt.remove_product(&product.id).unwrap();
        assert_eq!(removed.quantity, 5);
        assert!(matches!(
            appt.remove_product(&product.id),
            Err(LifecycleError::ProductNotAttached(_))
        ));
    }

    #[test]
    fn test_completed_locks_products() {
        let svc = service();
        let mut appt = booked(&svc, "a1", "09:00");
        let product = Product::new("Syringe".into(), 1.5);
        appt.start_service().unwrap();
        appt.complete(&svc).unwrap();

        assert_eq!(
            appt.attach_product(&product, 1),
            Err(LifecycleError::ProductsLocked(AppointmentStatus::Completed))
        );
        assert!(appt.complete(&svc).is_err());
    }

    #[test]
    fn test_edit_excludes_itself() {
        let svc = service();
        let mut appt = booked(&svc, "a1", "09:00");
        let existing = vec![appt.clone()];
        let edit = AppointmentEdit {
            service_type_id: Some("svc-follow-up".into()),
            ..AppointmentEdit::default()
        };
        assert!(edit.changes_booking(&appt));

        let decision = appt
            .apply_edit(edit, ServiceCategory::Consultation, &existing, None, &ClinicPolicy::default())
            .unwrap();
        assert!(decision.is_accepted());
        assert_eq!(appt.service_type_id, "svc-follow-up");
    }

    #[test]
    fn test_changes_booking() {
        let svc = service();
        let appt = booked(&svc, "a1", "09:00");

        let notes = AppointmentEdit {
            notes: Some(Some("bring vaccination card".into())),
            room_id: Some(Some("room-2".into())),
            ..AppointmentEdit::default()
        };
        assert!(!notes.changes_booking(&appt));

        let same_slot = AppointmentEdit {
            animal_id: Some("a1".into()),
            veterinarian_id: Some(Some("v1".into())),
            ..AppointmentEdit::reschedule(appt.date, appt.time)
        };
        assert!(!same_slot.changes_booking(&appt));

        let drop_vet = AppointmentEdit {
            veterinarian_id: Some(None),
            ..AppointmentEdit::default()
        };
        assert!(drop_vet.changes_booking(&appt));

        let later = AppointmentEdit::reschedule(appt.date, parse_slot_time("10:00").unwrap());
        assert!(later.changes_booking(&appt));
    }

    #[test]
    fn test_notes_edit_skips_validation() {
        let svc = service();
        let mut appt = booked(&svc, "a1", "09:00");
        // Friday closed after the booking was made
        let mut schedule = WorkSchedule::business_default();
        schedule.set_active(crate::schedule::DayOfWeek::Friday, false);
        let existing = vec![appt.clone()];

        let notes = AppointmentEdit {
            notes: Some(Some("bring vaccination card".into())),
            ..AppointmentEdit::default()
        };
        let decision = appt
            .apply_edit(
                notes,
                ServiceCategory::Consultation,
                &existing,
                Some(&schedule),
                &ClinicPolicy::default(),
            )
            .unwrap();
        assert!(decision.is_accepted());
        assert_eq!(appt.notes.as_deref(), Some("bring vaccination card"));

        let move_later = AppointmentEdit::reschedule(appt.date, parse_slot_time("10:00").unwrap());
        let decision = appt
            .apply_edit(
                move_later,
                ServiceCategory::Consultation,
                &existing,
                Some(&schedule),
                &ClinicPolicy::default(),
            )
            .unwrap();
        assert_eq!(
            decision,
            BookingDecision::Rejected(RejectionReason::VeterinarianUnavailable)
        );
    }

    #[test]
    fn test_rejected_edit_leaves_appointment_unchanged() {
        let svc = service();
        let mut appt = booked(&svc, "a1", "09:00");
        let other = booked(&svc, "a2", "10:00");
        let existing = vec![appt.clone(), other];
        let before = appt.clone();

        let edit = AppointmentEdit::reschedule(appt.date, parse_slot_time("10:00").unwrap());
        let decision = appt
            .apply_edit(edit, ServiceCategory::Consultation, &existing, None, &ClinicPolicy::default())
            .unwrap();

        assert_eq!(
            decision,
            BookingDecision::Rejected(RejectionReason::VeterinarianDoubleBooked)
        );
        assert_eq!(appt, before);
    }

    #[test]
    fn test_terminal_appointment_cannot_be_edited() {
        let svc = service();
        let mut appt = booked(&svc, "a1", "09:00");
        appt.cancel("duplicate", true).unwrap();
        let existing: Vec<Appointment> = Vec::new();
        let result = appt.apply_edit(
            AppointmentEdit::default(),
            ServiceCategory::Consultation,
            &existing,
            None,
            &ClinicPolicy::default(),
        );
        assert_eq!(result, Err(LifecycleError::Terminal(AppointmentStatus::Cancelled)));
    }

    #[test]
    fn test_transition_table_has_no_exits_from_terminal() {
        for status in [
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::NoShow,
        ] {
            assert!(valid_transitions(status).is_empty());
        }
    }
}
