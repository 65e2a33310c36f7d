//! The booking conflict validator.

use tracing::debug;

use super::{BookingDecision, BookingRequest, RejectionReason, RequiredField, SlotLookup};
use crate::models::ClinicPolicy;
use crate::schedule::WorkSchedule;

/// Decide whether `request` can be booked.
///
/// Checks run in a fixed order and stop at the first failure:
///
/// 1. animal, date and time are present, plus a veterinarian when the
///    service category requires one;
/// 2. the slot lies inside the veterinarian's work hours, when the policy
///    asks for it and a schedule is known;
/// 3. the animal is not already booked in the slot;
/// 4. the veterinarian is not already booked in the slot.
///
/// Steps 3 and 4 are skipped for exam services when the policy exempts them.
/// `existing` is every appointment the caller wants compared; no filtering
/// by status happens here.
pub fn validate<L>(
    request: &BookingRequest,
    existing: &L,
    schedule: Option<&WorkSchedule>,
    policy: &ClinicPolicy,
) -> BookingDecision
where
    L: SlotLookup + ?Sized,
{
    let decision = run_checks(request, existing, schedule, policy);
    if let BookingDecision::Rejected(reason) = decision {
        debug!(
            animal_id = ?request.animal_id,
            veterinarian_id = ?request.veterinarian_id,
            category = %request.service_category,
            reason = reason.code(),
            "booking rejected"
        );
    }
    decision
}

fn run_checks<L>(
    request: &BookingRequest,
    existing: &L,
    schedule: Option<&WorkSchedule>,
    policy: &ClinicPolicy,
) -> BookingDecision
where
    L: SlotLookup + ?Sized,
{
    let missing = |field| BookingDecision::Rejected(RejectionReason::MissingRequiredField(field));

    let Some(animal_id) = present(&request.animal_id) else {
        return missing(RequiredField::Animal);
    };
    let Some(date) = request.date else {
        return missing(RequiredField::Date);
    };
    let Some(time) = request.time else {
        return missing(RequiredField::Time);
    };
    let veterinarian_id = present(&request.veterinarian_id);
    if veterinarian_id.is_none() && request.service_category.requires_veterinarian() {
        return missing(RequiredField::Veterinarian);
    }

    if policy.prevent_booking_outside_work_hours && veterinarian_id.is_some() {
        if let Some(schedule) = schedule {
            if !schedule.is_open(date, time) {
                return BookingDecision::Rejected(RejectionReason::VeterinarianUnavailable);
            }
        }
    }

    let exam_exempt =
        request.service_category.is_exam() && policy.allow_double_booking_for_exam_services;
    if exam_exempt {
        return BookingDecision::Accepted;
    }

    let exclude = request.exclude_appointment_id.as_deref();

    if policy.prevent_animal_double_booking
        && existing.animal_booked(animal_id, date, time, exclude)
    {
        return BookingDecision::Rejected(RejectionReason::AnimalDoubleBooked);
    }

    if let Some(vet_id) = veterinarian_id {
        if policy.prevent_vet_double_booking
            && existing.veterinarian_booked(vet_id, date, time, exclude)
        {
            return BookingDecision::Rejected(RejectionReason::VeterinarianDoubleBooked);
        }
    }

    BookingDecision::Accepted
}

/// Treat blank ids as absent.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::SlotIndex;
    use crate::models::slot::{parse_date, parse_slot_time};
    use crate::models::{Appointment, ServiceCategory};
    use crate::schedule::DayOfWeek;

    fn existing(animal: &str, vet: &str, date: &str, time: &str) -> Appointment {
        let mut appt = Appointment::new(
            animal.into(),
            "svc".into(),
            parse_date(date).unwrap(),
            parse_slot_time(time).unwrap(),
        );
        appt.veterinarian_id = Some(vet.into());
        appt
    }

    fn request(animal: &str, vet: &str, category: ServiceCategory, date: &str, time: &str) -> BookingRequest {
        BookingRequest::new(
            animal,
            category,
            parse_date(date).unwrap(),
            parse_slot_time(time).unwrap(),
        )
        .with_veterinarian(vet)
    }

    #[test]
    fn test_missing_fields_in_order() {
        let policy = ClinicPolicy::default();
        let none: Vec<Appointment> = Vec::new();

        let mut req = request("a1", "v1", ServiceCategory::Consultation, "2024-12-20", "09:00");
        req.animal_id = Some("  ".into());
        req.date = None;
        assert_eq!(
            validate(&req, &none, None, &policy),
            BookingDecision::Rejected(RejectionReason::MissingRequiredField(RequiredField::Animal))
        );

        req.animal_id = Some("a1".into());
        assert_eq!(
            validate(&req, &none, None, &policy),
            BookingDecision::Rejected(RejectionReason::MissingRequiredField(RequiredField::Date))
        );

        req.date = parse_date("2024-12-20").ok();
        req.time = None;
        assert_eq!(
            validate(&req, &none, None, &policy),
            BookingDecision::Rejected(RejectionReason::MissingRequiredField(RequiredField::Time))
        );
    }

    #[test]
    fn test_veterinarian_required_by_category() {
        let policy = ClinicPolicy::default();
        let none: Vec<Appointment> = Vec::new();
        let date = parse_date("2024-12-20").unwrap();
        let time = parse_slot_time("09:00").unwrap();

        let surgery = BookingRequest::new("a1", ServiceCategory::Surgery, date, time);
        assert_eq!(
            validate(&surgery, &none, None, &policy),
            BookingDecision::Rejected(RejectionReason::MissingRequiredField(
                RequiredField::Veterinarian
            ))
        );

        let grooming = BookingRequest::new("a1", ServiceCategory::Grooming, date, time);
        assert_eq!(validate(&grooming, &none, None, &policy), BookingDecision::Accepted);
    }

    #[test]
    fn test_missing_field_wins_over_clash() {
        let policy = ClinicPolicy::default();
        let appts = vec![existing("a1", "v1", "2024-12-20", "09:00")];
        let mut req = request("a1", "v1", ServiceCategory::Consultation, "2024-12-20", "09:00");
        req.veterinarian_id = None;
        assert!(matches!(
            validate(&req, &appts, None, &policy),
            BookingDecision::Rejected(RejectionReason::MissingRequiredField(_))
        ));
    }

    #[test]
    fn test_work_hours_checked_before_clash() {
        let policy = ClinicPolicy::default();
        let mut schedule = WorkSchedule::business_default();
        schedule.set_active(DayOfWeek::Friday, false);
        let appts = vec![existing("a1", "v1", "2024-12-20", "09:00")];
        let req = request("a1", "v1", ServiceCategory::Consultation, "2024-12-20", "09:00");

        assert_eq!(
            validate(&req, &appts, Some(&schedule), &policy),
            BookingDecision::Rejected(RejectionReason::VeterinarianUnavailable)
        );
    }

    #[test]
    fn test_schedule_ignored_without_veterinarian() {
        let policy = ClinicPolicy::default();
        let none: Vec<Appointment> = Vec::new();
        let mut schedule = WorkSchedule::business_default();
        schedule.set_active(DayOfWeek::Friday, false);
        let req = BookingRequest::new(
            "a1",
            ServiceCategory::Grooming,
            parse_date("2024-12-20").unwrap(),
            parse_slot_time("09:00").unwrap(),
        );
        assert_eq!(validate(&req, &none, Some(&schedule), &policy), BookingDecision::Accepted);
    }

    #[test]
    fn test_vet_double_booking() {
        let policy = ClinicPolicy::default();
        let appts = vec![existing("a1", "v1", "2024-12-20", "09:00")];
        let req = request("a2", "v1", ServiceCategory::Consultation, "2024-12-20", "09:00");
        assert_eq!(
            validate(&req, &appts, None, &policy),
            BookingDecision::Rejected(RejectionReason::VeterinarianDoubleBooked)
        );

        let relaxed = ClinicPolicy {
            prevent_vet_double_booking: false,
            ..ClinicPolicy::default()
        };
        assert_eq!(validate(&req, &appts, None, &relaxed), BookingDecision::Accepted);
    }

    #[test]
    fn test_animal_double_booking() {
        let policy = ClinicPolicy::default();
        let appts = vec![existing("a1", "v1", "2024-12-20", "09:00")];
        let req = request("a1", "v2", ServiceCategory::Consultation, "2024-12-20", "09:00");
        assert_eq!(
            validate(&req, &appts, None, &policy),
            BookingDecision::Rejected(RejectionReason::AnimalDoubleBooked)
        );

        let relaxed = ClinicPolicy {
            prevent_animal_double_booking: false,
            ..ClinicPolicy::default()
        };
        assert_eq!(validate(&req, &appts, None, &relaxed), BookingDecision::Accepted);

        // Vet clash still applies once the animal check is off
        let same_vet = request("a1", "v1", ServiceCategory::Consultation, "2024-12-20", "09:00");
        assert_eq!(
            validate(&same_vet, &appts, None, &relaxed),
            BookingDecision::Rejected(RejectionReason::VeterinarianDoubleBooked)
        );
    }

    #[test]
    fn test_animal_clash_reported_before_vet_clash() {
        let policy = ClinicPolicy::default();
        let appts = vec![existing("a1", "v1", "2024-12-20", "09:00")];
        let req = request("a1", "v1", ServiceCategory::Consultation, "2024-12-20", "09:00");
        assert_eq!(
            validate(&req, &appts, None, &policy),
            BookingDecision::Rejected(RejectionReason::AnimalDoubleBooked)
        );
    }

    #[test]
    fn test_exam_exemption_needs_policy() {
        let appts = vec![existing("a1", "v1", "2024-12-20", "09:00")];
        let req = request("a1", "v1", ServiceCategory::Exam, "2024-12-20", "09:00");

        let strict = ClinicPolicy::default();
        assert_eq!(
            validate(&req, &appts, None, &strict),
            BookingDecision::Rejected(RejectionReason::AnimalDoubleBooked)
        );

        let exempt = ClinicPolicy {
            allow_double_booking_for_exam_services: true,
            ..ClinicPolicy::default()
        };
        assert_eq!(validate(&req, &appts, None, &exempt), BookingDecision::Accepted);
    }

    #[test]
    fn test_five_minutes_apart_do_not_clash() {
        let policy = ClinicPolicy::default();
        let appts = vec![existing("a1", "v1", "2024-12-20", "09:00")];
        let req = request("a1", "v1", ServiceCategory::Consultation, "2024-12-20", "09:05");
        assert_eq!(validate(&req, &appts, None, &policy), BookingDecision::Accepted);
    }

    #[test]
    fn test_index_and_slice_agree() {
        let policy = ClinicPolicy::default();
        let appts = vec![
            existing("a1", "v1", "2024-12-20", "09:00"),
            existing("a2", "v2", "2024-12-20", "10:00"),
        ];
        let index = SlotIndex::build(&appts);
        for (animal, vet, time) in [("a1", "v3", "09:00"), ("a3", "v2", "10:00"), ("a3", "v3", "10:00")] {
            let req = request(animal, vet, ServiceCategory::Consultation, "2024-12-20", time);
            assert_eq!(
                validate(&req, &appts, None, &policy),
                validate(&req, &index, None, &policy)
            );
        }
    }
}
