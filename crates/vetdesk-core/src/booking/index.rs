//! Slot occupancy lookups over existing appointments.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};

use crate::models::slot::truncate_to_minute;
use crate::models::Appointment;

/// Answers "is this animal / veterinarian already booked in this slot".
///
/// `exclude` names an appointment that must not count as a clash with
/// itself (edit in place).
pub trait SlotLookup {
    fn animal_booked(
        &self,
        animal_id: &str,
        date: NaiveDate,
        time: NaiveTime,
        exclude: Option<&str>,
    ) -> bool;

    fn veterinarian_booked(
        &self,
        veterinarian_id: &str,
        date: NaiveDate,
        time: NaiveTime,
        exclude: Option<&str>,
    ) -> bool;
}

fn is_excluded(appointment_id: &str, exclude: Option<&str>) -> bool {
    exclude == Some(appointment_id)
}

/// Linear scan, fine for a single day's appointments.
impl SlotLookup for [Appointment] {
    fn animal_booked(
        &self,
        animal_id: &str,
        date: NaiveDate,
        time: NaiveTime,
        exclude: Option<&str>,
    ) -> bool {
        self.iter().any(|a| {
            !is_excluded(&a.id, exclude) && a.animal_id == animal_id && a.occupies(date, time)
        })
    }

    fn veterinarian_booked(
        &self,
        veterinarian_id: &str,
        date: NaiveDate,
        time: NaiveTime,
        exclude: Option<&str>,
    ) -> bool {
        self.iter().any(|a| {
            !is_excluded(&a.id, exclude)
                && a.veterinarian_id.as_deref() == Some(veterinarian_id)
                && a.occupies(date, time)
        })
    }
}

impl SlotLookup for Vec<Appointment> {
    fn animal_booked(
        &self,
        animal_id: &str,
        date: NaiveDate,
        time: NaiveTime,
        exclude: Option<&str>,
    ) -> bool {
        self.as_slice().animal_booked(animal_id, date, time, exclude)
    }

    fn veterinarian_booked(
        &self,
        veterinarian_id: &str,
        date: NaiveDate,
        time: NaiveTime,
        exclude: Option<&str>,
    ) -> bool {
        self.as_slice()
            .veterinarian_booked(veterinarian_id, date, time, exclude)
    }
}

type SlotKey = (String, NaiveDate, NaiveTime);

/// Hash index of appointments by `(animal, date, time)` and
/// `(veterinarian, date, time)`.
#[derive(Debug, Default, Clone)]
pub struct SlotIndex {
    by_animal: HashMap<SlotKey, Vec<String>>,
    by_veterinarian: HashMap<SlotKey, Vec<String>>,
    len: usize,
}

impl SlotIndex {
    /// Index every appointment in `appointments`.
    pub fn build(appointments: &[Appointment]) -> Self {
        let mut index = Self::default();
        for appointment in appointments {
            index.insert(appointment);
        }
        index
    }

    fn insert(&mut self, appointment: &Appointment) {
        let time = truncate_to_minute(appointment.time);
        self.by_animal
            .entry((appointment.animal_id.clone(), appointment.date, time))
            .or_default()
            .push(appointment.id.clone());
        if let Some(vet_id) = &appointment.veterinarian_id {
            self.by_veterinarian
                .entry((vet_id.clone(), appointment.date, time))
                .or_default()
                .push(appointment.id.clone());
        }
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

fn occupied(
    map: &HashMap<SlotKey, Vec<String>>,
    owner: &str,
    date: NaiveDate,
    time: NaiveTime,
    exclude: Option<&str>,
) -> bool {
    map.get(&(owner.to_string(), date, truncate_to_minute(time)))
        .map_or(false, |ids| ids.iter().any(|id| !is_excluded(id, exclude)))
}

impl SlotLookup for SlotIndex {
    fn animal_booked(
        &self,
        animal_id: &str,
        date: NaiveDate,
        time: NaiveTime,
        exclude: Option<&str>,
    ) -> bool {
        occupied(&self.by_animal, animal_id, date, time, exclude)
    }

    fn veterinarian_booked(
        &self,
        veterinarian_id: &str,
        date: NaiveDate,
        time: NaiveTime,
        exclude: Option<&str>,
    ) -> bool {
        occupied(&self.by_veterinarian, veterinarian_id, date, time, exclude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::slot::{parse_date, parse_slot_time};

    fn appointment(animal: &str, vet: Option<&str>, date: &str, time: &str) -> Appointment {
        let mut appt = Appointment::new(
            animal.to_string(),
            "svc".to_string(),
            parse_date(date).unwrap(),
            parse_slot_time(time).unwrap(),
        );
        appt.veterinarian_id = vet.map(str::to_string);
        appt
    }

    #[test]
    fn test_index_matches_linear_scan() {
        let appointments = vec![
            appointment("a1", Some("v1"), "2024-12-20", "09:00"),
            appointment("a2", Some("v1"), "2024-12-20", "10:00"),
            appointment("a3", None, "2024-12-20", "09:00"),
        ];
        let index = SlotIndex::build(&appointments);
        let date = parse_date("2024-12-20").unwrap();

        for (time, exclude) in [("09:00", None), ("10:00", None), ("11:00", None)] {
            let t = parse_slot_time(time).unwrap();
            for animal in ["a1", "a2", "a3", "a4"] {
                assert_eq!(
                    index.animal_booked(animal, date, t, exclude),
                    appointments.animal_booked(animal, date, t, exclude),
                );
            }
            assert_eq!(
                index.veterinarian_booked("v1", date, t, exclude),
                appointments.veterinarian_booked("v1", date, t, exclude),
            );
        }
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_exclude_skips_self() {
        let appt = appointment("a1", Some("v1"), "2024-12-20", "09:00");
        let index = SlotIndex::build(std::slice::from_ref(&appt));

        assert!(index.animal_booked("a1", appt.date, appt.time, None));
        assert!(!index.animal_booked("a1", appt.date, appt.time, Some(&appt.id)));
        assert!(!index.veterinarian_booked("v1", appt.date, appt.time, Some(&appt.id)));
        assert!(!index.is_empty());
        assert!(SlotIndex::build(&[]).is_empty());
    }
}
