//! Dose schedule generation and per-entry transitions.

use chrono::{Days, NaiveDate};
use tracing::debug;

use super::{DoseError, DoseResult, MAX_DOSES};
use crate::models::{DoseScheduleEntry, DoseStatus, VaccineProtocol};

/// Generate the dose series starting at `first_application_date`.
///
/// The first entry is always produced and marked applied. With
/// `auto_schedule`, `dose_count - 1` further entries follow, each dated on
/// the previous entry's `next_due`. Without it, later doses are registered
/// manually and only the first entry is returned. More than [`MAX_DOSES`]
/// auto-scheduled doses is an error.
pub fn generate_doses(
    first_application_date: NaiveDate,
    dose_count: u32,
    interval_days: u32,
    auto_schedule: bool,
) -> DoseResult<Vec<DoseScheduleEntry>> {
    let total = if auto_schedule { dose_count.max(1) } else { 1 };
    if total > MAX_DOSES {
        return Err(DoseError::TooManyDoses(total));
    }
    let mut entries = Vec::new();
    let mut application_date = first_application_date;

    for sequence_number in 1..=total {
        let next_due = add_days(application_date, interval_days)
            .ok_or(DoseError::DateOverflow(sequence_number))?;
        let status = if sequence_number == 1 {
            DoseStatus::Applied
        } else {
            DoseStatus::Scheduled
        };
        entries.push(DoseScheduleEntry {
            sequence_number,
            application_date,
            due_interval_days: interval_days,
            next_due,
            status,
            cancellation_reason: None,
        });
        application_date = next_due;
    }

    debug!(
        first = %first_application_date,
        doses = entries.len(),
        interval_days,
        "generated dose schedule"
    );
    Ok(entries)
}

/// Generate a series from a vaccine protocol.
pub fn generate_for_protocol(
    protocol: &VaccineProtocol,
    first_application_date: NaiveDate,
    auto_schedule: bool,
) -> DoseResult<Vec<DoseScheduleEntry>> {
    generate_doses(
        first_application_date,
        protocol.dose_count,
        protocol.interval_days,
        auto_schedule,
    )
}

fn add_days(date: NaiveDate, days: u32) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(u64::from(days)))
}

impl DoseScheduleEntry {
    /// Record the dose as given on `applied_on`.
    pub fn apply(&mut self, applied_on: NaiveDate) -> DoseResult<()> {
        self.ensure_scheduled()?;
        self.application_date = applied_on;
        self.next_due = add_days(applied_on, self.due_interval_days)
            .ok_or(DoseError::DateOverflow(self.sequence_number))?;
        self.status = DoseStatus::Applied;
        Ok(())
    }

    /// Cancel a scheduled dose. `canceled` is final.
    pub fn cancel(&mut self, reason: &str) -> DoseResult<()> {
        self.ensure_scheduled()?;
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(DoseError::MissingReason);
        }
        self.status = DoseStatus::Canceled;
        self.cancellation_reason = Some(reason.to_string());
        Ok(())
    }

    /// Whether this dose is still pending on or after `as_of`.
    pub fn is_upcoming(&self, as_of: NaiveDate) -> bool {
        self.status == DoseStatus::Scheduled && self.application_date >= as_of
    }

    fn ensure_scheduled(&self) -> DoseResult<()> {
        if self.status != DoseStatus::Scheduled {
            return Err(DoseError::NotScheduled {
                sequence: self.sequence_number,
                status: self.status,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_three_doses_thirty_days() {
        let d = date("2024-01-10");
        let doses = generate_doses(d, 3, 30, true).unwrap();

        assert_eq!(doses.len(), 3);
        assert_eq!(doses[0].application_date, d);
        assert_eq!(doses[1].application_date, date("2024-02-09"));
        assert_eq!(doses[2].application_date, date("2024-03-10"));
        assert_eq!(doses[0].status, DoseStatus::Applied);
        assert_eq!(doses[1].status, DoseStatus::Scheduled);
        assert_eq!(doses[2].status, DoseStatus::Scheduled);
        assert_eq!(doses[2].next_due, date("2024-04-09"));
        assert_eq!(
            doses.iter().map(|d| d.sequence_number).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_without_auto_schedule_only_first() {
        let doses = generate_doses(date("2024-01-10"), 5, 21, false).unwrap();
        assert_eq!(doses.len(), 1);
        assert_eq!(doses[0].next_due, date("2024-01-31"));
    }

    #[test]
    fn test_zero_count_still_produces_first() {
        let doses = generate_doses(date("2024-01-10"), 0, 21, true).unwrap();
        assert_eq!(doses.len(), 1);
        assert_eq!(doses[0].status, DoseStatus::Applied);
    }

    #[test]
    fn test_leap_year_crossing() {
        let doses = generate_doses(date("2024-02-20"), 2, 10, true).unwrap();
        assert_eq!(doses[1].application_date, date("2024-03-01"));
    }

    #[test]
    fn test_overflow_is_an_error() {
        let result = generate_doses(NaiveDate::MAX, 2, 1, true);
        assert_eq!(result, Err(DoseError::DateOverflow(1)));
    }

    #[test]
    fn test_dose_count_is_bounded() {
        let start = date("2024-01-10");
        assert_eq!(
            generate_doses(start, u32::MAX, 30, true),
            Err(DoseError::TooManyDoses(u32::MAX))
        );
        assert_eq!(
            generate_doses(start, MAX_DOSES + 1, 0, true),
            Err(DoseError::TooManyDoses(MAX_DOSES + 1))
        );
        assert_eq!(generate_doses(start, MAX_DOSES, 0, true).unwrap().len(), MAX_DOSES as usize);
        // Manual series only ever produce the first dose
        assert_eq!(generate_doses(start, u32::MAX, 30, false).unwrap().len(), 1);
    }

    #[test]
    fn test_cancel_is_final() {
        let mut doses = generate_doses(date("2024-01-10"), 3, 30, true).unwrap();

        assert_eq!(doses[2].cancel(""), Err(DoseError::MissingReason));
        doses[2].cancel("animal moved away").unwrap();
        assert_eq!(doses[2].status, DoseStatus::Canceled);
        assert!(doses[2].apply(date("2024-03-10")).is_err());
        assert!(doses[2].cancel("again").is_err());

        // Earlier dose remains scheduled; ordering is not enforced
        assert_eq!(doses[1].status, DoseStatus::Scheduled);
    }

    #[test]
    fn test_apply_moves_next_due() {
        let mut doses = generate_doses(date("2024-01-10"), 2, 30, true).unwrap();
        doses[1].apply(date("2024-02-12")).unwrap();
        assert_eq!(doses[1].status, DoseStatus::Applied);
        assert_eq!(doses[1].next_due, date("2024-03-13"));
        assert!(doses[0].cancel("too late").is_err());
    }

    #[test]
    fn test_protocol_generation() {
        let protocol = VaccineProtocol::new("V10", 3, 21);
        let doses = generate_for_protocol(&protocol, date("2024-05-01"), true).unwrap();
        assert_eq!(doses.len(), 3);
        assert_eq!(doses[2].application_date, date("2024-06-12"));
    }
}
