//! Day-of-week indexed availability windows.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use super::{ScheduleError, ScheduleResult};
use crate::models::slot::{self, truncate_to_minute};

/// Day of week, Sunday first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum DayOfWeek {
    Sunday = 0,
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
}

impl DayOfWeek {
    /// All days in schedule order.
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Sunday,
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
    ];

    /// Index into a [`WorkSchedule`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DayOfWeek::Sunday => "sunday",
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayOfWeek {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        DayOfWeek::ALL
            .into_iter()
            .find(|day| day.as_str() == lower || day.as_str()[..3] == lower)
            .ok_or_else(|| ScheduleError::UnknownDay(s.to_string()))
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sun => DayOfWeek::Sunday,
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
        }
    }
}

/// The only place calendar dates are mapped to schedule days.
pub fn day_of_week(date: NaiveDate) -> DayOfWeek {
    date.weekday().into()
}

/// Availability window for a single day.
///
/// `start` and `end` are kept when the day is inactive so the edit form can
/// restore them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DaySchedule {
    pub active: bool,
    #[serde(with = "slot::hhmm")]
    pub start: NaiveTime,
    #[serde(with = "slot::hhmm")]
    pub end: NaiveTime,
}

impl DaySchedule {
    pub fn new(active: bool, start: NaiveTime, end: NaiveTime) -> Self {
        Self { active, start, end }
    }

    /// Inactive day keeping the given window for later editing.
    pub fn closed(start: NaiveTime, end: NaiveTime) -> Self {
        Self::new(false, start, end)
    }

    /// Whether `time` falls inside this day's window, boundaries included.
    pub fn contains(&self, time: NaiveTime) -> bool {
        if !self.active {
            return false;
        }
        let time = truncate_to_minute(time);
        self.start <= time && time <= self.end
    }
}

/// One veterinarian's weekly availability pattern.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkSchedule {
    days: [DaySchedule; 7],
}

impl WorkSchedule {
    /// Build from explicit day entries, Sunday first.
    pub fn from_days(days: [DaySchedule; 7]) -> ScheduleResult<Self> {
        for day in DayOfWeek::ALL {
            validate_window(day, &days[day.index()])?;
        }
        Ok(Self { days })
    }

    /// Monday to Friday 08:00-18:00, Saturday 08:00-12:00, Sunday closed.
    pub fn business_default() -> Self {
        let open = hm(8, 0);
        let close = hm(18, 0);
        let weekday = DaySchedule::new(true, open, close);
        Self {
            days: [
                DaySchedule::closed(open, close),
                weekday,
                weekday,
                weekday,
                weekday,
                weekday,
                DaySchedule::new(true, open, hm(12, 0)),
            ],
        }
    }

    /// Entry for a given day.
    pub fn day(&self, day: DayOfWeek) -> &DaySchedule {
        &self.days[day.index()]
    }

    /// Iterate `(day, entry)` pairs in schedule order.
    pub fn iter(&self) -> impl Iterator<Item = (DayOfWeek, &DaySchedule)> + '_ {
        DayOfWeek::ALL.into_iter().map(move |d| (d, &self.days[d.index()]))
    }

    /// Replace a day entry.
    pub fn set_day(&mut self, day: DayOfWeek, entry: DaySchedule) -> ScheduleResult<()> {
        validate_window(day, &entry)?;
        self.days[day.index()] = entry;
        Ok(())
    }

    /// Toggle a day without touching its stored window.
    pub fn set_active(&mut self, day: DayOfWeek, active: bool) {
        self.days[day.index()].active = active;
    }

    /// Whether the veterinarian works at `at`.
    pub fn is_within_work_hours(&self, at: NaiveDateTime) -> bool {
        self.is_open(at.date(), at.time())
    }

    /// Same as [`WorkSchedule::is_within_work_hours`] with date and time split.
    pub fn is_open(&self, date: NaiveDate, time: NaiveTime) -> bool {
        self.day(day_of_week(date)).contains(time)
    }

    /// Days marked active.
    pub fn active_days(&self) -> Vec<DayOfWeek> {
        self.iter()
            .filter(|(_, entry)| entry.active)
            .map(|(day, _)| day)
            .collect()
    }
}

impl Default for WorkSchedule {
    fn default() -> Self {
        Self::business_default()
    }
}

fn validate_window(day: DayOfWeek, entry: &DaySchedule) -> ScheduleResult<()> {
    if entry.start > entry.end {
        return Err(ScheduleError::InvalidWindow {
            day,
            start: slot::format_slot_time(entry.start),
            end: slot::format_slot_time(entry.end),
        });
    }
    Ok(())
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}
