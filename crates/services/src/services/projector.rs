//! Pure expansion of recurring care schedules into concrete calendar
//! occurrences. No I/O and no clock access; callers pass `today` in.

use chrono::{Days, Months, NaiveDate};
use db::models::care_schedule::{CareScheduleWithPlant, CareType};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

pub const DEFAULT_HORIZON_MONTHS: u32 = 3;
pub const DEFAULT_MAX_EVENTS_PER_SCHEDULE: usize = 20;

#[derive(Debug, Clone, Copy)]
pub struct ProjectorConfig {
    /// Forward window, in whole months from `today`.
    pub horizon_months: u32,
    /// Per-schedule emission cap. Display safeguard for dense schedules
    /// (daily frequency over a long horizon), not a business rule.
    pub max_events_per_schedule: usize,
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self {
            horizon_months: DEFAULT_HORIZON_MONTHS,
            max_events_per_schedule: DEFAULT_MAX_EVENTS_PER_SCHEDULE,
        }
    }
}

/// One concrete instance of a schedule on one date. Derived for display,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct CalendarOccurrence {
    /// Synthetic id: schedule id plus sequence index.
    pub id: String,
    pub schedule_id: Uuid,
    pub plant_id: Uuid,
    pub plant_name: String,
    pub care_type: CareType,
    pub date: NaiveDate,
    /// Completion is tracked on the schedule, so a projected occurrence is
    /// always pending.
    pub completed: bool,
}

/// Last date inside the projection window.
pub fn horizon_end(today: NaiveDate, horizon_months: u32) -> NaiveDate {
    today
        .checked_add_months(Months::new(horizon_months))
        .unwrap_or(NaiveDate::MAX)
}

/// Expands every active schedule into dated occurrences.
///
/// The cursor starts at the schedule's stored `next_due_date` even when that
/// date is in the past: an overdue obligation is emitted at its original
/// date for the UI to flag, never silently moved up to today. Per schedule,
/// dates increase by exactly `frequency_days` until `horizon_end` or the
/// emission cap.
pub fn project_occurrences(
    schedules: &[CareScheduleWithPlant],
    today: NaiveDate,
    config: &ProjectorConfig,
) -> Vec<CalendarOccurrence> {
    let end = horizon_end(today, config.horizon_months);
    let mut occurrences = Vec::new();

    for entry in schedules {
        let schedule = &entry.schedule;
        if !schedule.is_active || schedule.frequency_days < 1 {
            continue;
        }

        let mut cursor = schedule.next_due_date;
        let mut seq = 0usize;
        while cursor <= end && seq < config.max_events_per_schedule {
            occurrences.push(CalendarOccurrence {
                id: format!("{}-{}", schedule.id, seq),
                schedule_id: schedule.id,
                plant_id: schedule.plant_id,
                plant_name: entry.plant_name.clone(),
                care_type: schedule.care_type,
                date: cursor,
                completed: false,
            });
            seq += 1;
            match cursor.checked_add_days(Days::new(schedule.frequency_days as u64)) {
                Some(next) => cursor = next,
                None => break,
            }
        }
    }

    occurrences
}

pub fn occurrences_on(
    occurrences: &[CalendarOccurrence],
    date: NaiveDate,
) -> Vec<CalendarOccurrence> {
    occurrences
        .iter()
        .filter(|o| o.date == date)
        .cloned()
        .collect()
}

pub fn due_today(occurrences: &[CalendarOccurrence], today: NaiveDate) -> Vec<CalendarOccurrence> {
    occurrences_on(occurrences, today)
}

/// Occurrences strictly after today and within the next seven days.
pub fn upcoming_week(
    occurrences: &[CalendarOccurrence],
    today: NaiveDate,
) -> Vec<CalendarOccurrence> {
    let week_end = today
        .checked_add_days(Days::new(7))
        .unwrap_or(NaiveDate::MAX);
    occurrences
        .iter()
        .filter(|o| o.date > today && o.date <= week_end)
        .cloned()
        .collect()
}

/// Occurrences whose date has passed without the schedule being advanced.
/// Only active schedules are projected, so date comparison is the whole
/// check.
pub fn overdue(occurrences: &[CalendarOccurrence], today: NaiveDate) -> Vec<CalendarOccurrence> {
    occurrences
        .iter()
        .filter(|o| is_overdue(o.date, today))
        .cloned()
        .collect()
}

pub fn is_overdue(date: NaiveDate, today: NaiveDate) -> bool {
    date < today
}
