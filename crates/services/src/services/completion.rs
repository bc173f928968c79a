//! Completion processing: record a care log and roll the schedule forward
//! by exactly one period, plus validated schedule authoring.

use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};
use db::{
    DBService,
    models::{
        care_log::{CareLog, CareLogWithPlant},
        care_schedule::{CareSchedule, CareScheduleWithPlant, CreateCareSchedule},
        plant::Plant,
    },
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use ts_rs::TS;
use uuid::Uuid;

use super::store::UserDataStore;

#[derive(Debug, Error)]
pub enum CompletionError {
    /// Absent from the cache (or gone from the table). Refresh and retry
    /// once before surfacing this to the user.
    #[error("schedule {0} not found")]
    ScheduleNotFound(Uuid),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("frequency must be at least one day, got {0}")]
    InvalidFrequency(i32),
    #[error("plant {0} not found for this user")]
    UnknownPlant(Uuid),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// What a successful completion produced: the new log and the rolled
/// schedule.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CompletionOutcome {
    pub log: CareLogWithPlant,
    pub schedule: CareScheduleWithPlant,
}

/// The next due date is one period after the occurrence actually satisfied,
/// not after today and not after the stored due date. Completing an overdue
/// occurrence therefore does not compound drift.
pub fn advance_from(occurrence_date: NaiveDate, frequency_days: i32) -> NaiveDate {
    occurrence_date
        .checked_add_days(Days::new(frequency_days.max(0) as u64))
        .unwrap_or(NaiveDate::MAX)
}

pub struct CompletionProcessor {
    db: DBService,
    store: Arc<UserDataStore>,
}

impl CompletionProcessor {
    pub fn new(db: DBService, store: Arc<UserDataStore>) -> Self {
        Self { db, store }
    }

    /// Records that `schedule_id`'s obligation on `occurrence_date` was
    /// fulfilled: writes one immutable care log stamped with the wall-clock
    /// completion time, then advances `next_due_date` by one
    /// `frequency_days` step from `occurrence_date`.
    ///
    /// The two writes are ordered but not transactional. If the schedule
    /// update fails after the log landed, the cache is left untouched and
    /// the next refresh shows the schedule still due; completing it again
    /// then produces a duplicate log. Repeat calls are likewise not
    /// deduplicated, so callers must disable the action once submitted.
    pub async fn complete_task(
        &self,
        user_id: Uuid,
        schedule_id: Uuid,
        occurrence_date: NaiveDate,
    ) -> Result<CompletionOutcome, CompletionError> {
        let entry = self
            .store
            .schedule(user_id, schedule_id)
            .ok_or(CompletionError::ScheduleNotFound(schedule_id))?;

        let log = CareLog::create(
            &self.db.pool,
            entry.schedule.plant_id,
            entry.schedule.care_type,
            Utc::now(),
            Some("Completed via task list".to_string()),
        )
        .await?;

        let new_due_date = advance_from(occurrence_date, entry.schedule.frequency_days);
        let updated = CareSchedule::advance_due_date(&self.db.pool, schedule_id, new_due_date)
            .await
            .inspect_err(|e| {
                warn!(
                    %schedule_id,
                    log_id = %log.id,
                    error = %e,
                    "care log written but schedule advance failed; schedule stays due"
                );
            })?
            .ok_or(CompletionError::ScheduleNotFound(schedule_id))?;

        info!(
            %user_id,
            %schedule_id,
            care_type = %updated.care_type,
            %occurrence_date,
            %new_due_date,
            "completed care task"
        );

        let plant_name = entry.plant_name.clone();
        let outcome = CompletionOutcome {
            log: CareLogWithPlant {
                log,
                plant_name: plant_name.clone(),
            },
            schedule: CareScheduleWithPlant {
                schedule: updated,
                plant_name,
            },
        };

        // Both writes confirmed; now the cache may reflect them.
        self.store.add_log(user_id, outcome.log.clone());
        self.store
            .update_schedule(user_id, outcome.schedule.schedule.clone());

        Ok(outcome)
    }

    /// Validates and creates a new schedule. The frequency check runs before
    /// any write; `start_date` becomes `next_due_date` verbatim, so a past
    /// start is legal and immediately overdue.
    pub async fn create_schedule(
        &self,
        user_id: Uuid,
        data: CreateCareSchedule,
    ) -> Result<CareScheduleWithPlant, ScheduleError> {
        if data.frequency_days < 1 {
            return Err(ScheduleError::InvalidFrequency(data.frequency_days));
        }

        let plant = Plant::find_by_id_for_user(&self.db.pool, data.plant_id, user_id)
            .await?
            .ok_or(ScheduleError::UnknownPlant(data.plant_id))?;

        let schedule = CareSchedule::create(&self.db.pool, &data).await?;
        info!(
            %user_id,
            schedule_id = %schedule.id,
            care_type = %schedule.care_type,
            frequency_days = schedule.frequency_days,
            "created care schedule"
        );

        let entry = CareScheduleWithPlant {
            schedule,
            plant_name: plant.name,
        };
        self.store.add_schedule(user_id, entry.clone());
        Ok(entry)
    }
}
