use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

/// Care action a schedule recurs on.
#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "care_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CareType {
    #[default]
    Water,
    Fertilize,
    Prune,
    Repot,
    Mist,
    Rotate,
}

/// A recurring care obligation for one plant. `next_due_date` only ever
/// moves forward, one `frequency_days` step per completion.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, TS)]
pub struct CareSchedule {
    pub id: Uuid,
    pub plant_id: Uuid,
    pub care_type: CareType,
    pub frequency_days: i32,
    pub next_due_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Schedule joined with its owning plant's display name, as the calendar
/// and task views consume it.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct CareScheduleWithPlant {
    #[sqlx(flatten)]
    #[serde(flatten)]
    #[ts(flatten)]
    pub schedule: CareSchedule,
    pub plant_name: String,
}

impl std::ops::Deref for CareScheduleWithPlant {
    type Target = CareSchedule;
    fn deref(&self) -> &Self::Target {
        &self.schedule
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateCareSchedule {
    pub plant_id: Uuid,
    pub care_type: CareType,
    pub frequency_days: i32,
    /// Becomes `next_due_date` verbatim; a past date is legal and shows up
    /// as immediately overdue.
    pub start_date: NaiveDate,
}

/// Editable schedule fields. `next_due_date` is deliberately absent: it
/// only moves through `advance_due_date`, one period per completion.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateCareSchedule {
    pub care_type: Option<CareType>,
    pub frequency_days: Option<i32>,
    pub is_active: Option<bool>,
}

const SCHEDULE_COLUMNS: &str =
    "id, plant_id, care_type, frequency_days, next_due_date, is_active, created_at, updated_at";

impl CareSchedule {
    /// All schedules whose plant belongs to `user_id`, soonest due first.
    pub async fn find_by_user_id(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<Vec<CareScheduleWithPlant>, sqlx::Error> {
        sqlx::query_as::<_, CareScheduleWithPlant>(
            "SELECT s.id, s.plant_id, s.care_type, s.frequency_days, s.next_due_date,
                    s.is_active, s.created_at, s.updated_at, p.name AS plant_name
             FROM care_schedules s
             JOIN plants p ON p.id = s.plant_id
             WHERE p.user_id = $1
             ORDER BY s.next_due_date ASC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Active schedules due on or before `date` for `user_id`, soonest first.
    pub async fn find_due_by(
        pool: &SqlitePool,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<CareScheduleWithPlant>, sqlx::Error> {
        sqlx::query_as::<_, CareScheduleWithPlant>(
            "SELECT s.id, s.plant_id, s.care_type, s.frequency_days, s.next_due_date,
                    s.is_active, s.created_at, s.updated_at, p.name AS plant_name
             FROM care_schedules s
             JOIN plants p ON p.id = s.plant_id
             WHERE p.user_id = $1 AND s.is_active = 1 AND s.next_due_date <= $2
             ORDER BY s.next_due_date ASC",
        )
        .bind(user_id)
        .bind(date)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, CareSchedule>(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM care_schedules WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateCareSchedule,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, CareSchedule>(&format!(
            "INSERT INTO care_schedules (id, plant_id, care_type, frequency_days, next_due_date, is_active)
             VALUES ($1, $2, $3, $4, $5, 1)
             RETURNING {SCHEDULE_COLUMNS}"
        ))
        .bind(id)
        .bind(data.plant_id)
        .bind(data.care_type)
        .bind(data.frequency_days)
        .bind(data.start_date)
        .fetch_one(pool)
        .await
    }

    /// Partial update; absent fields keep their current value. Does not
    /// touch `next_due_date`.
    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateCareSchedule,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, CareSchedule>(&format!(
            "UPDATE care_schedules
             SET care_type = COALESCE($2, care_type),
                 frequency_days = COALESCE($3, frequency_days),
                 is_active = COALESCE($4, is_active),
                 updated_at = datetime('now', 'subsec')
             WHERE id = $1
             RETURNING {SCHEDULE_COLUMNS}"
        ))
        .bind(id)
        .bind(data.care_type)
        .bind(data.frequency_days)
        .bind(data.is_active)
        .fetch_optional(pool)
        .await
    }

    /// Roll the schedule forward after a completion. The schedule stays
    /// active; only the due date moves.
    pub async fn advance_due_date(
        pool: &SqlitePool,
        id: Uuid,
        new_due_date: NaiveDate,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, CareSchedule>(&format!(
            "UPDATE care_schedules
             SET next_due_date = $2, is_active = 1, updated_at = datetime('now', 'subsec')
             WHERE id = $1
             RETURNING {SCHEDULE_COLUMNS}"
        ))
        .bind(id)
        .bind(new_due_date)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM care_schedules WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        DBService,
        models::plant::{CreatePlant, Plant},
    };

    async fn seed_plant(pool: &SqlitePool, user_id: Uuid) -> Plant {
        Plant::create(
            pool,
            user_id,
            &CreatePlant {
                name: "Snake plant".to_string(),
                species: None,
                image_url: None,
                health_score: None,
                location: None,
                acquired_date: None,
                notes: None,
            },
        )
        .await
        .unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_create_starts_active_with_verbatim_start_date() {
        let db = DBService::new_in_memory().await.unwrap();
        let user_id = Uuid::new_v4();
        let plant = seed_plant(&db.pool, user_id).await;

        // Past start dates are kept as-is, not clamped to today.
        let schedule = CareSchedule::create(
            &db.pool,
            &CreateCareSchedule {
                plant_id: plant.id,
                care_type: CareType::Water,
                frequency_days: 7,
                start_date: date("2020-06-01"),
            },
        )
        .await
        .unwrap();

        assert!(schedule.is_active);
        assert_eq!(schedule.next_due_date, date("2020-06-01"));
        assert_eq!(schedule.care_type, CareType::Water);
    }

    #[tokio::test]
    async fn test_find_by_user_joins_plant_name_and_orders_by_due_date() {
        let db = DBService::new_in_memory().await.unwrap();
        let user_id = Uuid::new_v4();
        let plant = seed_plant(&db.pool, user_id).await;

        for (care_type, due) in [
            (CareType::Fertilize, "2025-03-01"),
            (CareType::Water, "2025-01-10"),
            (CareType::Mist, "2025-02-01"),
        ] {
            CareSchedule::create(
                &db.pool,
                &CreateCareSchedule {
                    plant_id: plant.id,
                    care_type,
                    frequency_days: 14,
                    start_date: date(due),
                },
            )
            .await
            .unwrap();
        }

        let schedules = CareSchedule::find_by_user_id(&db.pool, user_id).await.unwrap();
        assert_eq!(schedules.len(), 3);
        assert_eq!(schedules[0].plant_name, "Snake plant");
        let dues: Vec<NaiveDate> = schedules.iter().map(|s| s.next_due_date).collect();
        assert_eq!(
            dues,
            vec![date("2025-01-10"), date("2025-02-01"), date("2025-03-01")]
        );

        // Another user sees none of them.
        let other = CareSchedule::find_by_user_id(&db.pool, Uuid::new_v4())
            .await
            .unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn test_find_due_by_skips_inactive_and_future() {
        let db = DBService::new_in_memory().await.unwrap();
        let user_id = Uuid::new_v4();
        let plant = seed_plant(&db.pool, user_id).await;

        let due = CareSchedule::create(
            &db.pool,
            &CreateCareSchedule {
                plant_id: plant.id,
                care_type: CareType::Water,
                frequency_days: 3,
                start_date: date("2025-01-05"),
            },
        )
        .await
        .unwrap();
        let paused = CareSchedule::create(
            &db.pool,
            &CreateCareSchedule {
                plant_id: plant.id,
                care_type: CareType::Prune,
                frequency_days: 30,
                start_date: date("2025-01-01"),
            },
        )
        .await
        .unwrap();
        CareSchedule::update(
            &db.pool,
            paused.id,
            &UpdateCareSchedule {
                care_type: None,
                frequency_days: None,
                is_active: Some(false),
            },
        )
        .await
        .unwrap();
        // Not yet due.
        CareSchedule::create(
            &db.pool,
            &CreateCareSchedule {
                plant_id: plant.id,
                care_type: CareType::Repot,
                frequency_days: 180,
                start_date: date("2025-06-01"),
            },
        )
        .await
        .unwrap();

        let found = CareSchedule::find_due_by(&db.pool, user_id, date("2025-01-10"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, due.id);
    }

    #[tokio::test]
    async fn test_update_never_moves_next_due_date() {
        let db = DBService::new_in_memory().await.unwrap();
        let user_id = Uuid::new_v4();
        let plant = seed_plant(&db.pool, user_id).await;

        let schedule = CareSchedule::create(
            &db.pool,
            &CreateCareSchedule {
                plant_id: plant.id,
                care_type: CareType::Water,
                frequency_days: 7,
                start_date: date("2025-01-10"),
            },
        )
        .await
        .unwrap();

        // Only completions roll the due date; edits never do.
        let updated = CareSchedule::update(
            &db.pool,
            schedule.id,
            &UpdateCareSchedule {
                care_type: Some(CareType::Mist),
                frequency_days: Some(3),
                is_active: Some(false),
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(updated.care_type, CareType::Mist);
        assert_eq!(updated.frequency_days, 3);
        assert!(!updated.is_active);
        assert_eq!(updated.next_due_date, date("2025-01-10"));
    }

    #[tokio::test]
    async fn test_advance_due_date_keeps_schedule_active() {
        let db = DBService::new_in_memory().await.unwrap();
        let user_id = Uuid::new_v4();
        let plant = seed_plant(&db.pool, user_id).await;

        let schedule = CareSchedule::create(
            &db.pool,
            &CreateCareSchedule {
                plant_id: plant.id,
                care_type: CareType::Water,
                frequency_days: 7,
                start_date: date("2025-01-10"),
            },
        )
        .await
        .unwrap();

        let rolled = CareSchedule::advance_due_date(&db.pool, schedule.id, date("2025-01-17"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rolled.next_due_date, date("2025-01-17"));
        assert!(rolled.is_active);
    }

    #[tokio::test]
    async fn test_deleting_plant_cascades_to_schedules() {
        let db = DBService::new_in_memory().await.unwrap();
        let user_id = Uuid::new_v4();
        let plant = seed_plant(&db.pool, user_id).await;

        let schedule = CareSchedule::create(
            &db.pool,
            &CreateCareSchedule {
                plant_id: plant.id,
                care_type: CareType::Water,
                frequency_days: 7,
                start_date: date("2025-01-10"),
            },
        )
        .await
        .unwrap();

        Plant::delete(&db.pool, plant.id, user_id).await.unwrap();

        assert!(
            CareSchedule::find_by_id(&db.pool, schedule.id)
                .await
                .unwrap()
                .is_none()
        );
    }
}
