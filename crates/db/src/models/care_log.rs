use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

use super::care_schedule::CareType;

/// Immutable record that one care action was performed. Never updated,
/// never deleted outside of a plant cascade.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct CareLog {
    pub id: Uuid,
    pub plant_id: Uuid,
    pub care_type: CareType,
    pub completed_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Log joined with its plant's display name for history views.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct CareLogWithPlant {
    #[sqlx(flatten)]
    #[serde(flatten)]
    #[ts(flatten)]
    pub log: CareLog,
    pub plant_name: String,
}

impl std::ops::Deref for CareLogWithPlant {
    type Target = CareLog;
    fn deref(&self) -> &Self::Target {
        &self.log
    }
}

const LOG_COLUMNS: &str = "id, plant_id, care_type, completed_at, notes, created_at";

impl CareLog {
    pub async fn create(
        pool: &SqlitePool,
        plant_id: Uuid,
        care_type: CareType,
        completed_at: DateTime<Utc>,
        notes: Option<String>,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, CareLog>(&format!(
            "INSERT INTO care_logs (id, plant_id, care_type, completed_at, notes)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {LOG_COLUMNS}"
        ))
        .bind(id)
        .bind(plant_id)
        .bind(care_type)
        .bind(completed_at)
        .bind(notes)
        .fetch_one(pool)
        .await
    }

    /// Most recent completions across all of the user's plants.
    pub async fn find_recent_by_user_id(
        pool: &SqlitePool,
        user_id: Uuid,
        limit: i32,
    ) -> Result<Vec<CareLogWithPlant>, sqlx::Error> {
        sqlx::query_as::<_, CareLogWithPlant>(
            "SELECT l.id, l.plant_id, l.care_type, l.completed_at, l.notes, l.created_at,
                    p.name AS plant_name
             FROM care_logs l
             JOIN plants p ON p.id = l.plant_id
             WHERE p.user_id = $1
             ORDER BY l.completed_at DESC
             LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub async fn count_for_plant(pool: &SqlitePool, plant_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM care_logs WHERE plant_id = $1")
                .bind(plant_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }
}
