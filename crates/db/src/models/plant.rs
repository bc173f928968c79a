use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// A plant owned by one user. Schedules and logs hang off it and are
/// removed with it (ON DELETE CASCADE).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Plant {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub species: Option<String>,
    pub image_url: Option<String>,
    pub health_score: i32, // 0-100
    pub location: Option<String>,
    pub acquired_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreatePlant {
    pub name: String,
    pub species: Option<String>,
    pub image_url: Option<String>,
    pub health_score: Option<i32>,
    pub location: Option<String>,
    pub acquired_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdatePlant {
    pub name: Option<String>,
    pub species: Option<String>,
    pub image_url: Option<String>,
    pub health_score: Option<i32>,
    pub location: Option<String>,
    pub acquired_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

const PLANT_COLUMNS: &str =
    "id, user_id, name, species, image_url, health_score, location, acquired_date, notes, created_at, updated_at";

impl Plant {
    pub async fn find_by_user_id(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Plant>(&format!(
            "SELECT {PLANT_COLUMNS} FROM plants WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Plant>(&format!(
            "SELECT {PLANT_COLUMNS} FROM plants WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Ownership-scoped lookup. Returns `None` for plants belonging to a
    /// different user, same as for a missing row.
    pub async fn find_by_id_for_user(
        pool: &SqlitePool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Plant>(&format!(
            "SELECT {PLANT_COLUMNS} FROM plants WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        user_id: Uuid,
        data: &CreatePlant,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        let health_score = data.health_score.unwrap_or(100);
        sqlx::query_as::<_, Plant>(&format!(
            "INSERT INTO plants (id, user_id, name, species, image_url, health_score, location, acquired_date, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {PLANT_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .bind(&data.name)
        .bind(&data.species)
        .bind(&data.image_url)
        .bind(health_score)
        .bind(&data.location)
        .bind(data.acquired_date)
        .bind(&data.notes)
        .fetch_one(pool)
        .await
    }

    /// Partial update; absent fields keep their current value.
    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        user_id: Uuid,
        data: &UpdatePlant,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Plant>(&format!(
            "UPDATE plants
             SET name = COALESCE($3, name),
                 species = COALESCE($4, species),
                 image_url = COALESCE($5, image_url),
                 health_score = COALESCE($6, health_score),
                 location = COALESCE($7, location),
                 acquired_date = COALESCE($8, acquired_date),
                 notes = COALESCE($9, notes),
                 updated_at = datetime('now', 'subsec')
             WHERE id = $1 AND user_id = $2
             RETURNING {PLANT_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .bind(&data.name)
        .bind(&data.species)
        .bind(&data.image_url)
        .bind(data.health_score)
        .bind(&data.location)
        .bind(data.acquired_date)
        .bind(&data.notes)
        .fetch_optional(pool)
        .await
    }

    /// Deletes the plant; schedules and logs referencing it go with it.
    pub async fn delete<'e, E>(executor: E, id: Uuid, user_id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM plants WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
