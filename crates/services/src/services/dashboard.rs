//! Aggregated home-screen data: plants, what's due, recent history.

use chrono::NaiveDate;
use db::{
    DBService,
    models::{
        care_log::{CareLog, CareLogWithPlant},
        care_schedule::{CareSchedule, CareScheduleWithPlant},
        plant::Plant,
    },
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::store::{DEFAULT_RECENT_LOGS, StoreError};

const HEALTHY_SCORE_THRESHOLD: i32 = 80;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct DashboardStats {
    pub total_plants: usize,
    pub due_today: usize,
    pub healthy_plants: usize,
    pub need_attention: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct DashboardData {
    pub plants: Vec<Plant>,
    /// Active schedules due today or earlier.
    pub due_schedules: Vec<CareScheduleWithPlant>,
    pub recent_logs: Vec<CareLogWithPlant>,
    pub stats: DashboardStats,
}

pub struct DashboardService {
    db: DBService,
}

impl DashboardService {
    pub fn new(db: DBService) -> Self {
        Self { db }
    }

    /// Fetches plants, due schedules and recent logs in parallel and
    /// derives the headline stats.
    pub async fn load(&self, user_id: Uuid, today: NaiveDate) -> Result<DashboardData, StoreError> {
        let (plants, due_schedules, recent_logs) = tokio::try_join!(
            Plant::find_by_user_id(&self.db.pool, user_id),
            CareSchedule::find_due_by(&self.db.pool, user_id, today),
            CareLog::find_recent_by_user_id(&self.db.pool, user_id, DEFAULT_RECENT_LOGS),
        )?;

        let healthy_plants = plants
            .iter()
            .filter(|p| p.health_score >= HEALTHY_SCORE_THRESHOLD)
            .count();
        let stats = DashboardStats {
            total_plants: plants.len(),
            due_today: due_schedules.len(),
            healthy_plants,
            need_attention: plants.len() - healthy_plants,
        };

        Ok(DashboardData {
            plants,
            due_schedules,
            recent_logs,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use db::models::care_schedule::{CareType, CreateCareSchedule};
    use db::models::plant::CreatePlant;

    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_dashboard_stats_split_by_health_and_due_date() {
        let db = DBService::new_in_memory().await.unwrap();
        let service = DashboardService::new(db.clone());
        let user_id = Uuid::new_v4();

        let mut plant_ids = Vec::new();
        for (name, score) in [("Aloe", 95), ("Fern", 80), ("Orchid", 40)] {
            let plant = Plant::create(
                &db.pool,
                user_id,
                &CreatePlant {
                    name: name.to_string(),
                    species: None,
                    image_url: None,
                    health_score: Some(score),
                    location: None,
                    acquired_date: None,
                    notes: None,
                },
            )
            .await
            .unwrap();
            plant_ids.push(plant.id);
        }

        // One overdue, one due later.
        CareSchedule::create(
            &db.pool,
            &CreateCareSchedule {
                plant_id: plant_ids[0],
                care_type: CareType::Water,
                frequency_days: 7,
                start_date: date("2025-01-01"),
            },
        )
        .await
        .unwrap();
        CareSchedule::create(
            &db.pool,
            &CreateCareSchedule {
                plant_id: plant_ids[1],
                care_type: CareType::Repot,
                frequency_days: 180,
                start_date: date("2025-06-01"),
            },
        )
        .await
        .unwrap();

        let data = service.load(user_id, date("2025-01-15")).await.unwrap();
        assert_eq!(data.stats.total_plants, 3);
        assert_eq!(data.stats.due_today, 1);
        assert_eq!(data.stats.healthy_plants, 2);
        assert_eq!(data.stats.need_attention, 1);
        assert_eq!(data.due_schedules[0].plant_name, "Aloe");
    }
}
