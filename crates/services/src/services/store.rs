//! Per-user cache over plants, schedules and recent care logs.
//!
//! The database row is the source of truth; this cache exists so the API
//! surface can reflect a confirmed write immediately instead of paying a
//! second round-trip. Mutators are in-memory only and must be called after
//! the corresponding write has succeeded.

use dashmap::DashMap;
use db::{
    DBService,
    models::{
        care_log::{CareLog, CareLogWithPlant},
        care_schedule::{CareSchedule, CareScheduleWithPlant},
        plant::Plant,
    },
};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_RECENT_LOGS: i32 = 10;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to fetch from store: {0}")]
    Fetch(#[from] sqlx::Error),
}

/// Anything cached by id.
pub trait HasId {
    fn id(&self) -> Uuid;
}

impl HasId for Plant {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl HasId for CareScheduleWithPlant {
    fn id(&self) -> Uuid {
        self.schedule.id
    }
}

impl HasId for CareLogWithPlant {
    fn id(&self) -> Uuid {
        self.log.id
    }
}

/// Ordered list with insert-front / replace-by-id / remove-by-id. One
/// implementation instead of hand-rolled list edits per entity.
#[derive(Debug, Clone)]
pub struct CollectionCache<T> {
    items: Vec<T>,
}

impl<T> Default for CollectionCache<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: HasId + Clone> CollectionCache<T> {
    pub fn replace_all(&mut self, items: Vec<T>) {
        self.items = items;
    }

    /// New entries go first, matching "most recent on top" list ordering.
    pub fn insert_front(&mut self, item: T) {
        self.items.insert(0, item);
    }

    /// Replaces the entry with the same id in place. Returns false when no
    /// entry matched.
    pub fn replace(&mut self, item: T) -> bool {
        match self.items.iter_mut().find(|i| i.id() == item.id()) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id() != id);
        self.items.len() != before
    }

    pub fn retain(&mut self, f: impl FnMut(&T) -> bool) {
        self.items.retain(f);
    }

    pub fn get(&self, id: Uuid) -> Option<&T> {
        self.items.iter().find(|i| i.id() == id)
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.items.clone()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Everything cached for one user.
#[derive(Debug, Clone, Default)]
pub struct UserData {
    pub plants: CollectionCache<Plant>,
    pub schedules: CollectionCache<CareScheduleWithPlant>,
    pub recent_logs: CollectionCache<CareLogWithPlant>,
}

/// Cache plus the refresh operations that fill it from the database.
pub struct UserDataStore {
    db: DBService,
    users: DashMap<Uuid, UserData>,
}

impl UserDataStore {
    pub fn new(db: DBService) -> Self {
        Self {
            db,
            users: DashMap::new(),
        }
    }

    // --- refresh operations -------------------------------------------------

    /// Fetches all of the user's plants and replaces the cached list. No
    /// internal retry; on failure the previous cache contents are kept and
    /// the caller decides what to do.
    pub async fn refresh_plants(&self, user_id: Uuid) -> Result<Vec<Plant>, StoreError> {
        let plants = Plant::find_by_user_id(&self.db.pool, user_id).await?;
        debug!(%user_id, count = plants.len(), "refreshed plants");
        self.users
            .entry(user_id)
            .or_default()
            .plants
            .replace_all(plants.clone());
        Ok(plants)
    }

    /// Fetches all schedules belonging to the user's plants, soonest due
    /// first, and replaces the cached list.
    pub async fn refresh_schedules(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<CareScheduleWithPlant>, StoreError> {
        let schedules = CareSchedule::find_by_user_id(&self.db.pool, user_id).await?;
        debug!(%user_id, count = schedules.len(), "refreshed care schedules");
        self.users
            .entry(user_id)
            .or_default()
            .schedules
            .replace_all(schedules.clone());
        Ok(schedules)
    }

    /// Fetches the `limit` most recent completion logs across the user's
    /// plants, newest first.
    pub async fn refresh_logs(
        &self,
        user_id: Uuid,
        limit: i32,
    ) -> Result<Vec<CareLogWithPlant>, StoreError> {
        let logs = CareLog::find_recent_by_user_id(&self.db.pool, user_id, limit).await?;
        debug!(%user_id, count = logs.len(), "refreshed care logs");
        self.users
            .entry(user_id)
            .or_default()
            .recent_logs
            .replace_all(logs.clone());
        Ok(logs)
    }

    /// Refreshes plants, schedules and logs in parallel round-trips.
    pub async fn refresh_all(&self, user_id: Uuid) -> Result<(), StoreError> {
        tokio::try_join!(
            self.refresh_plants(user_id),
            self.refresh_schedules(user_id),
            self.refresh_logs(user_id, DEFAULT_RECENT_LOGS),
        )?;
        Ok(())
    }

    // --- snapshots ----------------------------------------------------------

    pub fn plants(&self, user_id: Uuid) -> Vec<Plant> {
        self.users
            .get(&user_id)
            .map(|u| u.plants.to_vec())
            .unwrap_or_default()
    }

    pub fn schedules(&self, user_id: Uuid) -> Vec<CareScheduleWithPlant> {
        self.users
            .get(&user_id)
            .map(|u| u.schedules.to_vec())
            .unwrap_or_default()
    }

    pub fn recent_logs(&self, user_id: Uuid) -> Vec<CareLogWithPlant> {
        self.users
            .get(&user_id)
            .map(|u| u.recent_logs.to_vec())
            .unwrap_or_default()
    }

    pub fn schedule(&self, user_id: Uuid, schedule_id: Uuid) -> Option<CareScheduleWithPlant> {
        self.users
            .get(&user_id)
            .and_then(|u| u.schedules.get(schedule_id).cloned())
    }

    // --- local mutators (after a confirmed write only) ----------------------

    pub fn add_plant(&self, user_id: Uuid, plant: Plant) {
        self.users
            .entry(user_id)
            .or_default()
            .plants
            .insert_front(plant);
    }

    pub fn update_plant(&self, user_id: Uuid, plant: Plant) {
        if let Some(mut user) = self.users.get_mut(&user_id) {
            user.plants.replace(plant);
        }
    }

    /// Removes the plant and evicts its cached schedules and logs, mirroring
    /// the database cascade.
    pub fn remove_plant(&self, user_id: Uuid, plant_id: Uuid) {
        if let Some(mut user) = self.users.get_mut(&user_id) {
            user.plants.remove(plant_id);
            user.schedules.retain(|s| s.schedule.plant_id != plant_id);
            user.recent_logs.retain(|l| l.log.plant_id != plant_id);
        }
    }

    pub fn add_schedule(&self, user_id: Uuid, schedule: CareScheduleWithPlant) {
        self.users
            .entry(user_id)
            .or_default()
            .schedules
            .insert_front(schedule);
    }

    /// Replaces the cached schedule row, keeping the joined plant name.
    pub fn update_schedule(&self, user_id: Uuid, schedule: CareSchedule) {
        if let Some(mut user) = self.users.get_mut(&user_id)
            && let Some(existing) = user.schedules.get(schedule.id)
        {
            let plant_name = existing.plant_name.clone();
            user.schedules.replace(CareScheduleWithPlant {
                schedule,
                plant_name,
            });
        }
    }

    pub fn remove_schedule(&self, user_id: Uuid, schedule_id: Uuid) {
        if let Some(mut user) = self.users.get_mut(&user_id) {
            user.schedules.remove(schedule_id);
        }
    }

    pub fn add_log(&self, user_id: Uuid, log: CareLogWithPlant) {
        self.users
            .entry(user_id)
            .or_default()
            .recent_logs
            .insert_front(log);
    }

    // --- lifecycle ----------------------------------------------------------

    /// Drops everything cached for the user. Safe to call when nothing was
    /// ever loaded.
    pub fn clear(&self, user_id: Uuid) {
        self.users.remove(&user_id);
    }

    pub fn clear_all(&self) {
        self.users.clear();
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use db::models::care_schedule::{CareType, CreateCareSchedule};
    use db::models::plant::CreatePlant;

    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn create_plant(name: &str) -> CreatePlant {
        CreatePlant {
            name: name.to_string(),
            species: None,
            image_url: None,
            health_score: None,
            location: None,
            acquired_date: None,
            notes: None,
        }
    }

    async fn store_with_user() -> (UserDataStore, Uuid) {
        let db = DBService::new_in_memory().await.unwrap();
        (UserDataStore::new(db), Uuid::new_v4())
    }

    #[tokio::test]
    async fn test_refresh_fills_cache_snapshots() {
        let (store, user_id) = store_with_user().await;
        let plant = Plant::create(&store.db.pool, user_id, &create_plant("Aloe"))
            .await
            .unwrap();
        CareSchedule::create(
            &store.db.pool,
            &CreateCareSchedule {
                plant_id: plant.id,
                care_type: CareType::Water,
                frequency_days: 7,
                start_date: date("2025-01-10"),
            },
        )
        .await
        .unwrap();

        assert!(store.plants(user_id).is_empty());

        store.refresh_all(user_id).await.unwrap();
        assert_eq!(store.plants(user_id).len(), 1);
        assert_eq!(store.schedules(user_id).len(), 1);
        assert_eq!(store.schedules(user_id)[0].plant_name, "Aloe");
        assert!(store.recent_logs(user_id).is_empty());
    }

    #[tokio::test]
    async fn test_clear_empties_everything_and_isolates_users() {
        let (store, user_id) = store_with_user().await;
        Plant::create(&store.db.pool, user_id, &create_plant("Aloe"))
            .await
            .unwrap();
        store.refresh_all(user_id).await.unwrap();
        assert_eq!(store.plants(user_id).len(), 1);

        store.clear(user_id);
        assert!(store.plants(user_id).is_empty());
        assert!(store.schedules(user_id).is_empty());
        assert!(store.recent_logs(user_id).is_empty());

        // A different user signing in afterwards starts from nothing.
        let other = Uuid::new_v4();
        assert!(store.plants(other).is_empty());

        // Clearing a user that never loaded anything is a no-op.
        store.clear(Uuid::new_v4());
    }

    #[tokio::test]
    async fn test_local_mutators_do_not_touch_the_database() {
        let (store, user_id) = store_with_user().await;
        let plant = Plant::create(&store.db.pool, user_id, &create_plant("Fig"))
            .await
            .unwrap();
        store.refresh_plants(user_id).await.unwrap();

        let mut renamed = plant.clone();
        renamed.name = "Fiddle-leaf fig".to_string();
        store.update_plant(user_id, renamed);

        assert_eq!(store.plants(user_id)[0].name, "Fiddle-leaf fig");
        // The row itself is untouched until a real update runs.
        let row = Plant::find_by_id(&store.db.pool, plant.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.name, "Fig");
    }

    #[tokio::test]
    async fn test_remove_plant_evicts_cached_schedules_and_logs() {
        let (store, user_id) = store_with_user().await;
        let plant = Plant::create(&store.db.pool, user_id, &create_plant("Rose"))
            .await
            .unwrap();
        let other = Plant::create(&store.db.pool, user_id, &create_plant("Tulip"))
            .await
            .unwrap();
        for p in [&plant, &other] {
            CareSchedule::create(
                &store.db.pool,
                &CreateCareSchedule {
                    plant_id: p.id,
                    care_type: CareType::Water,
                    frequency_days: 2,
                    start_date: date("2025-01-01"),
                },
            )
            .await
            .unwrap();
        }
        store.refresh_all(user_id).await.unwrap();
        assert_eq!(store.schedules(user_id).len(), 2);

        store.remove_plant(user_id, plant.id);
        assert_eq!(store.plants(user_id).len(), 1);
        let schedules = store.schedules(user_id);
        assert_eq!(schedules.len(), 1);
        assert_eq!(schedules[0].schedule.plant_id, other.id);
    }

    #[test]
    fn test_collection_cache_insert_replace_remove() {
        #[derive(Clone)]
        struct Item(Uuid, &'static str);
        impl HasId for Item {
            fn id(&self) -> Uuid {
                self.0
            }
        }

        let mut cache = CollectionCache::default();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        cache.insert_front(Item(a, "a"));
        cache.insert_front(Item(b, "b"));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.items()[0].1, "b");

        assert!(cache.replace(Item(a, "a2")));
        assert_eq!(cache.get(a).unwrap().1, "a2");
        assert!(!cache.replace(Item(Uuid::new_v4(), "missing")));

        assert!(cache.remove(b));
        assert!(!cache.remove(b));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
