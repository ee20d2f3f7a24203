//! Storage trait definition.
//!
//! The `PlantStore` trait defines the interface the care engines program
//! against. This abstraction keeps the engines independent of the backing
//! store and lets tests run against an in-memory database.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::model::{
    CareTask, NewPlantType, NewUser, PlantType, SensorReading, User, UserPlant,
};

/// Filter for querying care tasks.
///
/// All conditions are ANDed. Results are always ordered by scheduled date
/// ascending with ties broken by task type (text order), which is the
/// ordering every calendar view needs.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Restrict to plants owned by this user
    pub user_id: Option<Uuid>,

    /// Restrict to a single plant
    pub plant_id: Option<Uuid>,

    /// Scheduled on exactly this date
    pub on: Option<NaiveDate>,

    /// Scheduled on or after this date (inclusive)
    pub since: Option<NaiveDate>,

    /// Scheduled on or before this date (inclusive)
    pub until: Option<NaiveDate>,

    /// Only tasks that are not completed
    pub incomplete_only: bool,
}

impl TaskFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(mut self, id: Uuid) -> Self {
        self.user_id = Some(id);
        self
    }

    pub fn plant(mut self, id: Uuid) -> Self {
        self.plant_id = Some(id);
        self
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.on = Some(date);
        self
    }

    pub fn since(mut self, date: NaiveDate) -> Self {
        self.since = Some(date);
        self
    }

    pub fn until(mut self, date: NaiveDate) -> Self {
        self.until = Some(date);
        self
    }

    pub fn incomplete(mut self) -> Self {
        self.incomplete_only = true;
        self
    }
}

/// Storage interface for the plant-care domain.
///
/// All implementations must ensure:
/// - UUIDs are used for all identifiers
/// - Deleting a plant cascades to its care tasks and sensor readings
/// - Deleting a plant type referenced by any plant is rejected
/// - Sensor readings are append-only
pub trait PlantStore: Send + Sync {
    // --- User operations ---

    /// Insert a new user and return its ID.
    fn insert_user(&mut self, user: &NewUser) -> Result<Uuid>;

    /// Get a user by ID. Returns `Ok(None)` if not found.
    fn get_user(&self, id: &Uuid) -> Result<Option<User>>;

    /// List all users, oldest first.
    fn list_users(&self) -> Result<Vec<User>>;

    /// Update a user's premium fields.
    fn set_premium(
        &mut self,
        id: &Uuid,
        is_premium: bool,
        premium_end_date: Option<NaiveDate>,
    ) -> Result<()>;

    // --- Plant type catalog ---

    /// Insert a catalog entry and return its ID.
    fn insert_plant_type(&mut self, plant_type: &NewPlantType) -> Result<Uuid>;

    /// Get a catalog entry by ID.
    fn get_plant_type(&self, id: &Uuid) -> Result<Option<PlantType>>;

    /// List the catalog ordered by name.
    fn list_plant_types(&self) -> Result<Vec<PlantType>>;

    /// Delete a catalog entry.
    ///
    /// # Errors
    ///
    /// Returns `CareError::Conflict` while any plant references it.
    fn delete_plant_type(&mut self, id: &Uuid) -> Result<()>;

    // --- Plant operations ---

    /// Insert a fully-derived plant row (the lifecycle layer computes the
    /// next dates and status before insertion).
    fn insert_plant(&mut self, plant: &UserPlant) -> Result<()>;

    /// Get a plant by ID.
    fn get_plant(&self, id: &Uuid) -> Result<Option<UserPlant>>;

    /// List one user's plants, newest first.
    fn list_plants(&self, user_id: &Uuid) -> Result<Vec<UserPlant>>;

    /// List every plant in the system (admin sweep and statistics).
    fn list_all_plants(&self) -> Result<Vec<UserPlant>>;

    /// Number of plants a user has registered.
    fn count_plants(&self, user_id: &Uuid) -> Result<u32>;

    /// Persist all mutable fields of a plant.
    fn update_plant(&mut self, plant: &UserPlant) -> Result<()>;

    /// Delete a plant; its care tasks and sensor readings go with it.
    fn delete_plant(&mut self, id: &Uuid) -> Result<()>;

    // --- Care task operations ---

    /// Insert a care task row.
    fn insert_task(&mut self, task: &CareTask) -> Result<()>;

    /// Get a task by ID.
    fn get_task(&self, id: &Uuid) -> Result<Option<CareTask>>;

    /// Persist completion/skip state and notes of a task.
    fn update_task(&mut self, task: &CareTask) -> Result<()>;

    /// Delete all pending (incomplete, unskipped) tasks of a plant whose
    /// scheduled date is strictly before `before`. Completed and skipped
    /// tasks are never touched. Returns the number deleted.
    fn delete_stale_pending(&mut self, plant_id: &Uuid, before: NaiveDate) -> Result<u32>;

    /// Whether a pending task of this type exists at exactly this date.
    fn pending_task_exists(
        &self,
        plant_id: &Uuid,
        task_type: crate::model::TaskType,
        date: NaiveDate,
    ) -> Result<bool>;

    /// List tasks matching the filter.
    fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<CareTask>>;

    // --- Sensor reading operations ---

    /// Append a sensor reading row.
    fn insert_reading(&mut self, reading: &SensorReading) -> Result<()>;

    /// Latest reading for a plant by `recorded_at`, if any.
    fn latest_reading(&self, plant_id: &Uuid) -> Result<Option<SensorReading>>;

    /// Readings for a plant recorded at or after `since` (all readings when
    /// `None`), oldest first.
    fn list_readings(
        &self,
        plant_id: &Uuid,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<SensorReading>>;

    // --- Maintenance ---

    /// Check referential integrity of the store.
    fn check_integrity(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_filter_builder() {
        let user = Uuid::new_v4();
        let day = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();

        let filter = TaskFilter::new().user(user).since(day).incomplete();
        assert_eq!(filter.user_id, Some(user));
        assert_eq!(filter.since, Some(day));
        assert!(filter.incomplete_only);
        assert!(filter.plant_id.is_none());
        assert!(filter.on.is_none());
    }
}
