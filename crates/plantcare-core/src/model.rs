//! Core data types for the plant-care domain.
//!
//! These records map one-to-one onto relational rows. Next-due dates and
//! `status` on [`UserPlant`] are always derived by the engines, never
//! user-supplied; the `New*` structs carry only what callers may set.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CareError, Result};

/// Derived health status of a plant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlantStatus {
    Healthy,
    Warning,
    Critical,
}

impl PlantStatus {
    /// Stable lowercase form used for storage and output.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlantStatus::Healthy => "healthy",
            PlantStatus::Warning => "warning",
            PlantStatus::Critical => "critical",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "healthy" => Ok(PlantStatus::Healthy),
            "warning" => Ok(PlantStatus::Warning),
            "critical" => Ok(PlantStatus::Critical),
            other => Err(CareError::Validation(format!(
                "Unknown plant status: {}",
                other
            ))),
        }
    }
}

/// Kind of care task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Watering,
    Fertilizing,
    Repotting,
}

impl TaskType {
    /// Stable lowercase form used for storage and output.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Watering => "watering",
            TaskType::Fertilizing => "fertilizing",
            TaskType::Repotting => "repotting",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "watering" => Ok(TaskType::Watering),
            "fertilizing" => Ok(TaskType::Fertilizing),
            "repotting" => Ok(TaskType::Repotting),
            other => Err(CareError::Validation(format!(
                "Unknown task type: {}",
                other
            ))),
        }
    }
}

/// Reference catalog entry describing one species' care parameters.
///
/// Owned by the catalog; referenced (not owned) by plants. A type cannot
/// be deleted while any plant references it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantType {
    pub id: Uuid,

    /// Common name (e.g., "Monstera")
    pub name: String,

    pub scientific_name: Option<String>,

    /// How often the species wants water, in days
    pub watering_frequency_days: u32,

    /// How often the species wants fertilizer, in days
    pub fertilizing_frequency_days: u32,

    /// How often the species wants repotting, in months; not every
    /// species has a repotting cadence
    pub repotting_frequency_months: Option<u32>,

    /// Optimal temperature range (°C, one decimal by convention)
    pub optimal_temp_min: f64,
    pub optimal_temp_max: f64,

    /// Optimal soil humidity range (percent)
    pub optimal_humidity_min: u32,
    pub optimal_humidity_max: u32,

    /// Optimal light range (lux)
    pub optimal_light_min: u32,
    pub optimal_light_max: u32,

    /// Free-form care notes
    pub care_tips: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Input for creating a plant type.
#[derive(Debug, Clone)]
pub struct NewPlantType {
    pub name: String,
    pub scientific_name: Option<String>,
    pub watering_frequency_days: u32,
    pub fertilizing_frequency_days: u32,
    pub repotting_frequency_months: Option<u32>,
    pub optimal_temp_min: f64,
    pub optimal_temp_max: f64,
    pub optimal_humidity_min: u32,
    pub optimal_humidity_max: u32,
    pub optimal_light_min: u32,
    pub optimal_light_max: u32,
    pub care_tips: Option<String>,
}

impl NewPlantType {
    /// Check frequency and range invariants (min ≤ max for every range).
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CareError::Validation(
                "Plant type name cannot be empty".to_string(),
            ));
        }
        if self.watering_frequency_days == 0 {
            return Err(CareError::Validation(
                "Watering frequency must be at least 1 day".to_string(),
            ));
        }
        if self.fertilizing_frequency_days == 0 {
            return Err(CareError::Validation(
                "Fertilizing frequency must be at least 1 day".to_string(),
            ));
        }
        if self.repotting_frequency_months == Some(0) {
            return Err(CareError::Validation(
                "Repotting frequency must be at least 1 month".to_string(),
            ));
        }
        if self.optimal_temp_min > self.optimal_temp_max {
            return Err(CareError::Validation(
                "Optimal temperature min exceeds max".to_string(),
            ));
        }
        if self.optimal_humidity_min > self.optimal_humidity_max {
            return Err(CareError::Validation(
                "Optimal humidity min exceeds max".to_string(),
            ));
        }
        if self.optimal_humidity_max > 100 {
            return Err(CareError::Validation(
                "Optimal humidity must be between 0% and 100%".to_string(),
            ));
        }
        if self.optimal_light_min > self.optimal_light_max {
            return Err(CareError::Validation(
                "Optimal light min exceeds max".to_string(),
            ));
        }
        Ok(())
    }
}

/// An account that owns plants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,

    /// Premium flag; only meaningful together with `premium_end_date`
    pub is_premium: bool,
    pub premium_end_date: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
}

/// Free-tier plant limit.
pub const FREE_PLANT_LIMIT: u32 = 5;

impl User {
    /// Whether the premium subscription is active on the given date.
    pub fn is_premium_active(&self, today: NaiveDate) -> bool {
        match self.premium_end_date {
            Some(end) => self.is_premium && end >= today,
            None => false,
        }
    }

    /// Maximum number of plants this user may register.
    /// `None` means unlimited.
    pub fn plant_limit(&self, today: NaiveDate) -> Option<u32> {
        if self.is_premium_active(today) {
            None
        } else {
            Some(FREE_PLANT_LIMIT)
        }
    }
}

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
}

impl NewUser {
    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err(CareError::Validation(
                "A valid email address is required".to_string(),
            ));
        }
        if self.username.trim().is_empty() {
            return Err(CareError::Validation(
                "Username cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// A plant registered by a user.
///
/// The `next_*` dates and `status` are derived: the schedule engine owns
/// the former, the status engine the latter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPlant {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plant_type_id: Uuid,

    /// User-chosen display name
    pub name: String,
    pub location: Option<String>,

    pub last_watered: NaiveDate,
    pub last_fertilized: NaiveDate,
    pub last_repotted: Option<NaiveDate>,

    pub next_watering: NaiveDate,
    pub next_fertilizing: NaiveDate,
    pub next_repotting: Option<NaiveDate>,

    pub status: PlantStatus,
    pub has_sensor: bool,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a plant. Last dates are user-supplied and must
/// not lie in the future; next dates are derived at creation.
#[derive(Debug, Clone)]
pub struct NewPlant {
    pub user_id: Uuid,
    pub plant_type_id: Uuid,
    pub name: String,
    pub location: Option<String>,
    pub last_watered: NaiveDate,
    pub last_fertilized: NaiveDate,
    pub last_repotted: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl NewPlant {
    pub fn validate(&self, today: NaiveDate) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CareError::Validation(
                "Plant name cannot be empty".to_string(),
            ));
        }
        if self.last_watered > today {
            return Err(CareError::Validation(
                "Last watered date cannot be in the future".to_string(),
            ));
        }
        if self.last_fertilized > today {
            return Err(CareError::Validation(
                "Last fertilized date cannot be in the future".to_string(),
            ));
        }
        if let Some(repotted) = self.last_repotted {
            if repotted > today {
                return Err(CareError::Validation(
                    "Last repotted date cannot be in the future".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// A scheduled care task for one plant.
///
/// Pending means `is_completed == false && skipped == false`. Completion
/// and skipping are both terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareTask {
    pub id: Uuid,
    pub plant_id: Uuid,

    pub scheduled_date: NaiveDate,
    pub task_type: TaskType,

    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub skipped: bool,

    /// Reserved: set when a sensor adjustment moved this task's date.
    /// Persisted for forward compatibility, never written by the engines.
    pub auto_adjusted: bool,

    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CareTask {
    /// A task that is neither completed nor skipped.
    pub fn is_pending(&self) -> bool {
        !self.is_completed && !self.skipped
    }

    /// Read-time derived field: scheduled in the past and not completed.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.scheduled_date < today && !self.is_completed
    }
}

/// One environmental measurement for a plant. Append-only; the latest
/// reading (by `recorded_at`) drives the sensor-aware engine branches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorReading {
    pub id: Uuid,
    pub plant_id: Uuid,

    /// Temperature (°C)
    pub temperature: f64,

    /// Soil humidity (percent); absent when no soil probe is attached
    pub soil_humidity: Option<f64>,

    /// Air humidity (percent)
    pub air_humidity: Option<f64>,

    /// Light level (lux)
    pub light_level: u32,

    pub recorded_at: DateTime<Utc>,
}

/// Input for ingesting a sensor reading.
#[derive(Debug, Clone)]
pub struct NewReading {
    pub plant_id: Uuid,
    pub temperature: f64,
    pub soil_humidity: Option<f64>,
    pub air_humidity: Option<f64>,
    pub light_level: u32,
}

impl NewReading {
    const TEMP_MIN: f64 = -50.0;
    const TEMP_MAX: f64 = 60.0;
    const LIGHT_MAX: u32 = 200_000;

    /// Range-check the measurement. Out-of-range values are rejected,
    /// never clamped.
    pub fn validate(&self) -> Result<()> {
        if !self.temperature.is_finite()
            || self.temperature < Self::TEMP_MIN
            || self.temperature > Self::TEMP_MAX
        {
            return Err(CareError::Validation(
                "Temperature must be between -50°C and 60°C".to_string(),
            ));
        }
        if let Some(soil) = self.soil_humidity {
            if !soil.is_finite() || !(0.0..=100.0).contains(&soil) {
                return Err(CareError::Validation(
                    "Soil humidity must be between 0% and 100%".to_string(),
                ));
            }
        }
        if let Some(air) = self.air_humidity {
            if !air.is_finite() || !(0.0..=100.0).contains(&air) {
                return Err(CareError::Validation(
                    "Air humidity must be between 0% and 100%".to_string(),
                ));
            }
        }
        if self.light_level > Self::LIGHT_MAX {
            return Err(CareError::Validation(
                "Light level must be between 0 and 200000 lux".to_string(),
            ));
        }
        Ok(())
    }
}

/// Read-time derived field: days from `today` until `date` (negative when
/// the date has passed). Never persisted.
pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    (date - today).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_type() -> NewPlantType {
        NewPlantType {
            name: "Monstera".to_string(),
            scientific_name: Some("Monstera deliciosa".to_string()),
            watering_frequency_days: 7,
            fertilizing_frequency_days: 30,
            repotting_frequency_months: Some(12),
            optimal_temp_min: 18.0,
            optimal_temp_max: 27.0,
            optimal_humidity_min: 40,
            optimal_humidity_max: 60,
            optimal_light_min: 1000,
            optimal_light_max: 5000,
            care_tips: None,
        }
    }

    #[test]
    fn test_plant_type_range_invariants() {
        assert!(sample_type().validate().is_ok());

        let mut inverted = sample_type();
        inverted.optimal_temp_min = 30.0;
        assert!(inverted.validate().is_err());

        let mut inverted = sample_type();
        inverted.optimal_humidity_min = 80;
        assert!(inverted.validate().is_err());

        let mut zero_freq = sample_type();
        zero_freq.watering_frequency_days = 0;
        assert!(zero_freq.validate().is_err());
    }

    #[test]
    fn test_future_last_dates_rejected() {
        let today = date(2024, 6, 1);
        let plant = NewPlant {
            user_id: Uuid::new_v4(),
            plant_type_id: Uuid::new_v4(),
            name: "Fred".to_string(),
            location: None,
            last_watered: date(2024, 6, 2),
            last_fertilized: today,
            last_repotted: None,
            notes: None,
        };
        assert!(plant.validate(today).is_err());

        let ok = NewPlant {
            last_watered: today,
            ..plant
        };
        assert!(ok.validate(today).is_ok());
    }

    #[test]
    fn test_premium_active_requires_flag_and_date() {
        let today = date(2024, 6, 1);
        let mut user = User {
            id: Uuid::new_v4(),
            email: "a@b.c".to_string(),
            username: "a".to_string(),
            is_premium: true,
            premium_end_date: Some(date(2024, 6, 1)),
            created_at: chrono::Utc::now(),
        };
        assert!(user.is_premium_active(today));
        assert_eq!(user.plant_limit(today), None);

        user.premium_end_date = Some(date(2024, 5, 31));
        assert!(!user.is_premium_active(today));
        assert_eq!(user.plant_limit(today), Some(FREE_PLANT_LIMIT));

        user.premium_end_date = None;
        assert!(!user.is_premium_active(today));

        user.is_premium = false;
        user.premium_end_date = Some(date(2025, 1, 1));
        assert!(!user.is_premium_active(today));
    }

    #[test]
    fn test_sensor_reading_bounds() {
        let base = NewReading {
            plant_id: Uuid::new_v4(),
            temperature: 22.5,
            soil_humidity: Some(45.0),
            air_humidity: Some(50.0),
            light_level: 2000,
        };
        assert!(base.validate().is_ok());

        let cold = NewReading {
            temperature: -51.0,
            ..base.clone()
        };
        assert!(cold.validate().is_err());

        let soggy = NewReading {
            soil_humidity: Some(101.0),
            ..base.clone()
        };
        assert!(soggy.validate().is_err());

        let blinding = NewReading {
            light_level: 200_001,
            ..base
        };
        assert!(blinding.validate().is_err());
    }

    #[test]
    fn test_task_pending_and_overdue() {
        let today = date(2024, 6, 10);
        let task = CareTask {
            id: Uuid::new_v4(),
            plant_id: Uuid::new_v4(),
            scheduled_date: date(2024, 6, 9),
            task_type: TaskType::Watering,
            is_completed: false,
            completed_at: None,
            skipped: false,
            auto_adjusted: false,
            notes: None,
            created_at: chrono::Utc::now(),
        };
        assert!(task.is_pending());
        assert!(task.is_overdue(today));

        let done = CareTask {
            is_completed: true,
            ..task.clone()
        };
        assert!(!done.is_pending());
        assert!(!done.is_overdue(today));

        let skipped = CareTask {
            skipped: true,
            ..task
        };
        assert!(!skipped.is_pending());
        // Skipped but not completed still counts as overdue for display.
        assert!(skipped.is_overdue(today));
    }

    #[test]
    fn test_days_until_is_signed() {
        let today = date(2024, 6, 10);
        assert_eq!(days_until(date(2024, 6, 13), today), 3);
        assert_eq!(days_until(date(2024, 6, 10), today), 0);
        assert_eq!(days_until(date(2024, 6, 7), today), -3);
    }
}
