//! Care Status Engine.
//!
//! Derives a plant's tri-state health status from how overdue its watering
//! is and, for sensor-equipped premium plants, the latest environmental
//! reading. Pure given its inputs; "today" is injected by the caller.

use chrono::NaiveDate;

use crate::model::{PlantStatus, PlantType, SensorReading, User, UserPlant};

/// Derive a plant's health status.
///
/// The sensor-aware branch only applies when the owner's premium is active,
/// the plant has a sensor assigned, and at least one reading exists;
/// otherwise the basic overdue thresholds decide. A sensor plant with no
/// reading yet degrades to the basic branch rather than failing, and so
/// does a plant whose owner's premium has lapsed.
pub fn compute_status(
    plant: &UserPlant,
    plant_type: &PlantType,
    user: &User,
    latest_reading: Option<&SensorReading>,
    today: NaiveDate,
) -> PlantStatus {
    let days_since_watering = (today - plant.last_watered).num_days();
    let watering_overdue = days_since_watering - i64::from(plant_type.watering_frequency_days);

    if user.is_premium_active(today) && plant.has_sensor {
        if let Some(reading) = latest_reading {
            return sensor_status(plant_type, reading, watering_overdue);
        }
    }

    basic_status(watering_overdue)
}

/// Status from watering overdue-ness alone.
fn basic_status(watering_overdue: i64) -> PlantStatus {
    if watering_overdue >= 3 {
        PlantStatus::Critical
    } else if watering_overdue >= 1 {
        PlantStatus::Warning
    } else {
        PlantStatus::Healthy
    }
}

/// Status from the latest reading, evaluated in strict precedence order.
///
/// A reading without a soil probe contributes no soil clauses; the overdue
/// clauses and the temperature/light rule still apply.
fn sensor_status(
    plant_type: &PlantType,
    reading: &SensorReading,
    watering_overdue: i64,
) -> PlantStatus {
    let humidity_min = f64::from(plant_type.optimal_humidity_min);
    let soil = reading.soil_humidity;

    let critically_dry = soil.map(|s| s < humidity_min * 0.5).unwrap_or(false);
    if critically_dry || watering_overdue >= 3 {
        return PlantStatus::Critical;
    }

    let dry = soil.map(|s| s < humidity_min).unwrap_or(false);
    if dry || watering_overdue >= 1 {
        return PlantStatus::Warning;
    }

    if reading.temperature < plant_type.optimal_temp_min
        || reading.temperature > plant_type.optimal_temp_max
        || reading.light_level < plant_type.optimal_light_min
    {
        return PlantStatus::Warning;
    }

    PlantStatus::Healthy
}
