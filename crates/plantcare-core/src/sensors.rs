//! Sensor ingestion and assignment.
//!
//! Readings are append-only and premium-gated. A burst of writes never
//! recomputes plant status by itself; recomputation happens on task
//! completion, the admin sweep, or an explicit refresh request.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{CareError, Result};
use crate::model::{NewReading, SensorReading, UserPlant};
use crate::plants::{owned_plant, refresh_status};
use crate::storage::PlantStore;

/// Time window for reading queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingPeriod {
    Day,
    Week,
    Month,
}

impl ReadingPeriod {
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "day" => Ok(ReadingPeriod::Day),
            "week" => Ok(ReadingPeriod::Week),
            "month" => Ok(ReadingPeriod::Month),
            other => Err(CareError::Validation(format!(
                "Unknown period: {} (use day, week or month)",
                other
            ))),
        }
    }

    fn window(&self) -> Duration {
        match self {
            ReadingPeriod::Day => Duration::days(1),
            ReadingPeriod::Week => Duration::days(7),
            ReadingPeriod::Month => Duration::days(30),
        }
    }
}

fn require_premium(store: &dyn PlantStore, user_id: &Uuid, today: chrono::NaiveDate) -> Result<()> {
    let user = store
        .get_user(user_id)?
        .ok_or_else(|| CareError::NotFound("User not found".to_string()))?;
    if !user.is_premium_active(today) {
        return Err(CareError::Entitlement(
            "Sensor features are only available for Premium users".to_string(),
        ));
    }
    Ok(())
}

/// Ingest one sensor reading for an owned plant.
///
/// Status is recomputed only when `refresh` is set; plain ingestion leaves
/// it to the next completion or sweep.
pub fn record_reading(
    store: &mut dyn PlantStore,
    clock: &dyn Clock,
    user_id: &Uuid,
    new: &NewReading,
    refresh: bool,
) -> Result<SensorReading> {
    new.validate()?;
    require_premium(store, user_id, clock.today())?;
    let plant = owned_plant(store, user_id, &new.plant_id)?;

    let reading = SensorReading {
        id: Uuid::new_v4(),
        plant_id: plant.id,
        temperature: new.temperature,
        soil_humidity: new.soil_humidity,
        air_humidity: new.air_humidity,
        light_level: new.light_level,
        recorded_at: clock.now(),
    };
    store.insert_reading(&reading)?;

    if refresh {
        refresh_status(store, clock, &plant.id)?;
    }

    Ok(reading)
}

/// Mark a plant as sensor-equipped. Premium-gated: the sensor-aware
/// branches only ever activate for premium owners anyway.
pub fn assign_sensor(
    store: &mut dyn PlantStore,
    clock: &dyn Clock,
    user_id: &Uuid,
    plant_id: &Uuid,
) -> Result<UserPlant> {
    require_premium(store, user_id, clock.today())?;
    let mut plant = owned_plant(store, user_id, plant_id)?;
    plant.has_sensor = true;
    plant.updated_at = clock.now();
    store.update_plant(&plant)?;
    Ok(plant)
}

/// Detach a plant's sensor. Deliberately not premium-gated so a lapsed
/// subscriber can still clean up; existing readings are retained.
pub fn unassign_sensor(
    store: &mut dyn PlantStore,
    clock: &dyn Clock,
    user_id: &Uuid,
    plant_id: &Uuid,
) -> Result<UserPlant> {
    let mut plant = owned_plant(store, user_id, plant_id)?;
    plant.has_sensor = false;
    plant.updated_at = clock.now();
    store.update_plant(&plant)?;
    Ok(plant)
}

/// Latest reading for an owned plant, if any.
pub fn latest_reading(
    store: &dyn PlantStore,
    user_id: &Uuid,
    plant_id: &Uuid,
) -> Result<Option<SensorReading>> {
    let plant = owned_plant(store, user_id, plant_id)?;
    store.latest_reading(&plant.id)
}

/// Readings for an owned plant inside the chart window, oldest first.
pub fn readings_window(
    store: &dyn PlantStore,
    clock: &dyn Clock,
    user_id: &Uuid,
    plant_id: &Uuid,
    period: ReadingPeriod,
) -> Result<Vec<SensorReading>> {
    let plant = owned_plant(store, user_id, plant_id)?;
    let since: DateTime<Utc> = clock.now() - period.window();
    store.list_readings(&plant.id, Some(since))
}

/// Every reading ever recorded for an owned plant, oldest first.
pub fn all_readings(
    store: &dyn PlantStore,
    user_id: &Uuid,
    plant_id: &Uuid,
) -> Result<Vec<SensorReading>> {
    let plant = owned_plant(store, user_id, plant_id)?;
    store.list_readings(&plant.id, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_parsing() {
        assert_eq!(ReadingPeriod::parse("day").unwrap(), ReadingPeriod::Day);
        assert_eq!(ReadingPeriod::parse("week").unwrap(), ReadingPeriod::Week);
        assert_eq!(ReadingPeriod::parse("month").unwrap(), ReadingPeriod::Month);
        assert!(ReadingPeriod::parse("year").is_err());
    }

    #[test]
    fn test_period_windows() {
        assert_eq!(ReadingPeriod::Day.window(), Duration::days(1));
        assert_eq!(ReadingPeriod::Week.window(), Duration::days(7));
        assert_eq!(ReadingPeriod::Month.window(), Duration::days(30));
    }
}
