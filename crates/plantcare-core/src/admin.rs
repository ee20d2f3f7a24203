//! Administration: premium management, the status sweep, and system
//! statistics.

use std::collections::BTreeMap;

use chrono::Duration;
use serde::Serialize;
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{CareError, Result};
use crate::plants::refresh_status;
use crate::storage::PlantStore;

/// Default premium grant length.
pub const DEFAULT_PREMIUM_DAYS: i64 = 30;

/// Grant premium to a user for `days` starting today.
pub fn grant_premium(
    store: &mut dyn PlantStore,
    clock: &dyn Clock,
    user_id: &Uuid,
    days: i64,
) -> Result<()> {
    if days <= 0 {
        return Err(CareError::Validation(
            "Premium duration must be positive".to_string(),
        ));
    }
    store
        .get_user(user_id)?
        .ok_or_else(|| CareError::NotFound("User not found".to_string()))?;
    let end = clock.today() + Duration::days(days);
    store.set_premium(user_id, true, Some(end))
}

/// Revoke premium. Sensor data and assignments are retained; the engines
/// degrade to the basic branch on the next recompute.
pub fn revoke_premium(store: &mut dyn PlantStore, user_id: &Uuid) -> Result<()> {
    let user = store
        .get_user(user_id)?
        .ok_or_else(|| CareError::NotFound("User not found".to_string()))?;
    store.set_premium(user_id, false, user.premium_end_date)
}

/// Outcome of a status sweep.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SweepReport {
    pub plants_seen: u32,
    pub failures: u32,
}

/// Recompute every plant's status. Best effort: plants are processed one
/// by one with no ordering or cross-plant atomicity guarantee, and a
/// failure on one plant does not stop the sweep.
pub fn recompute_all_statuses(store: &mut dyn PlantStore, clock: &dyn Clock) -> Result<SweepReport> {
    let plants = store.list_all_plants()?;
    let mut report = SweepReport {
        plants_seen: 0,
        failures: 0,
    };
    for plant in plants {
        report.plants_seen += 1;
        if refresh_status(store, clock, &plant.id).is_err() {
            report.failures += 1;
        }
    }
    Ok(report)
}

/// System-wide counters for the admin view.
#[derive(Debug, Clone, Serialize)]
pub struct SystemStatistics {
    pub total_users: u32,
    pub premium_users: u32,
    pub free_users: u32,
    pub total_plants: u32,
    pub plant_statuses: BTreeMap<String, u32>,
    pub plants_with_sensors: u32,
}

pub fn system_statistics(store: &dyn PlantStore, clock: &dyn Clock) -> Result<SystemStatistics> {
    let today = clock.today();
    let users = store.list_users()?;
    let plants = store.list_all_plants()?;

    let total_users = users.len() as u32;
    let premium_users = users.iter().filter(|u| u.is_premium_active(today)).count() as u32;

    let mut plant_statuses: BTreeMap<String, u32> = BTreeMap::new();
    let mut plants_with_sensors = 0u32;
    for plant in &plants {
        *plant_statuses
            .entry(plant.status.as_str().to_string())
            .or_insert(0) += 1;
        if plant.has_sensor {
            plants_with_sensors += 1;
        }
    }

    Ok(SystemStatistics {
        total_users,
        premium_users,
        free_users: total_users - premium_users,
        total_plants: plants.len() as u32,
        plant_statuses,
        plants_with_sensors,
    })
}
