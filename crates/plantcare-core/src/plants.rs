//! Plant lifecycle operations.
//!
//! Registration derives the initial schedule and task set in one logical
//! transaction; deletion is ownership-checked and cascades through the
//! store schema to care tasks and sensor readings.

use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{CareError, Result};
use crate::model::{NewPlant, PlantStatus, UserPlant};
use crate::schedule::{initial_schedule, reconcile_tasks};
use crate::status::compute_status;
use crate::storage::PlantStore;

/// Register a plant: validate the user-supplied dates, enforce the
/// free-tier plant limit, derive next-due dates and initial status, and
/// generate the initial pending task set.
pub fn create_plant(
    store: &mut dyn PlantStore,
    clock: &dyn Clock,
    new: &NewPlant,
) -> Result<UserPlant> {
    let today = clock.today();
    new.validate(today)?;

    let user = store
        .get_user(&new.user_id)?
        .ok_or_else(|| CareError::NotFound("User not found".to_string()))?;
    let plant_type = store
        .get_plant_type(&new.plant_type_id)?
        .ok_or_else(|| CareError::NotFound("Plant type not found".to_string()))?;

    if let Some(limit) = user.plant_limit(today) {
        if store.count_plants(&user.id)? >= limit {
            return Err(CareError::Validation(format!(
                "You have reached the limit of {} plants for your account. \
                 Upgrade to Premium for unlimited plants.",
                limit
            )));
        }
    }

    let now = clock.now();
    let mut plant = UserPlant {
        id: Uuid::new_v4(),
        user_id: new.user_id,
        plant_type_id: new.plant_type_id,
        name: new.name.clone(),
        location: new.location.clone(),
        last_watered: new.last_watered,
        last_fertilized: new.last_fertilized,
        last_repotted: new.last_repotted,
        // Placeholder next dates; derived just below.
        next_watering: new.last_watered,
        next_fertilizing: new.last_fertilized,
        next_repotting: None,
        status: PlantStatus::Healthy,
        has_sensor: false,
        notes: new.notes.clone(),
        created_at: now,
        updated_at: now,
    };

    initial_schedule(&mut plant, &plant_type);
    plant.status = compute_status(&plant, &plant_type, &user, None, today);

    store.insert_plant(&plant)?;
    reconcile_tasks(store, clock, &plant)?;

    Ok(plant)
}

/// Look up a plant enforcing ownership. Another user's plant is reported
/// as not found so existence is never leaked.
pub fn owned_plant(
    store: &dyn PlantStore,
    user_id: &Uuid,
    plant_id: &Uuid,
) -> Result<UserPlant> {
    let plant = store
        .get_plant(plant_id)?
        .ok_or_else(|| CareError::NotFound("Plant not found".to_string()))?;
    if plant.user_id != *user_id {
        return Err(CareError::NotFound("Plant not found".to_string()));
    }
    Ok(plant)
}

/// Update the user-editable fields of a plant. Schedule and status fields
/// are owned by the engines and cannot be set here.
pub fn update_plant_details(
    store: &mut dyn PlantStore,
    clock: &dyn Clock,
    user_id: &Uuid,
    plant_id: &Uuid,
    name: Option<String>,
    location: Option<String>,
    notes: Option<String>,
) -> Result<UserPlant> {
    let mut plant = owned_plant(store, user_id, plant_id)?;

    if let Some(name) = name {
        if name.trim().is_empty() {
            return Err(CareError::Validation(
                "Plant name cannot be empty".to_string(),
            ));
        }
        plant.name = name;
    }
    if location.is_some() {
        plant.location = location;
    }
    if notes.is_some() {
        plant.notes = notes;
    }
    plant.updated_at = clock.now();
    store.update_plant(&plant)?;
    Ok(plant)
}

/// Delete a plant with all of its care tasks and sensor readings.
pub fn delete_plant(store: &mut dyn PlantStore, user_id: &Uuid, plant_id: &Uuid) -> Result<()> {
    let plant = owned_plant(store, user_id, plant_id)?;
    store.delete_plant(&plant.id)
}

/// Recompute and persist one plant's status from the current clock and its
/// latest reading. The status write is the only side effect.
pub fn refresh_status(
    store: &mut dyn PlantStore,
    clock: &dyn Clock,
    plant_id: &Uuid,
) -> Result<PlantStatus> {
    let mut plant = store
        .get_plant(plant_id)?
        .ok_or_else(|| CareError::NotFound("Plant not found".to_string()))?;
    let user = store
        .get_user(&plant.user_id)?
        .ok_or_else(|| CareError::Storage("Plant references a missing user".to_string()))?;
    let plant_type = store
        .get_plant_type(&plant.plant_type_id)?
        .ok_or_else(|| CareError::Storage("Plant references a missing type".to_string()))?;
    let latest = store.latest_reading(&plant.id)?;

    let status = compute_status(&plant, &plant_type, &user, latest.as_ref(), clock.today());
    if status != plant.status {
        plant.status = status;
        plant.updated_at = clock.now();
        store.update_plant(&plant)?;
    }
    Ok(status)
}
