//! Care Schedule Engine.
//!
//! Owns next-due-date computation, the sensor-driven watering adjustment,
//! pending-task reconciliation, and the complete/skip state machine. Date
//! arithmetic is pure; the task-set operations go through [`PlantStore`].
//!
//! Repotting months are fixed 30-day blocks, not calendar months;
//! downstream schedules depend on that simplification.

use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{CareError, Result};
use crate::model::{CareTask, PlantType, SensorReading, TaskType, User, UserPlant};
use crate::status::compute_status;
use crate::storage::PlantStore;

/// Days in one schedule "month".
const DAYS_PER_MONTH: i64 = 30;

/// Derive the initial next-due dates at plant creation. Called once; all
/// later mutation goes through task completion.
pub fn initial_schedule(plant: &mut UserPlant, plant_type: &PlantType) {
    plant.next_watering =
        plant.last_watered + Duration::days(i64::from(plant_type.watering_frequency_days));
    plant.next_fertilizing =
        plant.last_fertilized + Duration::days(i64::from(plant_type.fertilizing_frequency_days));
    plant.next_repotting = next_repotting_date(plant.last_repotted, plant_type);
}

/// Next repotting date: only derivable when the plant has been repotted
/// before and the species has a repotting cadence.
pub fn next_repotting_date(
    last_repotted: Option<NaiveDate>,
    plant_type: &PlantType,
) -> Option<NaiveDate> {
    match (last_repotted, plant_type.repotting_frequency_months) {
        (Some(last), Some(months)) => {
            Some(last + Duration::days(i64::from(months) * DAYS_PER_MONTH))
        }
        _ => None,
    }
}

/// Next watering date: base frequency from the last watering, shifted by
/// the sensor adjustment when the owner's premium is active and the plant
/// reports soil humidity.
pub fn next_watering_date(
    plant: &UserPlant,
    plant_type: &PlantType,
    user: &User,
    latest_reading: Option<&SensorReading>,
    today: NaiveDate,
) -> NaiveDate {
    let base =
        plant.last_watered + Duration::days(i64::from(plant_type.watering_frequency_days));

    if user.is_premium_active(today) && plant.has_sensor {
        if let Some(reading) = latest_reading {
            return base + Duration::days(sensor_adjustment_days(reading, plant_type));
        }
    }

    base
}

/// Signed schedule adjustment in days, from soil humidity relative to the
/// optimal range. Well-watered soil pushes the next watering later; soil
/// below 70% of the optimal minimum pulls it a day earlier. A reading
/// without a soil probe contributes nothing.
pub fn sensor_adjustment_days(reading: &SensorReading, plant_type: &PlantType) -> i64 {
    let soil = match reading.soil_humidity {
        Some(value) => value,
        None => return 0,
    };
    let optimal_min = f64::from(plant_type.optimal_humidity_min);
    let optimal_max = f64::from(plant_type.optimal_humidity_max);

    if soil >= optimal_min {
        if soil > optimal_max {
            return 2;
        }
        return 1;
    }

    if soil < optimal_min * 0.7 {
        return -1;
    }

    0
}

/// Reconcile a plant's pending task set against its current next-due dates.
///
/// Deletes pending tasks scheduled strictly before today (stale, superseded
/// by the current schedule), then ensures exactly one pending task per care
/// type at the plant's next date. Idempotent: a second call with no other
/// mutation changes nothing.
pub fn reconcile_tasks(
    store: &mut dyn PlantStore,
    clock: &dyn Clock,
    plant: &UserPlant,
) -> Result<()> {
    let today = clock.today();
    store.delete_stale_pending(&plant.id, today)?;

    ensure_pending(store, clock, plant, TaskType::Watering, plant.next_watering)?;
    ensure_pending(
        store,
        clock,
        plant,
        TaskType::Fertilizing,
        plant.next_fertilizing,
    )?;
    if let Some(next_repotting) = plant.next_repotting {
        ensure_pending(store, clock, plant, TaskType::Repotting, next_repotting)?;
    }

    Ok(())
}

fn ensure_pending(
    store: &mut dyn PlantStore,
    clock: &dyn Clock,
    plant: &UserPlant,
    task_type: TaskType,
    date: NaiveDate,
) -> Result<()> {
    if store.pending_task_exists(&plant.id, task_type, date)? {
        return Ok(());
    }
    store.insert_task(&CareTask {
        id: Uuid::new_v4(),
        plant_id: plant.id,
        scheduled_date: date,
        task_type,
        is_completed: false,
        completed_at: None,
        skipped: false,
        auto_adjusted: false,
        notes: None,
        created_at: clock.now(),
    })
}

/// Load a task and its plant, enforcing ownership. Another user's task is
/// reported as not found so existence is never leaked.
fn owned_task(
    store: &dyn PlantStore,
    user_id: &Uuid,
    task_id: &Uuid,
) -> Result<(CareTask, UserPlant)> {
    let task = store
        .get_task(task_id)?
        .ok_or_else(|| CareError::NotFound("Care task not found".to_string()))?;
    let plant = store
        .get_plant(&task.plant_id)?
        .ok_or_else(|| CareError::NotFound("Care task not found".to_string()))?;
    if plant.user_id != *user_id {
        return Err(CareError::NotFound("Care task not found".to_string()));
    }
    Ok((task, plant))
}

/// Complete a care task and advance the owning plant's schedule.
///
/// The task's *scheduled* date becomes the plant's new `last_<type>`
/// baseline, so completing early or late still anchors the schedule to the
/// planned date. Watering recomputes with the sensor adjustment;
/// fertilizing and repotting use the flat frequency. The plant's status is
/// recomputed and the pending task set regenerated.
pub fn complete_task(
    store: &mut dyn PlantStore,
    clock: &dyn Clock,
    user_id: &Uuid,
    task_id: &Uuid,
    notes: Option<String>,
) -> Result<CareTask> {
    let (mut task, mut plant) = owned_task(store, user_id, task_id)?;

    if task.is_completed {
        return Err(CareError::Conflict("Task is already completed".to_string()));
    }

    let user = store
        .get_user(user_id)?
        .ok_or_else(|| CareError::NotFound("User not found".to_string()))?;
    let plant_type = store
        .get_plant_type(&plant.plant_type_id)?
        .ok_or_else(|| CareError::Storage("Plant references a missing type".to_string()))?;
    let latest = store.latest_reading(&plant.id)?;
    let today = clock.today();

    task.is_completed = true;
    task.completed_at = Some(clock.now());
    if notes.is_some() {
        task.notes = notes;
    }
    store.update_task(&task)?;

    match task.task_type {
        TaskType::Watering => {
            plant.last_watered = task.scheduled_date;
            plant.next_watering =
                next_watering_date(&plant, &plant_type, &user, latest.as_ref(), today);
        }
        TaskType::Fertilizing => {
            plant.last_fertilized = task.scheduled_date;
            plant.next_fertilizing = plant.last_fertilized
                + Duration::days(i64::from(plant_type.fertilizing_frequency_days));
        }
        TaskType::Repotting => {
            plant.last_repotted = Some(task.scheduled_date);
            // Without a repotting cadence the next date stays unset and no
            // repotting task is regenerated.
            plant.next_repotting = next_repotting_date(plant.last_repotted, &plant_type);
        }
    }

    plant.status = compute_status(&plant, &plant_type, &user, latest.as_ref(), today);
    plant.updated_at = clock.now();
    store.update_plant(&plant)?;

    reconcile_tasks(store, clock, &plant)?;

    Ok(task)
}

/// Skip a care task. Terminal: the plant's schedule and status are left
/// untouched and nothing is rescheduled.
pub fn skip_task(
    store: &mut dyn PlantStore,
    user_id: &Uuid,
    task_id: &Uuid,
) -> Result<CareTask> {
    let (mut task, _plant) = owned_task(store, user_id, task_id)?;

    if task.is_completed {
        return Err(CareError::Conflict(
            "Cannot skip a completed task".to_string(),
        ));
    }
    if task.skipped {
        return Err(CareError::Conflict("Task is already skipped".to_string()));
    }

    task.skipped = true;
    store.update_task(&task)?;

    Ok(task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PlantStatus;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn plant_type() -> PlantType {
        PlantType {
            id: Uuid::new_v4(),
            name: "Ficus".to_string(),
            scientific_name: None,
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
            created_at: Utc::now(),
        }
    }

    fn plant(pt: &PlantType, has_sensor: bool) -> UserPlant {
        UserPlant {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            plant_type_id: pt.id,
            name: "Freddy".to_string(),
            location: None,
            last_watered: date(2024, 6, 1),
            last_fertilized: date(2024, 5, 15),
            last_repotted: Some(date(2024, 1, 1)),
            next_watering: date(2024, 6, 1),
            next_fertilizing: date(2024, 5, 15),
            next_repotting: None,
            status: PlantStatus::Healthy,
            has_sensor,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn premium_user(id: Uuid) -> User {
        User {
            id,
            email: "p@example.com".to_string(),
            username: "p".to_string(),
            is_premium: true,
            premium_end_date: Some(date(2030, 1, 1)),
            created_at: Utc::now(),
        }
    }

    fn reading(plant_id: Uuid, soil: Option<f64>) -> SensorReading {
        SensorReading {
            id: Uuid::new_v4(),
            plant_id,
            temperature: 22.0,
            soil_humidity: soil,
            air_humidity: Some(50.0),
            light_level: 3000,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_initial_schedule_uses_flat_frequencies() {
        let pt = plant_type();
        let mut p = plant(&pt, false);
        initial_schedule(&mut p, &pt);

        assert_eq!(p.next_watering, date(2024, 6, 8));
        assert_eq!(p.next_fertilizing, date(2024, 6, 14));
        // 12 months * 30 days = 360 days after 2024-01-01
        assert_eq!(p.next_repotting, Some(date(2024, 12, 26)));
    }

    #[test]
    fn test_initial_schedule_without_repotting_history() {
        let pt = plant_type();
        let mut p = plant(&pt, false);
        p.last_repotted = None;
        initial_schedule(&mut p, &pt);
        assert_eq!(p.next_repotting, None);

        let mut no_cadence = plant_type();
        no_cadence.repotting_frequency_months = None;
        let mut p = plant(&no_cadence, false);
        initial_schedule(&mut p, &no_cadence);
        assert_eq!(p.next_repotting, None);
    }

    #[test]
    fn test_adjustment_matrix() {
        let pt = plant_type();
        let plant_id = Uuid::new_v4();

        // above optimal max -> +2
        assert_eq!(sensor_adjustment_days(&reading(plant_id, Some(65.0)), &pt), 2);
        // inside optimal range -> +1
        assert_eq!(sensor_adjustment_days(&reading(plant_id, Some(40.0)), &pt), 1);
        assert_eq!(sensor_adjustment_days(&reading(plant_id, Some(60.0)), &pt), 1);
        // below min but at least 70% of min -> 0
        assert_eq!(sensor_adjustment_days(&reading(plant_id, Some(30.0)), &pt), 0);
        assert_eq!(sensor_adjustment_days(&reading(plant_id, Some(28.0)), &pt), 0);
        // critically dry (< 70% of min) -> -1
        assert_eq!(sensor_adjustment_days(&reading(plant_id, Some(27.9)), &pt), -1);
        assert_eq!(sensor_adjustment_days(&reading(plant_id, Some(5.0)), &pt), -1);
        // no soil probe -> 0
        assert_eq!(sensor_adjustment_days(&reading(plant_id, None), &pt), 0);
    }

    #[test]
    fn test_next_watering_applies_adjustment_for_premium_sensor_plant() {
        let pt = plant_type();
        let p = plant(&pt, true);
        let user = premium_user(p.user_id);
        let today = date(2024, 6, 8);

        // Soil above optimal max: base (+7) plus 2 days.
        let r = reading(p.id, Some(65.0));
        assert_eq!(
            next_watering_date(&p, &pt, &user, Some(&r), today),
            date(2024, 6, 10)
        );

        // Critically dry soil pulls the date a day earlier.
        let r = reading(p.id, Some(10.0));
        assert_eq!(
            next_watering_date(&p, &pt, &user, Some(&r), today),
            date(2024, 6, 7)
        );

        // No reading: flat frequency.
        assert_eq!(
            next_watering_date(&p, &pt, &user, None, today),
            date(2024, 6, 8)
        );
    }

    #[test]
    fn test_next_watering_ignores_sensor_without_premium() {
        let pt = plant_type();
        let p = plant(&pt, true);
        let mut user = premium_user(p.user_id);
        user.is_premium = false;
        let today = date(2024, 6, 8);

        let r = reading(p.id, Some(65.0));
        assert_eq!(
            next_watering_date(&p, &pt, &user, Some(&r), today),
            date(2024, 6, 8)
        );
    }
}
