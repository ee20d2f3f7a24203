//! Output formatting.
//!
//! JSON views carry the read-time derived fields (days-until counts and
//! overdue flags) alongside the stored record, so scripted callers never
//! have to re-derive them.

use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use plantcare_core::model::{days_until, CareTask, SensorReading, User, UserPlant};

/// Convert a user to JSON for output.
pub fn user_json(user: &User, today: NaiveDate) -> serde_json::Value {
    serde_json::json!({
        "id": user.id,
        "email": user.email,
        "username": user.username,
        "is_premium": user.is_premium,
        "premium_end_date": user.premium_end_date,
        "premium_active": user.is_premium_active(today),
        "created_at": user.created_at,
    })
}

/// Convert a plant to JSON, with the type name and derived day counts.
pub fn plant_json(
    plant: &UserPlant,
    type_names: &HashMap<Uuid, String>,
    today: NaiveDate,
) -> serde_json::Value {
    let type_name = type_names
        .get(&plant.plant_type_id)
        .cloned()
        .unwrap_or_else(|| "unknown".to_string());
    serde_json::json!({
        "id": plant.id,
        "user_id": plant.user_id,
        "plant_type_id": plant.plant_type_id,
        "plant_type_name": type_name,
        "name": plant.name,
        "location": plant.location,
        "status": plant.status,
        "has_sensor": plant.has_sensor,
        "last_watered": plant.last_watered,
        "last_fertilized": plant.last_fertilized,
        "last_repotted": plant.last_repotted,
        "next_watering": plant.next_watering,
        "next_fertilizing": plant.next_fertilizing,
        "next_repotting": plant.next_repotting,
        "days_until_watering": days_until(plant.next_watering, today),
        "days_until_fertilizing": days_until(plant.next_fertilizing, today),
        "days_until_repotting": plant.next_repotting.map(|d| days_until(d, today)),
        "notes": plant.notes,
        "created_at": plant.created_at,
        "updated_at": plant.updated_at,
    })
}

/// Convert a care task to JSON, with the plant name and overdue flag.
pub fn task_json(
    task: &CareTask,
    plant_names: &HashMap<Uuid, String>,
    today: NaiveDate,
) -> serde_json::Value {
    let plant_name = plant_names
        .get(&task.plant_id)
        .cloned()
        .unwrap_or_else(|| "unknown".to_string());
    serde_json::json!({
        "id": task.id,
        "plant_id": task.plant_id,
        "plant_name": plant_name,
        "task_type": task.task_type,
        "scheduled_date": task.scheduled_date,
        "days_until": days_until(task.scheduled_date, today),
        "is_completed": task.is_completed,
        "completed_at": task.completed_at,
        "skipped": task.skipped,
        "is_overdue": task.is_overdue(today),
        "notes": task.notes,
    })
}

pub fn tasks_json(
    tasks: &[CareTask],
    plant_names: &HashMap<Uuid, String>,
    today: NaiveDate,
) -> Vec<serde_json::Value> {
    tasks
        .iter()
        .map(|task| task_json(task, plant_names, today))
        .collect()
}

/// Convert a sensor reading to JSON.
pub fn reading_json(reading: &SensorReading) -> serde_json::Value {
    serde_json::json!({
        "id": reading.id,
        "plant_id": reading.plant_id,
        "temperature": reading.temperature,
        "soil_humidity": reading.soil_humidity,
        "air_humidity": reading.air_humidity,
        "light_level": reading.light_level,
        "recorded_at": reading.recorded_at,
    })
}

/// One task as a plain text line.
pub fn task_line(
    task: &CareTask,
    plant_names: &HashMap<Uuid, String>,
    today: NaiveDate,
) -> String {
    let plant_name = plant_names
        .get(&task.plant_id)
        .map(String::as_str)
        .unwrap_or("unknown");
    let state = if task.is_completed {
        "done"
    } else if task.skipped {
        "skipped"
    } else if task.is_overdue(today) {
        "OVERDUE"
    } else {
        "pending"
    };
    format!(
        "{} | {} | {} | {} | {}",
        task.id,
        task.scheduled_date,
        task.task_type.as_str(),
        plant_name,
        state
    )
}

/// Lookup table from plant ID to display name for a user's plants.
pub fn plant_name_map(plants: &[UserPlant]) -> HashMap<Uuid, String> {
    plants
        .iter()
        .map(|plant| (plant.id, plant.name.clone()))
        .collect()
}
