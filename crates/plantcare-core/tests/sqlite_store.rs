use chrono::NaiveDate;
use tempfile::TempDir;
use uuid::Uuid;

use plantcare_core::model::{
    CareTask, NewPlant, NewPlantType, NewReading, NewUser, TaskType,
};
use plantcare_core::plants::create_plant;
use plantcare_core::sensors::{assign_sensor, record_reading};
use plantcare_core::{CareError, FixedClock, PlantStore, SqliteStore, TaskFilter};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn clock() -> FixedClock {
    FixedClock::on_date(date(2024, 6, 10))
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        username: email.split('@').next().unwrap().to_string(),
    }
}

fn new_plant_type(name: &str) -> NewPlantType {
    NewPlantType {
        name: name.to_string(),
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
    }
}

fn new_plant(user_id: Uuid, plant_type_id: Uuid, name: &str) -> NewPlant {
    NewPlant {
        user_id,
        plant_type_id,
        name: name.to_string(),
        location: Some("Kitchen".to_string()),
        last_watered: date(2024, 6, 8),
        last_fertilized: date(2024, 5, 20),
        last_repotted: None,
        notes: None,
    }
}

#[test]
fn test_create_reopen_round_trip() {
    let dir = TempDir::new().expect("temp dir should be created");
    let path = dir.path().join("plants.db");
    let clock = clock();

    let (user_id, plant_id) = {
        let mut store = SqliteStore::open(&path).expect("open should succeed");
        let user_id = store.insert_user(&new_user("fern@example.com")).unwrap();
        let type_id = store.insert_plant_type(&new_plant_type("Monstera")).unwrap();
        let plant = create_plant(&mut store, &clock, &new_plant(user_id, type_id, "Freddy"))
            .expect("plant creation should succeed");
        (user_id, plant.id)
    };

    let store = SqliteStore::open(&path).expect("reopen should succeed");
    let user = store.get_user(&user_id).unwrap().expect("user persists");
    assert_eq!(user.email, "fern@example.com");

    let plant = store.get_plant(&plant_id).unwrap().expect("plant persists");
    assert_eq!(plant.name, "Freddy");
    assert_eq!(plant.last_watered, date(2024, 6, 8));
    assert_eq!(plant.next_watering, date(2024, 6, 15));
    assert_eq!(plant.next_fertilizing, date(2024, 6, 19));
    assert_eq!(plant.next_repotting, None);

    let tasks = store
        .list_tasks(&TaskFilter::new().plant(plant_id))
        .unwrap();
    assert_eq!(tasks.len(), 2);

    store.check_integrity().expect("integrity check should pass");
}

#[test]
fn test_duplicate_email_rejected() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    store.insert_user(&new_user("dup@example.com")).unwrap();

    let err = store.insert_user(&new_user("dup@example.com")).unwrap_err();
    assert!(matches!(err, CareError::Conflict(_)));
}

#[test]
fn test_plant_type_delete_blocked_while_referenced() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let clock = clock();

    let user_id = store.insert_user(&new_user("a@example.com")).unwrap();
    let type_id = store.insert_plant_type(&new_plant_type("Ficus")).unwrap();
    let plant = create_plant(&mut store, &clock, &new_plant(user_id, type_id, "Fred")).unwrap();

    let err = store.delete_plant_type(&type_id).unwrap_err();
    assert!(matches!(err, CareError::Conflict(_)));

    store.delete_plant(&plant.id).unwrap();
    store
        .delete_plant_type(&type_id)
        .expect("delete should succeed once unreferenced");
    assert!(store.get_plant_type(&type_id).unwrap().is_none());
}

#[test]
fn test_delete_plant_cascades_to_tasks_and_readings() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let clock = clock();

    let user_id = store.insert_user(&new_user("casc@example.com")).unwrap();
    store
        .set_premium(&user_id, true, Some(date(2030, 1, 1)))
        .unwrap();
    let type_id = store.insert_plant_type(&new_plant_type("Pothos")).unwrap();
    let plant = create_plant(&mut store, &clock, &new_plant(user_id, type_id, "Piet")).unwrap();

    assign_sensor(&mut store, &clock, &user_id, &plant.id).unwrap();
    record_reading(
        &mut store,
        &clock,
        &user_id,
        &NewReading {
            plant_id: plant.id,
            temperature: 22.0,
            soil_humidity: Some(45.0),
            air_humidity: Some(55.0),
            light_level: 2000,
        },
        false,
    )
    .unwrap();

    assert!(!store
        .list_tasks(&TaskFilter::new().plant(plant.id))
        .unwrap()
        .is_empty());
    assert!(store.latest_reading(&plant.id).unwrap().is_some());

    store.delete_plant(&plant.id).unwrap();

    assert!(store
        .list_tasks(&TaskFilter::new().plant(plant.id))
        .unwrap()
        .is_empty());
    assert!(store.latest_reading(&plant.id).unwrap().is_none());
    store.check_integrity().expect("no orphans after cascade");
}

#[test]
fn test_task_listing_order_is_date_then_type() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let clock = clock();

    let user_id = store.insert_user(&new_user("ord@example.com")).unwrap();
    let type_id = store.insert_plant_type(&new_plant_type("Calathea")).unwrap();
    let plant = create_plant(&mut store, &clock, &new_plant(user_id, type_id, "Cal")).unwrap();

    // Two extra tasks on the same date, inserted out of order.
    let day = date(2024, 7, 1);
    for task_type in [TaskType::Watering, TaskType::Fertilizing, TaskType::Repotting] {
        store
            .insert_task(&CareTask {
                id: Uuid::new_v4(),
                plant_id: plant.id,
                scheduled_date: day,
                task_type,
                is_completed: false,
                completed_at: None,
                skipped: false,
                auto_adjusted: false,
                notes: None,
                created_at: clock.0,
            })
            .unwrap();
    }

    let tasks = store
        .list_tasks(&TaskFilter::new().plant(plant.id).on(day))
        .unwrap();
    let types: Vec<TaskType> = tasks.iter().map(|t| t.task_type).collect();
    assert_eq!(
        types,
        vec![TaskType::Fertilizing, TaskType::Repotting, TaskType::Watering]
    );
}

#[test]
fn test_delete_stale_pending_spares_completed_and_skipped() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let clock = clock();

    let user_id = store.insert_user(&new_user("stale@example.com")).unwrap();
    let type_id = store.insert_plant_type(&new_plant_type("Aloe")).unwrap();
    let plant = create_plant(&mut store, &clock, &new_plant(user_id, type_id, "Al")).unwrap();

    let old_day = date(2024, 6, 1);
    let mut ids = Vec::new();
    for (is_completed, skipped) in [(false, false), (true, false), (false, true)] {
        let task = CareTask {
            id: Uuid::new_v4(),
            plant_id: plant.id,
            scheduled_date: old_day,
            task_type: TaskType::Watering,
            is_completed,
            completed_at: is_completed.then(|| clock.0),
            skipped,
            auto_adjusted: false,
            notes: None,
            created_at: clock.0,
        };
        store.insert_task(&task).unwrap();
        ids.push((task.id, is_completed, skipped));
    }

    let deleted = store.delete_stale_pending(&plant.id, date(2024, 6, 10)).unwrap();
    assert_eq!(deleted, 1);

    for (id, is_completed, skipped) in ids {
        let survives = is_completed || skipped;
        assert_eq!(store.get_task(&id).unwrap().is_some(), survives);
    }
}

#[test]
fn test_pending_task_exists_matches_exact_slot() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let clock = clock();

    let user_id = store.insert_user(&new_user("slot@example.com")).unwrap();
    let type_id = store.insert_plant_type(&new_plant_type("Basil")).unwrap();
    let plant = create_plant(&mut store, &clock, &new_plant(user_id, type_id, "Basi")).unwrap();

    // Creation scheduled a watering task at the derived next date.
    assert!(store
        .pending_task_exists(&plant.id, TaskType::Watering, plant.next_watering)
        .unwrap());
    assert!(!store
        .pending_task_exists(&plant.id, TaskType::Repotting, plant.next_watering)
        .unwrap());
    assert!(!store
        .pending_task_exists(&plant.id, TaskType::Watering, date(2024, 12, 25))
        .unwrap());
}

#[test]
fn test_readings_window_filter() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let clock = clock();

    let user_id = store.insert_user(&new_user("win@example.com")).unwrap();
    store
        .set_premium(&user_id, true, Some(date(2030, 1, 1)))
        .unwrap();
    let type_id = store.insert_plant_type(&new_plant_type("Ivy")).unwrap();
    let plant = create_plant(&mut store, &clock, &new_plant(user_id, type_id, "Ive")).unwrap();
    assign_sensor(&mut store, &clock, &user_id, &plant.id).unwrap();

    for day in [1, 5, 9] {
        let at = FixedClock::on_date(date(2024, 6, day));
        record_reading(
            &mut store,
            &at,
            &user_id,
            &NewReading {
                plant_id: plant.id,
                temperature: 20.0 + f64::from(day),
                soil_humidity: Some(50.0),
                air_humidity: None,
                light_level: 1500,
            },
            false,
        )
        .unwrap();
    }

    let all = store.list_readings(&plant.id, None).unwrap();
    assert_eq!(all.len(), 3);
    // Oldest first.
    assert!(all[0].recorded_at < all[2].recorded_at);

    let since = FixedClock::on_date(date(2024, 6, 4)).0;
    let recent = store.list_readings(&plant.id, Some(since)).unwrap();
    assert_eq!(recent.len(), 2);

    let latest = store.latest_reading(&plant.id).unwrap().unwrap();
    assert_eq!(latest.temperature, 29.0);
}
