use chrono::NaiveDate;
use uuid::Uuid;

use plantcare_core::admin::{grant_premium, recompute_all_statuses, system_statistics};
use plantcare_core::calendar::{overdue_tasks, tasks_for_date, tasks_for_month, upcoming_tasks};
use plantcare_core::model::{
    NewPlant, NewPlantType, NewReading, NewUser, PlantStatus, TaskType,
};
use plantcare_core::plants::{create_plant, delete_plant, refresh_status, update_plant_details};
use plantcare_core::schedule::{complete_task, reconcile_tasks, skip_task};
use plantcare_core::sensors::{assign_sensor, record_reading};
use plantcare_core::{CareError, Clock, FixedClock, PlantStore, SqliteStore, TaskFilter};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn monstera() -> NewPlantType {
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
        care_tips: Some("Bright indirect light".to_string()),
    }
}

struct Fixture {
    store: SqliteStore,
    user_id: Uuid,
    type_id: Uuid,
}

fn fixture() -> Fixture {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let user_id = store
        .insert_user(&NewUser {
            email: "grower@example.com".to_string(),
            username: "grower".to_string(),
        })
        .unwrap();
    let type_id = store.insert_plant_type(&monstera()).unwrap();
    Fixture {
        store,
        user_id,
        type_id,
    }
}

fn register(fx: &mut Fixture, clock: &FixedClock, name: &str) -> plantcare_core::model::UserPlant {
    create_plant(
        &mut fx.store,
        clock,
        &NewPlant {
            user_id: fx.user_id,
            plant_type_id: fx.type_id,
            name: name.to_string(),
            location: None,
            last_watered: date(2024, 6, 8),
            last_fertilized: date(2024, 5, 20),
            last_repotted: None,
            notes: None,
        },
    )
    .unwrap()
}

#[test]
fn test_registration_creates_pending_tasks_for_derived_dates() {
    let mut fx = fixture();
    let clock = FixedClock::on_date(date(2024, 6, 10));
    let plant = register(&mut fx, &clock, "Freddy");

    assert_eq!(plant.next_watering, date(2024, 6, 15));
    assert_eq!(plant.next_fertilizing, date(2024, 6, 19));
    // Never repotted: no repotting date, no repotting task.
    assert_eq!(plant.next_repotting, None);
    assert_eq!(plant.status, PlantStatus::Healthy);

    let tasks = fx
        .store
        .list_tasks(&TaskFilter::new().plant(plant.id))
        .unwrap();
    assert_eq!(tasks.len(), 2);
    assert!(tasks.iter().all(|t| t.is_pending()));
    assert!(tasks
        .iter()
        .any(|t| t.task_type == TaskType::Watering && t.scheduled_date == date(2024, 6, 15)));
    assert!(tasks
        .iter()
        .any(|t| t.task_type == TaskType::Fertilizing && t.scheduled_date == date(2024, 6, 19)));
}

#[test]
fn test_reconcile_is_idempotent() {
    let mut fx = fixture();
    let clock = FixedClock::on_date(date(2024, 6, 10));
    let plant = register(&mut fx, &clock, "Freddy");

    reconcile_tasks(&mut fx.store, &clock, &plant).unwrap();
    reconcile_tasks(&mut fx.store, &clock, &plant).unwrap();

    let tasks = fx
        .store
        .list_tasks(&TaskFilter::new().plant(plant.id))
        .unwrap();
    assert_eq!(tasks.len(), 2);
}

#[test]
fn test_free_tier_plant_limit() {
    let mut fx = fixture();
    let clock = FixedClock::on_date(date(2024, 6, 10));

    for i in 0..5 {
        register(&mut fx, &clock, &format!("Plant {}", i));
    }
    let err = create_plant(
        &mut fx.store,
        &clock,
        &NewPlant {
            user_id: fx.user_id,
            plant_type_id: fx.type_id,
            name: "One too many".to_string(),
            location: None,
            last_watered: date(2024, 6, 8),
            last_fertilized: date(2024, 5, 20),
            last_repotted: None,
            notes: None,
        },
    )
    .unwrap_err();
    assert!(matches!(err, CareError::Validation(_)));
    assert!(err.to_string().contains("Premium"));

    // Premium lifts the limit.
    grant_premium(&mut fx.store, &clock, &fx.user_id, 30).unwrap();
    register(&mut fx, &clock, "Number six");
    assert_eq!(fx.store.count_plants(&fx.user_id).unwrap(), 6);
}

#[test]
fn test_completion_anchors_to_scheduled_date() {
    let mut fx = fixture();
    let clock = FixedClock::on_date(date(2024, 6, 10));
    let plant = register(&mut fx, &clock, "Freddy");

    let watering = fx
        .store
        .list_tasks(&TaskFilter::new().plant(plant.id))
        .unwrap()
        .into_iter()
        .find(|t| t.task_type == TaskType::Watering)
        .unwrap();
    assert_eq!(watering.scheduled_date, date(2024, 6, 15));

    // Completed two days late: the schedule stays anchored to the planned
    // date, not the completion date.
    let late = FixedClock::on_date(date(2024, 6, 17));
    let done = complete_task(
        &mut fx.store,
        &late,
        &fx.user_id,
        &watering.id,
        Some("gave it a good soak".to_string()),
    )
    .unwrap();
    assert!(done.is_completed);
    assert!(done.completed_at.is_some());

    let plant = fx.store.get_plant(&plant.id).unwrap().unwrap();
    assert_eq!(plant.last_watered, date(2024, 6, 15));
    assert_eq!(plant.next_watering, date(2024, 6, 22));

    // A fresh pending watering task exists at the new date.
    assert!(fx
        .store
        .pending_task_exists(&plant.id, TaskType::Watering, date(2024, 6, 22))
        .unwrap());
}

#[test]
fn test_complete_twice_conflicts() {
    let mut fx = fixture();
    let clock = FixedClock::on_date(date(2024, 6, 10));
    let plant = register(&mut fx, &clock, "Freddy");

    let task = fx
        .store
        .list_tasks(&TaskFilter::new().plant(plant.id))
        .unwrap()
        .remove(0);
    complete_task(&mut fx.store, &clock, &fx.user_id, &task.id, None).unwrap();

    let err = complete_task(&mut fx.store, &clock, &fx.user_id, &task.id, None).unwrap_err();
    assert!(matches!(err, CareError::Conflict(_)));
}

#[test]
fn test_skip_is_terminal_and_leaves_schedule_alone() {
    let mut fx = fixture();
    let clock = FixedClock::on_date(date(2024, 6, 10));
    let plant = register(&mut fx, &clock, "Freddy");

    let watering = fx
        .store
        .list_tasks(&TaskFilter::new().plant(plant.id))
        .unwrap()
        .into_iter()
        .find(|t| t.task_type == TaskType::Watering)
        .unwrap();

    let skipped = skip_task(&mut fx.store, &fx.user_id, &watering.id).unwrap();
    assert!(skipped.skipped);
    assert!(!skipped.is_completed);

    // No schedule mutation.
    let after = fx.store.get_plant(&plant.id).unwrap().unwrap();
    assert_eq!(after.last_watered, plant.last_watered);
    assert_eq!(after.next_watering, plant.next_watering);

    let err = skip_task(&mut fx.store, &fx.user_id, &watering.id).unwrap_err();
    assert!(matches!(err, CareError::Conflict(_)));
}

#[test]
fn test_sensor_adjustment_applied_on_completion() {
    let mut fx = fixture();
    let clock = FixedClock::on_date(date(2024, 6, 10));
    let plant = register(&mut fx, &clock, "Freddy");

    grant_premium(&mut fx.store, &clock, &fx.user_id, 365).unwrap();
    assign_sensor(&mut fx.store, &clock, &fx.user_id, &plant.id).unwrap();
    // Soil above the optimal max pushes the next watering out by 2 days.
    record_reading(
        &mut fx.store,
        &clock,
        &fx.user_id,
        &NewReading {
            plant_id: plant.id,
            temperature: 22.0,
            soil_humidity: Some(70.0),
            air_humidity: Some(50.0),
            light_level: 2000,
        },
        false,
    )
    .unwrap();

    let watering = fx
        .store
        .list_tasks(&TaskFilter::new().plant(plant.id))
        .unwrap()
        .into_iter()
        .find(|t| t.task_type == TaskType::Watering)
        .unwrap();
    complete_task(&mut fx.store, &clock, &fx.user_id, &watering.id, None).unwrap();

    let plant = fx.store.get_plant(&plant.id).unwrap().unwrap();
    assert_eq!(plant.last_watered, date(2024, 6, 15));
    // Base 7 days plus the +2 adjustment.
    assert_eq!(plant.next_watering, date(2024, 6, 24));
}

#[test]
fn test_repotting_without_cadence_is_never_rescheduled() {
    let mut fx = fixture();
    let clock = FixedClock::on_date(date(2024, 6, 10));

    let mut no_cadence = monstera();
    no_cadence.name = "Air plant".to_string();
    no_cadence.repotting_frequency_months = None;
    let type_id = fx.store.insert_plant_type(&no_cadence).unwrap();

    let plant = create_plant(
        &mut fx.store,
        &clock,
        &NewPlant {
            user_id: fx.user_id,
            plant_type_id: type_id,
            name: "Tilly".to_string(),
            location: None,
            last_watered: date(2024, 6, 8),
            last_fertilized: date(2024, 5, 20),
            last_repotted: Some(date(2024, 1, 1)),
            notes: None,
        },
    )
    .unwrap();
    assert_eq!(plant.next_repotting, None);

    // A manually logged repotting completes fine but never reschedules.
    let task = plantcare_core::model::CareTask {
        id: Uuid::new_v4(),
        plant_id: plant.id,
        scheduled_date: date(2024, 6, 10),
        task_type: TaskType::Repotting,
        is_completed: false,
        completed_at: None,
        skipped: false,
        auto_adjusted: false,
        notes: None,
        created_at: clock.0,
    };
    fx.store.insert_task(&task).unwrap();
    complete_task(&mut fx.store, &clock, &fx.user_id, &task.id, None).unwrap();

    let plant = fx.store.get_plant(&plant.id).unwrap().unwrap();
    assert_eq!(plant.last_repotted, Some(date(2024, 6, 10)));
    assert_eq!(plant.next_repotting, None);

    let repot_tasks: Vec<_> = fx
        .store
        .list_tasks(&TaskFilter::new().plant(plant.id))
        .unwrap()
        .into_iter()
        .filter(|t| t.task_type == TaskType::Repotting && t.is_pending())
        .collect();
    assert!(repot_tasks.is_empty());
}

#[test]
fn test_sensor_features_require_active_premium() {
    let mut fx = fixture();
    let clock = FixedClock::on_date(date(2024, 6, 10));
    let plant = register(&mut fx, &clock, "Freddy");

    let err = assign_sensor(&mut fx.store, &clock, &fx.user_id, &plant.id).unwrap_err();
    assert!(matches!(err, CareError::Entitlement(_)));

    let err = record_reading(
        &mut fx.store,
        &clock,
        &fx.user_id,
        &NewReading {
            plant_id: plant.id,
            temperature: 22.0,
            soil_humidity: Some(50.0),
            air_humidity: None,
            light_level: 2000,
        },
        false,
    )
    .unwrap_err();
    assert!(matches!(err, CareError::Entitlement(_)));
}

#[test]
fn test_other_users_tasks_read_as_not_found() {
    let mut fx = fixture();
    let clock = FixedClock::on_date(date(2024, 6, 10));
    let plant = register(&mut fx, &clock, "Freddy");

    let stranger = fx
        .store
        .insert_user(&NewUser {
            email: "stranger@example.com".to_string(),
            username: "stranger".to_string(),
        })
        .unwrap();

    let task = fx
        .store
        .list_tasks(&TaskFilter::new().plant(plant.id))
        .unwrap()
        .remove(0);
    let err = complete_task(&mut fx.store, &clock, &stranger, &task.id, None).unwrap_err();
    assert!(matches!(err, CareError::NotFound(_)));

    let err = delete_plant(&mut fx.store, &stranger, &plant.id).unwrap_err();
    assert!(matches!(err, CareError::NotFound(_)));
}

#[test]
fn test_calendar_views() {
    let mut fx = fixture();
    let clock = FixedClock::on_date(date(2024, 6, 10));

    // A neglected plant: watering was due 2024-06-03, a week ago.
    let neglected = create_plant(
        &mut fx.store,
        &clock,
        &NewPlant {
            user_id: fx.user_id,
            plant_type_id: fx.type_id,
            name: "Neglected".to_string(),
            location: None,
            last_watered: date(2024, 5, 27),
            last_fertilized: date(2024, 6, 1),
            last_repotted: None,
            notes: None,
        },
    )
    .unwrap();
    let fresh = register(&mut fx, &clock, "Fresh");

    let overdue = overdue_tasks(&fx.store, &clock, &fx.user_id).unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].plant_id, neglected.id);
    assert_eq!(overdue[0].scheduled_date, date(2024, 6, 3));
    assert!(overdue[0].is_overdue(clock.today()));

    // Default week horizon covers the fresh plant's watering on 6/15 but
    // not its fertilizing on 6/19.
    let upcoming = upcoming_tasks(&fx.store, &clock, &fx.user_id, 7).unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].plant_id, fresh.id);
    assert_eq!(upcoming[0].task_type, TaskType::Watering);

    let on_day = tasks_for_date(&fx.store, &fx.user_id, date(2024, 6, 15)).unwrap();
    assert_eq!(on_day.len(), 1);

    // June holds three of the four generated tasks; July holds the
    // fertilizing due 2024-07-01 from the neglected plant's 6/1 baseline.
    let june = tasks_for_month(&fx.store, &fx.user_id, 2024, 6).unwrap();
    assert_eq!(june.len(), 3);
    let july = tasks_for_month(&fx.store, &fx.user_id, 2024, 7).unwrap();
    assert_eq!(july.len(), 1);
    assert_eq!(july[0].task_type, TaskType::Fertilizing);
}

#[test]
fn test_refresh_status_tracks_watering_overdue() {
    let mut fx = fixture();
    let clock = FixedClock::on_date(date(2024, 6, 10));

    let plant = create_plant(
        &mut fx.store,
        &clock,
        &NewPlant {
            user_id: fx.user_id,
            plant_type_id: fx.type_id,
            name: "Thirsty".to_string(),
            location: None,
            last_watered: date(2024, 6, 2),
            last_fertilized: date(2024, 6, 1),
            last_repotted: None,
            notes: None,
        },
    )
    .unwrap();
    // Watering due 6/9, one day overdue today.
    assert_eq!(plant.status, PlantStatus::Warning);

    // Three days overdue tips it to critical.
    let later = FixedClock::on_date(date(2024, 6, 12));
    let status = refresh_status(&mut fx.store, &later, &plant.id).unwrap();
    assert_eq!(status, PlantStatus::Critical);
    assert_eq!(
        fx.store.get_plant(&plant.id).unwrap().unwrap().status,
        PlantStatus::Critical
    );
}

#[test]
fn test_update_plant_details_leaves_schedule_untouched() {
    let mut fx = fixture();
    let clock = FixedClock::on_date(date(2024, 6, 10));
    let plant = register(&mut fx, &clock, "Freddy");

    let updated = update_plant_details(
        &mut fx.store,
        &clock,
        &fx.user_id,
        &plant.id,
        Some("Frederick".to_string()),
        Some("Bedroom".to_string()),
        None,
    )
    .unwrap();
    assert_eq!(updated.name, "Frederick");
    assert_eq!(updated.location.as_deref(), Some("Bedroom"));
    assert_eq!(updated.next_watering, plant.next_watering);
    assert_eq!(updated.status, plant.status);
}

#[test]
fn test_admin_sweep_and_statistics() {
    let mut fx = fixture();
    let clock = FixedClock::on_date(date(2024, 6, 10));
    register(&mut fx, &clock, "Healthy one");
    create_plant(
        &mut fx.store,
        &clock,
        &NewPlant {
            user_id: fx.user_id,
            plant_type_id: fx.type_id,
            name: "Behind".to_string(),
            location: None,
            last_watered: date(2024, 5, 20),
            last_fertilized: date(2024, 6, 1),
            last_repotted: None,
            notes: None,
        },
    )
    .unwrap();

    let later = FixedClock::on_date(date(2024, 6, 20));
    let report = recompute_all_statuses(&mut fx.store, &later).unwrap();
    assert_eq!(report.plants_seen, 2);
    assert_eq!(report.failures, 0);

    let stats = system_statistics(&fx.store, &later).unwrap();
    assert_eq!(stats.total_users, 1);
    assert_eq!(stats.premium_users, 0);
    assert_eq!(stats.free_users, 1);
    assert_eq!(stats.total_plants, 2);
    assert_eq!(stats.plants_with_sensors, 0);
    // Both plants are past their watering date by 2024-06-20.
    assert_eq!(stats.plant_statuses.get("critical"), Some(&2));
}
